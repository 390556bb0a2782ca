//! Frozen snapshot of one draft, shaped for the review screen.
//!
//! A snapshot is taken only on an explicit "continue" and replaces the previous
//! one wholesale. Later draft edits never reach an existing snapshot.
//!
//! Singles and albums share one shape ([`MusicReview`]): the single's title and
//! credits are fanned out into per-track maps keyed by its one track, so the
//! review screen renders both with the same per-track component.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        entry::MediaKind,
        media::{MediaFileId, MediaFileRef},
        metadata::{MusicMetadata, PrimaryArtist, VideoMetadata},
    },
    draft::{AlbumDraft, DraftStore, SingleDraft, VideoDraft},
};

/// Display-only view of a file; carries no binary handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFile {
    pub id: MediaFileId,
    pub display_name: String,
    pub human_size: String,
}

impl From<&MediaFileRef> for ReviewFile {
    fn from(file: &MediaFileRef) -> Self {
        Self {
            id: file.id.clone(),
            display_name: file.display_name.clone(),
            human_size: file.human_size.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MusicReview {
    pub kind: MediaKind,
    pub title: String,
    pub cover_art: Option<ReviewFile>,
    pub tracks: Vec<ReviewFile>,
    pub track_titles: BTreeMap<MediaFileId, String>,
    pub track_artists: BTreeMap<MediaFileId, Vec<String>>,
    pub primary_artists: Vec<PrimaryArtist>,
    pub metadata: MusicMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoReview {
    pub title: String,
    pub video: Option<ReviewFile>,
    pub thumbnails: Vec<ReviewFile>,
    pub selected_thumbnail: Option<MediaFileId>,
    pub track_links: Vec<String>,
    pub metadata: VideoMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewSnapshot {
    Music(MusicReview),
    Video(VideoReview),
}

impl ReviewSnapshot {
    pub fn kind(&self) -> MediaKind {
        match self {
            ReviewSnapshot::Music(music) => music.kind,
            ReviewSnapshot::Video(_) => MediaKind::Video,
        }
    }
}

pub fn project_single(draft: &SingleDraft) -> ReviewSnapshot {
    let tracks: Vec<ReviewFile> = draft.track().map(ReviewFile::from).into_iter().collect();
    let (track_titles, track_artists) = match draft.track() {
        Some(track) => (
            BTreeMap::from([(track.id.clone(), draft.title().to_string())]),
            BTreeMap::from([(track.id.clone(), draft.credits().to_vec())]),
        ),
        None => (BTreeMap::new(), BTreeMap::new()),
    };

    ReviewSnapshot::Music(MusicReview {
        kind: MediaKind::Single,
        title: draft.title().to_string(),
        cover_art: draft.cover_art().map(ReviewFile::from),
        tracks,
        track_titles,
        track_artists,
        primary_artists: Vec::new(),
        metadata: draft.metadata().clone(),
    })
}

pub fn project_album(draft: &AlbumDraft) -> ReviewSnapshot {
    ReviewSnapshot::Music(MusicReview {
        kind: MediaKind::Album,
        title: draft.title().to_string(),
        cover_art: draft.cover_art().map(ReviewFile::from),
        tracks: draft.tracks().iter().map(ReviewFile::from).collect(),
        track_titles: draft.track_titles().clone(),
        track_artists: draft.track_artists().clone(),
        primary_artists: draft.primary_artists().to_vec(),
        metadata: draft.metadata().clone(),
    })
}

pub fn project_video(draft: &VideoDraft) -> ReviewSnapshot {
    ReviewSnapshot::Video(VideoReview {
        title: draft.title().to_string(),
        video: draft.video().map(ReviewFile::from),
        thumbnails: draft.thumbnails().iter().map(ReviewFile::from).collect(),
        selected_thumbnail: draft.selected_thumbnail().map(|t| t.id.clone()),
        track_links: draft.track_links().to_vec(),
        metadata: draft.metadata().clone(),
    })
}

pub fn project(drafts: &DraftStore, kind: MediaKind) -> ReviewSnapshot {
    match kind {
        MediaKind::Single => project_single(drafts.single()),
        MediaKind::Album => project_album(drafts.album()),
        MediaKind::Video => project_video(drafts.video()),
    }
}

/// Staging area behind the review screen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewStage {
    snapshot: Option<ReviewSnapshot>,
}

impl ReviewStage {
    /// Replaces whatever was staged before.
    pub fn stage(&mut self, snapshot: ReviewSnapshot) -> &ReviewSnapshot {
        log::debug!("staging {} draft for review", snapshot.kind());
        self.snapshot.insert(snapshot)
    }

    pub fn snapshot(&self) -> Option<&ReviewSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn clear(&mut self) {
        self.snapshot = None;
    }

    pub fn is_empty(&self) -> bool {
        self.snapshot.is_none()
    }
}
