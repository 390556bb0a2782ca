//! In-progress submissions, one independent slice per media kind.
//!
//! Nothing in here performs I/O or knows about review or the catalog.
//! Mutators never fail: unknown ids and out-of-range indices are ignored.

use serde::{Deserialize, Serialize};

use crate::domain::entry::MediaKind;

pub mod album;
pub mod single;
pub mod video;

pub use album::AlbumDraft;
pub use single::SingleDraft;
pub use video::VideoDraft;

/// Owner of the three draft slices.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftStore {
    single: SingleDraft,
    album: AlbumDraft,
    video: VideoDraft,
}

impl DraftStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(&self) -> &SingleDraft {
        &self.single
    }

    pub fn single_mut(&mut self) -> &mut SingleDraft {
        &mut self.single
    }

    pub fn album(&self) -> &AlbumDraft {
        &self.album
    }

    pub fn album_mut(&mut self) -> &mut AlbumDraft {
        &mut self.album
    }

    pub fn video(&self) -> &VideoDraft {
        &self.video
    }

    pub fn video_mut(&mut self) -> &mut VideoDraft {
        &mut self.video
    }

    /// Restores the slice of the given kind to its empty default.
    pub fn reset(&mut self, kind: MediaKind) {
        log::debug!("resetting {kind} draft");
        match kind {
            MediaKind::Single => self.single.reset(),
            MediaKind::Album => self.album.reset(),
            MediaKind::Video => self.video.reset(),
        }
    }

    pub fn is_empty(&self, kind: MediaKind) -> bool {
        match kind {
            MediaKind::Single => self.single.is_empty(),
            MediaKind::Album => self.album.is_empty(),
            MediaKind::Video => self.video.is_empty(),
        }
    }
}
