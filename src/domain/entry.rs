use std::{fmt::Display, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    domain::{
        media::MediaFileId,
        metadata::{MusicMetadata, PrimaryArtist, VideoMetadata},
    },
    publish::encoding::DurablePayload,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Single,
    Album,
    Video,
}

impl MediaKind {
    pub const ALL: [MediaKind; 3] = [MediaKind::Single, MediaKind::Album, MediaKind::Video];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Single => "single",
            MediaKind::Album => "album",
            MediaKind::Video => "video",
        }
    }
}

impl Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = String;

    /// `mix` is what the navigation layer calls a single
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "mix" => Ok(MediaKind::Single),
            "album" => Ok(MediaKind::Album),
            "video" => Ok(MediaKind::Video),
            other => Err(format!("unknown media kind '{other}'")),
        }
    }
}

/// Engagement counters shown on dashboards. A new entry starts at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Engagement {
    pub plays: u64,
    pub unlocks: u64,
    pub gifts: u64,
}

/// Fields every catalog entry carries regardless of its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryInfo {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub release_date: DateTime<Utc>,
    pub engagement: Engagement,
}

impl EntryInfo {
    pub fn new(id: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            created_at: now,
            updated_at: now,
            release_date: now,
            engagement: Engagement::default(),
        }
    }
}

/// A published file: display metadata plus its self-contained encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    pub id: MediaFileId,
    pub display_name: String,
    pub human_size: String,
    pub payload: DurablePayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleEntry {
    pub info: EntryInfo,
    pub title: String,
    pub credits: Vec<String>,
    pub track: StoredFile,
    pub cover_art: Option<StoredFile>,
    pub metadata: MusicMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumTrack {
    pub file: StoredFile,
    pub title: String,
    pub artists: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumEntry {
    pub info: EntryInfo,
    pub title: String,
    pub primary_artists: Vec<PrimaryArtist>,
    /// in track order
    pub tracks: Vec<AlbumTrack>,
    pub cover_art: Option<StoredFile>,
    pub metadata: MusicMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoEntry {
    pub info: EntryInfo,
    pub title: String,
    pub video: StoredFile,
    pub thumbnails: Vec<StoredFile>,
    pub selected_thumbnail: Option<MediaFileId>,
    pub track_links: Vec<String>,
    pub metadata: VideoMetadata,
}

/// Published media record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum CatalogEntry {
    Single(SingleEntry),
    Album(AlbumEntry),
    Video(VideoEntry),
}

impl CatalogEntry {
    pub fn kind(&self) -> MediaKind {
        match self {
            CatalogEntry::Single(_) => MediaKind::Single,
            CatalogEntry::Album(_) => MediaKind::Album,
            CatalogEntry::Video(_) => MediaKind::Video,
        }
    }

    pub fn info(&self) -> &EntryInfo {
        match self {
            CatalogEntry::Single(e) => &e.info,
            CatalogEntry::Album(e) => &e.info,
            CatalogEntry::Video(e) => &e.info,
        }
    }

    pub fn id(&self) -> &str {
        &self.info().id
    }

    pub fn title(&self) -> &str {
        match self {
            CatalogEntry::Single(e) => &e.title,
            CatalogEntry::Album(e) => &e.title,
            CatalogEntry::Video(e) => &e.title,
        }
    }

    /// every stored file of the entry, primary media first
    pub fn files(&self) -> Vec<&StoredFile> {
        match self {
            CatalogEntry::Single(e) => std::iter::once(&e.track)
                .chain(e.cover_art.as_ref())
                .collect(),
            CatalogEntry::Album(e) => e
                .tracks
                .iter()
                .map(|t| &t.file)
                .chain(e.cover_art.as_ref())
                .collect(),
            CatalogEntry::Video(e) => std::iter::once(&e.video)
                .chain(e.thumbnails.iter())
                .collect(),
        }
    }

    pub fn file(&self, file_id: &MediaFileId) -> Option<&StoredFile> {
        self.files().into_iter().find(|f| &f.id == file_id)
    }
}


#[cfg(test)]
mod tests {
    use super::{fixtures::*, *};

    #[test]
    fn test_kind_parsing_accepts_mix() {
        assert_eq!("mix".parse::<MediaKind>(), Ok(MediaKind::Single));
        assert_eq!("Album".parse::<MediaKind>(), Ok(MediaKind::Album));
        assert!("podcast".parse::<MediaKind>().is_err());
    }

    #[test]
    fn test_new_entry_has_zero_engagement() {
        let info = EntryInfo::new("1".into(), Utc::now());
        assert_eq!(info.engagement, Engagement::default());
        assert_eq!(info.created_at, info.release_date);
    }

    #[test]
    fn test_entry_json_is_tagged_by_kind() -> anyhow::Result<()> {
        let entry = single_entry("7", "Fall");
        let value = serde_json::to_value(&entry)?;
        assert_eq!(value["kind"], "single");

        let back: CatalogEntry = serde_json::from_value(value)?;
        assert_eq!(back, entry);
        Ok(())
    }

    #[test]
    fn test_album_files_keep_track_order_then_cover() {
        let entry = album_entry("a", "Album", &[("one.mp3", "One"), ("two.mp3", "Two")]);
        let names: Vec<_> = entry.files().iter().map(|f| f.display_name.as_str()).collect();
        assert_eq!(names, vec!["one.mp3", "two.mp3", "cover.png"]);
    }

    #[test]
    fn test_file_lookup_by_id() {
        let entry = single_entry("7", "Fall");
        let CatalogEntry::Single(single) = &entry else {
            unreachable!()
        };
        assert!(entry.file(&single.track.id).is_some());
        assert!(entry.file(&MediaFileId::from("missing")).is_none());
    }
}
