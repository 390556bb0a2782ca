use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    media::{MediaFileId, MediaFileRef},
    metadata::{ArtistRole, MusicMetadata, PrimaryArtist},
};

/// Working state of a multi-track album.
///
/// Per-track titles and artists are keyed by the track's file id. Every key
/// always belongs to a track in `tracks`: removing a track drops its entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumDraft {
    tracks: Vec<MediaFileRef>,
    cover_art: Option<MediaFileRef>,
    title: String,
    track_titles: BTreeMap<MediaFileId, String>,
    track_artists: BTreeMap<MediaFileId, Vec<String>>,
    primary_artists: Vec<PrimaryArtist>,
    metadata: MusicMetadata,
}

impl AlbumDraft {
    pub fn tracks(&self) -> &[MediaFileRef] {
        &self.tracks
    }

    pub fn track(&self, id: &MediaFileId) -> Option<&MediaFileRef> {
        self.tracks.iter().find(|t| &t.id == id)
    }

    pub fn cover_art(&self) -> Option<&MediaFileRef> {
        self.cover_art.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn track_titles(&self) -> &BTreeMap<MediaFileId, String> {
        &self.track_titles
    }

    pub fn track_artists(&self) -> &BTreeMap<MediaFileId, Vec<String>> {
        &self.track_artists
    }

    pub fn track_title(&self, id: &MediaFileId) -> &str {
        self.track_titles.get(id).map(String::as_str).unwrap_or("")
    }

    pub fn artists_of(&self, id: &MediaFileId) -> &[String] {
        self.track_artists.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn primary_artists(&self) -> &[PrimaryArtist] {
        &self.primary_artists
    }

    pub fn metadata(&self) -> &MusicMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MusicMetadata {
        &mut self.metadata
    }

    fn has_track(&self, id: &MediaFileId) -> bool {
        self.tracks.iter().any(|t| &t.id == id)
    }

    /// Appends a track. A file already on the album is not added twice.
    pub fn add_track(&mut self, file: MediaFileRef) {
        if !self.has_track(&file.id) {
            self.tracks.push(file);
        }
    }

    /// Removes the track together with its title and artists.
    pub fn remove_track(&mut self, id: &MediaFileId) {
        self.tracks.retain(|t| &t.id != id);
        self.track_titles.remove(id);
        self.track_artists.remove(id);
    }

    /// Moves a track to `to_index`, clamped to the end of the list.
    pub fn move_track(&mut self, id: &MediaFileId, to_index: usize) {
        if let Some(from) = self.tracks.iter().position(|t| &t.id == id) {
            let track = self.tracks.remove(from);
            let to = to_index.min(self.tracks.len());
            self.tracks.insert(to, track);
        }
    }

    pub fn set_track_title(&mut self, id: &MediaFileId, title: impl Into<String>) {
        if self.has_track(id) {
            self.track_titles.insert(id.clone(), title.into());
        }
    }

    /// Appends an artist to the track; pass an empty name to open a blank slot.
    pub fn add_track_artist(&mut self, id: &MediaFileId, name: impl Into<String>) {
        if self.has_track(id) {
            self.track_artists
                .entry(id.clone())
                .or_default()
                .push(name.into());
        }
    }

    pub fn update_track_artist(&mut self, id: &MediaFileId, index: usize, name: impl Into<String>) {
        if let Some(artist) = self
            .track_artists
            .get_mut(id)
            .and_then(|artists| artists.get_mut(index))
        {
            *artist = name.into();
        }
    }

    pub fn remove_track_artist(&mut self, id: &MediaFileId, index: usize) {
        if let Some(artists) = self.track_artists.get_mut(id) {
            if index < artists.len() {
                artists.remove(index);
            }
        }
    }

    pub fn set_cover_art(&mut self, file: MediaFileRef) {
        self.cover_art = Some(file);
    }

    pub fn remove_cover_art(&mut self) {
        self.cover_art = None;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    /// Credits an artist on the whole album and returns the new credit's id.
    pub fn add_primary_artist(&mut self, name: impl Into<String>, role: ArtistRole) -> String {
        let id = Uuid::new_v4().simple().to_string();
        self.primary_artists.push(PrimaryArtist {
            id: id.clone(),
            name: name.into(),
            role,
        });
        id
    }

    /// Puts back a credit that already has an id, e.g. when resuming an edit.
    pub fn push_primary_artist(&mut self, artist: PrimaryArtist) {
        if !self.primary_artists.iter().any(|a| a.id == artist.id) {
            self.primary_artists.push(artist);
        }
    }

    pub fn update_primary_artist(&mut self, id: &str, name: impl Into<String>) {
        if let Some(artist) = self.primary_artists.iter_mut().find(|a| a.id == id) {
            artist.name = name.into();
        }
    }

    pub fn set_primary_artist_role(&mut self, id: &str, role: ArtistRole) {
        if let Some(artist) = self.primary_artists.iter_mut().find(|a| a.id == id) {
            artist.role = role;
        }
    }

    pub fn remove_primary_artist(&mut self, id: &str) {
        self.primary_artists.retain(|a| a.id != id);
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
