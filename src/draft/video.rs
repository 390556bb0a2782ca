use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    media::{MediaFileId, MediaFileRef},
    metadata::VideoMetadata,
};

/// Working state of a video release.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoDraft {
    video: Option<MediaFileRef>,
    thumbnails: Vec<MediaFileRef>,
    selected_thumbnail: Option<MediaFileId>,
    title: String,
    /// links to the tracks used in the video; always at least one slot
    #[serde(deserialize_with = "at_least_one_link")]
    track_links: Vec<String>,
    metadata: VideoMetadata,
}

impl Default for VideoDraft {
    fn default() -> Self {
        Self {
            video: None,
            thumbnails: Vec::new(),
            selected_thumbnail: None,
            title: String::new(),
            track_links: vec![String::new()],
            metadata: VideoMetadata::default(),
        }
    }
}

fn at_least_one_link<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let mut links = Vec::<String>::deserialize(deserializer)?;
    if links.is_empty() {
        links.push(String::new());
    }
    Ok(links)
}

impl VideoDraft {
    pub fn video(&self) -> Option<&MediaFileRef> {
        self.video.as_ref()
    }

    pub fn thumbnails(&self) -> &[MediaFileRef] {
        &self.thumbnails
    }

    /// The thumbnail the user picked, or the first one when nothing was picked.
    pub fn selected_thumbnail(&self) -> Option<&MediaFileRef> {
        self.selected_thumbnail
            .as_ref()
            .and_then(|id| self.thumbnails.iter().find(|t| &t.id == id))
            .or_else(|| self.thumbnails.first())
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn track_links(&self) -> &[String] {
        &self.track_links
    }

    pub fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut VideoMetadata {
        &mut self.metadata
    }

    pub fn set_video(&mut self, file: MediaFileRef) {
        self.video = Some(file);
    }

    pub fn remove_video(&mut self) {
        self.video = None;
    }

    pub fn add_thumbnail(&mut self, file: MediaFileRef) {
        if !self.thumbnails.iter().any(|t| t.id == file.id) {
            self.thumbnails.push(file);
        }
    }

    pub fn remove_thumbnail(&mut self, id: &MediaFileId) {
        self.thumbnails.retain(|t| &t.id != id);
        if self.selected_thumbnail.as_ref() == Some(id) {
            self.selected_thumbnail = None;
        }
    }

    pub fn select_thumbnail(&mut self, id: &MediaFileId) {
        if self.thumbnails.iter().any(|t| &t.id == id) {
            self.selected_thumbnail = Some(id.clone());
        }
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn add_track_link(&mut self) {
        self.track_links.push(String::new());
    }

    pub fn update_track_link(&mut self, index: usize, url: impl Into<String>) {
        if let Some(link) = self.track_links.get_mut(index) {
            *link = url.into();
        }
    }

    /// Removing the last remaining slot does nothing.
    pub fn remove_track_link(&mut self, index: usize) {
        if self.track_links.len() > 1 && index < self.track_links.len() {
            self.track_links.remove(index);
        }
    }

    /// Replaces all links; an empty list leaves one blank slot.
    pub fn set_track_links(&mut self, links: Vec<String>) {
        self.track_links = links;
        if self.track_links.is_empty() {
            self.track_links.push(String::new());
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
