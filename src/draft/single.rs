use serde::{Deserialize, Serialize};

use crate::domain::{media::MediaFileRef, metadata::MusicMetadata};

/// Working state of a single (one track) release.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingleDraft {
    track: Option<MediaFileRef>,
    cover_art: Option<MediaFileRef>,
    title: String,
    /// first credit is the primary artist; blank entries are unnamed feature slots
    credits: Vec<String>,
    metadata: MusicMetadata,
}

impl SingleDraft {
    pub fn track(&self) -> Option<&MediaFileRef> {
        self.track.as_ref()
    }

    pub fn cover_art(&self) -> Option<&MediaFileRef> {
        self.cover_art.as_ref()
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn credits(&self) -> &[String] {
        &self.credits
    }

    pub fn metadata(&self) -> &MusicMetadata {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut MusicMetadata {
        &mut self.metadata
    }

    pub fn set_track(&mut self, file: MediaFileRef) {
        self.track = Some(file);
    }

    pub fn remove_track(&mut self) {
        self.track = None;
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

    pub fn add_credit(&mut self, name: impl Into<String>) {
        self.credits.push(name.into());
    }

    /// Adds a feature-artist slot that is not named yet.
    pub fn add_credit_slot(&mut self) {
        self.credits.push(String::new());
    }

    pub fn update_credit(&mut self, index: usize, name: impl Into<String>) {
        if let Some(credit) = self.credits.get_mut(index) {
            *credit = name.into();
        }
    }

    pub fn remove_credit(&mut self, index: usize) {
        if index < self.credits.len() {
            self.credits.remove(index);
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credit_slots_keep_insertion_order() {
        let mut draft = SingleDraft::default();
        draft.add_credit("Burna Boy");
        draft.add_credit_slot();
        draft.add_credit("Tems");
        draft.update_credit(1, "Wizkid");

        assert_eq!(draft.credits(), &["Burna Boy", "Wizkid", "Tems"]);
    }

    #[test]
    fn test_unknown_credit_index_is_ignored() {
        let mut draft = SingleDraft::default();
        draft.add_credit("Burna Boy");
        draft.update_credit(5, "Nobody");
        draft.remove_credit(5);

        assert_eq!(draft.credits(), &["Burna Boy"]);
    }

    #[test]
    fn test_track_and_cover_are_replaced() {
        let mut draft = SingleDraft::default();
        draft.set_track(MediaFileRef::from_bytes("one.mp3", vec![1]));
        let second = MediaFileRef::from_bytes("two.mp3", vec![2]);
        draft.set_track(second.clone());
        draft.set_cover_art(MediaFileRef::from_bytes("cover.png", vec![3]));

        assert_eq!(draft.track(), Some(&second));
        draft.remove_cover_art();
        assert!(draft.cover_art().is_none());
    }

    #[test]
    fn test_reset_twice_equals_default() {
        let mut draft = SingleDraft::default();
        draft.set_title("Fall");
        draft.add_credit_slot();
        draft.metadata_mut().genre.select("Afrobeats");
        draft.set_track(MediaFileRef::from_bytes("demo.mp3", vec![1]));

        draft.reset();
        let once = draft.clone();
        draft.reset();

        assert_eq!(once, SingleDraft::default());
        assert_eq!(draft, once);
        assert!(draft.is_empty());
    }
}
