//! Loads a published entry back into a draft slice for editing.
//!
//! File ids survive the trip, so per-track titles and artists stay attached
//! to the same tracks and a later publish keeps the entry's identity.

use crate::{
    domain::{
        entry::{AlbumEntry, CatalogEntry, SingleEntry, StoredFile, VideoEntry},
        media::MediaFileRef,
    },
    draft::{AlbumDraft, DraftStore, SingleDraft, VideoDraft},
    publish::encoding::EncodeError,
};

fn restore_file(file: &StoredFile) -> Result<MediaFileRef, EncodeError> {
    let bytes = file.payload.decode()?;
    Ok(MediaFileRef::restored(
        file.id.clone(),
        file.display_name.clone(),
        bytes,
    ))
}

pub fn single_draft(entry: &SingleEntry) -> Result<SingleDraft, EncodeError> {
    let mut draft = SingleDraft::default();
    draft.set_track(restore_file(&entry.track)?);
    if let Some(cover) = &entry.cover_art {
        draft.set_cover_art(restore_file(cover)?);
    }
    draft.set_title(entry.title.clone());
    for credit in &entry.credits {
        draft.add_credit(credit.clone());
    }
    *draft.metadata_mut() = entry.metadata.clone();
    Ok(draft)
}

pub fn album_draft(entry: &AlbumEntry) -> Result<AlbumDraft, EncodeError> {
    let mut draft = AlbumDraft::default();
    draft.set_title(entry.title.clone());
    for track in &entry.tracks {
        let file = restore_file(&track.file)?;
        let id = file.id.clone();
        draft.add_track(file);
        draft.set_track_title(&id, track.title.clone());
        for artist in &track.artists {
            draft.add_track_artist(&id, artist.clone());
        }
    }
    if let Some(cover) = &entry.cover_art {
        draft.set_cover_art(restore_file(cover)?);
    }
    for artist in &entry.primary_artists {
        draft.push_primary_artist(artist.clone());
    }
    *draft.metadata_mut() = entry.metadata.clone();
    Ok(draft)
}

pub fn video_draft(entry: &VideoEntry) -> Result<VideoDraft, EncodeError> {
    let mut draft = VideoDraft::default();
    draft.set_title(entry.title.clone());
    draft.set_video(restore_file(&entry.video)?);
    for thumbnail in &entry.thumbnails {
        draft.add_thumbnail(restore_file(thumbnail)?);
    }
    if let Some(selected) = &entry.selected_thumbnail {
        draft.select_thumbnail(selected);
    }
    draft.set_track_links(entry.track_links.clone());
    *draft.metadata_mut() = entry.metadata.clone();
    Ok(draft)
}

/// Replaces the slice matching the entry's kind with the entry's content.
///
/// Decoding happens before anything is replaced, so a corrupt entry leaves
/// the store as it was.
pub fn load_into(drafts: &mut DraftStore, entry: &CatalogEntry) -> Result<(), EncodeError> {
    match entry {
        CatalogEntry::Single(e) => *drafts.single_mut() = single_draft(e)?,
        CatalogEntry::Album(e) => *drafts.album_mut() = album_draft(e)?,
        CatalogEntry::Video(e) => *drafts.video_mut() = video_draft(e)?,
    }
    Ok(())
}
