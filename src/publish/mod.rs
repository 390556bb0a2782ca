//! Moves a draft into the catalog.
//!
//! Order of work: check the draft is ready, settle the entry id, encode every
//! referenced file, and only then write the entry and reset the draft. Until
//! the final write nothing outside this function's locals is touched, so a
//! failed or abandoned publish leaves both the draft and the catalog as they were.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::{
    domain::{
        entry::{
            AlbumEntry, AlbumTrack, CatalogEntry, EntryInfo, MediaKind, SingleEntry, StoredFile,
            VideoEntry,
        },
        media::{MediaFileId, MediaFileRef, UploadStatus},
        metadata::filled_names,
    },
    draft::{AlbumDraft, SingleDraft, VideoDraft},
    session::{EditSession, SessionMode},
    storage::{Storage, StorageError},
};

pub mod encoding;

use encoding::{ConversionFailure, EncodeError, FileEncoder, Payloads, encode_all};

#[derive(Debug, Error)]
pub enum PublishError {
    #[error("{kind} draft needs a ready {what} before it can be published")]
    MissingPrimary { kind: MediaKind, what: &'static str },

    #[error("{file_name} is not ready to publish ({status:?})")]
    FileNotReady {
        file_id: MediaFileId,
        file_name: String,
        status: UploadStatus,
    },

    #[error("failed to convert {file_name}: {source}")]
    Conversion {
        file_id: MediaFileId,
        file_name: String,
        #[source]
        source: EncodeError,
    },

    #[error("entry {id} is a {existing}, it cannot be replaced by a {requested}")]
    KindMismatch {
        id: String,
        existing: MediaKind,
        requested: MediaKind,
    },

    #[error("no encoded payload for {file_name}")]
    MissingPayload { file_name: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<ConversionFailure> for PublishError {
    fn from(failure: ConversionFailure) -> Self {
        PublishError::Conversion {
            file_id: failure.file_id,
            file_name: failure.file_name,
            source: failure.source,
        }
    }
}

impl PublishError {
    /// The file the user has to fix, when the failure is about one file.
    pub fn failed_file(&self) -> Option<&MediaFileId> {
        match self {
            PublishError::FileNotReady { file_id, .. } | PublishError::Conversion { file_id, .. } => {
                Some(file_id)
            }
            _ => None,
        }
    }
}

/// What the pipeline needs from a draft slice, whatever its kind.
pub trait Publishable {
    const KIND: MediaKind;

    /// Name of the primary file, for the error when it is missing.
    const PRIMARY: &'static str;

    fn has_ready_primary(&self) -> bool;

    /// Every file the entry will carry.
    fn files(&self) -> Vec<&MediaFileRef>;

    fn build_entry(&self, info: EntryInfo, payloads: Payloads) -> Result<CatalogEntry, PublishError>;

    fn reset(&mut self);
}

fn take_stored(file: &MediaFileRef, payloads: &mut Payloads) -> Result<StoredFile, PublishError> {
    let payload = payloads
        .remove(&file.id)
        .ok_or_else(|| PublishError::MissingPayload {
            file_name: file.display_name.clone(),
        })?;
    Ok(StoredFile {
        id: file.id.clone(),
        display_name: file.display_name.clone(),
        human_size: file.human_size.clone(),
        payload,
    })
}

impl Publishable for SingleDraft {
    const KIND: MediaKind = MediaKind::Single;
    const PRIMARY: &'static str = "track";

    fn has_ready_primary(&self) -> bool {
        self.track().is_some_and(MediaFileRef::is_ready)
    }

    fn files(&self) -> Vec<&MediaFileRef> {
        self.track().into_iter().chain(self.cover_art()).collect()
    }

    fn build_entry(&self, info: EntryInfo, mut payloads: Payloads) -> Result<CatalogEntry, PublishError> {
        let track = self.track().ok_or(PublishError::MissingPrimary {
            kind: Self::KIND,
            what: Self::PRIMARY,
        })?;
        Ok(CatalogEntry::Single(SingleEntry {
            info,
            title: self.title().trim().to_string(),
            credits: filled_names(self.credits()),
            track: take_stored(track, &mut payloads)?,
            cover_art: self
                .cover_art()
                .map(|cover| take_stored(cover, &mut payloads))
                .transpose()?,
            metadata: self.metadata().clone(),
        }))
    }

    fn reset(&mut self) {
        SingleDraft::reset(self);
    }
}

impl Publishable for AlbumDraft {
    const KIND: MediaKind = MediaKind::Album;
    const PRIMARY: &'static str = "track";

    fn has_ready_primary(&self) -> bool {
        self.tracks().iter().any(MediaFileRef::is_ready)
    }

    fn files(&self) -> Vec<&MediaFileRef> {
        self.tracks().iter().chain(self.cover_art()).collect()
    }

    fn build_entry(&self, info: EntryInfo, mut payloads: Payloads) -> Result<CatalogEntry, PublishError> {
        let tracks = self
            .tracks()
            .iter()
            .map(|track| {
                Ok(AlbumTrack {
                    file: take_stored(track, &mut payloads)?,
                    title: self.track_title(&track.id).trim().to_string(),
                    artists: filled_names(self.artists_of(&track.id)),
                })
            })
            .collect::<Result<Vec<_>, PublishError>>()?;

        Ok(CatalogEntry::Album(AlbumEntry {
            info,
            title: self.title().trim().to_string(),
            primary_artists: self
                .primary_artists()
                .iter()
                .filter(|artist| !artist.name.trim().is_empty())
                .cloned()
                .collect(),
            tracks,
            cover_art: self
                .cover_art()
                .map(|cover| take_stored(cover, &mut payloads))
                .transpose()?,
            metadata: self.metadata().clone(),
        }))
    }

    fn reset(&mut self) {
        AlbumDraft::reset(self);
    }
}

impl Publishable for VideoDraft {
    const KIND: MediaKind = MediaKind::Video;
    const PRIMARY: &'static str = "video";

    fn has_ready_primary(&self) -> bool {
        self.video().is_some_and(MediaFileRef::is_ready)
    }

    fn files(&self) -> Vec<&MediaFileRef> {
        self.video().into_iter().chain(self.thumbnails()).collect()
    }

    fn build_entry(&self, info: EntryInfo, mut payloads: Payloads) -> Result<CatalogEntry, PublishError> {
        let video = self.video().ok_or(PublishError::MissingPrimary {
            kind: Self::KIND,
            what: Self::PRIMARY,
        })?;
        Ok(CatalogEntry::Video(VideoEntry {
            info,
            title: self.title().trim().to_string(),
            video: take_stored(video, &mut payloads)?,
            thumbnails: self
                .thumbnails()
                .iter()
                .map(|thumbnail| take_stored(thumbnail, &mut payloads))
                .collect::<Result<Vec<_>, _>>()?,
            selected_thumbnail: self.selected_thumbnail().map(|t| t.id.clone()),
            track_links: filled_names(self.track_links()),
            metadata: self.metadata().clone(),
        }))
    }

    fn reset(&mut self) {
        VideoDraft::reset(self);
    }
}

/// The primary file must be ready, and no referenced file may still be
/// uploading or failed.
pub fn check_ready<D: Publishable>(draft: &D) -> Result<(), PublishError> {
    if !draft.has_ready_primary() {
        return Err(PublishError::MissingPrimary {
            kind: D::KIND,
            what: D::PRIMARY,
        });
    }
    if let Some(file) = draft.files().into_iter().find(|f| !f.is_ready()) {
        return Err(PublishError::FileNotReady {
            file_id: file.id.clone(),
            file_name: file.display_name.clone(),
            status: file.status,
        });
    }
    Ok(())
}

/// time-based prefix keeps ids roughly sortable, the uuid makes them unique
pub fn mint_entry_id() -> String {
    format!(
        "{}-{}",
        Utc::now().timestamp_millis(),
        Uuid::new_v4().simple()
    )
}

/// Edit mode reuses the edited entry's id; create mode mints one not yet in the catalog.
pub fn resolve_entry_id(session: &EditSession, storage: &Storage) -> Result<String, StorageError> {
    resolve_entry_id_with(session, storage, mint_entry_id)
}

fn resolve_entry_id_with(
    session: &EditSession,
    storage: &Storage,
    mut mint: impl FnMut() -> String,
) -> Result<String, StorageError> {
    if session.mode() == SessionMode::Edit {
        if let Some(id) = session.editing_id() {
            return Ok(id.to_string());
        }
    }
    loop {
        let id = mint();
        if !storage.contains_entry(&id)? {
            return Ok(id);
        }
        log::debug!("minted entry id {id} is taken, minting another");
    }
}

/// Publishes `draft` into `storage` and resets the draft.
///
/// On any error the draft and the catalog are left untouched.
pub async fn publish_draft<D, E>(
    draft: &mut D,
    session: &EditSession,
    storage: &mut Storage,
    encoder: &E,
    concurrency: usize,
    now: DateTime<Utc>,
) -> Result<CatalogEntry, PublishError>
where
    D: Publishable,
    E: FileEncoder + ?Sized,
{
    check_ready(draft)?;
    let id = resolve_entry_id(session, storage)?;

    let info = match storage.find_entry(&id)? {
        Some(existing) if existing.kind() != D::KIND => {
            return Err(PublishError::KindMismatch {
                id,
                existing: existing.kind(),
                requested: D::KIND,
            });
        }
        Some(existing) => EntryInfo {
            updated_at: now,
            ..existing.info().clone()
        },
        None => EntryInfo::new(id, now),
    };

    log::info!("publishing {} {}", D::KIND, info.id);

    let files = draft.files();
    let payloads = encode_all(encoder, &files, concurrency)
        .await
        .inspect_err(|failure| {
            log::warn!(
                "publish of {} {} aborted, {} failed to convert: {}",
                D::KIND,
                info.id,
                failure.file_name,
                failure.source
            )
        })?;

    let entry = draft.build_entry(info, payloads)?;
    storage.upsert_entry(&entry)?;
    draft.reset();

    log::info!("published {} {}", entry.kind(), entry.id());
    Ok(entry)
}
