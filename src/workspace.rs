//! Application context for one upload session: drafts, review stage, edit
//! session and the catalog, owned together and passed to whoever drives them.

use chrono::Utc;

use crate::{
    config::PublishConfig,
    domain::entry::{CatalogEntry, MediaKind},
    draft::DraftStore,
    publish::{self, PublishError, encoding::FileEncoder},
    review::{self, ReviewSnapshot, ReviewStage},
    session::{ActiveTab, EditSession, EditTarget, resume},
    storage::{Storage, StorageError},
};

#[derive(Debug)]
pub struct Workspace {
    drafts: DraftStore,
    review: ReviewStage,
    session: EditSession,
    storage: Storage,
    concurrency: usize,
}

impl Workspace {
    pub fn new(storage: Storage) -> Self {
        Self::with_drafts(storage, DraftStore::default())
    }

    pub fn with_drafts(storage: Storage, drafts: DraftStore) -> Self {
        Self {
            drafts,
            review: ReviewStage::default(),
            session: EditSession::default(),
            storage,
            concurrency: PublishConfig::default().concurrency,
        }
    }

    pub fn with_publish_config(mut self, config: &PublishConfig) -> Self {
        self.concurrency = config.concurrency.max(1);
        self
    }

    /// Starts a session. With a target, the session is in edit mode and the
    /// target entry, if it exists and has the expected kind, is loaded into
    /// its draft slice.
    pub fn open_session(&mut self, target: Option<EditTarget>) -> Result<&EditSession, StorageError> {
        self.review.clear();

        if let Some(target) = &target {
            match self.storage.find_entry(target.id())? {
                Some(entry) if entry.kind() == target.kind() => {
                    resume::load_into(&mut self.drafts, &entry)?;
                    log::info!("loaded {} {} for editing", entry.kind(), entry.id());
                }
                Some(entry) => log::warn!(
                    "edit target {} is a {}, not a {}; draft left as is",
                    target.id(),
                    entry.kind(),
                    target.kind()
                ),
                None => log::warn!(
                    "edit target {} not found in catalog; publishing will create it",
                    target.id()
                ),
            }
        }

        self.session = EditSession::resolve(target);
        Ok(&self.session)
    }

    /// Resumes a session over drafts restored from the drafts table. The target
    /// entry is not loaded again, so edits saved since it was opened survive.
    pub fn continue_session(&mut self, target: Option<EditTarget>) -> &EditSession {
        self.review.clear();
        self.session = EditSession::resolve(target);
        &self.session
    }

    pub fn session(&self) -> &EditSession {
        &self.session
    }

    pub fn tabs_locked(&self) -> bool {
        self.session.tabs_locked()
    }

    pub fn select_tab(&mut self, tab: ActiveTab) -> bool {
        self.session.select_tab(tab)
    }

    pub fn drafts(&self) -> &DraftStore {
        &self.drafts
    }

    pub fn drafts_mut(&mut self) -> &mut DraftStore {
        &mut self.drafts
    }

    pub fn review(&self) -> &ReviewStage {
        &self.review
    }

    pub fn catalog(&self) -> &Storage {
        &self.storage
    }

    /// Persists the drafts so they can be picked up again later.
    pub fn save_drafts(&mut self) -> Result<(), StorageError> {
        self.storage.save_drafts(&self.drafts)
    }

    /// Snapshots the active draft into the review stage.
    pub fn continue_to_review(&mut self) -> &ReviewSnapshot {
        let kind = self.session.active_kind();
        log::info!("reviewing {kind} draft");
        self.review.stage(review::project(&self.drafts, kind))
    }

    /// Publishes the active draft. On success the draft is reset and the review
    /// stage cleared; on failure nothing changes.
    pub async fn publish<E: FileEncoder + ?Sized>(
        &mut self,
        encoder: &E,
    ) -> Result<CatalogEntry, PublishError> {
        let kind = self.session.active_kind();
        let now = Utc::now();
        let Self {
            drafts,
            session,
            storage,
            concurrency,
            ..
        } = &mut *self;

        let entry = match kind {
            MediaKind::Single => {
                publish::publish_draft(drafts.single_mut(), session, storage, encoder, *concurrency, now)
                    .await
            }
            MediaKind::Album => {
                publish::publish_draft(drafts.album_mut(), session, storage, encoder, *concurrency, now)
                    .await
            }
            MediaKind::Video => {
                publish::publish_draft(drafts.video_mut(), session, storage, encoder, *concurrency, now)
                    .await
            }
        }?;

        self.review.clear();
        Ok(entry)
    }
}
