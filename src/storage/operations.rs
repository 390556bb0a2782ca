use rusqlite::{OptionalExtension, params};

use crate::{
    config,
    domain::entry::{CatalogEntry, MediaKind},
    draft::DraftStore,
    storage::{
        db::{self, SecondsSinceUnix},
        error::StorageError,
        schema::{DEFAULT_DRAFT_SLOT, columns, tables},
    },
};

use columns::*;
use tables::*;

/// Catalog of published entries, plus the saved drafts.
///
/// Entries are stored as JSON bodies keyed by id. Writing an entry replaces
/// any previous entry with the same id in a single statement.
pub struct Storage {
    pub(crate) db: rusqlite::Connection,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    /// when called, opens a data base connection
    pub fn new(db_config: &config::Database) -> Result<Self, StorageError> {
        let db = db::open(db_config)?;
        Ok(Self::from_existing_conn(db))
    }

    pub fn in_memory() -> Result<Self, StorageError> {
        Self::new(&config::Database::in_memory())
    }

    pub fn from_existing_conn(db: rusqlite::Connection) -> Self {
        Self { db }
    }

    /// Inserts the entry, or replaces the one stored under the same id.
    ///
    /// `created_at` of an existing row is kept.
    pub fn upsert_entry(&mut self, entry: &CatalogEntry) -> Result<(), StorageError> {
        let body = serde_json::to_string(entry)?;
        let info = entry.info();
        let tx = self.db.transaction()?;
        tx.execute(
            &format!(
                "INSERT INTO {ENTRIES} ({ID}, {KIND}, {BODY}, {CREATED_AT}, {UPDATED_AT})
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT({ID}) DO UPDATE SET
                    {KIND} = excluded.{KIND},
                    {BODY} = excluded.{BODY},
                    {UPDATED_AT} = excluded.{UPDATED_AT}"
            ),
            params![
                info.id,
                entry.kind().as_str(),
                body,
                info.created_at.timestamp(),
                info.updated_at.timestamp()
            ],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn find_entry(&self, id: &str) -> Result<Option<CatalogEntry>, StorageError> {
        let body: Option<String> = self
            .db
            .query_row(
                &format!("SELECT {BODY} FROM {ENTRIES} WHERE {ID} = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;

        body.map(|body| serde_json::from_str(&body).map_err(StorageError::from))
            .transpose()
    }

    pub fn get_entry(&self, id: &str) -> Result<CatalogEntry, StorageError> {
        self.find_entry(id)?
            .ok_or_else(|| StorageError::EntryNotFound(id.to_string()))
    }

    pub fn contains_entry(&self, id: &str) -> Result<bool, StorageError> {
        let found: Option<i64> = self
            .db
            .query_row(
                &format!("SELECT 1 FROM {ENTRIES} WHERE {ID} = ?1"),
                params![id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// All entries, newest first
    pub fn list_entries(&self) -> Result<Vec<CatalogEntry>, StorageError> {
        self.query_entries(
            &format!("SELECT {BODY} FROM {ENTRIES} ORDER BY {CREATED_AT} DESC, {ID}"),
            params![],
        )
    }

    pub fn list_entries_of(&self, kind: MediaKind) -> Result<Vec<CatalogEntry>, StorageError> {
        self.query_entries(
            &format!(
                "SELECT {BODY} FROM {ENTRIES} WHERE {KIND} = ?1 ORDER BY {CREATED_AT} DESC, {ID}"
            ),
            params![kind.as_str()],
        )
    }

    fn query_entries(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<CatalogEntry>, StorageError> {
        let mut stmt = self.db.prepare(sql)?;
        let bodies = stmt
            .query_map(params, |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        bodies
            .iter()
            .map(|body| serde_json::from_str(body).map_err(StorageError::from))
            .collect()
    }

    pub fn count_entries(&self) -> Result<usize, StorageError> {
        let count: i64 =
            self.db
                .query_row(&format!("SELECT COUNT(*) FROM {ENTRIES}"), [], |row| {
                    row.get(0)
                })?;
        usize::try_from(count).map_err(|e| {
            StorageError::Internal(anyhow::anyhow!(
                "Strange conversion error to usize after select count: {e}"
            ))
        })
    }

    /// time of the most recent publish, if anything was ever published
    pub fn last_published_at(&self) -> Result<Option<SecondsSinceUnix>, StorageError> {
        Ok(self.db.query_row(
            &format!("SELECT MAX({UPDATED_AT}) FROM {ENTRIES}"),
            [],
            |row| row.get(0),
        )?)
    }

    pub fn save_drafts(&mut self, drafts: &DraftStore) -> Result<(), StorageError> {
        let body = serde_json::to_string(drafts)?;
        self.db.execute(
            &format!(
                "INSERT INTO {DRAFTS} ({SLOT}, {BODY}, {SAVED_AT}) VALUES (?1, ?2, ?3)
                 ON CONFLICT({SLOT}) DO UPDATE SET {BODY} = excluded.{BODY}, {SAVED_AT} = excluded.{SAVED_AT}"
            ),
            params![DEFAULT_DRAFT_SLOT, body, chrono::Utc::now().timestamp()],
        )?;
        Ok(())
    }

    /// Saved drafts, or empty drafts when nothing was saved yet.
    pub fn load_drafts(&self) -> Result<DraftStore, StorageError> {
        let body: Option<String> = self
            .db
            .query_row(
                &format!("SELECT {BODY} FROM {DRAFTS} WHERE {SLOT} = ?1"),
                params![DEFAULT_DRAFT_SLOT],
                |row| row.get(0),
            )
            .optional()?;

        match body {
            Some(body) => Ok(serde_json::from_str(&body)?),
            None => Ok(DraftStore::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::domain::{
        entry::fixtures::{album_entry, single_entry},
        media::MediaFileRef,
    };

    fn setup_storage() -> anyhow::Result<Storage> {
        Ok(Storage::in_memory()?)
    }

    #[test]
    fn test_upsert_and_get() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;
        let entry = single_entry("1", "Fall");

        storage.upsert_entry(&entry)?;

        assert_eq!(storage.get_entry("1")?, entry);
        assert!(storage.contains_entry("1")?);
        assert_eq!(storage.count_entries()?, 1);
        Ok(())
    }

    #[test]
    fn test_upsert_replaces_in_place() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;
        storage.upsert_entry(&album_entry("42", "Old", &[("a.mp3", "A")]))?;
        let replacement = album_entry("42", "New", &[("b.mp3", "B")]);

        storage.upsert_entry(&replacement)?;

        assert_eq!(storage.count_entries()?, 1);
        assert_eq!(storage.get_entry("42")?.title(), "New");
        Ok(())
    }

    #[test]
    fn test_replace_keeps_row_creation_time() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;
        let mut entry = single_entry("1", "Fall");
        let CatalogEntry::Single(single) = &mut entry else {
            unreachable!()
        };
        single.info.created_at = Utc::now() - Duration::days(3);
        storage.upsert_entry(&entry)?;

        let mut newer = single_entry("1", "Fall (remix)");
        if let CatalogEntry::Single(single) = &mut newer {
            single.info.updated_at = Utc::now();
        }
        storage.upsert_entry(&newer)?;

        let created: i64 = storage.db.query_row(
            &format!("SELECT {CREATED_AT} FROM {ENTRIES} WHERE {ID} = '1'"),
            [],
            |row| row.get(0),
        )?;
        assert_eq!(created, entry.info().created_at.timestamp());
        Ok(())
    }

    #[test]
    fn test_get_missing_entry() -> anyhow::Result<()> {
        let storage = setup_storage()?;

        assert!(storage.find_entry("nope")?.is_none());
        assert!(matches!(
            storage.get_entry("nope"),
            Err(StorageError::EntryNotFound(id)) if id == "nope"
        ));
        assert!(!storage.contains_entry("nope")?);
        Ok(())
    }

    #[test]
    fn test_list_entries_by_kind() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;
        storage.upsert_entry(&single_entry("s1", "One"))?;
        storage.upsert_entry(&single_entry("s2", "Two"))?;
        storage.upsert_entry(&album_entry("a1", "Album", &[("a.mp3", "A")]))?;

        assert_eq!(storage.list_entries()?.len(), 3);

        let singles = storage.list_entries_of(MediaKind::Single)?;
        assert_eq!(singles.len(), 2);
        assert!(singles.iter().all(|e| e.kind() == MediaKind::Single));
        assert!(storage.list_entries_of(MediaKind::Video)?.is_empty());
        Ok(())
    }

    #[test]
    fn test_list_is_newest_first() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;
        let mut old = single_entry("old", "Old");
        if let CatalogEntry::Single(single) = &mut old {
            single.info.created_at = Utc::now() - Duration::days(10);
        }
        storage.upsert_entry(&old)?;
        storage.upsert_entry(&single_entry("new", "New"))?;

        let ids: Vec<_> = storage
            .list_entries()?
            .iter()
            .map(|e| e.id().to_string())
            .collect();
        assert_eq!(ids, vec!["new", "old"]);
        Ok(())
    }

    #[test]
    fn test_malformed_body_is_reported() -> anyhow::Result<()> {
        let storage = setup_storage()?;
        storage.db.execute(
            &format!(
                "INSERT INTO {ENTRIES} ({ID}, {KIND}, {BODY}, {CREATED_AT}, {UPDATED_AT}) VALUES ('x', 'single', 'not json', 0, 0)"
            ),
            [],
        )?;

        assert!(matches!(
            storage.get_entry("x"),
            Err(StorageError::Serialization(_))
        ));
        Ok(())
    }

    #[test]
    fn test_last_published_at() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;
        assert_eq!(storage.last_published_at()?, None);

        let entry = single_entry("1", "Fall");
        storage.upsert_entry(&entry)?;

        assert_eq!(
            storage.last_published_at()?,
            Some(entry.info().updated_at.timestamp())
        );
        Ok(())
    }

    #[test]
    fn test_drafts_round_trip() -> anyhow::Result<()> {
        let mut storage = setup_storage()?;
        assert_eq!(storage.load_drafts()?, DraftStore::default());

        let mut drafts = DraftStore::new();
        drafts.single_mut().set_title("Fall");
        drafts
            .single_mut()
            .set_track(MediaFileRef::from_bytes("demo.mp3", vec![1, 2]));
        storage.save_drafts(&drafts)?;
        drafts.video_mut().set_title("Clip");
        storage.save_drafts(&drafts)?;

        assert_eq!(storage.load_drafts()?, drafts);
        Ok(())
    }

    #[test]
    fn test_catalog_survives_reopen() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let config = config::Database::on_disk(dir.path().join("catalog.db"));
        let entry = single_entry("1", "Fall");

        {
            let mut storage = Storage::new(&config)?;
            storage.upsert_entry(&entry)?;
        }

        let storage = Storage::new(&config)?;
        assert_eq!(storage.get_entry("1")?, entry);
        Ok(())
    }
}
