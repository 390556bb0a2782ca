use rusqlite::Connection;

pub mod tables {
    pub const ENTRIES: &str = "entries";
    pub const DRAFTS: &str = "drafts";

    pub const ALL_TABLES: &[&str] = &[ENTRIES, DRAFTS];
}

pub mod columns {
    pub const ID: &str = "id";
    pub const KIND: &str = "kind";
    pub const BODY: &str = "body";
    pub const CREATED_AT: &str = "created_at";
    pub const UPDATED_AT: &str = "updated_at";
    pub const SLOT: &str = "slot";
    pub const SAVED_AT: &str = "saved_at";
}

pub use columns::*;
pub use tables::*;

/// the only drafts row; one user per database
pub const DEFAULT_DRAFT_SLOT: &str = "current";

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS entries (
    id TEXT PRIMARY KEY NOT NULL,
    kind TEXT NOT NULL,
    body TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS entries_kind ON entries (kind);

CREATE TABLE IF NOT EXISTS drafts (
    slot TEXT PRIMARY KEY NOT NULL,
    body TEXT NOT NULL,
    saved_at INTEGER NOT NULL
);
"#;

pub fn init(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA)
}
