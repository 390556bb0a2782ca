use thiserror::Error;

use crate::publish::encoding::EncodeError;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("catalog entry {0} not found")]
    EntryNotFound(String),

    #[error("malformed stored record: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("stored file could not be decoded: {0}")]
    Payload(#[from] EncodeError),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
