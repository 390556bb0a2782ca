use std::{
    fmt::Display,
    path::{Path, PathBuf},
};

use mime_guess::mime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a selected file, minted when the user picks it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaFileId(pub String);

impl MediaFileId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MediaFileId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MediaFileId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UploadStatus {
    Uploading,
    Ready,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaType {
    Audio,
    Image,
    Video,
}

impl MediaType {
    /// guesses the media type from the file extension
    pub fn of_name(name: &str) -> Option<Self> {
        let guess = mime_guess::from_path(name).first()?;
        match guess.type_() {
            mime::AUDIO => Some(Self::Audio),
            mime::IMAGE => Some(Self::Image),
            mime::VIDEO => Some(Self::Video),
            _ => None,
        }
    }
}

impl Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaType::Audio => write!(f, "audio"),
            MediaType::Image => write!(f, "image"),
            MediaType::Video => write!(f, "video"),
        }
    }
}

/// MIME type to store next to an encoded file, so it can be served back as is.
pub fn mime_for_name(name: &str) -> String {
    let ext = Path::new(name)
        .extension()
        .map(|ext| ext.to_string_lossy().to_lowercase());
    let default = || {
        mime_guess::from_path(name)
            .first_or_octet_stream()
            .to_string()
    };
    ext.and_then(|ext| mime_from_ext(ext.as_str()))
        .unwrap_or_else(default)
}

/// Audio extensions where browsers disagree with the generic guess.
fn mime_from_ext(ext: &str) -> Option<String> {
    match ext {
        "m4a" => Some("audio/x-m4a".to_string()), // Safari iOS compatible
        "aac" => Some("audio/aac".to_string()),
        "mp3" => Some("audio/mpeg".to_string()),
        "wav" => Some("audio/wav".to_string()),
        "ogg" => Some("audio/ogg".to_string()),
        "flac" => Some("audio/flac".to_string()),
        _ => None,
    }
}

const SIZE_UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];

/// Renders a byte count the way upload forms show it, e.g. `3.4 MB`.
pub fn human_size(bytes: u64) -> String {
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < SIZE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", SIZE_UNITS[unit])
}

/// Live handle to a user-selected binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryHandle {
    /// file still sitting on the local disk
    File(PathBuf),
    /// bytes already held in memory (picked from a browser, or decoded from the catalog)
    Memory(#[serde(with = "base64_bytes")] Vec<u8>),
}

/// Saved drafts keep in-memory bytes as a base64 string rather than a number array.
mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&BASE64.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        BASE64.decode(encoded).map_err(D::Error::custom)
    }
}

impl BinaryHandle {
    pub fn read(&self) -> std::io::Result<Vec<u8>> {
        match self {
            BinaryHandle::File(path) => std::fs::read(path),
            BinaryHandle::Memory(bytes) => Ok(bytes.clone()),
        }
    }
}

/// A user-selected file together with what the upload forms display about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaFileRef {
    pub id: MediaFileId,
    pub display_name: String,
    pub human_size: String,
    pub upload_progress: u8,
    pub status: UploadStatus,
    handle: BinaryHandle,
}

impl MediaFileRef {
    /// a freshly selected file, upload not started yet
    pub fn selected(display_name: impl Into<String>, size_bytes: u64, handle: BinaryHandle) -> Self {
        Self {
            id: MediaFileId::generate(),
            display_name: display_name.into(),
            human_size: human_size(size_bytes),
            upload_progress: 0,
            status: UploadStatus::Uploading,
            handle,
        }
    }

    /// file from disk; nothing left to upload, so it is ready right away
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.to_string_lossy().to_string());
        let mut file = Self::selected(name, meta.len(), BinaryHandle::File(path.to_path_buf()));
        file.set_progress(100);
        Ok(file)
    }

    pub fn from_bytes(display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let size = bytes.len() as u64;
        let mut file = Self::selected(display_name, size, BinaryHandle::Memory(bytes));
        file.set_progress(100);
        file
    }

    /// Restores a reference for a file already stored under `id`.
    pub fn restored(id: MediaFileId, display_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            id,
            ..Self::from_bytes(display_name, bytes)
        }
    }

    /// Moves simulated upload progress; reaching 100 marks the file ready.
    /// Failed uploads stay failed.
    pub fn set_progress(&mut self, percent: u8) {
        if self.status == UploadStatus::Error {
            return;
        }
        self.upload_progress = percent.min(100);
        self.status = if self.upload_progress == 100 {
            UploadStatus::Ready
        } else {
            UploadStatus::Uploading
        };
    }

    pub fn mark_failed(&mut self) {
        self.status = UploadStatus::Error;
    }

    pub fn is_ready(&self) -> bool {
        self.status == UploadStatus::Ready
    }

    pub fn handle(&self) -> &BinaryHandle {
        &self.handle
    }

    pub fn media_type(&self) -> Option<MediaType> {
        MediaType::of_name(&self.display_name)
    }

    pub fn mime(&self) -> String {
        mime_for_name(&self.display_name)
    }
}
