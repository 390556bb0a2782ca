use std::{
    str::FromStr,
    sync::{Arc, Mutex, MutexGuard},
};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use log::info;
use rouille::{Request, Response};
use serde::{Deserialize, Serialize};

use crate::{
    config::HttpConfig,
    domain::{
        entry::{CatalogEntry, Engagement, MediaKind, StoredFile},
        media::MediaFileId,
    },
    http::error::ApiError,
    storage::{error::StorageError, operations::Storage},
};

/// Read-only HTTP view over the published catalog.
pub struct HttpServer {
    storage: Arc<Mutex<Storage>>,
    pub config: HttpConfig,
}

impl HttpServer {
    pub fn new(storage: Storage, config: HttpConfig) -> Self {
        Self {
            storage: Arc::new(Mutex::new(storage)),
            config,
        }
    }

    pub fn run(self) {
        let addr = format!("{}:{}", self.config.bind_addr, self.config.port);
        rouille::start_server(addr, move |request| self.handle_request(request));
    }

    fn handle_request(&self, request: &Request) -> Response {
        Self::log_request(request);

        let result = rouille::router!(request,
            (GET) (/catalog) => {
                self.list_entries(request)
            },
            (GET) (/catalog/{id: String}) => {
                self.get_entry(&id)
            },
            (GET) (/catalog/{id: String}/files/{file_id: String}) => {
                self.get_file(&id, &file_id)
            },
            _ => Ok(Response::empty_404())
        );

        let response = result.unwrap_or_else(ApiError::into_response);
        info!("Response: {} {}", request.method(), response.status_code);
        response
    }

    fn log_request(request: &Request) {
        info!("{} {}", request.method(), request.url());
    }

    fn lock_storage(&self) -> Result<MutexGuard<'_, Storage>, ApiError> {
        self.storage.lock().map_err(|e| {
            ApiError::from(StorageError::Internal(anyhow!(
                "Could not access catalog storage under lock: {e}"
            )))
        })
    }

    fn list_entries(&self, request: &Request) -> Result<Response, ApiError> {
        let kind = request
            .get_param("kind")
            .map(|kind| MediaKind::from_str(&kind).map_err(ApiError::BadRequest))
            .transpose()?;

        let storage = self.lock_storage()?;
        let entries = match kind {
            Some(kind) => storage.list_entries_of(kind)?,
            None => storage.list_entries()?,
        };

        let body: Vec<EntrySummary> = entries.iter().map(EntrySummary::from_domain).collect();
        Ok(Response::json(&body))
    }

    fn get_entry(&self, id: &str) -> Result<Response, ApiError> {
        let entry = self.lock_storage()?.get_entry(id)?;
        Ok(Response::json(&EntryResponse::from_domain(&entry)))
    }

    /// Streams a stored file back in its original form.
    fn get_file(&self, id: &str, file_id: &str) -> Result<Response, ApiError> {
        let entry = self.lock_storage()?.get_entry(id)?;
        let file = entry
            .file(&MediaFileId::from(file_id))
            .ok_or_else(|| ApiError::NotFound(format!("file {file_id} not found in entry {id}")))?;

        let bytes = file.payload.decode().map_err(StorageError::from)?;
        log::debug!(
            "FILE {id}/{file_id} -> 200 OK, {} bytes, MIME type: {}",
            bytes.len(),
            file.payload.mime
        );

        Ok(Response::from_data(file.payload.mime.clone(), bytes).with_additional_header(
            "Content-Disposition",
            format!("inline; filename=\"{}\"", file.display_name),
        ))
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EntrySummary {
    id: String,
    kind: MediaKind,
    title: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    release_date: DateTime<Utc>,
    engagement: Engagement,
    file_count: usize,
}

impl EntrySummary {
    fn from_domain(entry: &CatalogEntry) -> Self {
        let info = entry.info();
        Self {
            id: info.id.clone(),
            kind: entry.kind(),
            title: entry.title().to_string(),
            created_at: info.created_at,
            updated_at: info.updated_at,
            release_date: info.release_date,
            engagement: info.engagement,
            file_count: entry.files().len(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryResponse {
    #[serde(flatten)]
    summary: EntrySummary,
    files: Vec<FileResponse>,
}

impl EntryResponse {
    fn from_domain(entry: &CatalogEntry) -> Self {
        Self {
            summary: EntrySummary::from_domain(entry),
            files: entry.files().into_iter().map(FileResponse::from_domain).collect(),
        }
    }
}

/// File listing without the payload itself
#[derive(Debug, Serialize, Deserialize)]
struct FileResponse {
    id: MediaFileId,
    display_name: String,
    human_size: String,
    mime: String,
    byte_len: usize,
}

impl FileResponse {
    fn from_domain(file: &StoredFile) -> Self {
        Self {
            id: file.id.clone(),
            display_name: file.display_name.clone(),
            human_size: file.human_size.clone(),
            mime: file.payload.mime.clone(),
            byte_len: file.payload.byte_len,
        }
    }
}

#[cfg(test)]
pub fn parse_json_response<T: serde::de::DeserializeOwned>(
    response: rouille::Response,
) -> anyhow::Result<T> {
    Ok(serde_json::from_reader(
        response.data.into_reader_and_size().0,
    )?)
}
