//! Converts live binary handles into payloads that can be persisted on their own.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use futures::{
    channel::oneshot,
    stream::{self, StreamExt, TryStreamExt},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    hash::Checksum,
    media::{BinaryHandle, MediaFileId, MediaFileRef},
};

pub const ENCODING_BASE64: &str = "base64";

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("failed to read {name}: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{name} is empty")]
    Empty { name: String },

    #[error("unsupported payload encoding {0}")]
    UnsupportedEncoding(String),

    #[error("payload is not valid base64: {0}")]
    InvalidBase64(#[from] base64::DecodeError),

    #[error("payload is corrupt: expected {expected_len} bytes with checksum {expected_checksum}")]
    Corrupt {
        expected_len: usize,
        expected_checksum: String,
    },
}

/// Self-contained, persistence-safe form of a file's bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurablePayload {
    pub mime: String,
    pub encoding: String,
    pub byte_len: usize,
    pub checksum: String,
    pub data: String,
}

impl DurablePayload {
    pub fn encode(bytes: &[u8], mime: impl Into<String>) -> Self {
        Self {
            mime: mime.into(),
            encoding: ENCODING_BASE64.to_string(),
            byte_len: bytes.len(),
            checksum: Checksum::from_bytes(bytes).to_hex(),
            data: BASE64.encode(bytes),
        }
    }

    /// Reproduces the original bytes, verifying length and checksum.
    pub fn decode(&self) -> Result<Vec<u8>, EncodeError> {
        if self.encoding != ENCODING_BASE64 {
            return Err(EncodeError::UnsupportedEncoding(self.encoding.clone()));
        }
        let corrupt = || EncodeError::Corrupt {
            expected_len: self.byte_len,
            expected_checksum: self.checksum.clone(),
        };
        let expected = Checksum::from_hex(&self.checksum).map_err(|_| corrupt())?;
        let bytes = BASE64.decode(&self.data)?;
        if bytes.len() != self.byte_len || Checksum::from_bytes(&bytes) != expected {
            return Err(corrupt());
        }
        Ok(bytes)
    }
}

/// Turns one selected file into its durable payload.
#[async_trait]
pub trait FileEncoder: Send + Sync {
    async fn encode(&self, file: &MediaFileRef) -> Result<DurablePayload, EncodeError>;
}

/// Reads the whole file and stores it base64-encoded.
///
/// Files on disk are read and encoded on their own thread, so `encode_all`
/// keeps up to `concurrency` of them in progress at once.
#[derive(Debug, Default, Clone, Copy)]
pub struct Base64Encoder;

#[async_trait]
impl FileEncoder for Base64Encoder {
    async fn encode(&self, file: &MediaFileRef) -> Result<DurablePayload, EncodeError> {
        let mime = file.mime();
        let handle = match file.handle() {
            BinaryHandle::Memory(bytes) => return encode_bytes(&file.display_name, bytes, mime),
            disk @ BinaryHandle::File(_) => disk.clone(),
        };

        let name = file.display_name.clone();
        let (tx, rx) = oneshot::channel();
        std::thread::spawn(move || {
            let result = handle
                .read()
                .map_err(|source| EncodeError::Unreadable {
                    name: name.clone(),
                    source,
                })
                .and_then(|bytes| encode_bytes(&name, &bytes, mime));
            // nobody is waiting any more when the publish was dropped
            let _ = tx.send(result);
        });

        rx.await.map_err(|_| EncodeError::Unreadable {
            name: file.display_name.clone(),
            source: std::io::Error::other("reader thread stopped"),
        })?
    }
}

fn encode_bytes(name: &str, bytes: &[u8], mime: String) -> Result<DurablePayload, EncodeError> {
    if bytes.is_empty() {
        return Err(EncodeError::Empty {
            name: name.to_string(),
        });
    }
    Ok(DurablePayload::encode(bytes, mime))
}

#[derive(Debug)]
pub struct ConversionFailure {
    pub file_id: MediaFileId,
    pub file_name: String,
    pub source: EncodeError,
}

pub type Payloads = HashMap<MediaFileId, DurablePayload>;

/// Encodes every file, at most `concurrency` at a time.
///
/// Stops at the first failure; nothing is returned for the files that did succeed.
pub async fn encode_all<E: FileEncoder + ?Sized>(
    encoder: &E,
    files: &[&MediaFileRef],
    concurrency: usize,
) -> Result<Payloads, ConversionFailure> {
    stream::iter(files.iter().copied())
        .map(|file| async move {
            encoder
                .encode(file)
                .await
                .map(|payload| (file.id.clone(), payload))
                .map_err(|source| ConversionFailure {
                    file_id: file.id.clone(),
                    file_name: file.display_name.clone(),
                    source,
                })
        })
        .buffer_unordered(concurrency.max(1))
        .try_collect()
        .await
}


#[cfg(test)]
mod tests {
    use std::{
        future::Future,
        path::PathBuf,
        pin::Pin,
        sync::atomic::{AtomicUsize, Ordering},
        task::{Context, Poll},
    };

    use futures::executor::block_on;

    use super::{testing::FailingEncoder, *};

    /// Pending on first poll, ready on the second.
    struct YieldOnce(bool);

    impl Future for YieldOnce {
        type Output = ();

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
            if self.0 {
                return Poll::Ready(());
            }
            self.0 = true;
            cx.waker().wake_by_ref();
            Poll::Pending
        }
    }

    /// Records how many encodings were in progress at the same time.
    #[derive(Default)]
    struct OverlapCounter {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl FileEncoder for OverlapCounter {
        async fn encode(&self, file: &MediaFileRef) -> Result<DurablePayload, EncodeError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            YieldOnce(false).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Base64Encoder.encode(file).await
        }
    }

    #[test]
    fn test_payload_decodes_to_original_bytes() -> anyhow::Result<()> {
        let bytes: Vec<u8> = (0..=255).collect();
        let payload = DurablePayload::encode(&bytes, "audio/mpeg");

        assert_eq!(payload.byte_len, 256);
        assert_eq!(payload.encoding, ENCODING_BASE64);
        assert_eq!(payload.decode()?, bytes);
        Ok(())
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let mut payload = DurablePayload::encode(b"original", "audio/mpeg");
        payload.data = BASE64.encode(b"tampered");

        assert!(matches!(payload.decode(), Err(EncodeError::Corrupt { .. })));
    }

    #[test]
    fn test_invalid_base64_is_rejected() {
        let mut payload = DurablePayload::encode(b"original", "audio/mpeg");
        payload.data = "***".to_string();

        assert!(matches!(payload.decode(), Err(EncodeError::InvalidBase64(_))));
    }

    #[test]
    fn test_base64_encoder_reads_files_from_disk() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("demo.mp3");
        std::fs::write(&path, b"demo audio")?;
        let file = MediaFileRef::from_path(&path)?;

        let payload = block_on(Base64Encoder.encode(&file))?;

        assert_eq!(payload.mime, "audio/mpeg");
        assert_eq!(payload.decode()?, b"demo audio");
        Ok(())
    }

    #[test]
    fn test_base64_encoder_fails_on_missing_file() {
        let file = MediaFileRef::selected(
            "gone.mp3",
            10,
            BinaryHandle::File(PathBuf::from("/definitely/not/here/gone.mp3")),
        );

        let result = block_on(Base64Encoder.encode(&file));

        assert!(matches!(result, Err(EncodeError::Unreadable { .. })));
    }

    #[test]
    fn test_base64_encoder_fails_on_empty_file() {
        let file = MediaFileRef::from_bytes("empty.png", vec![]);
        let result = block_on(Base64Encoder.encode(&file));
        assert!(matches!(result, Err(EncodeError::Empty { .. })));
    }

    #[test]
    fn test_encode_all_collects_every_file() -> anyhow::Result<()> {
        let files: Vec<_> = (0..5)
            .map(|i| MediaFileRef::from_bytes(format!("track{i}.mp3"), vec![i; 4]))
            .collect();
        let refs: Vec<_> = files.iter().collect();

        let payloads = block_on(encode_all(&Base64Encoder, &refs, 2)).map_err(|f| f.source)?;

        assert_eq!(payloads.len(), 5);
        for file in &files {
            assert_eq!(payloads[&file.id].decode()?, file.handle().read()?);
        }
        Ok(())
    }

    #[test]
    fn test_encode_all_reports_failing_file() {
        let good = MediaFileRef::from_bytes("good.mp3", vec![1]);
        let bad = MediaFileRef::from_bytes("bad.png", vec![2]);

        let failure = block_on(encode_all(&FailingEncoder::on("bad.png"), &[&good, &bad], 4))
            .expect_err("bad.png must fail");

        assert_eq!(failure.file_id, bad.id);
        assert_eq!(failure.file_name, "bad.png");
    }

    #[test]
    fn test_encode_all_overlaps_up_to_concurrency() -> anyhow::Result<()> {
        let files: Vec<_> = (0..6)
            .map(|i| MediaFileRef::from_bytes(format!("track{i}.mp3"), vec![i; 4]))
            .collect();
        let refs: Vec<_> = files.iter().collect();

        let wide = OverlapCounter::default();
        block_on(encode_all(&wide, &refs, 3)).map_err(|f| f.source)?;
        let narrow = OverlapCounter::default();
        block_on(encode_all(&narrow, &refs, 1)).map_err(|f| f.source)?;

        assert_eq!(wide.peak.load(Ordering::SeqCst), 3);
        assert_eq!(narrow.peak.load(Ordering::SeqCst), 1);
        Ok(())
    }

    #[test]
    fn test_base64_encoder_reads_several_files_concurrently() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let files = (0..4)
            .map(|i| {
                let path = dir.path().join(format!("track{i}.mp3"));
                std::fs::write(&path, vec![i as u8 + 1; 64])?;
                MediaFileRef::from_path(&path)
            })
            .collect::<std::io::Result<Vec<_>>>()?;
        let refs: Vec<_> = files.iter().collect();

        let payloads = block_on(encode_all(&Base64Encoder, &refs, 4)).map_err(|f| f.source)?;

        for (i, file) in files.iter().enumerate() {
            assert_eq!(payloads[&file.id].decode()?, vec![i as u8 + 1; 64]);
        }
        Ok(())
    }

    #[test]
    fn test_malformed_checksum_is_corrupt() {
        let mut payload = DurablePayload::encode(b"original", "audio/mpeg");
        payload.checksum = "zz".to_string();

        assert!(matches!(payload.decode(), Err(EncodeError::Corrupt { .. })));
    }

    #[test]
    fn test_encode_all_with_no_files() -> anyhow::Result<()> {
        let payloads = block_on(encode_all(&Base64Encoder, &[], 0)).map_err(|f| f.source)?;
        assert!(payloads.is_empty());
        Ok(())
    }
}
