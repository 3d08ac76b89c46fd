use std::{env, sync::Arc};

use anyhow::Result;
use bytes::{Bytes, BytesMut};
use dashmap::{mapref::entry::Entry, DashMap};
use data_model::{Blob, BlobId};
use futures::{stream::BoxStream, StreamExt};
use nanoid::nanoid;
use object_store::{parse_url, path::Path, ObjectStore};
use papyrine_utils::get_epoch_time_in_ms;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::{info, warn};
use url::Url;

#[derive(Debug, Error)]
pub enum BlobStoreError {
    #[error("storage io error: {0}")]
    Io(#[from] object_store::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlobStoreConfig {
    pub path: String,
}

impl BlobStoreConfig {
    pub fn new(path: &str) -> Self {
        BlobStoreConfig {
            path: format!("file://{}", path),
        }
    }
}

impl Default for BlobStoreConfig {
    fn default() -> Self {
        let path = format!(
            "file://{}",
            env::current_dir()
                .unwrap()
                .join("papyrine_storage/blobs")
                .to_str()
                .unwrap()
        );
        BlobStoreConfig { path }
    }
}

/// Content-addressed blob store. Bytes live on the configured medium under
/// generated storage keys; two uploads with identical bytes resolve to the
/// same blob, whatever their display names.
pub struct BlobStore {
    object_store: Arc<dyn ObjectStore>,
    path: Path,
    blobs: DashMap<BlobId, Blob>,
    by_hash: DashMap<String, Blob>,
}

impl BlobStore {
    pub fn new(config: BlobStoreConfig) -> Result<Self> {
        let url = config.path.parse::<Url>()?;
        if url.scheme() == "file" {
            std::fs::create_dir_all(url.path())?;
        }
        let (object_store, path) = parse_url(&url)?;
        info!("blob store initialized at {}", config.path);
        Ok(Self {
            object_store: Arc::new(object_store),
            path,
            blobs: DashMap::new(),
            by_hash: DashMap::new(),
        })
    }

    /// Stores `data` and returns its blob. Idempotent under identical
    /// content: a byte sequence already present returns the existing blob
    /// without touching the medium or allocating a new id.
    pub async fn put(
        &self,
        data: Bytes,
        display_name: &str,
        mime_type: &str,
    ) -> Result<Blob, BlobStoreError> {
        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = format!("{:x}", hasher.finalize());

        if let Some(existing) = self.by_hash.get(&hash) {
            info!(
                "content hash {} already stored, reusing blob {}",
                hash,
                existing.value().id
            );
            return Ok(existing.value().clone());
        }

        let storage_path = self.path.child(storage_key(display_name));
        self.object_store
            .put(&storage_path, data.clone().into())
            .await?;

        let blob = Blob {
            id: BlobId::new(),
            content_hash: hash.clone(),
            display_name: display_name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: data.len() as u64,
            storage_path: storage_path.to_string(),
            uploaded_at: get_epoch_time_in_ms(),
        };

        // First registration of a hash wins; a loser discards the bytes it
        // just wrote and returns the winner's blob. The entry guard must be
        // released before touching the medium again.
        let winner = match self.by_hash.entry(hash) {
            Entry::Occupied(existing) => Some(existing.get().clone()),
            Entry::Vacant(vacant) => {
                self.blobs.insert(blob.id.clone(), blob.clone());
                vacant.insert(blob.clone());
                None
            }
        };

        if let Some(winner) = winner {
            if let Err(e) = self.object_store.delete(&storage_path).await {
                warn!(
                    "failed to remove duplicate object {}: {:?}",
                    storage_path, e
                );
            }
            return Ok(winner);
        }

        info!(
            "stored {} as blob {} at {}",
            display_name, blob.id, blob.storage_path
        );
        Ok(blob)
    }

    /// Returns a stream over the blob's bytes, positioned at the start, or
    /// `None` for an unknown id.
    pub async fn get(
        &self,
        id: &BlobId,
    ) -> Result<Option<BoxStream<'static, Result<Bytes, object_store::Error>>>, BlobStoreError>
    {
        let storage_path = match self.blobs.get(id) {
            Some(blob) => Path::from(blob.storage_path.as_str()),
            None => return Ok(None),
        };
        let get_result = self.object_store.get(&storage_path).await?;
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut stream = get_result.into_stream();
            while let Some(chunk) = stream.next().await {
                let _ = tx.send(chunk);
            }
        });
        Ok(Some(Box::pin(UnboundedReceiverStream::new(rx))))
    }

    pub async fn read_bytes(&self, id: &BlobId) -> Result<Option<Bytes>, BlobStoreError> {
        let Some(mut stream) = self.get(id).await? else {
            return Ok(None);
        };
        let mut bytes = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            bytes.extend_from_slice(&chunk?);
        }
        Ok(Some(bytes.into()))
    }

    pub fn metadata(&self, id: &BlobId) -> Option<Blob> {
        self.blobs.get(id).map(|blob| blob.value().clone())
    }
}

/// Generated key the bytes are stored under. Keeps the display name's
/// extension but never the name itself, so colliding uploads cannot clobber
/// each other.
fn storage_key(display_name: &str) -> String {
    match display_name.rsplit_once('.') {
        Some((stem, extension)) if !stem.is_empty() => format!("{}.{}", nanoid!(), extension),
        _ => nanoid!(),
    }
}
