//! Asset store
//!
//! Filesystem-backed intake: admission, category routing, naming, durable
//! write, URL composition, and idempotent deletion. Directory creation is
//! idempotent and safe under concurrent uploads to the same category;
//! per-upload unique target names mean writes never collide on a path.

use std::path::{Component, Path, PathBuf};

use bytes::BytesMut;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};

use edusite_core::{AppError, AssetCategory, Config};

use crate::admission::AdmissionPolicy;
use crate::asset::{DeleteOutcome, IncomingFile, StoredAsset};
use crate::naming;

/// Read chunk size for streaming receipt.
const STREAM_BUF_BYTES: usize = 64 * 1024;

/// Filesystem-backed asset store.
///
/// Explicitly constructed and passed to callers; holds the storage root,
/// admission limits, and the public base URL for link composition.
#[derive(Clone, Debug)]
pub struct AssetStore {
    root: PathBuf,
    public_base_url: String,
    policy: AdmissionPolicy,
}

impl AssetStore {
    /// Create a store rooted at `config.storage_root`, creating the root
    /// directory if needed.
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let root = config.storage_root.clone();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| AppError::storage(root.display(), e))?;

        Ok(AssetStore {
            root,
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            policy: AdmissionPolicy::from_config(config),
        })
    }

    pub fn policy(&self) -> &AdmissionPolicy {
        &self.policy
    }

    /// Accept a fully-buffered upload.
    ///
    /// Admission (type, then size) runs before any byte is persisted; a
    /// rejected upload leaves no artifact behind. On I/O failure the partial
    /// file is removed and `StorageFailure` is reported.
    pub async fn accept_upload(
        &self,
        original_name: &str,
        mime_type: &str,
        data: Vec<u8>,
    ) -> Result<StoredAsset, AppError> {
        self.policy.admit_type(mime_type)?;
        self.policy.admit_size(data.len())?;

        let size_bytes = data.len() as u64;
        let (stored_name, path, category) = self.prepare_target(original_name, mime_type).await?;

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| AppError::storage(path.display(), e))?;

        if let Err(e) = file.write_all(&data).await {
            self.cleanup_partial(&path).await;
            return Err(AppError::storage(path.display(), e));
        }
        if let Err(e) = file.sync_all().await {
            self.cleanup_partial(&path).await;
            return Err(AppError::storage(path.display(), e));
        }

        tracing::info!(
            path = %path.display(),
            category = %category,
            size_bytes = size_bytes,
            "Asset stored"
        );

        Ok(StoredAsset {
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes,
            category,
            stored_name,
            storage_path: path,
        })
    }

    /// Accept an upload from a reader without buffering it whole.
    ///
    /// Type admission runs first; the size ceiling is enforced during
    /// receipt. Exceeding it aborts the transfer, removes the partial file,
    /// and reports `FileTooLarge`. An aborted reader (e.g. the client
    /// disconnected mid-upload) likewise removes the partial file.
    pub async fn accept_upload_stream<R>(
        &self,
        original_name: &str,
        mime_type: &str,
        mut reader: R,
    ) -> Result<StoredAsset, AppError>
    where
        R: AsyncRead + Unpin + Send,
    {
        self.policy.admit_type(mime_type)?;

        let (stored_name, path, category) = self.prepare_target(original_name, mime_type).await?;
        let limit = self.policy.max_file_size_bytes();

        let mut file = fs::File::create(&path)
            .await
            .map_err(|e| AppError::storage(path.display(), e))?;

        let mut received: usize = 0;
        let mut buf = BytesMut::with_capacity(STREAM_BUF_BYTES);
        loop {
            buf.clear();
            let n = match reader.read_buf(&mut buf).await {
                Ok(n) => n,
                Err(e) => {
                    self.cleanup_partial(&path).await;
                    return Err(AppError::storage(path.display(), e));
                }
            };
            if n == 0 {
                break;
            }
            received += n;
            if received > limit {
                self.cleanup_partial(&path).await;
                return Err(AppError::FileTooLarge {
                    size_bytes: received as u64,
                    limit_bytes: limit as u64,
                });
            }
            if let Err(e) = file.write_all(&buf).await {
                self.cleanup_partial(&path).await;
                return Err(AppError::storage(path.display(), e));
            }
        }

        if let Err(e) = file.sync_all().await {
            self.cleanup_partial(&path).await;
            return Err(AppError::storage(path.display(), e));
        }

        tracing::info!(
            path = %path.display(),
            category = %category,
            size_bytes = received,
            "Asset stored from stream"
        );

        Ok(StoredAsset {
            original_name: original_name.to_string(),
            mime_type: mime_type.to_string(),
            size_bytes: received as u64,
            category,
            stored_name,
            storage_path: path,
        })
    }

    /// Accept a batch of files from one logical request, all-or-nothing.
    ///
    /// Count, field-name, type, and size admission run for every file before
    /// a single byte is written. If a write fails partway through, files
    /// already stored from this batch are removed.
    pub async fn accept_batch(
        &self,
        files: Vec<IncomingFile>,
    ) -> Result<Vec<StoredAsset>, AppError> {
        self.policy.admit_count(files.len())?;
        for file in &files {
            self.policy.admit_field_name(&file.field_name)?;
            self.policy.admit_type(&file.mime_type)?;
            self.policy.admit_size(file.data.len())?;
        }

        let mut stored: Vec<StoredAsset> = Vec::with_capacity(files.len());
        for file in files {
            match self
                .accept_upload(&file.original_name, &file.mime_type, file.data)
                .await
            {
                Ok(asset) => stored.push(asset),
                Err(e) => {
                    for asset in &stored {
                        self.cleanup_partial(&asset.storage_path).await;
                    }
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Compose the public retrieval URL for a stored asset. Pure string
    /// composition from the configured base; no I/O, cannot fail.
    pub fn resolve_url(&self, category: AssetCategory, stored_name: &str) -> String {
        crate::asset::public_url(&self.public_base_url, category, stored_name)
    }

    /// Delete an asset by storage path. Idempotent: an absent path is a
    /// no-op reported as `deleted: false`, not an error.
    pub async fn delete_asset(&self, storage_path: &Path) -> Result<DeleteOutcome, AppError> {
        let path = self.contain_path(storage_path)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(DeleteOutcome { deleted: false });
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| AppError::storage(path.display(), e))?;

        tracing::info!(path = %path.display(), "Asset deleted");
        Ok(DeleteOutcome { deleted: true })
    }

    /// Check whether an asset exists at the given storage path.
    pub async fn exists(&self, storage_path: &Path) -> Result<bool, AppError> {
        let path = self.contain_path(storage_path)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    /// Route, name, and prepare the destination directory for one upload.
    async fn prepare_target(
        &self,
        original_name: &str,
        mime_type: &str,
    ) -> Result<(String, PathBuf, AssetCategory), AppError> {
        let category = AssetCategory::from_mime(mime_type);
        let dir = self.root.join(category.dir_name());

        // Idempotent; "already exists" is success under concurrent creation.
        fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::storage(dir.display(), e))?;

        let stored_name = naming::stored_name(original_name);
        let path = dir.join(&stored_name);
        Ok((stored_name, path, category))
    }

    /// Validate that a caller-supplied storage path stays beneath the root.
    ///
    /// Paths produced by this store are already root-prefixed (including a
    /// relative root) and pass through unchanged; a bare relative path like
    /// `images/x.jpg` is joined onto the root.
    fn contain_path(&self, storage_path: &Path) -> Result<PathBuf, AppError> {
        if storage_path
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return Err(AppError::storage(
                storage_path.display(),
                "path escapes storage root",
            ));
        }
        if storage_path.starts_with(&self.root) {
            return Ok(storage_path.to_path_buf());
        }
        if storage_path.is_absolute() {
            return Err(AppError::storage(
                storage_path.display(),
                "path outside storage root",
            ));
        }
        Ok(self.root.join(storage_path))
    }

    /// Best-effort removal of a partial or orphaned file.
    async fn cleanup_partial(&self, path: &Path) {
        if let Err(e) = fs::remove_file(path).await {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove partial file"
                );
            }
        }
    }
}
