//! Asset data model

use std::path::PathBuf;

use edusite_core::AssetCategory;
use serde::Serialize;

/// A stored upload. Created atomically at successful receipt, never mutated;
/// destroyed only by an explicit deletion request.
#[derive(Debug, Clone, Serialize)]
pub struct StoredAsset {
    /// Client-supplied filename, untrusted; kept for display only.
    pub original_name: String,
    /// Declared content type; source of truth for category routing.
    pub mime_type: String,
    /// Bytes measured during receipt.
    pub size_bytes: u64,
    /// Routing class derived from the MIME prefix at store time.
    pub category: AssetCategory,
    /// Generated identifier: `{sanitized_stem}-{epoch_millis}-{random}{ext}`.
    pub stored_name: String,
    /// `{root}/{category}/{stored_name}`; immutable once assigned.
    pub storage_path: PathBuf,
}

/// Compose the public retrieval URL for a stored asset beneath `base_url`.
/// Pure string composition; no I/O.
pub(crate) fn public_url(base_url: &str, category: AssetCategory, stored_name: &str) -> String {
    format!(
        "{}/uploads/{}/{}",
        base_url.trim_end_matches('/'),
        category.dir_name(),
        stored_name
    )
}

impl StoredAsset {
    /// Public retrieval URL for this asset beneath the given base URL.
    pub fn url(&self, public_base_url: &str) -> String {
        public_url(public_base_url, self.category, &self.stored_name)
    }
}

/// A file received from one multipart part, as handed over by the HTTP layer.
#[derive(Debug, Clone)]
pub struct IncomingFile {
    pub field_name: String,
    pub original_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Result of a deletion request. Deleting an already-absent path is a no-op,
/// not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
}
