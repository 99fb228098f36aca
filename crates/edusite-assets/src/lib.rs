//! Edusite Asset Intake Pipeline
//!
//! This crate validates, classifies, stores, and names uploaded binary
//! assets on the local filesystem, and exposes retrieval URLs and idempotent
//! deletion.
//!
//! # Storage layout
//!
//! Assets live at `{root}/{category}/{stored_name}` where the category
//! subdirectory (`images`, `documents`, `videos`, `audios`, `misc`) is
//! derived from the declared MIME prefix at store time, never chosen by the
//! caller. Stored names are `{sanitized_stem}-{epoch_millis}-{random}{ext}`,
//! unique per upload without coordination, so concurrent writes never
//! collide on a path.
//!
//! Admission (type, size, count) always precedes persistence: a rejected
//! upload leaves no partial artifact behind.

pub mod admission;
pub mod asset;
pub mod naming;
pub mod store;

// Re-export commonly used types
pub use admission::AdmissionPolicy;
pub use asset::{DeleteOutcome, IncomingFile, StoredAsset};
pub use store::AssetStore;
