//! Asset categories
//!
//! A category is the routing class derived from a declared MIME type. It
//! determines the storage subdirectory an uploaded asset lands in and the
//! path segment used when composing its public URL.
//!
//! Routing is prefix-based and deliberately independent from the allow-list
//! admission check in `edusite-assets`: a type that passes admission but
//! matches no prefix rule (e.g. an `application/x-*` variant absent from the
//! prefix table) still routes to `Misc`. The two checks share no code path.

use serde::{Deserialize, Serialize};

/// Routing class for an uploaded asset, derived from its MIME prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetCategory {
    Image,
    Document,
    Video,
    Audio,
    Misc,
}

impl AssetCategory {
    /// Derive the category from a declared MIME type.
    ///
    /// `image/*` -> Image, `video/*` -> Video, `audio/*` -> Audio,
    /// `application/*` and `text/*` -> Document, everything else -> Misc.
    /// MIME parameters (`; charset=...`) are ignored.
    pub fn from_mime(mime_type: &str) -> Self {
        let essence = mime_type
            .split(';')
            .next()
            .map(|s| s.trim())
            .unwrap_or(mime_type)
            .to_ascii_lowercase();

        match essence.split('/').next().unwrap_or("") {
            "image" => AssetCategory::Image,
            "video" => AssetCategory::Video,
            "audio" => AssetCategory::Audio,
            "application" | "text" => AssetCategory::Document,
            _ => AssetCategory::Misc,
        }
    }

    /// Storage subdirectory name beneath the storage root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            AssetCategory::Image => "images",
            AssetCategory::Document => "documents",
            AssetCategory::Video => "videos",
            AssetCategory::Audio => "audios",
            AssetCategory::Misc => "misc",
        }
    }
}

impl std::fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.dir_name())
    }
}
