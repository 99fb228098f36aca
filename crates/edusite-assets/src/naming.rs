//! Stored-name generation
//!
//! The original filename is untrusted and only contributes a sanitized stem.
//! The final name is `{stem}-{epoch_millis}-{random}{ext}`: sanitize first,
//! then append the uniqueness suffix, so no uniqueness check against
//! existing files is needed even under concurrent uploads with identical
//! original names.

use std::path::Path;

use rand::Rng;

/// Replace every character outside `[A-Za-z0-9]` with `_`, one-for-one.
pub fn sanitize_stem(stem: &str) -> String {
    stem.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Split a client-supplied filename into (stem, extension-with-dot).
/// A missing extension yields an empty string.
fn split_filename(original_name: &str) -> (&str, String) {
    let path = Path::new(original_name);
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(original_name);
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    (stem, ext)
}

/// Generate a collision-free stored name from a client-supplied filename.
pub fn stored_name(original_name: &str) -> String {
    let (stem, ext) = split_filename(original_name);
    let stem = sanitize_stem(stem);
    let stem = if stem.is_empty() {
        "file".to_string()
    } else {
        stem
    };
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::rng().random_range(0..1_000_000_000);
    format!("{}-{}-{}{}", stem, millis, suffix, ext)
}
