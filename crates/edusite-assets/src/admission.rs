//! Upload admission checks
//!
//! Admission is the validation phase (type, size, count, field name) that
//! precedes any persistence. Type admission consults the configured MIME
//! allow-list; it is independent from the prefix-based category routing in
//! `edusite_core::category`, and the two can disagree (an allow-listed
//! `application/x-*` variant routes to `misc`). That disagreement is
//! intentional behavior, not a bug.

use edusite_core::{AppError, Config};

/// Multipart field names accepted for file parts.
const ACCEPTED_FIELD_NAMES: &[&str] = &["file", "files"];

/// Immutable admission limits, taken from config at construction.
#[derive(Clone, Debug)]
pub struct AdmissionPolicy {
    max_file_size_bytes: usize,
    max_files_per_request: usize,
    allowed_mime_types: Vec<String>,
}

/// Normalize a MIME type by stripping parameters
/// (e.g. "image/jpeg; charset=utf-8" -> "image/jpeg").
fn normalize_mime_type(content_type: &str) -> &str {
    content_type
        .split(';')
        .next()
        .map(|s| s.trim())
        .unwrap_or(content_type)
}

impl AdmissionPolicy {
    pub fn from_config(config: &Config) -> Self {
        AdmissionPolicy {
            max_file_size_bytes: config.max_file_size_bytes,
            max_files_per_request: config.max_files_per_request,
            allowed_mime_types: config.allowed_mime_types.clone(),
        }
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.max_file_size_bytes
    }

    /// Type admission: the declared MIME type must be on the allow-list.
    /// Compares the normalized essence only, so parameters cannot bypass it.
    pub fn admit_type(&self, mime_type: &str) -> Result<(), AppError> {
        let normalized = normalize_mime_type(mime_type).to_lowercase();
        if !self
            .allowed_mime_types
            .iter()
            .any(|ct| normalized == ct.to_lowercase())
        {
            return Err(AppError::InvalidFileType(normalized));
        }
        Ok(())
    }

    /// Size admission against the configured ceiling.
    pub fn admit_size(&self, size_bytes: usize) -> Result<(), AppError> {
        if size_bytes > self.max_file_size_bytes {
            return Err(AppError::FileTooLarge {
                size_bytes: size_bytes as u64,
                limit_bytes: self.max_file_size_bytes as u64,
            });
        }
        Ok(())
    }

    /// Count admission: a single logical request carries at most the
    /// configured number of files. The whole batch is rejected, never part
    /// of it.
    pub fn admit_count(&self, count: usize) -> Result<(), AppError> {
        if count > self.max_files_per_request {
            return Err(AppError::TooManyFiles {
                count,
                limit: self.max_files_per_request,
            });
        }
        Ok(())
    }

    /// Field-name admission: multipart parts must arrive under a known
    /// field name.
    pub fn admit_field_name(&self, field_name: &str) -> Result<(), AppError> {
        if !ACCEPTED_FIELD_NAMES.contains(&field_name) {
            return Err(AppError::UnexpectedField(field_name.to_string()));
        }
        Ok(())
    }
}
