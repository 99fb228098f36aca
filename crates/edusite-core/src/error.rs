//! Error types module
//!
//! This module provides the error taxonomy shared by the asset intake and
//! notification dispatch crates. Every public operation in those crates
//! returns these variants (or a structured `SendResult`); none of them use
//! panics or a transport library's error shape as their error channel.
//!
//! Each variant self-describes its HTTP mapping and log level so the HTTP
//! layer can translate errors without matching on message strings.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {size_bytes} bytes exceeds limit of {limit_bytes} bytes")]
    FileTooLarge { size_bytes: u64, limit_bytes: u64 },

    #[error("Too many files: {count} exceeds limit of {limit}")]
    TooManyFiles { count: usize, limit: usize },

    #[error("Unexpected field: {0}")]
    UnexpectedField(String),

    #[error("Storage failure at {path}: {detail}")]
    StorageFailure { path: String, detail: String },

    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template render failure in '{template}': {detail}")]
    RenderFailure { template: String, detail: String },
}

impl AppError {
    /// Machine-readable error code (e.g. "INVALID_FILE_TYPE").
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            AppError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            AppError::TooManyFiles { .. } => "TOO_MANY_FILES",
            AppError::UnexpectedField(_) => "UNEXPECTED_FIELD",
            AppError::StorageFailure { .. } => "STORAGE_FAILURE",
            AppError::TemplateNotFound(_) => "TEMPLATE_NOT_FOUND",
            AppError::RenderFailure { .. } => "RENDER_FAILURE",
        }
    }

    /// HTTP status code the excluded HTTP layer should map this variant to.
    pub fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidFileType(_) => 400,
            AppError::FileTooLarge { .. } => 413,
            AppError::TooManyFiles { .. } => 400,
            AppError::UnexpectedField(_) => 400,
            AppError::StorageFailure { .. } => 500,
            AppError::TemplateNotFound(_) => 500,
            AppError::RenderFailure { .. } => 500,
        }
    }

    /// Whether the error is correctable by the client that sent the request.
    pub fn is_client_error(&self) -> bool {
        self.http_status_code() < 500
    }

    /// Log level for this error. Template and render failures are loud:
    /// they indicate a deployment defect, not bad user input.
    pub fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidFileType(_)
            | AppError::FileTooLarge { .. }
            | AppError::TooManyFiles { .. }
            | AppError::UnexpectedField(_) => LogLevel::Debug,
            AppError::StorageFailure { .. }
            | AppError::TemplateNotFound(_)
            | AppError::RenderFailure { .. } => LogLevel::Error,
        }
    }

    /// Build a `StorageFailure` with path context from an I/O error.
    pub fn storage(path: impl std::fmt::Display, err: impl std::fmt::Display) -> Self {
        AppError::StorageFailure {
            path: path.to_string(),
            detail: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        let err = AppError::InvalidFileType("application/x-sh".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_FILE_TYPE");
        assert!(err.is_client_error());
        assert_eq!(err.log_level(), LogLevel::Debug);

        let err = AppError::FileTooLarge {
            size_bytes: 2048,
            limit_bytes: 1024,
        };
        assert_eq!(err.http_status_code(), 413);
        assert!(err.to_string().contains("2048"));
        assert!(err.to_string().contains("1024"));
    }

    #[test]
    fn infrastructure_errors_map_to_5xx_and_log_loud() {
        let err = AppError::storage("/data/uploads/images/x.jpg", "permission denied");
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.error_code(), "STORAGE_FAILURE");
        assert!(!err.is_client_error());
        assert_eq!(err.log_level(), LogLevel::Error);
        assert!(err.to_string().contains("/data/uploads/images/x.jpg"));

        let err = AppError::TemplateNotFound("welcome".to_string());
        assert_eq!(err.log_level(), LogLevel::Error);
    }
}
