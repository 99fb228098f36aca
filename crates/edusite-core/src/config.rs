//! Configuration module
//!
//! Configuration is read from the environment once at process start and is
//! immutable afterwards. Both core services are constructed from it; neither
//! reads the environment on its own.

use std::env;
use std::path::PathBuf;

// Default limits
const MAX_FILE_SIZE_MB: usize = 10;
const MAX_FILES_PER_REQUEST: usize = 10;
const SMTP_PORT: u16 = 587;
const SMTP_POOL_SIZE: u32 = 5;
const SMTP_TIMEOUT_SECS: u64 = 30;

/// Default MIME allow-list, grouped by category. Admission checks membership
/// here; routing into subdirectories is prefix-based and independent.
const DEFAULT_ALLOWED_MIME_TYPES: &[&str] = &[
    // images
    "image/jpeg",
    "image/png",
    "image/gif",
    "image/webp",
    "image/svg+xml",
    // documents
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.ms-excel",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "text/plain",
    "text/csv",
    // video
    "video/mp4",
    "video/mpeg",
    "video/quicktime",
    "video/webm",
    // audio
    "audio/mpeg",
    "audio/wav",
    "audio/ogg",
];

/// Application configuration for the asset intake and notification services.
#[derive(Clone, Debug)]
pub struct Config {
    // Asset intake
    pub storage_root: PathBuf,
    pub public_base_url: String,
    pub max_file_size_bytes: usize,
    pub max_files_per_request: usize,
    pub allowed_mime_types: Vec<String>,
    // Notification dispatch
    pub smtp_host: Option<String>,
    pub smtp_port: u16,
    pub smtp_user: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_from_address: Option<String>,
    pub smtp_from_name: String,
    pub smtp_tls: bool,
    pub smtp_pool_size: u32,
    pub smtp_timeout_secs: u64,
    pub template_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let storage_root =
            PathBuf::from(env::var("STORAGE_ROOT").unwrap_or_else(|_| "./uploads".to_string()));

        let public_base_url = env::var("PUBLIC_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:5000".to_string())
            .trim_end_matches('/')
            .to_string();

        let max_file_size_mb = env::var("MAX_FILE_SIZE_MB")
            .unwrap_or_else(|_| MAX_FILE_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILE_SIZE_MB);

        let max_files_per_request = env::var("MAX_FILES_PER_REQUEST")
            .unwrap_or_else(|_| MAX_FILES_PER_REQUEST.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_FILES_PER_REQUEST);

        let allowed_mime_types: Vec<String> = match env::var("ALLOWED_MIME_TYPES") {
            Ok(list) => list
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            Err(_) => DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        };

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| SMTP_PORT.to_string())
            .parse::<u16>()
            .unwrap_or(SMTP_PORT);

        let smtp_tls = env::var("SMTP_TLS")
            .map(|v| v.to_lowercase() == "true" || v == "1")
            .unwrap_or(true);

        let smtp_pool_size = env::var("SMTP_POOL_SIZE")
            .unwrap_or_else(|_| SMTP_POOL_SIZE.to_string())
            .parse::<u32>()
            .unwrap_or(SMTP_POOL_SIZE);

        let smtp_timeout_secs = env::var("SMTP_TIMEOUT_SECS")
            .unwrap_or_else(|_| SMTP_TIMEOUT_SECS.to_string())
            .parse::<u64>()
            .unwrap_or(SMTP_TIMEOUT_SECS);

        let template_dir =
            PathBuf::from(env::var("TEMPLATE_DIR").unwrap_or_else(|_| "./templates".to_string()));

        let config = Config {
            storage_root,
            public_base_url,
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            max_files_per_request,
            allowed_mime_types,
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port,
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_from_address: env::var("SMTP_FROM_ADDRESS").ok(),
            smtp_from_name: env::var("SMTP_FROM_NAME")
                .unwrap_or_else(|_| "Edusite".to_string()),
            smtp_tls,
            smtp_pool_size,
            smtp_timeout_secs,
            template_dir,
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.max_file_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_FILE_SIZE_MB must be greater than 0"));
        }
        if self.max_files_per_request == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILES_PER_REQUEST must be greater than 0"
            ));
        }
        if self.allowed_mime_types.is_empty() {
            return Err(anyhow::anyhow!("ALLOWED_MIME_TYPES cannot be empty"));
        }
        if self.smtp_pool_size == 0 {
            return Err(anyhow::anyhow!("SMTP_POOL_SIZE must be greater than 0"));
        }
        Ok(())
    }

    /// SMTP is considered configured when both a host and a from-address are
    /// present. Sends are still attempted when verification fails later; this
    /// only gates channel construction.
    pub fn smtp_configured(&self) -> bool {
        self.smtp_host.is_some() && self.smtp_from_address.is_some()
    }
}

impl Default for Config {
    /// In-process defaults, used by tests and callers that configure the
    /// services programmatically instead of from the environment.
    fn default() -> Self {
        Config {
            storage_root: PathBuf::from("./uploads"),
            public_base_url: "http://localhost:5000".to_string(),
            max_file_size_bytes: MAX_FILE_SIZE_MB * 1024 * 1024,
            max_files_per_request: MAX_FILES_PER_REQUEST,
            allowed_mime_types: DEFAULT_ALLOWED_MIME_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            smtp_host: None,
            smtp_port: SMTP_PORT,
            smtp_user: None,
            smtp_password: None,
            smtp_from_address: None,
            smtp_from_name: "Edusite".to_string(),
            smtp_tls: true,
            smtp_pool_size: SMTP_POOL_SIZE,
            smtp_timeout_secs: SMTP_TIMEOUT_SECS,
            template_dir: PathBuf::from("./templates"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.max_files_per_request, 10);
        assert!(config
            .allowed_mime_types
            .contains(&"image/jpeg".to_string()));
        assert!(!config.smtp_configured());
    }

    #[test]
    fn validate_rejects_zero_limits() {
        let config = Config {
            max_file_size_bytes: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            max_files_per_request: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            allowed_mime_types: vec![],
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
