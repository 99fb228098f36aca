//! Edusite Core Library
//!
//! This crate provides the configuration, error taxonomy, and asset category
//! types shared by the asset intake and notification dispatch crates.

pub mod category;
pub mod config;
pub mod error;

// Re-export commonly used types
pub use category::AssetCategory;
pub use config::Config;
pub use error::{AppError, LogLevel};
