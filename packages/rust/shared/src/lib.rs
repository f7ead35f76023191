//! Shared types, error model, and configuration for eo-tracker.
//!
//! This crate is the foundation depended on by all other eo-tracker crates.
//! It provides:
//! - [`EoTrackerError`]: the unified error type
//! - Domain types ([`Watermark`], [`OrderRecord`], [`MetadataRow`])
//! - Configuration ([`AppConfig`], [`FilterSet`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    ApiConfig, AppConfig, DocumentPathStyle, FilterSet, OutputConfig, config_file_path,
    load_config, load_config_from,
};
pub use error::{EoTrackerError, Result};
pub use types::{
    AgencyRef, DocumentsPage, LIST_DELIMITER, METADATA_LOG_COLUMNS, METADATA_LOG_SCHEMA_VERSION,
    MetadataRow, OrderRecord, Watermark,
};
