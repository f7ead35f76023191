//! Application configuration for eo-tracker.
//!
//! Configuration is resolved once per run: built-in defaults, then an optional
//! TOML file (`$EO_TRACKER_CONFIG`, else `./eo-tracker.toml`), then environment
//! variable overrides. There are no command-line configuration flags.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{EoTrackerError, Result};

/// Default configuration file name, looked up in the working directory.
const CONFIG_FILE_NAME: &str = "eo-tracker.toml";

/// Env var naming an explicit config file path.
pub const CONFIG_PATH_ENV: &str = "EO_TRACKER_CONFIG";

/// Env var overriding [`AppConfig::start_date`].
pub const START_DATE_ENV: &str = "EO_TRACKER_START_DATE";
/// Env var overriding [`FilterSet::signer`].
pub const SIGNER_ENV: &str = "EO_TRACKER_SIGNER";
/// Env var overriding [`ApiConfig::base_url`].
pub const API_BASE_URL_ENV: &str = "EO_TRACKER_API_BASE_URL";
/// Env var overriding [`ApiConfig::document_base_url`].
pub const DOCUMENT_BASE_URL_ENV: &str = "EO_TRACKER_DOCUMENT_BASE_URL";
/// Env var overriding [`OutputConfig::data_dir`].
pub const DATA_DIR_ENV: &str = "EO_TRACKER_DATA_DIR";

/// Upstream API page size ceiling.
const MAX_PER_PAGE: u32 = 1000;

// ---------------------------------------------------------------------------
// Config structs (matching eo-tracker.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Watermark used when no watermark has been stored yet.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Upstream API settings.
    #[serde(default)]
    pub api: ApiConfig,

    /// Equality filters applied to the documents query.
    #[serde(default)]
    pub filters: FilterSet,

    /// Where the watermark, metadata log, and text artifacts live.
    #[serde(default)]
    pub output: OutputConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            api: ApiConfig::default(),
            filters: FilterSet::default(),
            output: OutputConfig::default(),
        }
    }
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, 20).expect("valid calendar date")
}

/// Layout of per-order full-text document URLs under
/// [`ApiConfig::document_base_url`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentPathStyle {
    /// `<base>/<yyyy>/<mm>/<dd>/<document_id>/document.xml`
    Nested,
    /// `<base>/<yyyy>/<mm>/<dd>/<document_id>.xml`, the layout served under
    /// the default federalregister.gov `full_text/xml` base.
    #[default]
    Flat,
}

/// `[api]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Documents search endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Root of the per-order full-text XML documents.
    #[serde(default = "default_document_base_url")]
    pub document_base_url: String,

    /// URL layout under `document_base_url`.
    #[serde(default)]
    pub document_path_style: DocumentPathStyle,

    /// Results requested per page (upstream maximum is 1000).
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    /// Result ordering passed to the API (`oldest`, `newest`, `relevance`).
    #[serde(default = "default_order")]
    pub order: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            document_base_url: default_document_base_url(),
            document_path_style: DocumentPathStyle::default(),
            per_page: default_per_page(),
            order: default_order(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "https://www.federalregister.gov/api/v1/documents.json".into()
}
fn default_document_base_url() -> String {
    "https://www.federalregister.gov/documents/full_text/xml".into()
}
fn default_per_page() -> u32 {
    MAX_PER_PAGE
}
fn default_order() -> String {
    "oldest".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// `[filters]` section: equality conditions on the documents query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    /// `conditions[type][]`
    #[serde(default = "default_doc_type")]
    pub doc_type: String,

    /// `conditions[presidential_document_type][]`
    #[serde(default = "default_subtype")]
    pub subtype: String,

    /// `conditions[president][]`
    #[serde(default = "default_signer")]
    pub signer: String,
}

impl Default for FilterSet {
    fn default() -> Self {
        Self {
            doc_type: default_doc_type(),
            subtype: default_subtype(),
            signer: default_signer(),
        }
    }
}

fn default_doc_type() -> String {
    "PRESDOCU".into()
}
fn default_subtype() -> String {
    "executive_order".into()
}
fn default_signer() -> String {
    "donald-trump".into()
}

/// `[output]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Directory all other output paths are relative to.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Append-only CSV metadata log.
    #[serde(default = "default_metadata_log")]
    pub metadata_log: String,

    /// Single-line watermark file.
    #[serde(default = "default_watermark_file")]
    pub watermark_file: String,

    /// Directory receiving one `<document_number>.txt` per order.
    #[serde(default = "default_text_dir")]
    pub text_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            metadata_log: default_metadata_log(),
            watermark_file: default_watermark_file(),
            text_dir: default_text_dir(),
        }
    }
}

impl OutputConfig {
    pub fn metadata_log_path(&self) -> PathBuf {
        self.data_dir.join(&self.metadata_log)
    }

    pub fn watermark_path(&self) -> PathBuf {
        self.data_dir.join(&self.watermark_file)
    }

    pub fn text_dir_path(&self) -> PathBuf {
        self.data_dir.join(&self.text_dir)
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}
fn default_metadata_log() -> String {
    "executive_orders.csv".into()
}
fn default_watermark_file() -> String {
    "last_eo_date.txt".into()
}
fn default_text_dir() -> String {
    "executive_order_txt".into()
}

// ---------------------------------------------------------------------------
// Overrides & validation
// ---------------------------------------------------------------------------

impl AppConfig {
    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// `lookup` is injected so tests never touch the process environment.
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(raw) = non_empty(START_DATE_ENV) {
            self.start_date = NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                EoTrackerError::config(format!("{START_DATE_ENV}={raw:?} is not a YYYY-MM-DD date: {e}"))
            })?;
        }
        if let Some(signer) = non_empty(SIGNER_ENV) {
            self.filters.signer = signer;
        }
        if let Some(url) = non_empty(API_BASE_URL_ENV) {
            self.api.base_url = url;
        }
        if let Some(url) = non_empty(DOCUMENT_BASE_URL_ENV) {
            self.api.document_base_url = url;
        }
        if let Some(dir) = non_empty(DATA_DIR_ENV) {
            self.output.data_dir = PathBuf::from(dir);
        }

        Ok(self)
    }

    /// Check cross-field constraints that serde defaults can't express.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("api.base_url", &self.api.base_url),
            ("api.document_base_url", &self.api.document_base_url),
        ] {
            Url::parse(value)
                .map_err(|e| EoTrackerError::config(format!("{name} {value:?} is invalid: {e}")))?;
        }

        if self.api.per_page == 0 || self.api.per_page > MAX_PER_PAGE {
            return Err(EoTrackerError::config(format!(
                "api.per_page must be between 1 and {MAX_PER_PAGE}, got {}",
                self.api.per_page
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(EoTrackerError::config("api.timeout_secs must be positive"));
        }

        for (name, value) in [
            ("filters.doc_type", &self.filters.doc_type),
            ("filters.subtype", &self.filters.subtype),
            ("filters.signer", &self.filters.signer),
        ] {
            if value.trim().is_empty() {
                return Err(EoTrackerError::config(format!("{name} must not be empty")));
            }
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Resolve the config file to read, if any.
///
/// `$EO_TRACKER_CONFIG` wins (and must exist); otherwise `./eo-tracker.toml`
/// is used when present.
pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    local.exists().then_some(local)
}

/// Load the application config: file (if any), env overrides, validation.
pub fn load_config() -> Result<AppConfig> {
    let config = match config_file_path() {
        Some(path) => load_config_from(&path)?,
        None => {
            tracing::debug!("no config file found, using defaults");
            AppConfig::default()
        }
    };

    let config = config.with_env_overrides(|key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Load the application config from a specific file path (no env overrides).
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| EoTrackerError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        EoTrackerError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    tracing::debug!(path = %path.display(), "loaded config file");
    Ok(config)
}
