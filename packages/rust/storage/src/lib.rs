//! File-backed persistence for eo-tracker.
//!
//! Three artifacts live under the configured data directory:
//! - [`WatermarkStore`]: one ISO date, replaced atomically at the end of a run
//! - [`MetadataLog`]: append-only CSV with a fixed, versioned header
//! - [`TextStore`]: one plain-text file per order
//!
//! The run process is the only writer, so no locking is done.

mod metadata_log;
mod text_store;
mod watermark;

use eo_tracker_shared::{OutputConfig, Result, Watermark};

pub use metadata_log::MetadataLog;
pub use text_store::TextStore;
pub use watermark::WatermarkStore;

/// Handle bundling the stores for one data directory.
#[derive(Debug, Clone)]
pub struct Storage {
    pub watermark: WatermarkStore,
    pub metadata_log: MetadataLog,
    pub texts: TextStore,
}

impl Storage {
    /// Open the stores described by `output`.
    ///
    /// Fails early if an existing metadata log has an unexpected header, so a
    /// run never fetches data it cannot record.
    pub fn open(output: &OutputConfig, default_watermark: Watermark) -> Result<Self> {
        let storage = Self {
            watermark: WatermarkStore::new(output.watermark_path(), default_watermark),
            metadata_log: MetadataLog::new(output.metadata_log_path()),
            texts: TextStore::new(output.text_dir_path()),
        };
        storage.metadata_log.verify_header()?;

        tracing::debug!(data_dir = %output.data_dir.display(), "storage opened");
        Ok(storage)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_resolves_paths_under_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let output = OutputConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        let storage = Storage::open(&output, "2025-01-20".parse().unwrap()).unwrap();

        assert_eq!(storage.watermark.path(), dir.path().join("last_eo_date.txt"));
        assert_eq!(storage.metadata_log.path(), dir.path().join("executive_orders.csv"));
        assert_eq!(storage.texts.dir(), dir.path().join("executive_order_txt"));
        assert_eq!(storage.watermark.load().unwrap().to_string(), "2025-01-20");
    }

    #[test]
    fn open_rejects_incompatible_log() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("executive_orders.csv"), "id,name\n").unwrap();
        let output = OutputConfig {
            data_dir: dir.path().to_path_buf(),
            ..Default::default()
        };
        assert!(Storage::open(&output, "2025-01-20".parse().unwrap()).is_err());
    }
}
