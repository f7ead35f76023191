//! Single-line watermark file.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

use eo_tracker_shared::{EoTrackerError, Result, Watermark};

/// Reads and atomically replaces the stored watermark.
#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
    default: Watermark,
}

impl WatermarkStore {
    /// `default` is returned by [`load`](Self::load) until a watermark has
    /// been stored.
    pub fn new(path: impl Into<PathBuf>, default: Watermark) -> Self {
        Self {
            path: path.into(),
            default,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored watermark, or the default when none exists yet.
    ///
    /// An empty file counts as "none yet"; unparsable content is an error so a
    /// corrupted store never silently rewinds the query window.
    pub fn load(&self) -> Result<Watermark> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), default = %self.default, "no stored watermark");
                return Ok(self.default);
            }
            Err(e) => return Err(EoTrackerError::io(&self.path, e)),
        };

        if content.trim().is_empty() {
            warn!(path = %self.path.display(), "watermark file is empty, using default");
            return Ok(self.default);
        }

        content.parse().map_err(|e| {
            EoTrackerError::Storage(format!(
                "{} does not hold a YYYY-MM-DD date ({:?}): {e}",
                self.path.display(),
                content.trim()
            ))
        })
    }

    /// Replace the stored watermark.
    ///
    /// Writes a temp file in the same directory and renames it over the
    /// target, so a crash leaves either the old or the new value.
    pub fn store(&self, watermark: Watermark) -> Result<()> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir).map_err(|e| EoTrackerError::io(dir, e))?;

        let mut temp = NamedTempFile::new_in(dir).map_err(|e| EoTrackerError::io(dir, e))?;
        temp.write_all(watermark.to_string().as_bytes())
            .and_then(|()| temp.as_file().sync_all())
            .map_err(|e| EoTrackerError::io(temp.path(), e))?;
        temp.persist(&self.path)
            .map_err(|e| EoTrackerError::io(&self.path, e.error))?;

        debug!(path = %self.path.display(), %watermark, "watermark stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn wm(s: &str) -> Watermark {
        s.parse().unwrap()
    }

    #[test]
    fn missing_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = WatermarkStore::new(dir.path().join("last_eo_date.txt"), wm("2025-01-20"));
        assert_eq!(store.load().unwrap(), wm("2025-01-20"));
    }

    #[test]
    fn store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("last_eo_date.txt");
        let store = WatermarkStore::new(&path, wm("2025-01-20"));

        store.store(wm("2025-03-01")).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "2025-03-01");
        assert_eq!(
            store.load().unwrap().date(),
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
        );

        store.store(wm("2025-03-07")).unwrap();
        assert_eq!(store.load().unwrap(), wm("2025-03-07"));

        // Only the target file remains; the temp file was renamed away.
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn tolerates_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wm.txt");
        std::fs::write(&path, "2025-02-10\n").unwrap();
        let store = WatermarkStore::new(&path, wm("2025-01-20"));
        assert_eq!(store.load().unwrap(), wm("2025-02-10"));
    }

    #[test]
    fn empty_file_yields_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wm.txt");
        std::fs::write(&path, "  \n").unwrap();
        let store = WatermarkStore::new(&path, wm("2025-01-20"));
        assert_eq!(store.load().unwrap(), wm("2025-01-20"));
    }

    #[test]
    fn corrupted_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wm.txt");
        std::fs::write(&path, "yesterday").unwrap();
        let store = WatermarkStore::new(&path, wm("2025-01-20"));
        let err = store.load().unwrap_err();
        assert!(matches!(err, EoTrackerError::Storage(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn store_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("wm.txt");
        let store = WatermarkStore::new(&path, wm("2025-01-20"));
        store.store(wm("2025-02-01")).unwrap();
        assert!(path.exists());
    }
}
