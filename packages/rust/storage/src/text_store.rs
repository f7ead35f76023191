//! Per-order plain-text artifacts, one `<document_number>.txt` per order.

use std::path::{Path, PathBuf};

use tracing::debug;

use eo_tracker_shared::{EoTrackerError, Result};

#[derive(Debug, Clone)]
pub struct TextStore {
    dir: PathBuf,
}

impl TextStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the artifact for `document_id`.
    ///
    /// The identifier becomes a file name, so anything that could escape the
    /// directory is rejected.
    pub fn artifact_path(&self, document_id: &str) -> Result<PathBuf> {
        let id = document_id.trim();
        if id.is_empty() {
            return Err(EoTrackerError::validation("empty document number"));
        }
        if id.starts_with('.') || id.contains(['/', '\\', '\0']) {
            return Err(EoTrackerError::validation(format!(
                "document number {id:?} is not usable as a file name"
            )));
        }
        Ok(self.dir.join(format!("{id}.txt")))
    }

    /// Whether an artifact already exists for `document_id`.
    pub fn contains(&self, document_id: &str) -> bool {
        self.artifact_path(document_id)
            .map(|p| p.is_file())
            .unwrap_or(false)
    }

    /// Write (or replace) the artifact for `document_id`.
    pub fn write(&self, document_id: &str, text: &str) -> Result<PathBuf> {
        let path = self.artifact_path(document_id)?;
        std::fs::create_dir_all(&self.dir).map_err(|e| EoTrackerError::io(&self.dir, e))?;
        std::fs::write(&path, text).map_err(|e| EoTrackerError::io(&path, e))?;

        debug!(path = %path.display(), bytes = text.len(), "wrote text artifact");
        Ok(path)
    }
}
