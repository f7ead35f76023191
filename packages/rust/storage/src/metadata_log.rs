//! Append-only CSV metadata log.

use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use eo_tracker_shared::{
    EoTrackerError, METADATA_LOG_COLUMNS, METADATA_LOG_SCHEMA_VERSION, MetadataRow, Result,
};

/// CSV log with one row per recorded order and the fixed
/// [`METADATA_LOG_COLUMNS`] header.
#[derive(Debug, Clone)]
pub struct MetadataLog {
    path: PathBuf,
}

impl MetadataLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether the log exists with at least a header.
    fn has_content(&self) -> Result<bool> {
        match std::fs::metadata(&self.path) {
            Ok(meta) => Ok(meta.len() > 0),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(EoTrackerError::io(&self.path, e)),
        }
    }

    fn csv_error(&self, e: csv::Error) -> EoTrackerError {
        EoTrackerError::Storage(format!("{}: {e}", self.path.display()))
    }

    /// Check that an existing log carries the current header.
    ///
    /// A missing or empty log passes; it gets the header on first append.
    pub fn verify_header(&self) -> Result<()> {
        if !self.has_content()? {
            return Ok(());
        }

        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(e))?;
        let headers = reader.headers().map_err(|e| self.csv_error(e))?;

        if !headers.iter().eq(METADATA_LOG_COLUMNS.iter().copied()) {
            return Err(EoTrackerError::Storage(format!(
                "{} has header [{}], expected schema v{METADATA_LOG_SCHEMA_VERSION} [{}]",
                self.path.display(),
                headers.iter().collect::<Vec<_>>().join(","),
                METADATA_LOG_COLUMNS.join(",")
            )));
        }
        Ok(())
    }

    /// Document numbers of every row already in the log.
    pub fn document_numbers(&self) -> Result<HashSet<String>> {
        let mut numbers = HashSet::new();
        if !self.has_content()? {
            return Ok(numbers);
        }

        self.verify_header()?;
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.csv_error(e))?;
        for record in reader.records() {
            let record = record.map_err(|e| self.csv_error(e))?;
            if let Some(number) = record.get(0).map(str::trim).filter(|s| !s.is_empty()) {
                numbers.insert(number.to_string());
            }
        }

        debug!(path = %self.path.display(), count = numbers.len(), "loaded logged document numbers");
        Ok(numbers)
    }

    /// Append `rows`, writing the header first if the log is new.
    ///
    /// Returns the number of rows written.
    pub fn append(&self, rows: &[MetadataRow]) -> Result<usize> {
        if rows.is_empty() {
            return Ok(0);
        }

        let needs_header = !self.has_content()?;
        if !needs_header {
            self.verify_header()?;
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| EoTrackerError::io(parent, e))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| EoTrackerError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        if needs_header {
            writer
                .write_record(METADATA_LOG_COLUMNS)
                .map_err(|e| self.csv_error(e))?;
        }
        for row in rows {
            writer.write_record(row.cells()).map_err(|e| self.csv_error(e))?;
        }
        writer.flush().map_err(|e| EoTrackerError::io(&self.path, e))?;

        info!(path = %self.path.display(), rows = rows.len(), "appended to metadata log");
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(number: &str, title: &str) -> MetadataRow {
        MetadataRow {
            document_number: number.into(),
            title: title.into(),
            publication_date: "2025-02-24".into(),
            agencies: "Executive Office of the President; Office of Management and Budget".into(),
            ..Default::default()
        }
    }

    #[test]
    fn first_append_writes_header_once() {
        let dir = tempfile::tempdir().unwrap();
        let log = MetadataLog::new(dir.path().join("executive_orders.csv"));

        assert_eq!(log.append(&[row("2025-02841", "First")]).unwrap(), 1);
        assert_eq!(log.append(&[row("2025-03133", "Second, with comma")]).unwrap(), 1);

        let content = std::fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], METADATA_LOG_COLUMNS.join(","));
        assert!(lines[2].contains("\"Second, with comma\""));
    }

    #[test]
    fn empty_append_does_not_create_file() {
        let dir = tempfile::tempdir().unwrap();
        let log = MetadataLog::new(dir.path().join("log.csv"));
        assert_eq!(log.append(&[]).unwrap(), 0);
        assert!(!log.path().exists());
    }

    #[test]
    fn document_numbers_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let log = MetadataLog::new(dir.path().join("log.csv"));
        assert!(log.document_numbers().unwrap().is_empty());

        log.append(&[row("2025-02841", "A"), row("2025-03133", "B")])
            .unwrap();
        let numbers = log.document_numbers().unwrap();
        assert_eq!(numbers.len(), 2);
        assert!(numbers.contains("2025-02841"));
        assert!(numbers.contains("2025-03133"));
    }

    #[test]
    fn rejects_foreign_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("log.csv");
        std::fs::write(
            &path,
            "document_number,title,publication_date,pdf_url,html_url\n2025-1,T,2025-01-21,,\n",
        )
        .unwrap();

        let log = MetadataLog::new(&path);
        let err = log.verify_header().unwrap_err();
        assert!(err.to_string().contains("schema v1"));
        assert!(log.append(&[row("2025-2", "X")]).is_err());

        // Untouched on rejection.
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
