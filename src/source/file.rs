//! File-based data source.
//!
//! Polls a JSON file holding the latest reading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use super::{DataSource, FeedEvent};

/// A data source that reads the latest reading from a JSON file.
///
/// The file holds a single reading object, or `null` when the controller has
/// nothing to report. The source tracks the file's modification time and only
/// returns new data when the file has been updated.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    last_error: Option<String>,
    last_modified: Option<SystemTime>,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            last_error: None,
            last_modified: None,
        }
    }

    /// Returns the path being watched.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    /// Read and parse the file.
    fn read_file(&mut self) -> Option<FeedEvent> {
        match fs::read_to_string(&self.path) {
            Ok(content) => match FeedEvent::parse(&content) {
                Ok(event) => {
                    self.last_error = None;
                    Some(event)
                }
                Err(e) => {
                    self.last_error = Some(format!("Parse error: {}", e));
                    None
                }
            },
            Err(e) => {
                self.last_error = Some(format!("Read error: {}", e));
                None
            }
        }
    }
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<FeedEvent> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (None, _) => true,        // First poll, always read
            (Some(_), None) => false, // File disappeared, keep last reading
            (Some(last), Some(current)) => current > last,
        };

        if file_changed {
            if let Some(event) = self.read_file() {
                debug!(path = %self.path.display(), "Reading file changed");
                self.last_modified = current_modified;
                return Some(event);
            }
        }

        None
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<String> {
        self.last_error.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "soilMoisture": 45,
            "waterLevel": 75,
            "solarVoltage": 2.8,
            "pumpStatus": 0,
            "timestamp": 1718000000
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/reading.json");
        assert_eq!(source.path(), Path::new("/tmp/reading.json"));
        assert_eq!(source.description(), "file: /tmp/reading.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path());

        match source.poll() {
            Some(FeedEvent::Reading(reading)) => assert_eq!(reading.soil_moisture, 45.0),
            other => panic!("unexpected event: {:?}", other),
        }

        // Second poll without file change should return None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_null_is_missing() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "null").unwrap();

        let mut source = FileSource::new(file.path());
        assert_eq!(source.poll(), Some(FeedEvent::Missing));
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/reading.json");

        assert!(source.poll().is_none());
        let error = source.error().unwrap();
        assert!(error.contains("Read error"));
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path());

        assert!(source.poll().is_none());
        let error = source.error().unwrap();
        assert!(error.contains("Parse error"));
    }
}
