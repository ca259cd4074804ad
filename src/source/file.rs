//! File-based data source.
//!
//! Replays a captured Health API response for offline use. The file may be
//! a bare prediction in any supported shape, or a capture that also carries
//! `history`, `alerts`, `status` and `notifications` next to it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::Utc;
use serde_json::Value;

use super::{DataSource, PollerState, SequenceGuard};
use crate::api::ApiError;
use crate::data::{
    normalize_alerts, normalize_history, normalize_notifications, normalize_prediction,
    normalize_status, HealthSnapshot,
};

/// A data source that reads a captured response from a JSON file.
///
/// The source tracks the file's modification time and only re-reads it
/// when it has been updated. Read and parse failures go through the same
/// fallback as live fetches: last good data if any, else demo data.
#[derive(Debug)]
pub struct FileSource {
    path: PathBuf,
    description: String,
    state: PollerState,
    sequence: SequenceGuard,
    last_modified: Option<SystemTime>,
    read_once: bool,
}

impl FileSource {
    /// Create a new file source for the given path.
    pub fn new<P: AsRef<Path>>(path: P, patient_id: &str) -> Self {
        let path = path.as_ref().to_path_buf();
        let description = format!("file: {}", path.display());
        Self {
            path,
            description,
            state: PollerState::new(patient_id),
            sequence: SequenceGuard::default(),
            last_modified: None,
            read_once: false,
        }
    }

    /// Returns the path being replayed.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn get_modified_time(&self) -> Option<SystemTime> {
        fs::metadata(&self.path).ok()?.modified().ok()
    }

    fn read_file(&self) -> Result<HealthSnapshot, ApiError> {
        let content = fs::read_to_string(&self.path).map_err(|e| ApiError::Io(e.to_string()))?;
        let value: Value =
            serde_json::from_str(&content).map_err(|e| ApiError::Parse(e.to_string()))?;
        snapshot_from_capture(&value, &self.state.patient_id)
    }
}

/// Build a snapshot from a captured response body.
pub fn snapshot_from_capture(value: &Value, patient_id: &str) -> Result<HealthSnapshot, ApiError> {
    let prediction = normalize_prediction(value)?;
    let mut snapshot = HealthSnapshot::from_prediction(patient_id, prediction, Utc::now());

    snapshot.history = normalize_history(value);
    snapshot.alerts = normalize_alerts(value);
    snapshot.notifications = normalize_notifications(value);
    if let Some(status) = value.get("status").filter(|s| s.is_object()) {
        snapshot.status = normalize_status(status);
    }
    Ok(snapshot)
}

impl DataSource for FileSource {
    fn poll(&mut self) -> Option<PollerState> {
        let current_modified = self.get_modified_time();

        let file_changed = match (&self.last_modified, &current_modified) {
            (_, None) => !self.read_once, // Missing: report once
            (None, Some(_)) => true,
            (Some(last), Some(current)) => current > last,
        };

        if !file_changed {
            return None;
        }

        self.read_once = true;
        self.last_modified = current_modified;
        let result = self.read_file();

        let seq = self.sequence.issue();
        self.state.apply(seq, result, Utc::now());
        Some(self.state.clone())
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn error(&self) -> Option<&str> {
        self.state.error.as_deref()
    }

    fn request_refresh(&mut self) {
        self.last_modified = None;
        self.read_once = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::DataOrigin;
    use std::io::{Seek, Write};
    use tempfile::NamedTempFile;

    fn sample_json() -> &'static str {
        r#"{
            "prediction": {
                "current_health": { "score": 81, "status": "Excellent" },
                "predicted_health": { "score": 77, "status": "Good" }
            },
            "history": [
                { "timestamp": "2024-05-01T11:00:00Z", "score": 79 }
            ],
            "alerts": [
                { "severity": "medium", "type": "spo2", "message": "SpO2 trending down" }
            ],
            "status": { "model": "cnn-lstm", "trained": true }
        }"#
    }

    #[test]
    fn test_file_source_new() {
        let source = FileSource::new("/tmp/capture.json", "P001");
        assert_eq!(source.path(), Path::new("/tmp/capture.json"));
        assert_eq!(source.description(), "file: /tmp/capture.json");
        assert!(source.error().is_none());
    }

    #[test]
    fn test_file_source_poll_reads_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path(), "P001");

        let state = source.poll().unwrap();
        let shown = state.shown();
        assert_eq!(shown.origin, DataOrigin::Live);
        assert_eq!(shown.snapshot.prediction.current_health.score, 81.0);
        assert_eq!(shown.snapshot.prediction.predicted_score(), 77.0);
        assert_eq!(shown.snapshot.history.len(), 1);
        assert_eq!(shown.snapshot.alerts.len(), 1);
        assert_eq!(shown.snapshot.status.len(), 2);

        // Second poll without file change should return None
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_bare_vitals_capture() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "heart_rate": 75, "spo2": 95, "temperature": 37 }}"#).unwrap();

        let mut source = FileSource::new(file.path(), "P001");
        let state = source.poll().unwrap();
        assert_eq!(
            state.shown().snapshot.prediction.current_health.score,
            98.0
        );
        assert!(state.shown().snapshot.status.is_empty());
    }

    #[test]
    fn test_file_source_detects_changes() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path(), "P001");
        let _ = source.poll();

        std::thread::sleep(std::time::Duration::from_millis(10));
        file.as_file_mut().set_len(0).unwrap();
        file.rewind().unwrap();
        writeln!(file, r#"{{ "current_health": {{ "score": 55 }} }}"#).unwrap();
        file.flush().unwrap();

        // Note: may not detect on filesystems with coarse mtime resolution
        if let Some(state) = source.poll() {
            assert_eq!(state.shown().snapshot.prediction.current_health.score, 55.0);
        }
    }

    #[test]
    fn test_file_source_missing_file() {
        let mut source = FileSource::new("/nonexistent/path/capture.json", "P001");

        let state = source.poll().unwrap();
        assert_eq!(state.origin(), DataOrigin::Demo);
        assert!(source.error().unwrap().contains("read error"));

        // Reported once, not on every frame
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_file_source_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let mut source = FileSource::new(file.path(), "P001");

        let state = source.poll().unwrap();
        assert_eq!(state.origin(), DataOrigin::Demo);
        assert!(source.error().unwrap().contains("parse"));

        // A bad file is not re-parsed every frame
        assert!(source.poll().is_none());
    }

    #[test]
    fn test_unknown_shape_is_parse_error() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{ "hello": "world" }}"#).unwrap();

        let mut source = FileSource::new(file.path(), "P001");
        source.poll();
        assert!(source.error().unwrap().contains("unrecognized response shape"));
    }

    #[test]
    fn test_refresh_forces_reread() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", sample_json()).unwrap();

        let mut source = FileSource::new(file.path(), "P001");
        assert_eq!(source.poll().unwrap().sequence, 1);
        assert!(source.poll().is_none());

        source.request_refresh();
        assert_eq!(source.poll().unwrap().sequence, 2);
    }
}
