// Persisted download history
//
// A single JSON file holding an array of DownloadRecord, appended to after
// every successful download. Writers read the whole array, push one record,
// and rewrite the file through a temp file + rename so a crash mid-write
// cannot truncate the log. Single-process only; there is no locking.

use std::fs;
use std::path::{Path, PathBuf};

use crate::downloader::errors::DownloadError;
use crate::downloader::models::DownloadRecord;

pub const HISTORY_FILE: &str = "downloaded_videos.json";

#[derive(Debug, Clone)]
pub struct HistoryLog {
    path: PathBuf,
}

impl Default for HistoryLog {
    fn default() -> Self {
        Self::new(HISTORY_FILE)
    }
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All records in download order; an absent file is an empty history.
    pub fn read(&self) -> Result<Vec<DownloadRecord>, DownloadError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let content = fs::read_to_string(&self.path)
            .map_err(|e| DownloadError::Storage(format!("read {}: {}", self.path.display(), e)))?;

        serde_json::from_str(&content)
            .map_err(|e| DownloadError::ParseError(format!("{}: {}", self.path.display(), e)))
    }

    /// Append one record, preserving everything already logged.
    pub fn append(&self, record: DownloadRecord) -> Result<(), DownloadError> {
        let mut records = self.read()?;
        records.push(record);
        self.write(&records)
    }

    fn write(&self, records: &[DownloadRecord]) -> Result<(), DownloadError> {
        let json = serde_json::to_string_pretty(records)
            .map_err(|e| DownloadError::ParseError(e.to_string()))?;

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .map_err(|e| DownloadError::Storage(format!("write {}: {}", tmp.display(), e)))?;
        fs::rename(&tmp, &self.path)
            .map_err(|e| DownloadError::Storage(format!("rename {}: {}", tmp.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::VideoDetails;
    use tempfile::tempdir;

    fn record(id: &str) -> DownloadRecord {
        let details = VideoDetails {
            id: id.to_string(),
            title: format!("video {}", id),
            duration_seconds: 42,
            upload_date: "20240115".to_string(),
            view_count: 7,
            webpage_url: format!("https://www.youtube.com/watch?v={}", id),
        };
        let url = details.webpage_url.clone();
        DownloadRecord::new(&url, &details)
    }

    #[test]
    fn test_absent_file_reads_empty() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));
        assert!(log.read().unwrap().is_empty());
    }

    #[test]
    fn test_append_preserves_prior_entries() {
        let dir = tempdir().unwrap();
        let log = HistoryLog::new(dir.path().join("history.json"));

        log.append(record("a1")).unwrap();
        log.append(record("b2")).unwrap();
        log.append(record("c3")).unwrap();

        let records = log.read().unwrap();
        assert_eq!(records.len(), 3);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a1", "b2", "c3"]);
        assert!(records.iter().all(|r| r.downloaded));
    }

    #[test]
    fn test_append_survives_reopening() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");

        HistoryLog::new(&path).append(record("a1")).unwrap();
        // A later run opens the same file fresh
        HistoryLog::new(&path).append(record("b2")).unwrap();

        let records = HistoryLog::new(&path).read().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, "a1");
    }

    #[test]
    fn test_file_is_pretty_printed_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        HistoryLog::new(&path).append(record("a1")).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with('['));
        assert!(content.contains('\n'));
    }

    #[test]
    fn test_corrupt_file_is_an_error_not_a_wipe() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.json");
        std::fs::write(&path, "{not json").unwrap();

        let log = HistoryLog::new(&path);
        assert!(log.read().is_err());
        assert!(log.append(record("a1")).is_err());
        // The corrupt original is still there for inspection
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{not json");
    }
}
