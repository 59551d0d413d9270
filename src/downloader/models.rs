// Common data models for the downloader

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

const COMPACT_DATE: &[FormatItem<'static>] = format_description!("[year][month][day]");
const DISPLAY_DATE: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Videos at or below this length count as shorts.
pub const SHORTS_MAX_SECONDS: u64 = 60;

/// Shallow entry from a flat channel listing. No duration yet; that needs a
/// per-item metadata query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub id: String,
    pub url: String,
    pub title: String,
}

/// Full metadata for a single video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoDetails {
    pub id: String,
    pub title: String,
    /// Zero when the extractor reports no duration (live streams, premieres)
    pub duration_seconds: u64,
    /// yt-dlp compact form, `YYYYMMDD`
    pub upload_date: String,
    pub view_count: u64,
    pub webpage_url: String,
}

impl VideoDetails {
    /// Classification used by the shorts-only channel filter.
    pub fn is_short(&self) -> bool {
        self.duration_seconds > 0 && self.duration_seconds <= SHORTS_MAX_SECONDS
    }
}

/// One record of the persisted download history. Created only after a
/// successful download; the history file is append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadRecord {
    pub url: String,
    pub title: String,
    pub duration: u64,
    pub upload_date: String,
    pub view_count: u64,
    pub id: String,
    pub downloaded: bool,
}

impl DownloadRecord {
    pub fn new(url: &str, details: &VideoDetails) -> Self {
        Self {
            url: url.to_string(),
            title: details.title.clone(),
            duration: details.duration_seconds,
            upload_date: details.upload_date.clone(),
            view_count: details.view_count,
            id: details.id.clone(),
            downloaded: true,
        }
    }
}

/// Video quality presets offered by the settings prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Quality {
    Best,
    Good,
    Standard,
}

impl Quality {
    /// yt-dlp format selector for this preset.
    pub fn format_arg(&self) -> &'static str {
        match self {
            Self::Best => "bv*+ba/best",
            Self::Good => "bv*[height<=720]+ba/best[height<=720]",
            Self::Standard => "worst",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Best => "Best available",
            Self::Good => "Good (up to 720p)",
            Self::Standard => "Standard (smallest)",
        }
    }
}

/// Per-session download settings, built from the settings prompt. Not
/// persisted anywhere.
#[derive(Debug, Clone)]
pub struct DownloadSettings {
    pub output_dir: PathBuf,
    pub quality: Quality,
    pub save_metadata: bool,
    pub save_thumbnails: bool,
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("downloads"),
            quality: Quality::Best,
            save_metadata: false,
            save_thumbnails: false,
        }
    }
}

/// Render a yt-dlp `YYYYMMDD` upload date ISO-style; unparsable input is
/// passed through untouched.
pub fn format_upload_date(raw: &str) -> String {
    match Date::parse(raw, COMPACT_DATE) {
        Ok(date) => date
            .format(DISPLAY_DATE)
            .unwrap_or_else(|_| raw.to_string()),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details_with_duration(duration_seconds: u64) -> VideoDetails {
        VideoDetails {
            id: "abc123".to_string(),
            title: "clip".to_string(),
            duration_seconds,
            upload_date: "20240115".to_string(),
            view_count: 10,
            webpage_url: "https://www.youtube.com/watch?v=abc123".to_string(),
        }
    }

    #[test]
    fn shorts_cutoff_is_inclusive() {
        assert!(details_with_duration(1).is_short());
        assert!(details_with_duration(30).is_short());
        assert!(details_with_duration(60).is_short());
    }

    #[test]
    fn zero_and_long_durations_are_not_shorts() {
        assert!(!details_with_duration(0).is_short());
        assert!(!details_with_duration(61).is_short());
        assert!(!details_with_duration(3600).is_short());
    }

    #[test]
    fn upload_date_renders_iso() {
        assert_eq!(format_upload_date("20240115"), "2024-01-15");
    }

    #[test]
    fn bad_upload_date_passes_through() {
        assert_eq!(format_upload_date("Unknown"), "Unknown");
        assert_eq!(format_upload_date(""), "");
    }
}
