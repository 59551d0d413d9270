// Shared yt-dlp invocation plumbing: argument tables, JSON parsing, and the
// progress-streaming process runner. Both backends drive the same tool, so
// they share everything except the program name.

use regex::Regex;
use std::io::Write;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command as TokioCommand;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{ChannelEntry, DownloadSettings, VideoDetails};

use super::traits::ExtractorConfig;

// Browser-like identity; YouTube serves automation-flagged responses to the
// default python/curl agents much sooner
pub(crate) const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

pub(crate) const OUTPUT_TEMPLATE: &str = "%(title)s [%(id)s].%(ext)s";

/// Flags common to every invocation: identity, pacing, retry counts,
/// cookies, proxy.
pub(crate) fn base_args(config: &ExtractorConfig) -> Vec<String> {
    let mut args = vec![
        "--no-warnings".to_string(),
        "--no-update".to_string(),
        "--socket-timeout".to_string(),
        config.socket_timeout.to_string(),
        "--retries".to_string(),
        config.retries.to_string(),
        "--fragment-retries".to_string(),
        config.fragment_retries.to_string(),
        // yt-dlp's own inter-request pacing, on top of ours
        "--sleep-interval".to_string(),
        "1".to_string(),
        "--max-sleep-interval".to_string(),
        "5".to_string(),
        "--user-agent".to_string(),
        USER_AGENT.to_string(),
        "--add-headers".to_string(),
        "Accept-Language:en-us,en;q=0.5".to_string(),
    ];

    if let Some(path) = &config.cookies_path {
        args.push("--cookies".to_string());
        args.push(path.clone());
    } else if config.cookies_from_browser {
        args.push("--cookies-from-browser".to_string());
        args.push("chrome".to_string());
    }

    if let Some(proxy) = &config.proxy {
        args.push("--proxy".to_string());
        args.push(proxy.clone());
    }

    args
}

/// Flat channel listing: one JSON document with shallow entry stubs.
pub(crate) fn flat_list_args(channel_url: &str, config: &ExtractorConfig) -> Vec<String> {
    let mut args = vec!["-J".to_string(), "--flat-playlist".to_string()];
    args.extend(base_args(config));
    args.push(channel_url.to_string());
    args
}

/// Full metadata for a single video.
pub(crate) fn details_args(url: &str, config: &ExtractorConfig) -> Vec<String> {
    let mut args = vec!["--dump-json".to_string(), "--no-playlist".to_string()];
    args.extend(base_args(config));
    args.push(url.to_string());
    args
}

/// Download one video into the settings' output directory.
pub(crate) fn download_args(
    url: &str,
    settings: &DownloadSettings,
    config: &ExtractorConfig,
) -> Vec<String> {
    let mut args = vec![
        "-f".to_string(),
        settings.quality.format_arg().to_string(),
        "--no-playlist".to_string(),
        "--newline".to_string(),
        // IPv6 ranges are throttled more aggressively by Google CDNs
        "--force-ipv4".to_string(),
        "--merge-output-format".to_string(),
        "mp4".to_string(),
        "-P".to_string(),
        settings.output_dir.to_string_lossy().to_string(),
        "-o".to_string(),
        OUTPUT_TEMPLATE.to_string(),
    ];

    if settings.save_metadata {
        args.push("--write-info-json".to_string());
    }
    if settings.save_thumbnails {
        args.push("--write-thumbnail".to_string());
    }

    args.extend(base_args(config));
    args.push(url.to_string());
    args
}

pub(crate) fn parse_flat_channel(stdout: &[u8]) -> Result<Vec<ChannelEntry>, DownloadError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| DownloadError::ParseError(format!("Invalid JSON from listing: {}", e)))?;

    let entries = json["entries"]
        .as_array()
        .ok_or_else(|| DownloadError::ParseError("No entries array in listing".to_string()))?;

    let mut out = Vec::new();
    for entry in entries {
        // Deleted/hidden videos come back as nulls in the entries array
        if entry.is_null() {
            continue;
        }

        let id = entry["id"].as_str().unwrap_or("").to_string();
        let url = entry["url"]
            .as_str()
            .or_else(|| entry["webpage_url"].as_str())
            .map(str::to_string)
            .unwrap_or_else(|| format!("https://www.youtube.com/watch?v={}", id));

        out.push(ChannelEntry {
            id,
            url,
            title: entry["title"].as_str().unwrap_or("Unknown").to_string(),
        });
    }

    Ok(out)
}

pub(crate) fn parse_details(stdout: &[u8]) -> Result<VideoDetails, DownloadError> {
    let json: serde_json::Value = serde_json::from_slice(stdout)
        .map_err(|e| DownloadError::ParseError(format!("Invalid JSON from metadata: {}", e)))?;

    Ok(VideoDetails {
        id: json["id"].as_str().unwrap_or("").to_string(),
        title: json["title"].as_str().unwrap_or("Unknown").to_string(),
        duration_seconds: json["duration"].as_f64().unwrap_or(0.0) as u64,
        upload_date: json["upload_date"].as_str().unwrap_or("Unknown").to_string(),
        view_count: json["view_count"].as_u64().unwrap_or(0),
        webpage_url: json["webpage_url"]
            .as_str()
            .or_else(|| json["url"].as_str())
            .unwrap_or("")
            .to_string(),
    })
}

/// Parse a yt-dlp progress line like:
/// `[download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)`
/// Returns (percent, status_string)
pub(crate) fn parse_progress(line: &str) -> Option<(f32, String)> {
    lazy_static::lazy_static! {
        static ref PROGRESS_RE: Regex = Regex::new(
            r"\[download\]\s+(\d+\.?\d*)%\s+of\s+~?\s*(\d+\.?\d*\s*\w+)\s+at\s+(\d+\.?\d*\s*\w+/s)(?:\s+ETA\s+(\S+))?"
        ).unwrap();
        static ref DEST_RE: Regex = Regex::new(r"\[download\]\s+Destination:\s+(.+)").unwrap();
        static ref MERGE_RE: Regex = Regex::new(r"\[Merger?\]\s+Merging").unwrap();
        static ref ALREADY_RE: Regex = Regex::new(r"has already been downloaded").unwrap();
    }

    if let Some(caps) = PROGRESS_RE.captures(line) {
        let percent: f32 = caps.get(1)?.as_str().parse().ok()?;
        let size = caps.get(2).map(|m| m.as_str()).unwrap_or("?");
        let speed = caps.get(3).map(|m| m.as_str()).unwrap_or("?");
        let eta = caps.get(4).map(|m| m.as_str()).unwrap_or("");

        let status = if eta.is_empty() {
            format!("{:.1}% of {} @ {}", percent, size, speed)
        } else {
            format!("{:.1}% of {} @ {} ETA {}", percent, size, speed, eta)
        };

        return Some((percent, status));
    }

    if let Some(caps) = DEST_RE.captures(line) {
        let filename = caps.get(1).map(|m| m.as_str()).unwrap_or("file");
        let short_name: String = filename
            .split('/')
            .last()
            .unwrap_or(filename)
            .chars()
            .take(50)
            .collect();
        return Some((0.0, format!("Starting: {}...", short_name)));
    }

    if MERGE_RE.is_match(line) {
        return Some((99.0, "Merging video and audio...".to_string()));
    }

    if ALREADY_RE.is_match(line) {
        return Some((100.0, "File already downloaded".to_string()));
    }

    None
}

/// Run a download invocation with live console progress. Stdout is read line
/// by line for progress updates; stderr is collected for the error message.
pub(crate) async fn run_streaming(
    program: &str,
    args: Vec<String>,
) -> Result<(), DownloadError> {
    log::debug!("spawning {} {}", program, args.join(" "));

    let mut child = TokioCommand::new(program)
        .args(&args)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| DownloadError::ExecutionError(format!("Failed to start {}: {}", program, e)))?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stdout".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| DownloadError::ExecutionError("Failed to capture stderr".to_string()))?;

    let stderr_task = tokio::spawn(async move {
        let mut lines = BufReader::new(stderr).lines();
        let mut collected = Vec::new();
        while let Ok(Some(line)) = lines.next_line().await {
            collected.push(line);
        }
        collected.join("\n")
    });

    let mut printed_progress = false;
    let mut lines = BufReader::new(stdout).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        if let Some((_, status)) = parse_progress(&line) {
            print!("\r  {:<70}", status);
            let _ = std::io::stdout().flush();
            printed_progress = true;
        } else if line.contains("[download]") || line.contains("[Merger]") {
            log::debug!("yt-dlp: {}", line);
        }
    }
    if printed_progress {
        println!();
    }

    let status = child
        .wait()
        .await
        .map_err(|e| DownloadError::ExecutionError(format!("Process error: {}", e)))?;
    let stderr_output = stderr_task.await.unwrap_or_default();

    if status.success() {
        Ok(())
    } else if stderr_output.trim().is_empty() {
        Err(DownloadError::Unknown(format!(
            "yt-dlp exited with status {}",
            status
        )))
    } else {
        Err(stderr_output.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::models::Quality;

    #[test]
    fn test_progress_line_parsing() {
        let line = "[download]   6.2% of ~ 343.72MiB at  420.30KiB/s ETA 12:32 (frag 29/454)";
        let (percent, status) = parse_progress(line).unwrap();
        assert!((percent - 6.2).abs() < f32::EPSILON);
        assert!(status.contains("343.72MiB"));
        assert!(status.contains("ETA 12:32"));
    }

    #[test]
    fn test_non_progress_line_ignored() {
        assert!(parse_progress("[youtube] extracting player response").is_none());
    }

    #[test]
    fn test_already_downloaded_line() {
        let line = "[download] clip [abc].mp4 has already been downloaded";
        let (percent, _) = parse_progress(line).unwrap();
        assert!((percent - 100.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_flat_channel_drops_null_entries() {
        let json = br#"{"entries": [
            {"id": "a1", "url": "https://www.youtube.com/watch?v=a1", "title": "one"},
            null,
            {"id": "b2", "title": "two"}
        ]}"#;
        let entries = parse_flat_channel(json).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, "a1");
        // url synthesized from the id when the stub has none
        assert_eq!(entries[1].url, "https://www.youtube.com/watch?v=b2");
    }

    #[test]
    fn test_flat_channel_requires_entries() {
        assert!(parse_flat_channel(br#"{"title": "empty"}"#).is_err());
        assert!(parse_flat_channel(b"not json").is_err());
    }

    #[test]
    fn test_details_parsing() {
        let json = br#"{
            "id": "a1", "title": "clip", "duration": 42.7,
            "upload_date": "20240115", "view_count": 1234,
            "webpage_url": "https://www.youtube.com/watch?v=a1"
        }"#;
        let details = parse_details(json).unwrap();
        assert_eq!(details.duration_seconds, 42);
        assert_eq!(details.view_count, 1234);
        assert_eq!(details.upload_date, "20240115");
    }

    #[test]
    fn test_details_defaults_for_missing_fields() {
        let details = parse_details(br#"{"id": "a1", "title": "clip"}"#).unwrap();
        assert_eq!(details.duration_seconds, 0);
        assert_eq!(details.view_count, 0);
        assert_eq!(details.upload_date, "Unknown");
    }

    #[test]
    fn test_download_args_carry_settings() {
        let settings = DownloadSettings {
            quality: Quality::Standard,
            save_metadata: true,
            ..Default::default()
        };
        let config = ExtractorConfig::default();
        let args = download_args("https://youtu.be/a1", &settings, &config);
        assert!(args.contains(&"worst".to_string()));
        assert!(args.contains(&"--write-info-json".to_string()));
        assert!(!args.contains(&"--write-thumbnail".to_string()));
        assert_eq!(args.last().unwrap(), "https://youtu.be/a1");
    }

    #[test]
    fn test_base_args_cookie_precedence() {
        let config = ExtractorConfig::default()
            .with_cookies_path(Some("cookies.txt".to_string()))
            .with_cookies_from_browser(true);
        let args = base_args(&config);
        assert!(args.contains(&"--cookies".to_string()));
        assert!(!args.contains(&"--cookies-from-browser".to_string()));
    }
}
