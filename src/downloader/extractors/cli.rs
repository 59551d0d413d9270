// Native `yt-dlp` binary backend
//
// Faster to start than the Python module and needs no interpreter, but
// somewhat more likely to trip YouTube's bot wall.

use async_trait::async_trait;
use std::process::Command as StdCommand;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{ChannelEntry, DownloadSettings, VideoDetails};
use crate::downloader::utils::run_output_with_timeout;

use super::invocation;
use super::traits::{ExtractorConfig, MediaBackend};

/// Find the yt-dlp binary in common install locations, then PATH.
pub fn locate_binary() -> Option<String> {
    let common_paths = [
        "/opt/homebrew/bin/yt-dlp",
        "/usr/local/bin/yt-dlp",
        "/usr/bin/yt-dlp",
    ];

    for path in common_paths {
        if std::path::Path::new(path).exists() {
            return Some(path.to_string());
        }
    }

    if let Ok(output) = StdCommand::new("which").arg("yt-dlp").output() {
        if output.status.success() {
            if let Ok(path) = String::from_utf8(output.stdout) {
                let trimmed = path.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
        }
    }

    None
}

pub struct CliBackend {
    ytdlp_path: String,
}

impl CliBackend {
    pub fn new() -> Self {
        Self {
            ytdlp_path: locate_binary().unwrap_or_else(|| "yt-dlp".to_string()),
        }
    }

    pub fn version(&self) -> Option<String> {
        match StdCommand::new(&self.ytdlp_path).arg("--version").output() {
            Ok(out) if out.status.success() => {
                Some(String::from_utf8_lossy(&out.stdout).trim().to_string())
            }
            _ => None,
        }
    }
}

impl Default for CliBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaBackend for CliBackend {
    fn name(&self) -> &'static str {
        "yt-dlp-cli"
    }

    fn is_available(&self) -> bool {
        self.version().is_some()
    }

    async fn list_channel(
        &self,
        channel_url: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<ChannelEntry>, DownloadError> {
        let args = invocation::flat_list_args(channel_url, config);
        let output = run_output_with_timeout(
            &self.ytdlp_path,
            args,
            config.request_deadline_secs(),
        )
        .await
        .map_err(DownloadError::from)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(stderr.to_string().into());
        }

        invocation::parse_flat_channel(&output.stdout)
    }

    async fn fetch_details(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoDetails, DownloadError> {
        let args = invocation::details_args(url, config);
        let output = run_output_with_timeout(
            &self.ytdlp_path,
            args,
            config.request_deadline_secs(),
        )
        .await
        .map_err(DownloadError::from)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(stderr.to_string().into());
        }

        invocation::parse_details(&output.stdout)
    }

    async fn download(
        &self,
        url: &str,
        settings: &DownloadSettings,
        config: &ExtractorConfig,
    ) -> Result<(), DownloadError> {
        let args = invocation::download_args(url, settings, config);
        invocation::run_streaming(&self.ytdlp_path, args).await
    }
}
