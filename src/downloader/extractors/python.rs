// Python-module backend - runs `python3 -m yt_dlp`
//
// Preferred for YouTube: the module path historically survives the bot wall
// longer than the standalone binary.

use async_trait::async_trait;
use std::process::Command as StdCommand;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{ChannelEntry, DownloadSettings, VideoDetails};
use crate::downloader::utils::run_output_with_timeout;

use super::invocation;
use super::traits::{ExtractorConfig, MediaBackend};

/// Python interpreter to use. Overridable (e.g. a venv) to avoid Homebrew
/// PEP 668 limitations: `export YTDLP_PYTHON="/path/to/venv/bin/python"`
pub fn interpreter() -> String {
    std::env::var("YTDLP_PYTHON").unwrap_or_else(|_| "python3".to_string())
}

/// Quick `import yt_dlp` probe; avoids noisy stderr when the module is
/// missing.
pub fn has_module() -> bool {
    match StdCommand::new(interpreter())
        .args(["-c", "import yt_dlp"])
        .output()
    {
        Ok(out) => out.status.success(),
        Err(_) => false,
    }
}

pub struct PythonBackend {
    python: String,
}

impl PythonBackend {
    pub fn new() -> Self {
        Self {
            python: interpreter(),
        }
    }

    fn module_args(&self, tail: Vec<String>) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "yt_dlp".to_string()];
        args.extend(tail);
        args
    }
}

impl Default for PythonBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaBackend for PythonBackend {
    fn name(&self) -> &'static str {
        "yt-dlp-python"
    }

    fn is_available(&self) -> bool {
        has_module()
    }

    async fn list_channel(
        &self,
        channel_url: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<ChannelEntry>, DownloadError> {
        let args = self.module_args(invocation::flat_list_args(channel_url, config));
        let output = run_output_with_timeout(&self.python, args, config.request_deadline_secs())
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
        let args = self.module_args(invocation::details_args(url, config));
        let output = run_output_with_timeout(&self.python, args, config.request_deadline_secs())
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
        let args = self.module_args(invocation::download_args(url, settings, config));
        invocation::run_streaming(&self.python, args).await
    }
}
