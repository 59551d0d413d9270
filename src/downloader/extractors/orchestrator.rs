// Backend orchestrator - automatic backend selection and fallback
//
// Strategy:
// 1. For YouTube: Python module preferred (better bot-wall survival)
// 2. For other sites: CLI binary preferred (faster startup)
// 3. Fall back to the other backend on failure - EXCEPT when the failure
//    classifies as bot detection: retrying on another transport from the
//    same IP only raises the detection risk.

use async_trait::async_trait;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{ChannelEntry, DownloadSettings, VideoDetails};

use super::cli::CliBackend;
use super::diagnostics::classify;
use super::python::PythonBackend;
use super::traits::{ExtractorConfig, MediaBackend};

pub struct BackendOrchestrator {
    python: PythonBackend,
    cli: CliBackend,
}

fn is_youtube(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com") || lower.contains("youtu.be")
}

impl BackendOrchestrator {
    pub fn new() -> Self {
        Self {
            python: PythonBackend::new(),
            cli: CliBackend::new(),
        }
    }

    fn order_for(&self, url: &str) -> [&dyn MediaBackend; 2] {
        if is_youtube(url) {
            [&self.python, &self.cli]
        } else {
            [&self.cli, &self.python]
        }
    }

    /// Whether a failed attempt may be retried on the other backend.
    fn may_fall_back(error: &DownloadError) -> bool {
        !classify(&error.to_string()).halts_run()
    }
}

impl Default for BackendOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MediaBackend for BackendOrchestrator {
    fn name(&self) -> &'static str {
        "auto"
    }

    fn is_available(&self) -> bool {
        self.python.is_available() || self.cli.is_available()
    }

    async fn list_channel(
        &self,
        channel_url: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<ChannelEntry>, DownloadError> {
        let mut last_error =
            DownloadError::ToolNotFound("No yt-dlp backend available".to_string());

        for backend in self.order_for(channel_url) {
            if !backend.is_available() {
                continue;
            }
            log::debug!("listing channel via {}", backend.name());
            match backend.list_channel(channel_url, config).await {
                Ok(entries) => return Ok(entries),
                Err(e) => {
                    if !Self::may_fall_back(&e) {
                        return Err(e);
                    }
                    log::warn!("{} listing failed: {}", backend.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn fetch_details(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoDetails, DownloadError> {
        let mut last_error =
            DownloadError::ToolNotFound("No yt-dlp backend available".to_string());

        for backend in self.order_for(url) {
            if !backend.is_available() {
                continue;
            }
            match backend.fetch_details(url, config).await {
                Ok(details) => return Ok(details),
                Err(e) => {
                    if !Self::may_fall_back(&e) {
                        return Err(e);
                    }
                    log::warn!("{} metadata fetch failed: {}", backend.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn download(
        &self,
        url: &str,
        settings: &DownloadSettings,
        config: &ExtractorConfig,
    ) -> Result<(), DownloadError> {
        let mut last_error =
            DownloadError::ToolNotFound("No yt-dlp backend available".to_string());

        for backend in self.order_for(url) {
            if !backend.is_available() {
                continue;
            }
            log::debug!("downloading via {}", backend.name());
            match backend.download(url, settings, config).await {
                Ok(()) => return Ok(()),
                Err(e) => {
                    if !Self::may_fall_back(&e) {
                        return Err(e);
                    }
                    log::warn!("{} download failed: {}", backend.name(), e);
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
