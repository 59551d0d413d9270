// MediaBackend trait and request configuration

use async_trait::async_trait;

use crate::downloader::errors::DownloadError;
use crate::downloader::models::{ChannelEntry, DownloadSettings, VideoDetails};

/// Request policy shared by every yt-dlp invocation.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// SOCKS5/HTTP proxy URL
    pub proxy: Option<String>,
    /// Path to cookies.txt file
    pub cookies_path: Option<String>,
    /// Use cookies from browser (Chrome)
    pub cookies_from_browser: bool,
    /// Socket timeout in seconds
    pub socket_timeout: u32,
    /// Whole-request retries
    pub retries: u32,
    /// Fragment retries for HLS/DASH streams
    pub fragment_retries: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            proxy: None,
            cookies_path: None,
            cookies_from_browser: false,
            socket_timeout: 60,
            retries: 5,
            fragment_retries: 5,
        }
    }
}

impl ExtractorConfig {
    pub fn with_proxy(mut self, proxy: Option<String>) -> Self {
        self.proxy = proxy;
        self
    }

    pub fn with_cookies_path(mut self, path: Option<String>) -> Self {
        self.cookies_path = path;
        self
    }

    pub fn with_cookies_from_browser(mut self, enabled: bool) -> Self {
        self.cookies_from_browser = enabled;
        self
    }

    /// Tightened variant for per-item metadata probes: short timeout, one
    /// retry. A slow item gets skipped instead of stalling the whole scan.
    pub fn probe(&self) -> Self {
        let mut cfg = self.clone();
        cfg.socket_timeout = 10;
        cfg.retries = 1;
        cfg
    }

    /// Hard deadline for a single metadata subprocess.
    pub fn request_deadline_secs(&self) -> u64 {
        (self.socket_timeout as u64 * (self.retries as u64 + 1)).max(60)
    }
}

/// Capability interface over the external extraction tool. The pipeline only
/// talks to this trait, so policy (classification, halting, logging) stays
/// testable against a scripted implementation.
#[async_trait]
pub trait MediaBackend: Send + Sync {
    /// Name of the backend (for logging)
    fn name(&self) -> &'static str;

    /// Check if the underlying tool is usable
    fn is_available(&self) -> bool;

    /// Flat channel listing: shallow entries, no per-video metadata
    async fn list_channel(
        &self,
        channel_url: &str,
        config: &ExtractorConfig,
    ) -> Result<Vec<ChannelEntry>, DownloadError>;

    /// Full metadata for a single video URL
    async fn fetch_details(
        &self,
        url: &str,
        config: &ExtractorConfig,
    ) -> Result<VideoDetails, DownloadError>;

    /// Download one video into the configured output directory
    async fn download(
        &self,
        url: &str,
        settings: &DownloadSettings,
        config: &ExtractorConfig,
    ) -> Result<(), DownloadError>;
}
