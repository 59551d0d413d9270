// Scripted in-memory backend for pipeline tests. Records every call and
// serves canned responses, so the policy loops can be exercised without
// yt-dlp or a network.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::downloader::cancel::CancelFlag;
use crate::downloader::errors::DownloadError;
use crate::downloader::models::{ChannelEntry, DownloadSettings, VideoDetails};

use super::traits::{ExtractorConfig, MediaBackend};

pub(crate) struct ScriptedBackend {
    entries: Vec<ChannelEntry>,
    details: HashMap<String, Result<VideoDetails, DownloadError>>,
    download_failures: HashMap<String, DownloadError>,
    pub(crate) detail_calls: Mutex<Vec<String>>,
    pub(crate) download_calls: Mutex<Vec<String>>,
    /// Trip the flag after the nth fetch_details call (1-based), simulating
    /// a Ctrl-C arriving mid-scan.
    cancel_after: Option<(usize, CancelFlag)>,
}

pub(crate) fn entry_url(id: &str) -> String {
    format!("https://www.youtube.com/watch?v={}", id)
}

pub(crate) fn video(id: &str, duration_seconds: u64) -> VideoDetails {
    VideoDetails {
        id: id.to_string(),
        title: format!("video {}", id),
        duration_seconds,
        upload_date: "20240115".to_string(),
        view_count: 100,
        webpage_url: entry_url(id),
    }
}

impl ScriptedBackend {
    /// Backend whose channel contains the given videos, all metadata and
    /// download calls succeeding.
    pub(crate) fn with_videos(videos: Vec<VideoDetails>) -> Self {
        let entries = videos
            .iter()
            .map(|v| ChannelEntry {
                id: v.id.clone(),
                url: v.webpage_url.clone(),
                title: v.title.clone(),
            })
            .collect();
        let details = videos
            .into_iter()
            .map(|v| (v.webpage_url.clone(), Ok(v)))
            .collect();
        Self {
            entries,
            details,
            download_failures: HashMap::new(),
            detail_calls: Mutex::new(Vec::new()),
            download_calls: Mutex::new(Vec::new()),
            cancel_after: None,
        }
    }

    pub(crate) fn fail_details(mut self, id: &str, message: &str) -> Self {
        self.details
            .insert(entry_url(id), Err(DownloadError::Extractor(message.to_string())));
        self
    }

    pub(crate) fn fail_download(mut self, id: &str, message: &str) -> Self {
        self.download_failures
            .insert(entry_url(id), DownloadError::Extractor(message.to_string()));
        self
    }

    pub(crate) fn cancel_after_details(mut self, n: usize, flag: CancelFlag) -> Self {
        self.cancel_after = Some((n, flag));
        self
    }

    pub(crate) fn detail_call_count(&self) -> usize {
        self.detail_calls.lock().unwrap().len()
    }

    pub(crate) fn download_call_count(&self) -> usize {
        self.download_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl MediaBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn list_channel(
        &self,
        _channel_url: &str,
        _config: &ExtractorConfig,
    ) -> Result<Vec<ChannelEntry>, DownloadError> {
        Ok(self.entries.clone())
    }

    async fn fetch_details(
        &self,
        url: &str,
        _config: &ExtractorConfig,
    ) -> Result<VideoDetails, DownloadError> {
        let call_count = {
            let mut calls = self.detail_calls.lock().unwrap();
            calls.push(url.to_string());
            calls.len()
        };
        if let Some((n, flag)) = &self.cancel_after {
            if call_count == *n {
                flag.cancel();
            }
        }
        self.details
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(DownloadError::Unknown(format!("unscripted url {}", url))))
    }

    async fn download(
        &self,
        url: &str,
        _settings: &DownloadSettings,
        _config: &ExtractorConfig,
    ) -> Result<(), DownloadError> {
        self.download_calls.lock().unwrap().push(url.to_string());
        match self.download_failures.get(url) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
