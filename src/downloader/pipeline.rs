// Streaming scan-and-filter-and-download loop
//
// One item at a time: flat-listed, probed for metadata, classified against
// the shorts filter, downloaded, logged. Sequential by design; the pacing
// delays between calls are part of the bot-avoidance posture and parallel
// fetches would defeat them.

use std::fs;

use crate::downloader::cancel::CancelFlag;
use crate::downloader::extractors::{classify, ExtractorConfig, FailureKind, MediaBackend};
use crate::downloader::history::HistoryLog;
use crate::downloader::models::{DownloadRecord, DownloadSettings};
use crate::downloader::pacing::PacingPolicy;

/// Outcome of a channel run. Local accumulator state returned to the
/// caller, never process-wide counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Items that entered the scan loop
    pub processed: usize,
    pub downloaded: usize,
    pub failed: usize,
    /// Set when a fatal failure stopped the run early
    pub halted: Option<FailureKind>,
}

pub struct ChannelRun<'a> {
    backend: &'a dyn MediaBackend,
    settings: &'a DownloadSettings,
    config: ExtractorConfig,
    pacing: PacingPolicy,
    cancel: CancelFlag,
    history: HistoryLog,
    /// Pluggable failure classifier; the loop itself never inspects
    /// error text.
    classifier: fn(&str) -> FailureKind,
}

impl<'a> ChannelRun<'a> {
    pub fn new(backend: &'a dyn MediaBackend, settings: &'a DownloadSettings) -> Self {
        Self {
            backend,
            settings,
            config: ExtractorConfig::default(),
            pacing: PacingPolicy::default(),
            cancel: CancelFlag::new(),
            history: HistoryLog::default(),
            classifier: classify,
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_history(mut self, history: HistoryLog) -> Self {
        self.history = history;
        self
    }

    pub fn with_classifier(mut self, classifier: fn(&str) -> FailureKind) -> Self {
        self.classifier = classifier;
        self
    }

    /// Scan the channel and download every selected item as it is found.
    /// All failures are absorbed into the returned stats; nothing
    /// propagates past this call.
    pub async fn run(&self, channel_url: &str, shorts_only: bool) -> RunStats {
        let mut stats = RunStats::default();
        let kind_label = if shorts_only { "shorts" } else { "videos" };

        if let Err(e) = fs::create_dir_all(&self.settings.output_dir) {
            println!(
                "Cannot create output directory {}: {}",
                self.settings.output_dir.display(),
                e
            );
            return stats;
        }

        println!("\nSTREAMING DOWNLOAD MODE");
        println!("{}", "-".repeat(40));
        println!("Channel: {}", channel_url);
        println!("Output:  {}", self.settings.output_dir.display());
        println!("Type:    {}", kind_label);
        println!("Quality: {}", self.settings.quality.label());
        println!("{}", "-".repeat(40));
        println!("Scanning and downloading {} as found...", kind_label);
        println!("Press Ctrl+C to stop at any time");

        println!("Preparing to scan channel...");
        self.pacing.scan.wait().await;

        let entries = match self.backend.list_channel(channel_url, &self.config).await {
            Ok(entries) => entries,
            Err(e) => {
                let kind = (self.classifier)(&e.to_string());
                if kind.halts_run() {
                    self.report_fatal(kind);
                    stats.halted = Some(kind);
                } else {
                    println!("Failed to fetch channel info: {}", e);
                    println!("Try a different channel URL format:");
                    println!("  - https://youtube.com/@channelname");
                    println!("  - https://youtube.com/c/channelname");
                }
                return stats;
            }
        };

        if entries.is_empty() {
            println!("No videos found in channel");
            return stats;
        }

        let total = entries.len();
        println!("Found {} total videos in channel", total);
        println!("Checking each video and downloading {} immediately...\n", kind_label);

        let probe_config = self.config.probe();

        for (i, entry) in entries.iter().enumerate() {
            if self.cancel.is_cancelled() {
                println!("\nStopped by user at video {}/{}", i, total);
                break;
            }

            stats.processed += 1;
            self.pacing.probe.wait().await;

            let details = match self.backend.fetch_details(&entry.url, &probe_config).await {
                Ok(details) => details,
                Err(e) => {
                    let kind = (self.classifier)(&e.to_string());
                    if kind.halts_run() {
                        println!("\nBot detection triggered at video {}", i + 1);
                        println!("Stopping to avoid further detection");
                        self.report_fatal(kind);
                        stats.halted = Some(kind);
                        break;
                    }
                    // Per-item metadata failure: skip, keep scanning
                    log::warn!("skipping {}: {}", entry.url, e);
                    continue;
                }
            };

            if (i + 1) % 10 == 0 {
                println!(
                    "Progress: {}/{} checked | Downloaded: {} | Failed: {}",
                    i + 1,
                    total,
                    stats.downloaded,
                    stats.failed
                );
            }

            let selected = !shorts_only || details.is_short();
            if !selected {
                continue;
            }

            println!("\nFOUND {} #{}", kind_label.to_uppercase(), stats.downloaded + 1);
            println!("Title: {}", details.title);
            if details.duration_seconds > 0 {
                println!("Duration: {}s", details.duration_seconds);
            }
            println!("Downloading now...");

            self.pacing.fetch.wait().await;

            match self
                .backend
                .download(&entry.url, self.settings, &self.config)
                .await
            {
                Ok(()) => {
                    stats.downloaded += 1;
                    println!("Downloaded successfully!");
                    let record = DownloadRecord::new(&entry.url, &details);
                    if let Err(e) = self.history.append(record) {
                        log::warn!("could not update download history: {}", e);
                    }
                }
                Err(e) => {
                    stats.failed += 1;
                    let kind = (self.classifier)(&e.to_string());
                    if kind.halts_run() {
                        println!("Bot detection triggered during download!");
                        println!("Stopping to avoid further detection");
                        self.report_fatal(kind);
                        stats.halted = Some(kind);
                        break;
                    }
                    println!("Download failed: {}", e);
                }
            }
        }

        println!("\nSTREAMING DOWNLOAD COMPLETE");
        println!("{}", "=".repeat(50));
        println!("Videos processed: {}/{}", stats.processed, total);
        println!("Downloaded: {}", stats.downloaded);
        println!("Failed: {}", stats.failed);
        let location = self
            .settings
            .output_dir
            .canonicalize()
            .unwrap_or_else(|_| self.settings.output_dir.clone());
        println!("Location: {}", location.display());
        println!("Download log: {}", self.history.path().display());
        println!("{}", "=".repeat(50));

        stats
    }

    fn report_fatal(&self, kind: FailureKind) {
        println!("{}!", kind.description());
        if let Some(remediation) = kind.remediation() {
            println!("{}", remediation);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downloader::extractors::scripted::{entry_url, video, ScriptedBackend};
    use tempfile::tempdir;

    const CHANNEL: &str = "https://youtube.com/@somechannel";

    struct Fixture {
        _dir: tempfile::TempDir,
        settings: DownloadSettings,
        history: HistoryLog,
    }

    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let settings = DownloadSettings {
            output_dir: dir.path().join("downloads"),
            ..Default::default()
        };
        let history = HistoryLog::new(dir.path().join("history.json"));
        Fixture {
            _dir: dir,
            settings,
            history,
        }
    }

    fn run_for<'a>(backend: &'a ScriptedBackend, fx: &'a Fixture) -> ChannelRun<'a> {
        ChannelRun::new(backend, &fx.settings)
            .with_pacing(PacingPolicy::disabled())
            .with_history(fx.history.clone())
    }

    #[tokio::test]
    async fn test_shorts_filter_selects_only_shorts() {
        let backend = ScriptedBackend::with_videos(vec![
            video("a", 0),
            video("b", 30),
            video("c", 60),
            video("d", 61),
            video("e", 3600),
        ]);
        let fx = fixture();

        let stats = run_for(&backend, &fx).run(CHANNEL, true).await;

        assert_eq!(stats.processed, 5);
        assert_eq!(stats.downloaded, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.halted, None);
        assert_eq!(backend.download_call_count(), 2);
        let downloaded = backend.download_calls.lock().unwrap().clone();
        assert_eq!(downloaded, [entry_url("b"), entry_url("c")]);
    }

    #[tokio::test]
    async fn test_all_videos_mode_selects_everything() {
        let backend =
            ScriptedBackend::with_videos(vec![video("a", 0), video("b", 30), video("c", 7200)]);
        let fx = fixture();

        let stats = run_for(&backend, &fx).run(CHANNEL, false).await;

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.downloaded, 3);
        assert_eq!(backend.download_call_count(), 3);
    }

    #[tokio::test]
    async fn test_bot_error_during_metadata_halts_run() {
        let backend = ScriptedBackend::with_videos(vec![
            video("a", 30),
            video("b", 30),
            video("c", 30),
            video("d", 30),
            video("e", 30),
        ])
        .fail_details("c", "ERROR: Sign in to confirm you're not a bot");
        let fx = fixture();

        let stats = run_for(&backend, &fx).run(CHANNEL, true).await;

        // Items 1-2 complete, 3 trips the wall, 4-5 are never attempted
        assert_eq!(stats.processed, 3);
        assert_eq!(stats.downloaded, 2);
        assert_eq!(stats.halted, Some(FailureKind::BotDetection));
        assert_eq!(backend.detail_call_count(), 3);
        assert_eq!(backend.download_call_count(), 2);
    }

    #[tokio::test]
    async fn test_bot_error_during_download_halts_and_counts_failure() {
        let backend =
            ScriptedBackend::with_videos(vec![video("a", 30), video("b", 30), video("c", 30)])
                .fail_download("b", "Sign in to continue");
        let fx = fixture();

        let stats = run_for(&backend, &fx).run(CHANNEL, true).await;

        assert_eq!(stats.processed, 2);
        assert_eq!(stats.downloaded, 1);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.halted, Some(FailureKind::BotDetection));
        assert_eq!(backend.detail_call_count(), 2);
    }

    #[tokio::test]
    async fn test_ordinary_download_failure_continues() {
        let backend =
            ScriptedBackend::with_videos(vec![video("a", 30), video("b", 30), video("c", 30)])
                .fail_download("b", "ERROR: HTTP Error 404: Not Found");
        let fx = fixture();

        let stats = run_for(&backend, &fx).run(CHANNEL, true).await;

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.downloaded, 2);
        assert_eq!(stats.failed, 1);
        assert_eq!(stats.halted, None);
    }

    #[tokio::test]
    async fn test_metadata_failure_skips_item_without_counting() {
        let backend =
            ScriptedBackend::with_videos(vec![video("a", 30), video("b", 30), video("c", 30)])
                .fail_details("b", "ERROR: Video unavailable");
        let fx = fixture();

        let stats = run_for(&backend, &fx).run(CHANNEL, true).await;

        assert_eq!(stats.processed, 3);
        assert_eq!(stats.downloaded, 2);
        assert_eq!(stats.failed, 0);
        assert_eq!(stats.halted, None);
    }

    #[tokio::test]
    async fn test_cancellation_stops_at_loop_boundary() {
        let cancel = CancelFlag::new();
        let backend = ScriptedBackend::with_videos(vec![
            video("a", 30),
            video("b", 30),
            video("c", 30),
            video("d", 30),
            video("e", 30),
        ])
        .cancel_after_details(2, cancel.clone());
        let fx = fixture();

        let stats = run_for(&backend, &fx)
            .with_cancel(cancel)
            .run(CHANNEL, true)
            .await;

        // The flag trips during item 2's probe; item 2 still finishes,
        // item 3 is never started
        assert_eq!(stats.processed, 2);
        assert!(stats.downloaded + stats.failed <= stats.processed);
        assert_eq!(stats.halted, None);
        assert_eq!(backend.detail_call_count(), 2);
    }

    #[tokio::test]
    async fn test_history_records_every_success_in_order() {
        let backend =
            ScriptedBackend::with_videos(vec![video("a", 10), video("b", 90), video("c", 20)]);
        let fx = fixture();

        let stats = run_for(&backend, &fx).run(CHANNEL, true).await;
        assert_eq!(stats.downloaded, 2);

        let records = fx.history.read().unwrap();
        assert_eq!(records.len(), 2);
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "c"]);
        assert!(records.iter().all(|r| r.downloaded));
    }

    #[tokio::test]
    async fn test_history_accumulates_across_runs() {
        let fx = fixture();

        let first = ScriptedBackend::with_videos(vec![video("a", 10)]);
        run_for(&first, &fx).run(CHANNEL, true).await;

        let second = ScriptedBackend::with_videos(vec![video("b", 10)]);
        run_for(&second, &fx).run(CHANNEL, true).await;

        let records = fx.history.read().unwrap();
        let ids: Vec<_> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn test_custom_classifier_is_used() {
        fn everything_is_fatal(_error: &str) -> FailureKind {
            FailureKind::BotDetection
        }

        let backend =
            ScriptedBackend::with_videos(vec![video("a", 30), video("b", 30)])
                .fail_download("a", "ERROR: HTTP Error 404: Not Found");
        let fx = fixture();

        let stats = run_for(&backend, &fx)
            .with_classifier(everything_is_fatal)
            .run(CHANNEL, true)
            .await;

        assert_eq!(stats.halted, Some(FailureKind::BotDetection));
        assert_eq!(stats.processed, 1);
    }
}
