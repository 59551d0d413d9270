// Link-file batch downloader
//
// Reads newline-delimited URLs and downloads each one as-is: no metadata
// pre-check, no duration filter. Shares the bot-detection halt rule and
// cancellation behavior with the channel pipeline.

use std::fs;
use std::path::Path;

use crate::downloader::cancel::CancelFlag;
use crate::downloader::extractors::{classify, ExtractorConfig, FailureKind, MediaBackend};
use crate::downloader::models::DownloadSettings;
use crate::downloader::pacing::Pacing;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub downloaded: usize,
    pub failed: usize,
    pub halted: Option<FailureKind>,
}

/// Usable links from a link-file: blank lines and `#` comments dropped.
pub fn parse_links(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

pub struct BatchRun<'a> {
    backend: &'a dyn MediaBackend,
    settings: &'a DownloadSettings,
    config: ExtractorConfig,
    pacing: Pacing,
    cancel: CancelFlag,
    classifier: fn(&str) -> FailureKind,
}

impl<'a> BatchRun<'a> {
    pub fn new(backend: &'a dyn MediaBackend, settings: &'a DownloadSettings) -> Self {
        Self {
            backend,
            settings,
            config: ExtractorConfig::default(),
            pacing: Pacing::new(1000, 2000),
            cancel: CancelFlag::new(),
            classifier: classify,
        }
    }

    pub fn with_config(mut self, config: ExtractorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    /// Download every link in the file. Fails fast - before any download
    /// attempt - when the file is missing or holds no usable links.
    pub async fn run(&self, file_path: &Path) -> BatchStats {
        let mut stats = BatchStats::default();

        let content = match fs::read_to_string(file_path) {
            Ok(content) => content,
            Err(_) => {
                println!("File not found: {}", file_path.display());
                return stats;
            }
        };

        let links = parse_links(&content);
        if links.is_empty() {
            println!("No valid links found in file");
            return stats;
        }

        if let Err(e) = fs::create_dir_all(&self.settings.output_dir) {
            println!(
                "Cannot create output directory {}: {}",
                self.settings.output_dir.display(),
                e
            );
            return stats;
        }

        println!("\nDOWNLOAD FROM TEXT FILE");
        println!("{}", "-".repeat(40));
        println!("File:    {}", file_path.display());
        println!("Links:   {}", links.len());
        println!("Output:  {}", self.settings.output_dir.display());
        println!("Quality: {}", self.settings.quality.label());
        println!("{}", "-".repeat(40));
        println!("Starting downloads...");
        println!("Press Ctrl+C to stop at any time");

        for (i, link) in links.iter().enumerate() {
            if self.cancel.is_cancelled() {
                println!("\nStopped by user at link {}/{}", i, links.len());
                break;
            }

            println!("\n[{}/{}] Downloading: {}", i + 1, links.len(), link);
            self.pacing.wait().await;

            match self.backend.download(link, self.settings, &self.config).await {
                Ok(()) => {
                    stats.downloaded += 1;
                    println!("Downloaded successfully!");
                }
                Err(e) => {
                    stats.failed += 1;
                    let kind = (self.classifier)(&e.to_string());
                    if kind.halts_run() {
                        println!("{}!", kind.description());
                        println!("Stopping to avoid further detection");
                        stats.halted = Some(kind);
                        break;
                    }
                    println!("Download failed: {}", e);
                }
            }
        }

        println!("\nDOWNLOAD COMPLETE");
        println!("{}", "=".repeat(50));
        println!("Total links: {}", links.len());
        println!("Downloaded: {}", stats.downloaded);
        println!("Failed: {}", stats.failed);
        println!("{}", "=".repeat(50));

        stats
    }
}
