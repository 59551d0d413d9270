// Downloader module - download policy over the yt-dlp backends

pub mod batch;
pub mod cancel;
pub mod errors;
pub mod extractors;
pub mod history;
pub mod models;
pub mod pacing;
pub mod pipeline;
pub mod tools;
pub mod utils;

pub use batch::{BatchRun, BatchStats};
pub use cancel::CancelFlag;
pub use errors::DownloadError;
pub use extractors::{BackendOrchestrator, ExtractorConfig, FailureKind, MediaBackend};
pub use history::HistoryLog;
pub use models::{ChannelEntry, DownloadRecord, DownloadSettings, Quality, VideoDetails};
pub use pipeline::{ChannelRun, RunStats};
