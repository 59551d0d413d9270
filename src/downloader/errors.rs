// Error types for extraction backends

use std::fmt;

#[derive(Debug, Clone)]
pub enum DownloadError {
    /// Network timeout while talking to YouTube
    NetworkTimeout,

    /// yt-dlp or python not found in system
    ToolNotFound(String),

    /// Failed to parse yt-dlp JSON output
    ParseError(String),

    /// Command execution failed (spawn, wait, pipe)
    ExecutionError(String),

    /// History file or link file I/O failed
    Storage(String),

    /// yt-dlp itself reported a failure; carries the raw stderr text so the
    /// failure classifier can inspect it
    Extractor(String),

    /// Unknown error with details
    Unknown(String),
}

impl fmt::Display for DownloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NetworkTimeout => write!(f, "Network timeout: YouTube is not responding"),
            Self::ToolNotFound(tool) => write!(f, "Tool not found: {}", tool),
            Self::ParseError(msg) => write!(f, "Parse error: {}", msg),
            Self::ExecutionError(msg) => write!(f, "Execution error: {}", msg),
            Self::Storage(msg) => write!(f, "Storage error: {}", msg),
            Self::Extractor(msg) => write!(f, "{}", msg),
            Self::Unknown(msg) => write!(f, "Unknown error: {}", msg),
        }
    }
}

impl std::error::Error for DownloadError {}

// Convert from raw subprocess stderr
impl From<String> for DownloadError {
    fn from(s: String) -> Self {
        if s.contains("not found") || s.contains("No such file") || s.contains("command not found")
        {
            return Self::ToolNotFound(s);
        }

        if s.contains("Timed out") {
            return Self::NetworkTimeout;
        }

        if s.contains("Invalid JSON") || s.contains("Expected JSON") {
            return Self::ParseError(s);
        }

        // Everything else stays verbatim for classification
        Self::Extractor(s)
    }
}
