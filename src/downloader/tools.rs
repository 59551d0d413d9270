// yt-dlp availability probing and bootstrap installation

use std::process::Command;

use crate::downloader::extractors::{self, CliBackend};

#[derive(Debug, Clone)]
pub struct ToolStatus {
    /// `python3 -m yt_dlp` usable
    pub python_module: bool,
    /// Path of the native binary, when found
    pub cli_binary: Option<String>,
    pub cli_version: Option<String>,
}

impl ToolStatus {
    pub fn any_available(&self) -> bool {
        self.python_module || self.cli_binary.is_some()
    }
}

pub fn probe() -> ToolStatus {
    let cli_binary = extractors::locate_binary();
    let cli_version = cli_binary
        .is_some()
        .then(|| CliBackend::new().version())
        .flatten();

    ToolStatus {
        python_module: extractors::has_module(),
        cli_binary,
        cli_version,
    }
}

/// Make sure some yt-dlp backend exists, installing the Python module with
/// pip when nothing is found. Returns false when no backend could be made
/// available; the caller should quit with the printed guidance.
pub fn ensure_available() -> bool {
    let status = probe();
    if status.any_available() {
        if let Some(version) = &status.cli_version {
            log::info!("yt-dlp binary {} found", version);
        }
        if status.python_module {
            log::info!("python yt_dlp module found");
        }
        return true;
    }

    println!("yt-dlp not found. Installing via pip...");
    match Command::new("pip3")
        .args(["install", "--user", "-U", "yt-dlp"])
        .status()
    {
        Ok(exit) if exit.success() => {}
        Ok(_) | Err(_) => {
            println!("Failed to install yt-dlp.");
            println!("Install it manually and run again:");
            println!("  pip3 install yt-dlp");
            println!("  (or) brew install yt-dlp");
            return false;
        }
    }

    let status = probe();
    if !status.any_available() {
        println!("yt-dlp still not usable after install.");
        println!("Check that pip's bin directory is on your PATH.");
        return false;
    }

    true
}
