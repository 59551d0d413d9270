// Interactive console surface: banner, menu, prompts, listing views.
// All policy lives in the downloader module; this file only talks to the
// terminal.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::downloader::extractors::ExtractorConfig;
use crate::downloader::history::HistoryLog;
use crate::downloader::models::{format_upload_date, DownloadSettings, Quality};
use crate::downloader::utils;

pub const DEFAULT_OUTPUT_DIR: &str = "downloads";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    DownloadShorts,
    DownloadAll,
    DownloadFromFile,
    ViewDownloads,
    ShowSavedList,
    Settings,
    Exit,
}

fn read_line(prompt: &str) -> String {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    if io::stdin().read_line(&mut buf).is_err() {
        return String::new();
    }
    buf.trim().to_string()
}

pub fn show_banner() {
    println!("\n{}", "=".repeat(60));
    println!("YOUTUBE VIDEO DOWNLOADER");
    println!("{}", "=".repeat(60));
    println!("Download shorts or all videos from any YouTube channel");
    println!("{}\n", "=".repeat(60));
}

pub fn show_main_menu() {
    println!("MAIN MENU");
    println!("{}", "-".repeat(30));
    println!("1. Download shorts from channel");
    println!("2. Download all videos from channel");
    println!("3. Download from text file");
    println!("4. View previous downloads");
    println!("5. Load from saved list");
    println!("6. Settings");
    println!("7. Exit");
    println!("{}", "-".repeat(30));
}

pub fn read_choice() -> MenuAction {
    loop {
        match read_line("Enter your choice (1-7): ").as_str() {
            "1" => return MenuAction::DownloadShorts,
            "2" => return MenuAction::DownloadAll,
            "3" => return MenuAction::DownloadFromFile,
            "4" => return MenuAction::ViewDownloads,
            "5" => return MenuAction::ShowSavedList,
            "6" => return MenuAction::Settings,
            "7" => return MenuAction::Exit,
            _ => println!("Invalid choice. Please enter 1-7."),
        }
    }
}

pub fn prompt_channel_url() -> String {
    println!("\nCHANNEL INPUT");
    println!("{}", "-".repeat(30));
    println!("Enter the YouTube channel URL:");
    println!("Examples:");
    println!("  - https://youtube.com/@channelname");
    println!("  - https://youtube.com/c/channelname");
    println!("  - https://youtube.com/channel/UCxxxxxxxxx");
    println!("{}", "-".repeat(30));

    loop {
        let url = read_line("Channel URL: ");
        if url.is_empty() {
            println!("Please enter a URL");
            continue;
        }
        if !url.contains("youtube.com") && !url.contains("youtu.be") {
            println!("Invalid YouTube URL. Please try again.");
            continue;
        }
        return url;
    }
}

pub fn prompt_settings() -> DownloadSettings {
    println!("\nDOWNLOAD SETTINGS");
    println!("{}", "-".repeat(30));

    let dir_input = read_line(&format!("Output directory (default: {}): ", DEFAULT_OUTPUT_DIR));
    let output_dir = if dir_input.is_empty() {
        PathBuf::from(DEFAULT_OUTPUT_DIR)
    } else {
        PathBuf::from(dir_input)
    };

    println!("\nVideo quality options:");
    println!("1. {}", Quality::Best.label());
    println!("2. {}", Quality::Good.label());
    println!("3. {}", Quality::Standard.label());

    let quality = loop {
        match read_line("Choose quality (1-3, default: 1): ").as_str() {
            "" | "1" => break Quality::Best,
            "2" => break Quality::Good,
            "3" => break Quality::Standard,
            _ => println!("Invalid choice. Please enter 1-3."),
        }
    };

    let save_metadata = read_line("Save metadata sidecars? (y/N): ").eq_ignore_ascii_case("y");
    let save_thumbnails = read_line("Save thumbnails? (y/N): ").eq_ignore_ascii_case("y");

    DownloadSettings {
        output_dir,
        quality,
        save_metadata,
        save_thumbnails,
    }
}

/// Request policy for the coming run: optional browser cookies, plus any
/// local SOCKS5 proxy that can be auto-detected.
pub fn prompt_network() -> ExtractorConfig {
    let use_cookies =
        read_line("Use Chrome browser cookies for authentication? (y/N): ").eq_ignore_ascii_case("y");

    let proxy = utils::auto_detect_proxy();
    match &proxy {
        Some(proxy) => println!("Using detected proxy: {}", proxy),
        None => println!("No local proxy detected - using direct connection"),
    }

    ExtractorConfig::default()
        .with_cookies_from_browser(use_cookies)
        .with_proxy(proxy)
}

/// Prompt for a link file. Offers to create a commented example when the
/// path does not exist yet; returns None when the user backs out.
pub fn prompt_link_file() -> Option<PathBuf> {
    println!("\nTEXT FILE INPUT");
    println!("{}", "-".repeat(30));
    println!("Enter the path to your text file with video links");
    println!("Format: one URL per line; lines starting with # are ignored");
    println!("{}", "-".repeat(30));

    loop {
        let input = read_line("File path (or 'cancel' to go back): ");

        if input.eq_ignore_ascii_case("cancel") {
            return None;
        }
        if input.is_empty() {
            println!("Please enter a file path");
            continue;
        }

        let path = PathBuf::from(&input);
        if path.exists() {
            return Some(path);
        }

        println!("File not found: {}", path.display());
        if read_line("Create example file? (y/n): ").eq_ignore_ascii_case("y") {
            let template = "# Add your YouTube video links here, one per line\n\
                            # Lines starting with # are ignored\n\
                            # Example:\n\
                            # https://youtube.com/watch?v=xxxxx\n";
            match fs::write(&path, template) {
                Ok(()) => {
                    println!("Created example file: {}", path.display());
                    println!("Edit the file, add your links, then run again");
                    return None;
                }
                Err(e) => println!("Failed to create file: {}", e),
            }
        }
    }
}

pub fn view_previous_downloads(output_dir: &Path) {
    println!("\nPREVIOUS DOWNLOADS");
    println!("{}", "-".repeat(30));

    let entries = match fs::read_dir(output_dir) {
        Ok(entries) => entries,
        Err(_) => {
            println!("No downloads directory found.");
            return;
        }
    };

    let mut videos: Vec<(String, u64)> = entries
        .flatten()
        .filter_map(|entry| {
            let path = entry.path();
            let ext = path.extension()?.to_str()?.to_lowercase();
            if ext != "mp4" && ext != "webm" {
                return None;
            }
            let name = path.file_stem()?.to_string_lossy().to_string();
            let size = entry.metadata().ok()?.len();
            Some((name, size))
        })
        .collect();
    videos.sort();

    if videos.is_empty() {
        println!("No downloaded videos found.");
        return;
    }

    println!("Found {} downloaded videos:", videos.len());
    for (i, (name, size)) in videos.iter().take(10).enumerate() {
        let size_mb = *size as f64 / (1024.0 * 1024.0);
        println!("  {}. {} ({:.1} MB)", i + 1, name, size_mb);
    }
    if videos.len() > 10 {
        println!("  ... and {} more", videos.len() - 10);
    }
}

pub fn show_saved_list(history: &HistoryLog) {
    println!("\nLOAD FROM SAVED LIST");
    println!("{}", "-".repeat(30));

    let records = match history.read() {
        Ok(records) => records,
        Err(e) => {
            println!("Error loading saved list: {}", e);
            return;
        }
    };

    if records.is_empty() {
        println!("No saved video list found.");
        return;
    }

    println!("Found saved list with {} videos", records.len());
    for record in records.iter().take(5) {
        println!(
            "  - {} ({}s, uploaded {})",
            record.title,
            record.duration,
            format_upload_date(&record.upload_date)
        );
    }
    if records.len() > 5 {
        println!("  ... and {} more", records.len() - 5);
    }
}

pub async fn show_settings() {
    println!("\nSETTINGS");
    println!("{}", "-".repeat(30));
    println!("Settings are configured per download session.");

    println!("\nChecking network status...");
    let status = utils::get_network_status_info(None).await;
    println!("Mode:  {}", status.mode);
    match &status.proxy {
        Some(proxy) => println!("Proxy: {}", proxy),
        None => println!("Proxy: none detected"),
    }
    match &status.external_ip {
        Some(ip) => println!("External IP: {}", ip),
        None => println!("External IP: unavailable"),
    }
}

pub fn pause() {
    let _ = read_line("\nPress Enter to continue...");
}
