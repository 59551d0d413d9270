mod downloader;
mod ui;

use std::path::Path;

use downloader::{tools, BackendOrchestrator, BatchRun, CancelFlag, ChannelRun, HistoryLog};
use ui::MenuAction;

#[tokio::main]
async fn main() {
    env_logger::init();

    if !tools::ensure_available() {
        return;
    }

    let backend = BackendOrchestrator::new();
    let history = HistoryLog::default();
    let cancel = CancelFlag::new();
    cancel.listen();

    loop {
        ui::show_banner();
        ui::show_main_menu();

        match ui::read_choice() {
            action @ (MenuAction::DownloadShorts | MenuAction::DownloadAll) => {
                let channel_url = ui::prompt_channel_url();
                let settings = ui::prompt_settings();
                let config = ui::prompt_network();
                let shorts_only = action == MenuAction::DownloadShorts;

                cancel.reset();
                let stats = ChannelRun::new(&backend, &settings)
                    .with_config(config)
                    .with_cancel(cancel.clone())
                    .with_history(history.clone())
                    .run(&channel_url, shorts_only)
                    .await;
                log::info!(
                    "channel run finished: {} processed, {} downloaded, {} failed",
                    stats.processed,
                    stats.downloaded,
                    stats.failed
                );
                if let Some(kind) = stats.halted {
                    log::warn!("run halted early: {}", kind.description());
                }
                ui::pause();
            }

            MenuAction::DownloadFromFile => {
                if let Some(path) = ui::prompt_link_file() {
                    let settings = ui::prompt_settings();
                    let config = ui::prompt_network();
                    cancel.reset();
                    let stats = BatchRun::new(&backend, &settings)
                        .with_config(config)
                        .with_cancel(cancel.clone())
                        .run(&path)
                        .await;
                    log::info!(
                        "batch run finished: {} downloaded, {} failed",
                        stats.downloaded,
                        stats.failed
                    );
                    if let Some(kind) = stats.halted {
                        log::warn!("run halted early: {}", kind.description());
                    }
                    ui::pause();
                }
            }

            MenuAction::ViewDownloads => {
                ui::view_previous_downloads(Path::new(ui::DEFAULT_OUTPUT_DIR));
                ui::pause();
            }

            MenuAction::ShowSavedList => {
                ui::show_saved_list(&history);
                ui::pause();
            }

            MenuAction::Settings => {
                ui::show_settings().await;
                ui::pause();
            }

            MenuAction::Exit => {
                println!("\nThank you for using YouTube Video Downloader!");
                break;
            }
        }
    }
}
