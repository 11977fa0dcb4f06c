use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;
use tokio::fs;
use tracing::instrument;

mod download;
mod errors;
mod events;
mod pages;
mod scrape;
mod session;

pub use crate::errors::GrabError;
pub use crate::events::{Event, EventBus, Stage};
pub use crate::session::{Session, View};

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/108.0.0.0 Safari/537.36";

#[derive(Debug, Clone)]
pub struct DownloadRule {
    /// Delay step between download launches. Task K is launched K times this
    /// interval after scheduling, counting from 1.
    pub launch_interval: Duration,
    /// Count failed downloads toward the aggregate completion check. Off by
    /// default : a run with a failed item then never reports all downloads
    /// finished, which matches the historical behavior.
    pub count_failed_downloads: bool,
}

impl Default for DownloadRule {
    fn default() -> Self {
        DownloadRule {
            launch_interval: Duration::from_millis(500),
            count_failed_downloads: false,
        }
    }
}

/// Crawls every listing page of a user's gallery view and downloads each
/// distinct full-size image into `download_folder` (`./images` when not
/// given). Progress and failures are reported on `bus`; the returned error
/// covers only the failures that end the run before the fan-out starts.
#[instrument(skip(bus))]
pub async fn get_images(
    username: &str,
    view: View,
    download_folder: Option<PathBuf>,
    rule: DownloadRule,
    bus: &EventBus,
) -> Result<(), GrabError> {
    let session = Session::new(username, view, download_folder, rule)?;
    run_session(&session, bus).await
}

/// Drives the full pipeline for an already built session : page count, page
/// fan-out with its join, then the staggered downloads. Each stage only
/// starts once the previous one has fully settled.
#[instrument(skip(bus))]
pub async fn run_session(session: &Session, bus: &EventBus) -> Result<(), GrabError> {
    if let Err(e) = fs::create_dir_all(&session.download_folder).await {
        // Reported but not fatal. If the directory is truly unusable every
        // download will fail on its own and say so.
        tracing::error!("Failed to create destination directory\nError : {}", e);
        bus.emit(Event::Error {
            stage: Stage::EnsureDir,
            error: GrabError::ErrorCreatingDestinationDirectory(e.to_string()),
        });
    }

    let client = Client::builder().user_agent(USER_AGENT).build().unwrap();

    let page_count = pages::fetch_page_count(&client, &session.gallery_url, bus).await?;
    let image_urls = pages::collect_image_urls(&client, session, page_count, bus).await;
    download::download_images(
        &client,
        &image_urls,
        &session.download_folder,
        &session.rule,
        bus,
    )
    .await;
    Ok(())
}
