use crate::errors::GrabError;
use crate::events::{Event, EventBus, Stage};
use crate::DownloadRule;
use chrono::Utc;
use futures::future::join_all;
use reqwest::Client;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;
use tokio::time::sleep;
use url::Url;

#[derive(Debug)]
pub(crate) struct DownloadItem {
    pub link: Url,
    pub destination_dir: PathBuf,
}

/// Launches one download per image url, each a fixed interval later than the
/// one before it. Every timer is armed here at once, so transfers overlap as
/// soon as their offsets have elapsed. The aggregate event fires from
/// whichever task pushes the finished counter to the list length; whether a
/// failed item advances that counter is governed by the rule.
#[tracing::instrument(skip(client, image_urls, rule, bus))]
pub(crate) async fn download_images(
    client: &Client,
    image_urls: &[String],
    destination_dir: &Path,
    rule: &DownloadRule,
    bus: &EventBus,
) {
    let total = image_urls.len();
    let finished = AtomicUsize::new(0);
    let downloads = image_urls.iter().enumerate().map(|(index, image_url)| {
        let delay = launch_delay(rule, index);
        let finished = &finished;
        async move {
            sleep(delay).await;
            let outcome = match Url::parse(image_url) {
                Ok(link) => {
                    download_file(
                        client,
                        DownloadItem {
                            link,
                            destination_dir: destination_dir.to_path_buf(),
                        },
                    )
                    .await
                }
                Err(_) => Err(GrabError::InvalidUrl(image_url.to_string())),
            };
            match outcome {
                Ok(file_path) => {
                    tracing::debug!(
                        "Download completed for {}, file @ {}",
                        image_url,
                        file_path.to_string_lossy()
                    );
                    bus.emit(Event::DownloadFinished(image_url.clone()));
                    if finished.fetch_add(1, Ordering::SeqCst) + 1 == total {
                        bus.emit(Event::AllDownloadsFinished);
                    }
                }
                Err(e) => {
                    tracing::error!("Error downloading {}\nError : {}", image_url, e);
                    bus.emit(Event::Error {
                        stage: Stage::Download,
                        error: e,
                    });
                    if rule.count_failed_downloads
                        && finished.fetch_add(1, Ordering::SeqCst) + 1 == total
                    {
                        bus.emit(Event::AllDownloadsFinished);
                    }
                }
            }
        }
    });
    join_all(downloads).await;
}

/// Offset of the K-th download task, 0-indexed : the first task already
/// waits one full interval, the next one two, and so on.
fn launch_delay(rule: &DownloadRule, index: usize) -> std::time::Duration {
    rule.launch_interval * (index as u32 + 1)
}

/// Streams one remote file under the destination directory. The returned
/// path is where the bytes landed.
#[tracing::instrument(skip(client))]
async fn download_file(client: &Client, mut dld_item: DownloadItem) -> Result<PathBuf, GrabError> {
    let mut response = match client.get(dld_item.link.as_str()).send().await {
        Err(e) => {
            tracing::error!("Error downloading file from {}", dld_item.link);
            tracing::error!("{}", e);
            return Err(GrabError::NetworkError(e.to_string()));
        }
        Ok(r) => {
            if !r.status().is_success() {
                tracing::error!(
                    "Error status code received : {} |{}|",
                    r.status(),
                    dld_item.link
                );
                return Err(GrabError::ErrorStatusCode {
                    status_code: r.status().to_string(),
                    url: dld_item.link.to_string(),
                });
            }
            r
        }
    };

    let f_name = file_name(&dld_item.link);
    tracing::debug!("File name for {} is {}", dld_item.link, &f_name);
    dld_item.destination_dir.push(&f_name);

    let mut dest_file = match OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(dld_item.destination_dir.as_path())
        .await
    {
        Err(e) => {
            tracing::error!(
                "Error opening/creating file {}",
                dld_item.destination_dir.to_string_lossy()
            );
            tracing::error!("{} | {}", e, e.kind());
            return Err(GrabError::FileOperationError {
                file_name: dld_item.destination_dir.to_string_lossy().to_string(),
                message: format!("{} | {}", e, e.kind()),
            });
        }
        Ok(f) => f,
    };

    while let Some(chunks) = match response.chunk().await {
        Err(e) => {
            tracing::error!("Error downloading resource from {}", dld_item.link);
            tracing::error!("{}", e);
            return Err(GrabError::NetworkError(e.to_string()));
        }
        Ok(bytes) => bytes,
    } {
        if let Err(e) = dest_file.write_all(&chunks).await {
            tracing::error!(
                "Error writing to destination file {}",
                dld_item.destination_dir.to_string_lossy()
            );
            tracing::error!("{} | {}", e, e.kind());
            return Err(GrabError::FileOperationError {
                file_name: dld_item.destination_dir.to_string_lossy().to_string(),
                message: format!("{} | {}", e, e.kind()),
            });
        };
    }
    Ok(dld_item.destination_dir)
}

/// Local file name for an image url : its last path segment, or a
/// timestamped generic name when the path carries none.
fn file_name(link: &Url) -> String {
    let segment = link
        .path_segments()
        .and_then(|segments| segments.last())
        .unwrap_or("");
    if segment.is_empty() {
        tracing::warn!(
            "File name can't be determined, using generic name. {}",
            link
        );
        format!("file-{}.jpg", Utc::now().timestamp_millis())
    } else {
        segment.to_string()
    }
}
