use crate::errors::GrabError;
use crate::events::{Event, EventBus, Stage};
use crate::scrape;
use crate::session::Session;
use futures::future::join_all;
use reqwest::Client;
use std::collections::HashSet;
use tracing::instrument;
use url::Url;

/// Fetches the gallery page once and reads the total listing page count off
/// its pagination widget. The fan-out cannot be bounded without the count,
/// so any failure here ends the run.
#[instrument(skip(client, bus))]
pub(crate) async fn fetch_page_count(
    client: &Client,
    gallery_url: &Url,
    bus: &EventBus,
) -> Result<u32, GrabError> {
    let page_count = match fetch_page(client, gallery_url).await {
        Ok(body) => scrape::page_count(&body)
            .ok_or_else(|| GrabError::PageCountNotFound(gallery_url.to_string())),
        Err(e) => Err(e),
    };
    match page_count {
        Ok(page_count) => {
            tracing::debug!("Page count for {} is {}", gallery_url, page_count);
            bus.emit(Event::PageCountLoaded);
            Ok(page_count)
        }
        Err(e) => {
            tracing::error!("Failed to read page count from {}\nError : {}", gallery_url, e);
            bus.emit(Event::Error {
                stage: Stage::PageCount,
                error: e.clone(),
            });
            Err(e)
        }
    }
}

/// Fans one fetch out per listing page and waits until all of them have
/// settled. Dispatch order is ascending by page number; completion order is
/// whatever the network makes of it and nothing downstream depends on it.
/// A page that fails is reported and contributes zero references. The
/// returned list is deduplicated, first occurrence wins.
#[instrument(skip(client, session, bus))]
pub(crate) async fn collect_image_urls(
    client: &Client,
    session: &Session,
    page_count: u32,
    bus: &EventBus,
) -> Vec<String> {
    let page_fetches = (1..=page_count).map(|page_number| {
        let page_url = session.page_url(page_number);
        async move {
            match fetch_page(client, &page_url).await {
                Ok(body) => scrape::image_refs(&body)
                    .iter()
                    .map(|raw_ref| scrape::full_size_url(raw_ref))
                    .collect::<Vec<String>>(),
                Err(e) => {
                    tracing::error!("Failed to scrape {}\nError : {}", page_url, e);
                    bus.emit(Event::Error {
                        stage: Stage::CollectUrls,
                        error: e,
                    });
                    Vec::new()
                }
            }
        }
    });

    let mut seen = HashSet::new();
    let image_urls: Vec<String> = join_all(page_fetches)
        .await
        .into_iter()
        .flatten()
        .filter(|image_url| seen.insert(image_url.clone()))
        .collect();
    tracing::debug!("Collected {} distinct image urls", image_urls.len());
    bus.emit(Event::ImageUrlsLoaded);
    image_urls
}

async fn fetch_page(client: &Client, url: &Url) -> Result<String, GrabError> {
    let response = match client.get(url.as_str()).send().await {
        Err(e) => {
            tracing::error!("Error fetching page from {}", url);
            tracing::error!("{}", e);
            return Err(GrabError::NetworkError(e.to_string()));
        }
        Ok(r) => {
            if !r.status().is_success() {
                tracing::error!("Error status code received : {} |{}|", r.status(), url);
                return Err(GrabError::ErrorStatusCode {
                    status_code: r.status().to_string(),
                    url: url.to_string(),
                });
            }
            r
        }
    };
    match response.text().await {
        Ok(body) => Ok(body),
        Err(e) => Err(GrabError::NetworkError(e.to_string())),
    }
}
