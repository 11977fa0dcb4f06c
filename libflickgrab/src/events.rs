use crate::errors::GrabError;
use std::fmt::Formatter;

/// Pipeline stage an error is reported from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    EnsureDir,
    PageCount,
    CollectUrls,
    Download,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let str = match self {
            Stage::EnsureDir => "ensure_dir",
            Stage::PageCount => "get_page_count",
            Stage::CollectUrls => "get_image_urls",
            Stage::Download => "download_images",
        };
        write!(f, "{str}")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// The gallery's total listing page count has been read.
    PageCountLoaded,
    /// Every listing page has reported and the deduplicated url list is final.
    ImageUrlsLoaded,
    /// One image finished streaming to disk. Payload is its url.
    DownloadFinished(String),
    /// The downloaded counter reached the deduplicated list's length.
    AllDownloadsFinished,
    Error { stage: Stage, error: GrabError },
}

type Observer = Box<dyn Fn(&Event) + Send + Sync>;

/// Pub/sub channel shared by the pipeline stages. Emitting invokes every
/// registered observer synchronously, in registration order. Nothing is
/// persisted or replayed, and an observer that panics is not caught.
#[derive(Default)]
pub struct EventBus {
    observers: Vec<Observer>,
}

impl EventBus {
    pub fn new() -> Self {
        EventBus {
            observers: Vec::new(),
        }
    }

    /// Registration only happens before a run starts, so it takes the bus
    /// exclusively; emission is shared.
    pub fn register<F>(&mut self, observer: F)
    where
        F: Fn(&Event) + Send + Sync + 'static,
    {
        self.observers.push(Box::new(observer));
    }

    pub fn emit(&self, event: Event) {
        tracing::debug!("Event::{:?}", event);
        for observer in &self.observers {
            observer(&event);
        }
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EventBus({} observers)", self.observers.len())
    }
}
