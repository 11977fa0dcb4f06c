use crate::errors::GrabError;
use crate::DownloadRule;
use std::path::PathBuf;
use url::Url;

const BASE_URL: &str = "https://www.flickr.com";
const DEFAULT_DOWNLOAD_FOLDER: &str = "images";

/// Which of a user's gallery listings to crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// The user's complete chronological gallery.
    Photostream,
    /// The user's curated sub-collections.
    Set,
    /// Photos the user marked as favorite, not necessarily their own.
    Favorites,
}

impl View {
    fn path(&self, username: &str) -> String {
        match self {
            View::Photostream => format!("photos/{username}"),
            View::Set => format!("photos/{username}/sets"),
            View::Favorites => format!("photos/{username}/favorites"),
        }
    }
}

/// One gallery run's configuration. Pipeline state (page count, collected
/// urls, completion counters) lives with the stage that owns it.
#[derive(Debug)]
pub struct Session {
    /// Fully qualified url of the gallery view being crawled.
    pub gallery_url: Url,
    pub view: View,
    pub download_folder: PathBuf,
    pub rule: DownloadRule,
}

impl Session {
    pub fn new(
        username: &str,
        view: View,
        download_folder: Option<PathBuf>,
        rule: DownloadRule,
    ) -> Result<Session, GrabError> {
        Session::with_base(BASE_URL, username, view, download_folder, rule)
    }

    /// Builds the session against a custom base address. `Session::new`
    /// points at the public site; tests point this at a local server.
    pub fn with_base(
        base: &str,
        username: &str,
        view: View,
        download_folder: Option<PathBuf>,
        rule: DownloadRule,
    ) -> Result<Session, GrabError> {
        if username.trim().is_empty() {
            return Err(GrabError::EmptyUsername);
        }
        let address = format!("{}/{}", base.trim_end_matches('/'), view.path(username));
        let gallery_url = match Url::parse(&address) {
            Ok(u) => u,
            Err(_) => return Err(GrabError::InvalidUrl(address)),
        };
        Ok(Session {
            gallery_url,
            view,
            download_folder: download_folder
                .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_FOLDER)),
            rule,
        })
    }

    /// Url of the K-th listing page, 1-indexed. Gallery urls never end with
    /// a slash, so the page segment is appended rather than joined.
    pub(crate) fn page_url(&self, page_number: u32) -> Url {
        Url::parse(&format!("{}/page{}", self.gallery_url, page_number)).unwrap()
    }
}
