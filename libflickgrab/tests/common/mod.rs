use libflickgrab::Event;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Captures every event a run emits, in emission order.
#[derive(Clone, Default)]
pub struct EventRecorder {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observer(&self) -> impl Fn(&Event) + Send + Sync + 'static {
        let events = self.events.clone();
        move |event: &Event| events.lock().unwrap().push(event.clone())
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|event| predicate(event)).count()
    }
}

/// Markup of a gallery page carrying the pagination widget.
pub fn gallery_page(page_count: u32) -> String {
    format!(
        r#"<html><body><div class="Pages" data-page-count="{page_count}"></div></body></html>"#
    )
}

/// Markup of a listing page with one thumbnail per raw reference.
pub fn listing_page(raw_refs: &[String]) -> String {
    let thumbnails: String = raw_refs
        .iter()
        .map(|raw_ref| format!(r#"<img class="pc_img" data-defer-src="{raw_ref}"/>"#))
        .collect();
    format!(
        r#"<html><body><div id="photo-display-container">{thumbnails}</div></body></html>"#
    )
}

pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves image bytes and asserts the route is hit exactly once over the
/// server's lifetime.
pub async fn mount_image(server: &MockServer, route: &str, bytes: &[u8]) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
        .expect(1)
        .mount(server)
        .await;
}

pub async fn mount_error(server: &MockServer, route: &str, status_code: u16) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status_code))
        .mount(server)
        .await;
}
