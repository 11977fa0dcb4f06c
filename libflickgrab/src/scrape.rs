use scraper::{Html, Selector};

const PAGINATION_SELECTOR: &str = ".Pages";
const PAGE_COUNT_ATTR: &str = "data-page-count";
const IMAGE_SELECTOR: &str = "div#photo-display-container img.pc_img";
const IMAGE_SRC_ATTR: &str = "data-defer-src";

/// Reads the total listing page count off the pagination widget of a
/// gallery page. The first matching element that carries the attribute wins.
pub(crate) fn page_count(html_string: &str) -> Option<u32> {
    let html_document = Html::parse_document(html_string);
    let pagination_selector = Selector::parse(PAGINATION_SELECTOR).unwrap();
    html_document
        .select(&pagination_selector)
        .find_map(|element| element.value().attr(PAGE_COUNT_ATTR))
        .and_then(|value| value.parse::<u32>().ok())
}

/// Deferred image sources of every photo thumbnail on a listing page,
/// in document order.
pub(crate) fn image_refs(html_string: &str) -> Vec<String> {
    let html_document = Html::parse_document(html_string);
    let image_selector = Selector::parse(IMAGE_SELECTOR).unwrap();
    html_document
        .select(&image_selector)
        .filter_map(|element| element.value().attr(IMAGE_SRC_ATTR))
        .map(|src| src.to_string())
        .collect()
}

/// Swaps a thumbnail reference's `.jpg` suffix for the large-size `_b.jpg`
/// one. Applied exactly once per raw reference; anything else passes through
/// untouched.
pub(crate) fn full_size_url(raw_ref: &str) -> String {
    match raw_ref.strip_suffix(".jpg") {
        Some(stem) => format!("{stem}_b.jpg"),
        None => raw_ref.to_string(),
    }
}
