pub mod detail;
pub mod listing;

use scraper::ElementRef;
use tracing::warn;
use url::Url;

/// Whitespace-collapsed text content of an element.
pub(crate) fn normalized_text(el: ElementRef) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve an href the way a browser would, relative to the page it came from.
pub(crate) fn resolve(base: &Url, href: &str) -> Option<Url> {
    match base.join(href.trim()) {
        Ok(url) => Some(url),
        Err(e) => {
            warn!("Could not resolve {:?} against {}: {}", href, base, e);
            None
        }
    }
}
