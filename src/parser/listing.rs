use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use super::{normalized_text, resolve};
use crate::models::ListingRecord;

static ITEM: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article.product_pod").unwrap());
static HEADING_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("h3 a").unwrap());
static PRICE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.price_color").unwrap());
static AVAILABILITY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p.instock.availability").unwrap());
static RATING: LazyLock<Selector> = LazyLock::new(|| Selector::parse("p.star-rating").unwrap());
static NEXT_LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("li.next a").unwrap());

const RATING_CLASS: &str = "star-rating";

/// Every catalog item on a listing page, in document order.
pub fn extract_items(doc: &Html, page_url: &Url) -> Vec<ListingRecord> {
    doc.select(&ITEM)
        .map(|item| extract_item(item, page_url))
        .collect()
}

pub fn extract_item(item: ElementRef, page_url: &Url) -> ListingRecord {
    let link = item.select(&HEADING_LINK).next();

    let title = link
        .and_then(|a| a.value().attr("title"))
        .unwrap_or_default()
        .to_string();

    // Currency glyphs stay; the cleaner strips them.
    let price_raw = item
        .select(&PRICE)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let availability = item
        .select(&AVAILABILITY)
        .next()
        .map(normalized_text)
        .unwrap_or_default();

    let rating_label = item.select(&RATING).next().and_then(|p| {
        p.value()
            .classes()
            .find(|c| *c != RATING_CLASS)
            .map(str::to_string)
    });

    let detail_url = link
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve(page_url, href));

    ListingRecord {
        title,
        price_raw,
        availability,
        rating_label,
        detail_url,
    }
}

/// The absolute URL of the following listing page, or `None` on the last page.
pub fn next_page_url(doc: &Html, page_url: &Url) -> Option<Url> {
    doc.select(&NEXT_LINK)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| resolve(page_url, href))
}
