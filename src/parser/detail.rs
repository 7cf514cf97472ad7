use std::collections::HashMap;
use std::sync::LazyLock;

use scraper::{Html, Selector};
use tracing::error;
use url::Url;

use crate::error::ScrapeError;
use crate::models::{DetailFields, UNKNOWN_PRODUCT_TYPE};

static ROOT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("article.product_page").unwrap());
static DESCRIPTION: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#product_description + p").unwrap());
static INFO_TABLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("table.table").unwrap());
static ROW: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static HEADER_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("th").unwrap());
static DATA_CELL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static BREADCRUMB_LINK: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("ul.breadcrumb li a").unwrap());

const UPC: &str = "UPC";
const NUMBER_OF_REVIEWS: &str = "Number of reviews";
const PRODUCT_TYPE: &str = "Product Type";
const TAX: &str = "Tax";

/// Pull the extended attributes off a product page.
///
/// Fails only when the `article.product_page` container is absent. A missing
/// description or attributes table just leaves those fields at their defaults.
pub fn extract(doc: &Html, url: &Url) -> Result<DetailFields, ScrapeError> {
    let root = doc
        .select(&ROOT)
        .next()
        .ok_or_else(|| ScrapeError::MissingStructure {
            url: url.to_string(),
            what: "article.product_page",
        })?;

    let description = root
        .select(&DESCRIPTION)
        .next()
        .map(|p| p.text().collect::<String>().trim().to_string())
        .unwrap_or_default();

    let mut info: HashMap<String, String> = HashMap::new();
    match root.select(&INFO_TABLE).next() {
        Some(table) => {
            for row in table.select(&ROW) {
                let key = row.select(&HEADER_CELL).next();
                let value = row.select(&DATA_CELL).next();
                if let (Some(k), Some(v)) = (key, value) {
                    info.insert(
                        k.text().collect::<String>().trim().to_string(),
                        v.text().collect::<String>().trim().to_string(),
                    );
                }
            }
        }
        None => error!("No product details available on {}", url),
    }

    let category = doc
        .select(&BREADCRUMB_LINK)
        .last()
        .map(super::normalized_text)
        .filter(|c| !c.is_empty());

    Ok(DetailFields {
        description,
        upc: info.remove(UPC),
        number_of_reviews: info.remove(NUMBER_OF_REVIEWS),
        product_type: info
            .remove(PRODUCT_TYPE)
            .unwrap_or_else(|| UNKNOWN_PRODUCT_TYPE.to_string()),
        tax_raw: info.remove(TAX),
        category,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(fixture: &str) -> Result<DetailFields, ScrapeError> {
        let html = std::fs::read_to_string(format!("tests/fixtures/{}.html", fixture)).unwrap();
        let url =
            Url::parse("https://books.toscrape.com/catalogue/a-light-in-the-attic_1000/index.html")
                .unwrap();
        extract(&Html::parse_document(&html), &url)
    }

    #[test]
    fn full_detail_page() {
        let d = parse("detail_full").unwrap();
        assert!(d.description.starts_with("It's hard to imagine a world without"));
        assert_eq!(d.upc.as_deref(), Some("a897fe39b1053632"));
        assert_eq!(d.number_of_reviews.as_deref(), Some("0"));
        assert_eq!(d.product_type, "Books");
        assert_eq!(d.tax_raw.as_deref(), Some("£0.00"));
        assert_eq!(d.category.as_deref(), Some("Poetry"));
    }

    #[test]
    fn page_without_description_or_table_uses_defaults() {
        let d = parse("detail_bare").unwrap();
        assert_eq!(d.description, "");
        assert_eq!(d.upc, None);
        assert_eq!(d.number_of_reviews, None);
        assert_eq!(d.tax_raw, None);
        assert_eq!(d.product_type, "Unknown");
        assert_eq!(d.category.as_deref(), Some("Poetry"));
    }

    #[test]
    fn missing_root_container_is_missing_structure() {
        match parse("detail_missing_root") {
            Err(ScrapeError::MissingStructure { what, .. }) => {
                assert_eq!(what, "article.product_page")
            }
            other => panic!("expected MissingStructure, got {:?}", other),
        }
    }
}
