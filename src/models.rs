use url::Url;

/// Star rating as encoded in the `star-rating <Label>` class list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RatingLabel {
    One,
    Two,
    Three,
    Four,
    Five,
}

impl RatingLabel {
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim() {
            "One" => Some(Self::One),
            "Two" => Some(Self::Two),
            "Three" => Some(Self::Three),
            "Four" => Some(Self::Four),
            "Five" => Some(Self::Five),
            _ => None,
        }
    }

    pub fn value(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
            Self::Five => 5,
        }
    }
}

// ── Crawl output ──

#[derive(Debug, Clone, PartialEq)]
pub struct ListingRecord {
    pub title: String,
    pub price_raw: String,
    pub availability: String,
    pub rating_label: Option<String>,
    pub detail_url: Option<Url>,
}

pub const UNKNOWN_PRODUCT_TYPE: &str = "Unknown";

#[derive(Debug, Clone, PartialEq)]
pub struct DetailFields {
    pub description: String,
    pub upc: Option<String>,
    pub number_of_reviews: Option<String>,
    pub product_type: String,
    pub tax_raw: Option<String>,
    pub category: Option<String>,
}

impl Default for DetailFields {
    fn default() -> Self {
        DetailFields {
            description: String::new(),
            upc: None,
            number_of_reviews: None,
            product_type: UNKNOWN_PRODUCT_TYPE.to_string(),
            tax_raw: None,
            category: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MergedRecord {
    pub listing: ListingRecord,
    pub detail: DetailFields,
}

impl MergedRecord {
    pub fn merge(listing: ListingRecord, detail: Option<DetailFields>) -> Self {
        MergedRecord {
            listing,
            detail: detail.unwrap_or_default(),
        }
    }
}

// ── Cleaned output ──

pub const NO_DESCRIPTION: &str = "No description available";

#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    pub title: String,
    pub price: Option<f64>,
    pub availability: String,
    pub rating: Option<u8>,
    pub url: Option<String>,
    pub upc: Option<String>,
    pub number_of_reviews: Option<i64>,
    pub product_type: String,
    pub tax: Option<f64>,
    pub category: Option<String>,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rating_labels_map_to_one_through_five() {
        let labels = ["One", "Two", "Three", "Four", "Five"];
        let values: Vec<u8> = labels
            .iter()
            .map(|l| RatingLabel::from_label(l).unwrap().value())
            .collect();
        assert_eq!(values, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn unknown_rating_label_is_none() {
        assert_eq!(RatingLabel::from_label("Zero"), None);
        assert_eq!(RatingLabel::from_label("five"), None);
        assert_eq!(RatingLabel::from_label(""), None);
    }

    #[test]
    fn merge_without_detail_uses_defaults() {
        let listing = ListingRecord {
            title: "A Light in the Attic".into(),
            price_raw: "£51.77".into(),
            availability: "In stock".into(),
            rating_label: Some("Three".into()),
            detail_url: None,
        };
        let merged = MergedRecord::merge(listing.clone(), None);
        assert_eq!(merged.listing, listing);
        assert_eq!(merged.detail.product_type, "Unknown");
        assert!(merged.detail.upc.is_none());
        assert!(merged.detail.number_of_reviews.is_none());
        assert!(merged.detail.tax_raw.is_none());
        assert_eq!(merged.detail.description, "");
    }
}
