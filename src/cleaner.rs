use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

use crate::error::ScrapeError;
use crate::models::{CleanedRecord, MergedRecord, RatingLabel, NO_DESCRIPTION};

static NON_NUMERIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^\d.]").unwrap());

/// Advisory finding from validation. The record it refers to is kept as is.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    NonPositivePrice(f64),
    RatingOutOfRange(u8),
    MissingDescription,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub index: usize,
    pub title: String,
    pub kind: IssueKind,
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            IssueKind::NonPositivePrice(p) => {
                write!(f, "#{} {:?}: price {} is not positive", self.index, self.title, p)
            }
            IssueKind::RatingOutOfRange(r) => {
                write!(f, "#{} {:?}: rating {} outside 1..=5", self.index, self.title, r)
            }
            IssueKind::MissingDescription => {
                write!(f, "#{} {:?}: no description", self.index, self.title)
            }
        }
    }
}

pub struct CleanReport {
    pub records: Vec<CleanedRecord>,
    pub issues: Vec<Issue>,
}

/// Anything the cleaner accepts. Already-cleaned records pass through
/// unchanged so that cleaning is idempotent.
pub trait Cleanable {
    fn into_cleaned(self) -> CleanedRecord;
}

impl Cleanable for MergedRecord {
    fn into_cleaned(self) -> CleanedRecord {
        let MergedRecord { listing, detail } = self;
        CleanedRecord {
            price: amount("price", Some(listing.price_raw.as_str())),
            rating: listing
                .rating_label
                .as_deref()
                .and_then(RatingLabel::from_label)
                .map(RatingLabel::value),
            url: listing.detail_url.map(String::from),
            tax: amount("tax", detail.tax_raw.as_deref()),
            number_of_reviews: review_count(detail.number_of_reviews.as_deref()),
            title: listing.title,
            availability: listing.availability,
            upc: detail.upc,
            product_type: detail.product_type,
            category: detail.category,
            description: detail.description,
        }
    }
}

impl Cleanable for CleanedRecord {
    fn into_cleaned(self) -> CleanedRecord {
        self
    }
}

/// Normalise and validate the whole record set in one pass.
///
/// Never drops a record: out-of-range values are logged and kept, an empty
/// description is replaced by a placeholder.
pub fn clean<T, I>(records: I) -> CleanReport
where
    T: Cleanable,
    I: IntoIterator<Item = T>,
{
    let mut issues = Vec::new();
    let records = records
        .into_iter()
        .enumerate()
        .map(|(index, record)| {
            let mut record = record.into_cleaned();
            validate(index, &mut record, &mut issues);
            record
        })
        .collect();
    CleanReport { records, issues }
}

fn validate(index: usize, record: &mut CleanedRecord, issues: &mut Vec<Issue>) {
    let mut flag = |kind: IssueKind| {
        issues.push(Issue {
            index,
            title: record.title.clone(),
            kind,
        })
    };

    if let Some(price) = record.price.filter(|p| *p <= 0.0) {
        warn!("Invalid price for title - {}", record.title);
        flag(IssueKind::NonPositivePrice(price));
    }
    if let Some(rating) = record.rating.filter(|r| !(1..=5).contains(r)) {
        warn!("Invalid rating for title - {}", record.title);
        flag(IssueKind::RatingOutOfRange(rating));
    }
    if record.description.trim().is_empty() {
        warn!("No product description available for title - {}", record.title);
        flag(IssueKind::MissingDescription);
        record.description = NO_DESCRIPTION.to_string();
    }
}

/// Strip everything except digits and the decimal point, then parse.
pub fn parse_amount(field: &'static str, raw: &str) -> Result<f64, ScrapeError> {
    NON_NUMERIC
        .replace_all(raw, "")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| ScrapeError::Parse {
            field,
            raw: raw.to_string(),
        })
}

fn amount(field: &'static str, raw: Option<&str>) -> Option<f64> {
    let raw = raw.filter(|r| !r.trim().is_empty())?;
    parse_amount(field, raw)
        .map_err(|e| warn!("{}", e))
        .ok()
}

fn review_count(raw: Option<&str>) -> Option<i64> {
    let raw = raw.map(str::trim).filter(|r| !r.is_empty())?;
    raw.parse::<i64>()
        .map_err(|_| {
            warn!(
                "{}",
                ScrapeError::Parse {
                    field: "number_of_reviews",
                    raw: raw.to_string(),
                }
            )
        })
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DetailFields, ListingRecord};

    fn merged(price: &str, rating: Option<&str>, description: &str) -> MergedRecord {
        MergedRecord {
            listing: ListingRecord {
                title: "Sharp Objects".into(),
                price_raw: price.into(),
                availability: "In stock".into(),
                rating_label: rating.map(String::from),
                detail_url: None,
            },
            detail: DetailFields {
                description: description.into(),
                upc: Some("e00eb4fd7b871a48".into()),
                number_of_reviews: Some("0".into()),
                product_type: "Books".into(),
                tax_raw: Some("£0.00".into()),
                category: Some("Mystery".into()),
            },
        }
    }

    fn cleaned_one(record: MergedRecord) -> (CleanedRecord, Vec<Issue>) {
        let mut report = clean(vec![record]);
        (report.records.remove(0), report.issues)
    }

    #[test]
    fn strips_currency_from_price_and_tax() {
        let (r, issues) = cleaned_one(merged("£51.77", Some("Three"), "A thriller."));
        assert_eq!(r.price, Some(51.77));
        assert_eq!(r.tax, Some(0.0));
        assert_eq!(r.number_of_reviews, Some(0));
        assert!(issues.is_empty());
    }

    #[test]
    fn mis_decoded_currency_glyphs_are_stripped() {
        let (r, _) = cleaned_one(merged("Â£47.82", Some("Four"), "x"));
        assert_eq!(r.price, Some(47.82));
    }

    #[test]
    fn rating_labels_become_integers() {
        for (label, value) in [("One", 1), ("Two", 2), ("Three", 3), ("Four", 4), ("Five", 5)] {
            let (r, _) = cleaned_one(merged("£1.00", Some(label), "x"));
            assert_eq!(r.rating, Some(value));
        }
        let (r, _) = cleaned_one(merged("£1.00", Some("Six"), "x"));
        assert_eq!(r.rating, None);
        let (r, _) = cleaned_one(merged("£1.00", None, "x"));
        assert_eq!(r.rating, None);
    }

    #[test]
    fn unparseable_values_become_none() {
        let mut record = merged("free", Some("One"), "x");
        record.detail.tax_raw = Some("".into());
        record.detail.number_of_reviews = Some("many".into());
        let (r, _) = cleaned_one(record);
        assert_eq!(r.price, None);
        assert_eq!(r.tax, None);
        assert_eq!(r.number_of_reviews, None);
    }

    #[test]
    fn missing_description_gets_placeholder() {
        let (r, issues) = cleaned_one(merged("£10.00", Some("One"), "  "));
        assert_eq!(r.description, "No description available");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, IssueKind::MissingDescription);
    }

    #[test]
    fn validation_warnings_reach_the_log() {
        let (report, log) = crate::logging::capture(|| {
            clean(vec![merged("£0.00", Some("Two"), "")])
        });
        assert_eq!(report.issues.len(), 2);
        assert!(log.contains("WARN Invalid price for title - Sharp Objects"));
        assert!(log.contains("WARN No product description available for title - Sharp Objects"));
    }

    #[test]
    fn zero_price_is_flagged_but_kept() {
        let (r, issues) = cleaned_one(merged("£0.00", Some("One"), "x"));
        assert_eq!(r.price, Some(0.0));
        assert_eq!(issues[0].kind, IssueKind::NonPositivePrice(0.0));
    }

    #[test]
    fn negative_price_and_bad_rating_pass_through() {
        let (mut r, _) = cleaned_one(merged("£1.00", Some("One"), "x"));
        r.price = Some(-5.0);
        r.rating = Some(9);
        let report = clean(vec![r]);
        assert_eq!(report.records[0].price, Some(-5.0));
        assert_eq!(report.records[0].rating, Some(9));
        let kinds: Vec<&IssueKind> = report.issues.iter().map(|i| &i.kind).collect();
        assert_eq!(
            kinds,
            vec![&IssueKind::NonPositivePrice(-5.0), &IssueKind::RatingOutOfRange(9)]
        );
    }

    #[test]
    fn cleaning_twice_changes_nothing() {
        let raw = vec![
            merged("£51.77", Some("Three"), ""),
            merged("£13.99", None, "Short blurb."),
            MergedRecord::merge(merged("£20.00", Some("Two"), "").listing, None),
        ];
        let once = clean(raw).records;
        let twice = clean(once.clone()).records;
        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_every_record_in_order() {
        let raw: Vec<MergedRecord> = (1..=4)
            .map(|n| {
                let mut r = merged(&format!("£{}.00", n), Some("One"), "");
                r.listing.title = format!("Book {}", n);
                r
            })
            .collect();
        let report = clean(raw.iter().cloned());
        assert_eq!(report.records.len(), raw.len());
        for (c, r) in report.records.iter().zip(&raw) {
            assert_eq!(c.title, r.listing.title);
        }
        assert_eq!(report.issues.len(), 4);
    }

    #[test]
    fn parse_amount_reports_field() {
        match parse_amount("tax", "n/a") {
            Err(ScrapeError::Parse { field, raw }) => {
                assert_eq!(field, "tax");
                assert_eq!(raw, "n/a");
            }
            other => panic!("expected Parse error, got {:?}", other),
        }
    }
}
