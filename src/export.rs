use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};

use crate::models::{CleanedRecord, MergedRecord};

pub const CSV_HEADERS: [&str; 11] = [
    "title",
    "price",
    "availability",
    "rating",
    "url",
    "UPC",
    "number_of_reviews",
    "product_type",
    "tax",
    "category",
    "product_description",
];

fn writer(path: &Path) -> Result<csv::Writer<File>> {
    let file = File::create(path).with_context(|| format!("Failed to create {:?}", path))?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(CSV_HEADERS)?;
    Ok(writer)
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

/// Merged records exactly as scraped, no numeric coercion.
pub fn write_raw(path: &Path, records: &[MergedRecord]) -> Result<usize> {
    let mut w = writer(path)?;
    for r in records {
        let (l, d) = (&r.listing, &r.detail);
        w.write_record([
            l.title.clone(),
            l.price_raw.clone(),
            l.availability.clone(),
            opt(&l.rating_label),
            opt(&l.detail_url),
            opt(&d.upc),
            opt(&d.number_of_reviews),
            d.product_type.clone(),
            opt(&d.tax_raw),
            opt(&d.category),
            d.description.clone(),
        ])?;
    }
    w.flush()?;
    Ok(records.len())
}

pub fn write_cleaned(path: &Path, records: &[CleanedRecord]) -> Result<usize> {
    let mut w = writer(path)?;
    for r in records {
        w.write_record([
            r.title.clone(),
            opt(&r.price),
            r.availability.clone(),
            opt(&r.rating),
            opt(&r.url),
            opt(&r.upc),
            opt(&r.number_of_reviews),
            r.product_type.clone(),
            opt(&r.tax),
            opt(&r.category),
            r.description.clone(),
        ])?;
    }
    w.flush()?;
    Ok(records.len())
}
