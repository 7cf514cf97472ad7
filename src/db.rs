use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::Connection;

use crate::models::CleanedRecord;

pub const BOOKS_TABLE: &str = "books";

pub fn connect(path: &Path) -> Result<Connection> {
    let conn = Connection::open(path).with_context(|| format!("Failed to open {:?}", path))?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

/// Drop and recreate `books`, then bulk insert. Runs in one transaction so
/// a failure leaves the previous table in place.
pub fn replace_books(conn: &Connection, records: &[CleanedRecord]) -> Result<usize> {
    let tx = conn.unchecked_transaction()?;
    tx.execute_batch(&format!(
        "
        DROP TABLE IF EXISTS {table};
        CREATE TABLE {table} (
            title             TEXT,
            price             REAL,
            tax               REAL,
            rating            INTEGER,
            availability      TEXT,
            url               TEXT,
            upc               TEXT,
            number_of_reviews INTEGER,
            product_type      TEXT,
            category          TEXT,
            description       TEXT
        );
        ",
        table = BOOKS_TABLE
    ))?;

    let mut count = 0;
    {
        let mut stmt = tx.prepare(&format!(
            "INSERT INTO {}
             (title, price, tax, rating, availability, url, upc,
              number_of_reviews, product_type, category, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            BOOKS_TABLE
        ))?;
        for r in records {
            count += stmt.execute(rusqlite::params![
                r.title, r.price, r.tax, r.rating, r.availability, r.url, r.upc,
                r.number_of_reviews, r.product_type, r.category, r.description,
            ])?;
        }
    }
    tx.commit()?;
    Ok(count)
}
