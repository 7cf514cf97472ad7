mod cleaner;
mod crawler;
mod db;
mod error;
mod export;
mod fetcher;
mod logging;
mod models;
mod parser;
mod politeness;
mod settings;

use std::time::Instant;

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{debug, info};

use crate::crawler::Crawler;
use crate::fetcher::Fetcher;
use crate::politeness::Politeness;
use crate::settings::Settings;

fn main() -> Result<()> {
    let settings = Settings::load()?;
    let _log_guard = logging::init(&settings.log_file)?;
    info!(settings = ?settings, "Starting books scraper");

    let t0 = Instant::now();
    let http = Fetcher::new(&settings.user_agent, settings.request_timeout())?;

    // Advisory only; the crawl starts from `start_url` whatever happens here.
    let home = settings.home_url()?;
    if let Some(page) = fetcher::probe(&http.with_timeout(settings.probe_timeout()), &home) {
        let items = parser::listing::extract_items(&Html::parse_document(&page.body), &page.url);
        info!("Homepage lists {} products", items.len());
    }

    let politeness = if settings.max_delay_secs > 0.0 {
        Politeness::new(settings.min_delay_secs, settings.max_delay_secs)
    } else {
        info!("Politeness delay disabled");
        Politeness::disabled()
    };
    let outcome = Crawler::new(&http, politeness).run(settings.start_url()?)?;
    let stats = outcome.stats;
    let raw = outcome.records;

    let report = cleaner::clean(raw.iter().cloned());
    info!(
        "Cleaned {} records ({} validation warnings)",
        report.records.len(),
        report.issues.len()
    );
    for issue in &report.issues {
        debug!("{}", issue);
    }

    std::fs::create_dir_all(&settings.output_dir)
        .with_context(|| format!("Failed to create {:?}", settings.output_dir))?;

    let raw_path = settings.raw_csv_path();
    let written = export::write_raw(&raw_path, &raw)?;
    info!("Wrote {} raw rows to {:?}", written, raw_path);

    let cleaned_path = settings.cleaned_csv_path();
    let written = export::write_cleaned(&cleaned_path, &report.records)?;
    info!("Wrote {} cleaned rows to {:?}", written, cleaned_path);

    let db_path = settings.database_path();
    let conn = db::connect(&db_path)?;
    let inserted = db::replace_books(&conn, &report.records)?;
    info!("Loaded {} rows into {} ({:?})", inserted, db::BOOKS_TABLE, db_path);

    println!(
        "Scraped {} pages, {} records ({} detail pages failed, {} warnings).",
        stats.pages,
        raw.len(),
        stats.detail_failures,
        report.issues.len()
    );
    println!("Outputs in {:?}", settings.output_dir);
    println!("\nDone in {}", crawler::format_duration(t0.elapsed()));
    Ok(())
}
