use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use scraper::Html;
use tracing::{error, info};
use url::Url;

use crate::error::ScrapeError;
use crate::fetcher::PageSource;
use crate::models::{DetailFields, MergedRecord};
use crate::parser::{detail, listing};
use crate::politeness::Politeness;

/// Crawl stats returned after completion.
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlStats {
    pub pages: usize,
    pub products_seen: usize,
    pub records: usize,
    pub detail_failures: usize,
    pub elapsed: Duration,
}

pub struct CrawlOutcome {
    pub records: Vec<MergedRecord>,
    pub stats: CrawlStats,
}

pub struct Crawler<'a, S: PageSource> {
    source: &'a S,
    politeness: Politeness,
}

impl<'a, S: PageSource> Crawler<'a, S> {
    pub fn new(source: &'a S, politeness: Politeness) -> Self {
        Crawler { source, politeness }
    }

    /// Walk the listing chain from `start` until a page has no next link,
    /// visiting every item's detail page on the way.
    ///
    /// A failed listing fetch aborts the crawl. A failed detail page only
    /// costs that item its detail fields.
    pub fn run(&self, start: Url) -> Result<CrawlOutcome> {
        let t0 = Instant::now();
        info!("Scraping started");

        let mut current = start;
        let mut page_number = 1usize;
        let mut products_seen = 0usize;
        let mut detail_failures = 0usize;
        let mut records = Vec::new();

        loop {
            info!("Processing listing page {}: {}", page_number, current);
            let page = self
                .source
                .fetch(&current)
                .with_context(|| format!("Listing page {} failed: {}", page_number, current))?;
            let doc = Html::parse_document(&page.body);

            for item in listing::extract_items(&doc, &current) {
                let detail = match &item.detail_url {
                    Some(url) => {
                        self.politeness.pause();
                        info!("Processing data from URL - {}", url);
                        products_seen += 1;
                        let detail = self.visit_detail(url);
                        if detail.is_none() {
                            detail_failures += 1;
                        }
                        info!("Total products scraped so far: {}", products_seen);
                        detail
                    }
                    None => None,
                };
                records.push(MergedRecord::merge(item, detail));
            }

            let Some(next) = listing::next_page_url(&doc, &current) else {
                break;
            };
            current = next;
            page_number += 1;
            self.politeness.pause();
        }

        let stats = CrawlStats {
            pages: page_number,
            products_seen,
            records: records.len(),
            detail_failures,
            elapsed: t0.elapsed(),
        };
        info!(
            "Scraping finished. Pages: {}, Records: {} ({} detail pages visited, {} failed)",
            stats.pages, stats.records, stats.products_seen, stats.detail_failures
        );
        info!("Total duration: {}", format_duration(stats.elapsed));

        Ok(CrawlOutcome { records, stats })
    }

    fn visit_detail(&self, url: &Url) -> Option<DetailFields> {
        let page = match self.source.fetch(url) {
            Ok(page) => page,
            Err(e) => {
                error!("Detail page skipped: {}", e);
                return None;
            }
        };
        match detail::extract(&Html::parse_document(&page.body), url) {
            Ok(fields) => Some(fields),
            Err(e @ ScrapeError::MissingStructure { .. }) => {
                error!("{} is empty or could not be accessed ({})", url, e);
                None
            }
            Err(e) => {
                error!("Could not extract details from {}: {}", url, e);
                None
            }
        }
    }
}

pub fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
