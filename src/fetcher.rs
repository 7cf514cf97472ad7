use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{error, info, warn};
use url::Url;

use crate::error::ScrapeError;

/// A successfully fetched 2xx page.
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: Url,
    pub status: u16,
    pub body: String,
}

/// Anything that can turn a URL into a page body. The crawl loop only sees this.
pub trait PageSource {
    fn fetch(&self, url: &Url) -> Result<FetchedPage, ScrapeError>;
}

#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    timeout: Duration,
}

impl Fetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(user_agent).context("User agent is not a valid header value")?,
        );
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Fetcher { client, timeout })
    }

    /// Same client and headers, different per-request timeout.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Fetcher {
            client: self.client.clone(),
            timeout,
        }
    }
}

impl PageSource for Fetcher {
    fn fetch(&self, url: &Url) -> Result<FetchedPage, ScrapeError> {
        let response = self
            .client
            .get(url.as_str())
            .timeout(self.timeout)
            .send()
            .map_err(|e| ScrapeError::from_reqwest(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .map_err(|e| ScrapeError::from_reqwest(url.as_str(), e))?;

        Ok(FetchedPage {
            url: final_url,
            status: status.as_u16(),
            body,
        })
    }
}

/// One advisory request against the homepage. Every failure is logged and swallowed.
pub fn probe<S: PageSource>(source: &S, url: &Url) -> Option<FetchedPage> {
    match source.fetch(url) {
        Ok(page) => {
            info!("Homepage {} responded with status {}", url, page.status);
            Some(page)
        }
        Err(e @ ScrapeError::TransportTimeout { .. }) => {
            warn!("{}", e);
            None
        }
        Err(e @ ScrapeError::HttpStatus { .. }) => {
            error!("HTTP error for {}: {}", url, e);
            None
        }
        Err(e) => {
            error!("Probe failed for {}: {}", url, e);
            None
        }
    }
}
