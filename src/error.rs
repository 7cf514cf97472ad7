use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("timed out fetching {url}")]
    TransportTimeout { url: String },
    #[error("transport error fetching {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },
    #[error("{what} not found on {url}")]
    MissingStructure { url: String, what: &'static str },
    #[error("could not parse {field} from {raw:?}")]
    Parse { field: &'static str, raw: String },
}

impl ScrapeError {
    pub fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ScrapeError::TransportTimeout { url: url.to_string() }
        } else if let Some(status) = err.status() {
            ScrapeError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            ScrapeError::Transport {
                url: url.to_string(),
                source: err,
            }
        }
    }
}
