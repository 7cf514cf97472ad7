use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use url::Url;

const CONFIG_FILE: &str = "books_scraper";
const ENV_PREFIX: &str = "BOOKS";
/// Upper bound for either delay setting.
pub const MAX_DELAY_SECS: f64 = 300.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub home_url: String,
    pub start_url: String,
    pub user_agent: String,
    pub probe_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub min_delay_secs: f64,
    pub max_delay_secs: f64,
    pub log_file: PathBuf,
    pub output_dir: PathBuf,
    pub database_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            home_url: "https://books.toscrape.com/".into(),
            start_url: "https://books.toscrape.com/catalogue/category/books_1/page-1.html".into(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
                         AppleWebKit/605.1.15 (KHTML, like Gecko) \
                         Version/16.0 Safari/605.1.15"
                .into(),
            probe_timeout_secs: 10,
            request_timeout_secs: 10,
            min_delay_secs: 1.0,
            max_delay_secs: 5.0,
            log_file: PathBuf::from("scraper.log"),
            output_dir: PathBuf::from("ScrapedData"),
            database_file: "books.sqlite".into(),
        }
    }
}

impl Settings {
    /// Defaults, then `books_scraper.toml` if present, then `BOOKS_*` env vars.
    pub fn load() -> Result<Self> {
        let settings: Settings = config::Config::builder()
            .add_source(config::File::with_name(CONFIG_FILE).required(false))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        let (min, max) = (self.min_delay_secs, self.max_delay_secs);
        if !min.is_finite() || !max.is_finite() || min < 0.0 || max < min {
            bail!("delay bounds must satisfy 0 <= min <= max, got [{}, {}]", min, max);
        }
        if max > MAX_DELAY_SECS {
            bail!("max_delay_secs {} exceeds the {}s limit", max, MAX_DELAY_SECS);
        }
        self.home_url()?;
        self.start_url()?;
        Ok(())
    }

    pub fn home_url(&self) -> Result<Url> {
        Url::parse(&self.home_url).with_context(|| format!("Bad home_url {:?}", self.home_url))
    }

    pub fn start_url(&self) -> Result<Url> {
        Url::parse(&self.start_url).with_context(|| format!("Bad start_url {:?}", self.start_url))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn raw_csv_path(&self) -> PathBuf {
        self.output_dir.join("books_raw.csv")
    }

    pub fn cleaned_csv_path(&self) -> PathBuf {
        self.output_dir.join("books_cleaned.csv")
    }

    pub fn database_path(&self) -> PathBuf {
        Path::new(&self.output_dir).join(&self.database_file)
    }
}
