//! Run configuration

use anyhow::{bail, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Longest politeness pause accepted, seconds
const MAX_DELAY_SECS: f64 = 300.0;

/// Settings for one crawl run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Upper bound on pages fetched per source/type/query
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,
    /// Run Chrome without a window
    #[serde(default = "default_true")]
    pub headless: bool,
    /// Skip browser-driven sources entirely when false
    #[serde(default = "default_true")]
    pub browser: bool,
    /// Politeness pause bounds, seconds
    #[serde(default = "default_delay_min")]
    pub delay_min_secs: f64,
    #[serde(default = "default_delay_max")]
    pub delay_max_secs: f64,
    #[serde(default = "default_output")]
    pub output: PathBuf,
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
    #[serde(default = "default_log_file")]
    pub log_file: String,
    /// Search region; also the location given to text-pattern matches
    #[serde(default = "default_region")]
    pub region: String,
    /// Only crawl these sources (case-insensitive); empty means all
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default = "default_http_timeout")]
    pub http_timeout_secs: u64,
    #[serde(default = "default_nav_timeout")]
    pub nav_timeout_secs: u64,
    /// Fixed wait after navigation before the DOM is read
    #[serde(default = "default_settle")]
    pub settle_secs: u64,
}

fn default_max_pages() -> u32 {
    10
}

fn default_true() -> bool {
    true
}

fn default_delay_min() -> f64 {
    2.0
}

fn default_delay_max() -> f64 {
    4.0
}

fn default_output() -> PathBuf {
    PathBuf::from("nairobi_properties.csv")
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("logs")
}

fn default_log_file() -> String {
    "scraper.log".to_string()
}

fn default_region() -> String {
    "Nairobi".to_string()
}

fn default_http_timeout() -> u64 {
    20
}

fn default_nav_timeout() -> u64 {
    40
}

fn default_settle() -> u64 {
    3
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            max_pages: default_max_pages(),
            headless: true,
            browser: true,
            delay_min_secs: default_delay_min(),
            delay_max_secs: default_delay_max(),
            output: default_output(),
            log_dir: default_log_dir(),
            log_file: default_log_file(),
            region: default_region(),
            sources: Vec::new(),
            http_timeout_secs: default_http_timeout(),
            nav_timeout_secs: default_nav_timeout(),
            settle_secs: default_settle(),
        }
    }
}

impl ScrapeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        if !self.delay_min_secs.is_finite() || !self.delay_max_secs.is_finite() {
            bail!("delays must be finite numbers of seconds");
        }
        if self.delay_max_secs > MAX_DELAY_SECS {
            bail!("delay_max must not exceed {}s", MAX_DELAY_SECS);
        }
        if self.delay_min_secs < 0.0 || self.delay_min_secs > self.delay_max_secs {
            bail!(
                "invalid delay range {}..{}",
                self.delay_min_secs,
                self.delay_max_secs
            );
        }
        Ok(())
    }

    /// Whether `name` passes the source allow-list
    pub fn wants_source(&self, name: &str) -> bool {
        self.sources.is_empty() || self.sources.iter().any(|s| s.eq_ignore_ascii_case(name))
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http_timeout_secs)
    }

    pub fn nav_timeout(&self) -> Duration {
        Duration::from_secs(self.nav_timeout_secs)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_secs(self.settle_secs)
    }
}

/// Command-line flags
#[derive(Debug, Parser)]
#[command(name = "nairobi-scout", about = "Crawl Nairobi property listings into a CSV table")]
pub struct Args {
    /// Maximum pages per source and listing type
    #[arg(long, default_value_t = default_max_pages())]
    pub max_pages: u32,

    /// Show the browser window
    #[arg(long)]
    pub headful: bool,

    /// Skip Property24 and PigiaMe (browser-driven sources)
    #[arg(long)]
    pub no_browser: bool,

    /// Minimum politeness delay in seconds
    #[arg(long, default_value_t = default_delay_min())]
    pub delay_min: f64,

    /// Maximum politeness delay in seconds
    #[arg(long, default_value_t = default_delay_max())]
    pub delay_max: f64,

    /// CSV output path
    #[arg(short, long, default_value = "nairobi_properties.csv")]
    pub output: PathBuf,

    /// Directory for the rotating log file
    #[arg(long, default_value = "logs")]
    pub log_dir: PathBuf,

    /// Restrict the run to these sources (repeatable)
    #[arg(long = "source")]
    pub sources: Vec<String>,
}

impl From<Args> for ScrapeConfig {
    fn from(args: Args) -> Self {
        Self {
            max_pages: args.max_pages,
            headless: !args.headful,
            browser: !args.no_browser,
            delay_min_secs: args.delay_min,
            delay_max_secs: args.delay_max,
            output: args.output,
            log_dir: args.log_dir,
            sources: args.sources,
            ..Self::default()
        }
    }
}
