pub mod browser;
pub mod http;

pub use browser::BrowserSession;
pub use http::HttpFetcher;

use anyhow::Result;
use async_trait::async_trait;
use scraper::Html;

/// Which engine a source needs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Engine {
    Http,
    Browser,
}

/// Raw markup of one fetched results page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    pub url: String,
    pub html: String,
}

impl FetchedPage {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
        }
    }

    pub fn document(&self) -> Html {
        Html::parse_document(&self.html)
    }
}

/// Retrieves a single page; one attempt, no retries
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedPage>;
}
