use super::{FetchedPage, Fetcher};
use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36";

/// Headers sent with every plain HTTP request. Accept-Encoding is added by
/// the client itself since it also owns decompression.
pub const BASE_HEADERS: [(&str, &str); 3] = [
    ("accept", "text/html,application/xhtml+xml,*/*;q=0.8"),
    ("accept-language", "en-US,en;q=0.5"),
    ("connection", "keep-alive"),
];

/// Plain GET fetcher. One instance per source run keeps the connection pool
/// and cookie jar across that source's pages.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// `overlay` headers replace base headers of the same name
    pub fn new(overlay: &[(&str, String)], timeout: Duration) -> Result<Self> {
        let mut headers = HeaderMap::new();
        let pairs = BASE_HEADERS
            .iter()
            .copied()
            .chain(overlay.iter().map(|(k, v)| (*k, v.as_str())));
        for (name, value) in pairs {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name {name}"))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {name}"))?;
            headers.insert(name, value);
        }

        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .cookie_store(true)
            .gzip(true)
            .deflate(true)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedPage> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Fetch error {url}"))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {}: {}", status.as_u16(), url);
        }

        let html = response
            .text()
            .await
            .context("Failed to read response body")?;
        debug!("Downloaded {} bytes from {}", html.len(), url);

        Ok(FetchedPage::new(url, html))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sends_base_headers_and_overlay() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/listings"))
            .and(header("accept-language", "en-US,en;q=0.5"))
            .and(header("referer", "https://jiji.co.ke/"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher =
            HttpFetcher::new(&[("referer", "https://jiji.co.ke/".to_string())], Duration::from_secs(5))
                .unwrap();
        let page = fetcher
            .fetch(&format!("{}/listings", server.uri()))
            .await
            .unwrap();

        assert_eq!(page.html, "<html>ok</html>");
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let fetcher = HttpFetcher::new(&[], Duration::from_secs(5)).unwrap();
        let err = fetcher.fetch(&server.uri()).await.unwrap_err();

        assert!(err.to_string().contains("503"));
    }
}
