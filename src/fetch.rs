use std::time::Duration;

use anyhow::{bail, Context, Result};
use reqwest::Client;
use tracing::debug;

/// HTTP client for the court site. Strictly sequential: every fetch sleeps
/// the flat inter-request delay first, since the site rate-limits silently.
pub struct Fetcher {
    client: Client,
    delay: Duration,
}

impl Fetcher {
    /// `accept_invalid_certs` exists because the court site's certificate
    /// chain is frequently broken; it is surfaced as the --insecure flag and
    /// never turned on implicitly.
    pub fn new(delay_secs: u64, accept_invalid_certs: bool) -> Result<Self> {
        let client = Client::builder()
            .danger_accept_invalid_certs(accept_invalid_certs)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            delay: Duration::from_secs(delay_secs),
        })
    }

    /// Fetch a page and return its rendered text: markup stripped, whitespace
    /// collapsed to single spaces. Every extractor downstream scans the
    /// whitespace-split tokens of exactly this string.
    pub async fn fetch_text(&self, url: &str) -> Result<String> {
        tokio::time::sleep(self.delay).await;
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?;
        let status = response.status();
        if !status.is_success() {
            bail!("failed to retrieve {}: status {}", url, status.as_u16());
        }
        let html = response.text().await?;
        Ok(flatten_html(&html))
    }
}

/// Flatten an HTML document to its text content with single-space separators.
pub fn flatten_html(html: &str) -> String {
    let document = scraper::Html::parse_document(html);
    let text: String = document
        .root_element()
        .text()
        .collect::<Vec<_>>()
        .join(" ");
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
