//! Network fallbacks: HEAD size probing and Open Graph image scraping
//!
//! Both are single attempts with a bounded timeout and no retry; a slow
//! host costs at most one timeout per size-less format.

use std::time::Duration;

use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::normalize::{human_size, size_label};

const PROBE_TIMEOUT: Duration = Duration::from_secs(10);
const PROBE_USER_AGENT: &str = "Mozilla/5.0";

lazy_static! {
    // og:image meta tag, either attribute order
    static ref OG_IMAGE_PROP_FIRST: Regex = Regex::new(
        r#"<meta[^>]*property\s*=\s*["']og:image["'][^>]*content\s*=\s*["']([^"']+)["']"#
    )
    .unwrap();
    static ref OG_IMAGE_CONTENT_FIRST: Regex = Regex::new(
        r#"<meta[^>]*content\s*=\s*["']([^"']+)["'][^>]*property\s*=\s*["']og:image["']"#
    )
    .unwrap();
}

/// Seam between the handlers and the network; stubbed out in handler tests
#[async_trait]
pub trait MediaProber: Send + Sync {
    /// Resolve a display size: declared bytes when present, otherwise one
    /// HEAD request reading Content-Length. Failure yields the sentinel,
    /// never an error.
    async fn resolve_size(&self, declared: Option<u64>, url: &str) -> String;

    /// Fetch a page and scrape its og:image tag
    async fn scrape_og_image(&self, page_url: &str) -> Option<String>;
}

#[derive(Clone)]
pub struct SizeProber {
    client: reqwest::Client,
}

impl SizeProber {
    pub fn new() -> reqwest::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(PROBE_USER_AGENT)
            .timeout(PROBE_TIMEOUT)
            .build()?;
        Ok(Self { client })
    }

    async fn content_length(&self, url: &str) -> Option<u64> {
        let response = match self.client.head(url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url, error = %e, "HEAD probe failed");
                return None;
            }
        };
        response
            .headers()
            .get(reqwest::header::CONTENT_LENGTH)?
            .to_str()
            .ok()?
            .parse()
            .ok()
    }
}

#[async_trait]
impl MediaProber for SizeProber {
    async fn resolve_size(&self, declared: Option<u64>, url: &str) -> String {
        if let Some(bytes) = declared.filter(|b| *b > 0) {
            return human_size(bytes);
        }
        size_label(self.content_length(url).await)
    }

    async fn scrape_og_image(&self, page_url: &str) -> Option<String> {
        let response = match self.client.get(page_url).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(url = page_url, error = %e, "page fetch failed");
                return None;
            }
        };
        if !response.status().is_success() {
            return None;
        }
        let body = response.text().await.ok()?;
        extract_og_image(&body)
    }
}

/// Pull the og:image URL out of an HTML document
pub fn extract_og_image(html: &str) -> Option<String> {
    OG_IMAGE_PROP_FIRST
        .captures(html)
        .or_else(|| OG_IMAGE_CONTENT_FIRST.captures(html))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
