pub mod cache;
pub mod http;

use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::TransportError;

pub use cache::CachedFetcher;
pub use http::HttpFetcher;

/// One entry of a paged listing: just enough to fetch the full record.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ItemStub {
    pub name: String,
    pub url: String,
}

#[derive(Deserialize)]
struct Page {
    results: Vec<ItemStub>,
    #[serde(default)]
    next: Option<String>,
}

/// Source of JSON documents for the pipeline.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Value, TransportError>;

    /// Fetch `start_url` and keep following `next` until it is null,
    /// returning every page's `results` in page order.
    fn fetch_all_pages(&self, start_url: &str) -> Result<Vec<ItemStub>, TransportError> {
        let mut items = Vec::new();
        let mut next = Some(start_url.to_string());

        while let Some(url) = next {
            let page: Page = serde_json::from_value(self.fetch(&url)?)
                .map_err(|source| TransportError::Decode { url: url.clone(), source })?;
            debug!(url = %url, count = page.results.len(), "Fetched listing page");
            items.extend(page.results);
            next = page.next;
        }

        Ok(items)
    }
}
