//! Two-stage run: list every pokemon, then fetch and test each one.

use std::collections::BTreeMap;

use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::classify::{extract_categories, scalar};
use crate::error::{Error, MalformedDataError, Result};
use crate::fetch::Fetcher;
use crate::filter::Filter;

/// Matching pokemon names grouped by each filter type they matched.
#[derive(Debug, Default, Serialize)]
pub struct Aggregation {
    pub groups: BTreeMap<String, Vec<String>>,
    pub scanned: usize,
    pub matched: usize,
}

impl Aggregation {
    fn record(&mut self, name: &str, categories: impl IntoIterator<Item = String>) {
        self.matched += 1;
        for category in categories {
            self.groups.entry(category).or_default().push(name.to_string());
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Fetch the listing at `listing_url` and aggregate every pokemon that
/// passes `filter`. Any fetch or data error aborts the whole run.
pub fn run<F: Fetcher + ?Sized>(
    filter: &Filter,
    fetcher: &F,
    listing_url: &str,
) -> Result<Aggregation> {
    let stubs = fetcher.fetch_all_pages(listing_url)?;
    info!("Listing has {} pokemon", stubs.len());

    let pb = progress_bar(stubs.len() as u64);
    let mut agg = Aggregation::default();

    for stub in &stubs {
        debug!(name = %stub.name, url = %stub.url, "Fetching pokemon");
        let detail = fetcher.fetch(&stub.url)?;
        let malformed = |source: MalformedDataError| Error::MalformedData {
            url: stub.url.clone(),
            source,
        };

        let xp = scalar(&detail, "base_experience").map_err(malformed)?;
        let height = scalar(&detail, "height").map_err(malformed)?;
        let types = extract_categories(&detail).map_err(malformed)?;

        agg.scanned += 1;
        if filter.matches(height, xp, &types) {
            let name = detail.get("name").and_then(Value::as_str).unwrap_or(stub.name.as_str());
            agg.record(name, filter.matching_types(&types));
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(scanned = agg.scanned, matched = agg.matched, "Run complete");
    Ok(agg)
}

fn progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(style) = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {bar:40} {pos}/{len} ({per_sec}, eta {eta})")
    {
        pb.set_style(style.progress_chars("=> "));
    }
    pb
}
