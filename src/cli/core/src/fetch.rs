/* src/cli/core/src/fetch.rs */

use anyhow::{Context, Result};
use prewarm_core::{LocaleNormalizer, canonical_path};
use prewarm_fetch::{NextDataFetcher, NextDataOptions};
use serde_json::Value;

use crate::ui;

/// Request the props of one page, the way a prefetch would.
pub async fn fetch_page(
  options: NextDataOptions,
  locales: &[String],
  raw_path: &str,
  locale: Option<&str>,
) -> Result<Value> {
  let normalizer = LocaleNormalizer::new(locales.iter().map(String::as_str))?;
  let path = canonical_path(raw_path, &normalizer);
  let fetcher = NextDataFetcher::new(options).context("failed to build HTTP client")?;

  ui::arrow(&fetcher.endpoint(&path, locale));
  let props = fetcher
    .fetch_props(&path, locale)
    .await
    .with_context(|| format!("failed to fetch page data for {path}"))?;
  ui::ok(&format!("{path} fetched"));
  Ok(props)
}
