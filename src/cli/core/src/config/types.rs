/* src/cli/core/src/config/types.rs */

use anyhow::{Context, Result, bail};
use prewarm_core::{LocaleNormalizer, PagePattern, PrerenderConfig};
use prewarm_fetch::NextDataOptions;
use serde::Deserialize;

/// Contents of `prewarm.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct PrewarmConfig {
  #[serde(default)]
  pub prerender: PrerenderConfig,
  #[serde(default)]
  pub pages: PagesSection,
  /// Data endpoint; required by `prewarm fetch` and live replays only.
  #[serde(default)]
  pub data: Option<NextDataOptions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PagesSection {
  /// Page patterns, matched in order (`/product/[slug]`, `/product/*`).
  #[serde(default)]
  pub patterns: Vec<String>,
}

impl PrewarmConfig {
  pub fn validate(&self) -> Result<()> {
    self.prerender.validate()?;
    if self.pages.patterns.is_empty() {
      bail!("pages.patterns must not be empty");
    }
    for pattern in &self.pages.patterns {
      PagePattern::parse(pattern)?;
    }
    LocaleNormalizer::new(self.prerender.locales.iter().map(String::as_str))
      .context("prerender.locales could not be compiled")?;
    if let Some(ref data) = self.data {
      if data.base_url.is_empty() {
        bail!("data.base_url must not be empty");
      }
      if data.build_id.is_empty() {
        bail!("data.build_id must not be empty");
      }
    }
    Ok(())
  }

  pub fn data(&self) -> Result<&NextDataOptions> {
    self.data.as_ref().context("no [data] section in prewarm.toml")
  }
}
