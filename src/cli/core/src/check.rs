/* src/cli/core/src/check.rs */

use std::path::Path;

use anyhow::Result;
use prewarm_core::{LocaleNormalizer, PageRegistry, canonical_path};
use serde::Serialize;

use crate::config::PrewarmConfig;
use crate::ui;

/// How one raw path resolves against the configured pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathReport {
  pub raw: String,
  pub canonical: String,
  pub page: Option<String>,
  pub slug: Option<String>,
}

pub fn resolve_paths(config: &PrewarmConfig, paths: &[String]) -> Result<Vec<PathReport>> {
  let normalizer = LocaleNormalizer::new(config.prerender.locales.iter().map(String::as_str))?;
  let mut registry = PageRegistry::new();
  for pattern in &config.pages.patterns {
    registry.register(pattern, ())?;
  }
  let reports = paths
    .iter()
    .map(|raw| {
      let canonical = canonical_path(raw, &normalizer);
      let matched = registry.match_page(&canonical);
      PathReport {
        raw: raw.clone(),
        page: matched.as_ref().map(|m| m.page.pattern.template().to_string()),
        slug: matched.and_then(|m| m.slug),
        canonical,
      }
    })
    .collect();
  Ok(reports)
}

pub fn run_check(config_path: &Path, config: &PrewarmConfig, paths: &[String]) -> Result<()> {
  ui::banner("check");
  ui::ok(&format!("{} is valid", config_path.display()));

  let prerender = &config.prerender;
  ui::label("max prerendered", &prerender.max_prerendered.to_string());
  let locales = if prerender.locales.is_empty() { "none".to_string() } else { prerender.locales.join(", ") };
  ui::label("locales", &locales);
  let proximity = if prerender.proximity.enabled {
    format!("every {}ms", prerender.proximity.interval_ms)
  } else {
    "disabled".to_string()
  };
  ui::label("proximity", &proximity);
  match config.data {
    Some(ref data) => ui::label("data", &format!("{} (build {})", data.base_url, data.build_id)),
    None => ui::warn("no [data] section, replay --live is unavailable"),
  }

  ui::blank();
  let total = config.pages.patterns.len();
  for (i, pattern) in config.pages.patterns.iter().enumerate() {
    ui::step(i + 1, total, pattern);
  }

  if !paths.is_empty() {
    ui::blank();
    for report in resolve_paths(config, paths)? {
      match (&report.page, &report.slug) {
        (Some(page), Some(slug)) => ui::arrow(&format!("{} -> {page} ({slug})", report.canonical)),
        (Some(page), None) => ui::arrow(&format!("{} -> {page}", report.canonical)),
        (None, _) => ui::fail(&format!("{} has no registered page", report.canonical)),
      }
    }
  }
  ui::blank();
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn resolves_raw_paths() {
    let config: PrewarmConfig = toml::from_str(
      "[prerender]\nlocales = [\"en\", \"de\"]\n[pages]\npatterns = [\"/product/[slug]\", \"/\"]\n",
    )
    .unwrap();
    let paths: Vec<String> = ["/de/product/red-shoe/?color=red", "https://shop.test/?ref=mail", "/cart"]
      .iter()
      .map(|p| p.to_string())
      .collect();
    let reports = resolve_paths(&config, &paths).unwrap();

    assert_eq!(reports[0].canonical, "/product/red-shoe");
    assert_eq!(reports[0].page.as_deref(), Some("/product/[slug]"));
    assert_eq!(reports[0].slug.as_deref(), Some("red-shoe"));
    assert_eq!(reports[1].canonical, "/");
    assert_eq!(reports[1].page.as_deref(), Some("/"));
    assert_eq!(reports[2].page, None);
  }
}
