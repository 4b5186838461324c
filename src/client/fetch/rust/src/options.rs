/* src/client/fetch/rust/src/options.rs */

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Where and how page data is requested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextDataOptions {
  /// Scheme and host of the storefront, e.g. `https://shop.example`.
  pub base_url: String,
  pub build_id: String,
  /// Proxy endpoint prepended to the data path, e.g. `/api/data?path=`.
  #[serde(default)]
  pub reroute_prefix: Option<String>,
  /// Store a snapshot of the page's own route under `pageProps.router`.
  #[serde(default = "default_persist_router")]
  pub persist_router: bool,
  #[serde(default = "default_timeout_ms")]
  pub timeout_ms: u64,
}

impl NextDataOptions {
  pub fn new(base_url: impl Into<String>, build_id: impl Into<String>) -> Self {
    Self {
      base_url: base_url.into(),
      build_id: build_id.into(),
      reroute_prefix: None,
      persist_router: default_persist_router(),
      timeout_ms: default_timeout_ms(),
    }
  }

  pub fn reroute(mut self, prefix: impl Into<String>) -> Self {
    self.reroute_prefix = Some(prefix.into());
    self
  }

  pub fn persist_router(mut self, persist: bool) -> Self {
    self.persist_router = persist;
    self
  }

  pub fn timeout(mut self, timeout: Duration) -> Self {
    self.timeout_ms = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
    self
  }

  pub fn timeout_duration(&self) -> Duration {
    Duration::from_millis(self.timeout_ms)
  }
}

fn default_persist_router() -> bool {
  true
}

fn default_timeout_ms() -> u64 {
  10_000
}

/// `{base_url}{reroute_prefix}/_next/data/{build_id}/{locale}{path}.json`.
/// The locale segment is omitted when there is none; `/` maps to `/index`.
pub fn data_endpoint(options: &NextDataOptions, path: &str, locale: Option<&str>) -> String {
  let base = options.base_url.trim_end_matches('/');
  let reroute = options.reroute_prefix.as_deref().unwrap_or_default();
  let page = if path == "/" || path.is_empty() { "/index" } else { path };
  let locale = locale.filter(|l| !l.is_empty()).map(|l| format!("/{l}")).unwrap_or_default();
  format!("{base}{reroute}/_next/data/{}{locale}{page}.json", options.build_id)
}
