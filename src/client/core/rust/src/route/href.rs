/* src/client/core/rust/src/route/href.rs */

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reduce an href (absolute or root-relative) to a pathname: origin, query,
/// fragment, and leading/trailing slashes dropped, then a single `/` prefixed.
pub fn href_to_path(href: &str) -> String {
  let rest = strip_origin(href);
  let end = rest.find(['?', '#']).unwrap_or(rest.len());
  let trimmed = rest[..end].trim_matches('/');
  format!("/{trimmed}")
}

fn strip_origin(href: &str) -> &str {
  for scheme in ["https://", "http://"] {
    if let Some(rest) = href.strip_prefix(scheme) {
      return rest.find('/').map_or("", |i| &rest[i..]);
    }
  }
  href
}

/// Path of an in-app link, or `None` for links leaving `origin`.
/// Root-relative hrefs count as inbound; protocol-relative (`//host`) do not.
pub fn inbound_path(href: &str, origin: &str) -> Option<String> {
  let origin = origin.trim_end_matches('/');
  let inbound = match href.strip_prefix(origin) {
    Some(rest) if !origin.is_empty() => rest.is_empty() || rest.starts_with(['/', '?', '#']),
    _ => href.starts_with('/') && !href.starts_with("//"),
  };
  inbound.then(|| href_to_path(href))
}

/// Parse the query part of `url` (`?a=1&b=2`). Keys without `=` map to "".
pub fn parse_query(url: &str) -> BTreeMap<String, String> {
  let Some((_, query)) = url.split_once('?') else {
    return BTreeMap::new();
  };
  let query = query.split('#').next().unwrap_or_default();
  query
    .split('&')
    .filter(|pair| !pair.is_empty())
    .map(|pair| match pair.split_once('=') {
      Some((k, v)) => (k.to_string(), v.to_string()),
      None => (pair.to_string(), String::new()),
    })
    .collect()
}

/// Static copy of routing state, persisted into prefetched props so a page
/// prerendered off-screen reads its own path rather than the live router.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteSnapshot {
  pub as_path: String,
  pub query: BTreeMap<String, String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub locale: Option<String>,
}

impl RouteSnapshot {
  pub fn new(as_path: impl Into<String>, locale: Option<&str>) -> Self {
    let as_path = as_path.into();
    let query = parse_query(&as_path);
    Self { as_path, query, locale: locale.map(String::from) }
  }

  pub fn to_value(&self) -> serde_json::Value {
    serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
  }
}
