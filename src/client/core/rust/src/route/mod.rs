/* src/client/core/rust/src/route/mod.rs */

// Path canonicalization and page pattern matching.
// Everything here is pure and safe to share across tasks.

mod href;
mod locale;
mod pattern;


pub use href::{RouteSnapshot, href_to_path, inbound_path, parse_query};
pub use locale::LocaleNormalizer;
pub use pattern::{PageMatch, PagePattern, PageRegistry, RegisteredPage};

/// Canonical cache / warm set key for a raw link target or router path:
/// slashes and query trimmed, then the locale prefix dropped.
pub fn canonical_path(raw: &str, locales: &LocaleNormalizer) -> String {
  let path = href_to_path(raw);
  locales.drop_locale(&path).into_owned()
}
