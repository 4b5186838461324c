/* src/client/core/wasm/src/lib.rs */

use prewarm_core::{
  DeviceProfile, LocaleNormalizer, PageRegistry, Point, ProximityOptions, Rect, RelativeTo,
  WarmSet, decode_action_str,
};
use serde_json::{Value, json};
use wasm_bindgen::prelude::*;

fn error_json(message: impl std::fmt::Display) -> String {
  json!({ "error": message.to_string() }).to_string()
}

// --- Routing ---

/// Locale list and page patterns, compiled once and reused by every call.
#[wasm_bindgen]
pub struct Router {
  locales: LocaleNormalizer,
  pages: PageRegistry<usize>,
}

#[wasm_bindgen]
impl Router {
  /// Both arguments are JSON string arrays; an empty `locales_json` means no
  /// locales. Malformed input is returned as `{"error":...}`.
  #[wasm_bindgen(constructor)]
  pub fn new(patterns_json: &str, locales_json: &str) -> Result<Router, String> {
    let patterns: Vec<String> = serde_json::from_str(patterns_json).map_err(error_json)?;
    let locales: Vec<String> = if locales_json.trim().is_empty() {
      Vec::new()
    } else {
      serde_json::from_str(locales_json).map_err(error_json)?
    };
    if let Some(bad) = locales.iter().find(|l| l.is_empty() || l.contains('/')) {
      return Err(error_json(format!("invalid locale {bad:?}")));
    }
    let locales = LocaleNormalizer::new(locales).map_err(error_json)?;
    let mut pages = PageRegistry::new();
    for (index, pattern) in patterns.iter().enumerate() {
      pages.register(pattern, index).map_err(error_json)?;
    }
    Ok(Self { locales, pages })
  }

  pub fn drop_locale(&self, path: &str) -> String {
    self.locales.drop_locale(path).into_owned()
  }

  pub fn canonical_path(&self, raw: &str) -> String {
    prewarm_core::canonical_path(raw, &self.locales)
  }

  /// First pattern accepting the canonical form of `raw`:
  /// `{"index":n,"pattern":"...","slug":...}` or `null`.
  pub fn match_page(&self, raw: &str) -> String {
    let path = self.canonical_path(raw);
    match self.pages.match_page(&path) {
      Some(m) => json!({
        "index": m.page.target,
        "pattern": m.page.pattern.template(),
        "slug": m.slug,
      })
      .to_string(),
      None => "null".to_string(),
    }
  }

  /// Group links (`[{element, href, rect}]`) by their registered page and
  /// keep the nearest per group. `options_json` is a partial
  /// `ProximityOptions`.
  pub fn closest_to_pointer(&self, links_json: &str, x: f64, y: f64, options_json: &str) -> String {
    let links = match serde_json::from_str(links_json) {
      Ok(links) => links,
      Err(e) => return error_json(e),
    };
    let options: ProximityOptions = if options_json.is_empty() {
      ProximityOptions::default()
    } else {
      match serde_json::from_str(options_json) {
        Ok(options) => options,
        Err(e) => return error_json(e),
      }
    };
    let grouped = prewarm_core::closest_to_pointer(
      links,
      |link| {
        let path = self.canonical_path(&link.href);
        self.pages.match_page(&path).map(|m| m.page.pattern.template().to_string())
      },
      Some(Point::new(x, y)),
      &options,
    );
    serde_json::to_string(&grouped).unwrap_or_else(|_| "{}".to_string())
  }
}

// --- Paths ---

#[wasm_bindgen]
pub fn href_to_path(href: &str) -> String {
  prewarm_core::href_to_path(href)
}

/// Canonical path of an inbound link as a JSON string, or `null`.
#[wasm_bindgen]
pub fn inbound_path(href: &str, origin: &str) -> String {
  match prewarm_core::inbound_path(href, origin) {
    Some(path) => Value::String(path).to_string(),
    None => "null".to_string(),
  }
}

// --- Proximity ---

#[wasm_bindgen]
pub fn pointer_distance(rect_json: &str, x: f64, y: f64, relative_to: &str) -> f64 {
  let Ok(rect) = serde_json::from_str::<Rect>(rect_json) else {
    return f64::NAN;
  };
  let relative_to: RelativeTo =
    serde_json::from_value(Value::String(relative_to.to_string())).unwrap_or_default();
  prewarm_core::pointer_distance(&rect, Point::new(x, y), relative_to)
}

#[wasm_bindgen]
pub fn is_touchable(device_json: &str) -> bool {
  serde_json::from_str::<DeviceProfile>(device_json).is_ok_and(|device| device.is_touchable())
}

// --- Warm set ---

/// Apply one action to `{"paths":[...],"capacity":n}`. Unknown actions are
/// reported as `{"error":...}`, never ignored.
#[wasm_bindgen]
pub fn reduce_warm_set(state_json: &str, action_json: &str, active: &str) -> String {
  let state: WarmSet = match serde_json::from_str(state_json) {
    Ok(state) => state,
    Err(e) => return error_json(e),
  };
  let action = match decode_action_str(action_json) {
    Ok(action) => action,
    Err(e) => return error_json(e),
  };
  let next = prewarm_core::reduce(&state, &action, active);
  serde_json::to_string(&next).unwrap_or_else(|_| "null".to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn router() -> Router {
    Router::new(r#"["/", "/product/[slug]"]"#, r#"["en","de"]"#).unwrap()
  }

  #[test]
  fn paths() {
    let router = router();
    assert_eq!(router.drop_locale("/de/product/a"), "/product/a");
    assert_eq!(router.drop_locale("/fr/product/a"), "/fr/product/a");
    assert_eq!(router.canonical_path("https://shop.test/en/cart/?x=1"), "/cart");
    assert_eq!(inbound_path("/product/a/", ""), r#""/product/a""#);
    assert_eq!(inbound_path("https://elsewhere.test/a", "https://shop.test"), "null");
  }

  #[test]
  fn empty_locales_mean_identity() {
    let router = Router::new(r#"["/"]"#, "").unwrap();
    assert_eq!(router.drop_locale("/en/cart"), "/en/cart");
  }

  #[test]
  fn malformed_router_input_is_an_error() {
    for (patterns, locales) in [
      (r#"["/"]"#, "en,de"),
      (r#"["/"]"#, r#"["en", ""]"#),
      (r#"["/"]"#, r#"["en/us"]"#),
      ("not json", r#"["en"]"#),
      (r#"["/*/*"]"#, r#"["en"]"#),
    ] {
      let err = Router::new(patterns, locales).err().unwrap();
      let err: Value = serde_json::from_str(&err).unwrap();
      assert!(err["error"].is_string(), "{patterns} {locales}");
    }
  }

  #[test]
  fn matches_pages() {
    let router = router();
    let found: Value = serde_json::from_str(&router.match_page("/de/product/a")).unwrap();
    assert_eq!(found, json!({ "index": 1, "pattern": "/product/[slug]", "slug": "a" }));
    assert_eq!(router.match_page("/product/a/b"), "null");
  }

  #[test]
  fn distance() {
    let rect = r#"{"left":10,"top":10,"right":20,"bottom":20}"#;
    assert!((pointer_distance(rect, 0.0, 0.0, "closest") - 200f64.sqrt()).abs() < 1e-9);
    assert_eq!(pointer_distance(rect, 10.0, 0.0, "origin"), 10.0);
    assert!(pointer_distance("{}", 0.0, 0.0, "closest").is_nan());
  }

  #[test]
  fn groups_links() {
    let router = Router::new(r#"["/product/*"]"#, r#"["en"]"#).unwrap();
    let links = r#"[
      {"element":1,"href":"/en/product/a","rect":{"left":0,"top":0,"right":10,"bottom":10}},
      {"element":2,"href":"/product/b","rect":{"left":500,"top":0,"right":510,"bottom":10}},
      {"element":3,"href":"/about","rect":{"left":0,"top":20,"right":10,"bottom":30}}
    ]"#;
    let grouped: Value = serde_json::from_str(&router.closest_to_pointer(links, 5.0, 5.0, "")).unwrap();
    let group = grouped["/product/*"].as_array().unwrap();
    assert_eq!(group.len(), 1);
    assert_eq!(group[0]["href"], "/en/product/a");
    assert!(grouped.get("/about").is_none());
    assert!(router.closest_to_pointer("[", 5.0, 5.0, "").contains("error"));
  }

  #[test]
  fn touch_detection() {
    assert!(is_touchable(r#"{"maxTouchPoints":5}"#));
    assert!(!is_touchable(r#"{"userAgent":"Mozilla/5.0 (X11; Linux x86_64)"}"#));
  }

  #[test]
  fn warm_set_reduction() {
    let state = r#"{"paths":["/a","/b"],"capacity":2}"#;
    let next: Value = serde_json::from_str(&reduce_warm_set(
      state,
      r#"{"type":"add","payload":{"paths":"/c"}}"#,
      "/a",
    ))
    .unwrap();
    assert_eq!(next["paths"], json!(["/a", "/c"]));
    assert!(reduce_warm_set(state, r#"{"type":"remove"}"#, "/a").contains("unknown warm set action"));
  }
}
