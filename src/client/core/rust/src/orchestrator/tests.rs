/* src/client/core/rust/src/orchestrator/tests.rs */

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::config::ProximityOptions;
use crate::data::Props;
use crate::data::tests::StubFetcher;
use crate::errors::{ConfigError, LoadError, PatternError};
use crate::proximity::Rect;
use crate::renderer::SharedRenderer;
use crate::visibility::ElementId;
use crate::visibility::testing::ManualIntersections;

fn product(props: &Props) -> String {
  format!("product:{}", props["path"].as_str().unwrap_or_default())
}

fn page(props: &Props) -> String {
  format!("page:{}", props["path"].as_str().unwrap_or_default())
}

fn build(fetcher: &Arc<StubFetcher>, config: PrerenderConfig) -> Orchestrator<String> {
  Orchestrator::builder()
    .page("/product/[slug]", product)
    .page("/[slug]", page)
    .locales(["en", "de"])
    .config(config)
    .shared_fetcher(fetcher.clone())
    .build()
    .unwrap()
}

fn setup() -> (Orchestrator<String>, Arc<StubFetcher>) {
  let fetcher = Arc::new(StubFetcher::default());
  (build(&fetcher, PrerenderConfig::default()), fetcher)
}

fn en(path: &str) -> RoutingContext {
  RoutingContext::new(path, Some("en"))
}

fn live() -> String {
  "live".to_string()
}

async fn warm_up(orch: &Orchestrator<String>, href: &str) {
  orch.prefetch(href).unwrap().await;
  assert!(orch.pointer_over(href));
  orch.flush_transitions();
}

// -- Construction --

#[test]
fn build_requires_fetcher() {
  let err = Orchestrator::<String>::builder().page("/", page).build().err().unwrap();
  assert!(matches!(err, ConfigError::MissingFetcher));
}

#[test]
fn build_rejects_multi_wildcard_patterns() {
  let err = Orchestrator::<String>::builder()
    .page("/shop/*/item/*", page)
    .fetcher(StubFetcher::default())
    .build()
    .err()
    .unwrap();
  assert!(matches!(err, ConfigError::Pattern(PatternError::MultipleWildcards(_))));
}

#[test]
fn build_rejects_zero_capacity() {
  let config = PrerenderConfig { max_prerendered: 0, ..PrerenderConfig::default() };
  let err = Orchestrator::<String>::builder().config(config).fetcher(StubFetcher::default()).build().err().unwrap();
  assert!(matches!(err, ConfigError::ZeroCapacity));
}

// -- Link resolution and prefetch --

#[test]
fn resolves_only_registered_inbound_links() {
  let (orch, _) = setup();
  assert_eq!(orch.resolve_link("/de/product/red-shoe/").as_deref(), Some("/product/red-shoe"));
  assert_eq!(orch.resolve_link("/product/a?ref=home").as_deref(), Some("/product/a"));
  assert_eq!(orch.resolve_link("https://elsewhere.test/product/a"), None);
  assert_eq!(orch.resolve_link("/product/a/reviews"), None);
}

#[tokio::test]
async fn visible_links_fetch_once() {
  let (orch, fetcher) = setup();
  let mut updates = orch.updates();
  assert!(orch.link_visible("/product/a"));
  assert!(orch.link_visible("/en/product/a"));
  assert!(!orch.link_visible("/product/a/reviews"));

  updates.changed().await.unwrap();
  assert_eq!(fetcher.calls(), vec!["/product/a"]);
  assert_eq!(orch.path_state("/product/a"), PathState::Prefetching);
}

#[tokio::test]
async fn dropped_prefetch_leaves_path_fetchable() {
  let (orch, fetcher) = setup();
  drop(orch.prefetch("/product/a"));
  assert_eq!(orch.path_state("/product/a"), PathState::Cold);

  let mut updates = orch.updates();
  assert!(orch.link_visible("/product/a"));
  updates.changed().await.unwrap();
  assert_eq!(fetcher.calls(), vec!["/product/a", "/product/a"]);
  assert!(orch.cache().get("/product/a").is_some());
}

#[tokio::test]
async fn observed_links_fetch_on_first_intersection() {
  let fetcher = Arc::new(StubFetcher::default());
  let source = Arc::new(ManualIntersections::default());
  let orch: Orchestrator<String> = Orchestrator::builder()
    .page("/product/*", product)
    .shared_fetcher(fetcher.clone())
    .intersections(source.clone())
    .build()
    .unwrap();

  let link = CandidateLink {
    element: ElementId(7),
    href: "/product/a".into(),
    rect: Rect::new(0.0, 0.0, 10.0, 10.0),
  };
  assert!(orch.observe_link(&link));
  let outbound = CandidateLink { href: "https://elsewhere.test/x".into(), ..link.clone() };
  assert!(!orch.observe_link(&outbound));
  assert!(fetcher.calls().is_empty());

  let mut updates = orch.updates();
  source.report(ElementId(7), true);
  source.report(ElementId(7), true);
  updates.changed().await.unwrap();
  assert_eq!(fetcher.calls(), vec!["/product/a"]);
  assert_eq!(source.observed(), 0);
}

#[test]
fn links_are_not_observed_without_primitive() {
  let (orch, _) = setup();
  let link = CandidateLink { element: ElementId(1), href: "/product/a".into(), rect: Rect::default() };
  assert!(!orch.observe_link(&link));
}

// -- Warm set --

#[tokio::test]
async fn hover_warms_in_dispatch_order_and_protects_active() {
  let fetcher = Arc::new(StubFetcher::default());
  let config = PrerenderConfig { max_prerendered: 2, ..PrerenderConfig::default() };
  let orch = build(&fetcher, config);
  orch.navigate(en("/a"));

  assert!(orch.pointer_over("/a"));
  assert!(orch.pointer_over("/b"));
  assert!(orch.pointer_over("/c"));
  assert!(orch.warm_paths().is_empty());

  assert_eq!(orch.flush_transitions(), 3);
  assert_eq!(orch.warm_paths(), vec!["/a", "/c"]);
  assert_eq!(orch.path_state("/a"), PathState::Warm);
  assert_eq!(orch.path_state("/b"), PathState::Cold);
}

#[test]
fn hover_on_warm_path_is_ignored() {
  let (orch, _) = setup();
  orch.pointer_over("/product/a");
  orch.flush_transitions();
  assert!(!orch.pointer_over("/product/a"));
  assert!(!orch.pointer_over("/product/a/reviews"));
  assert_eq!(orch.flush_transitions(), 0);
}

#[tokio::test]
async fn background_driver_drains_queue() {
  let (orch, _) = setup();
  orch.navigate(en("/"));
  let _driver = orch.spawn_background();
  let mut updates = orch.updates();
  orch.pointer_over("/product/a");
  updates.changed().await.unwrap();
  assert_eq!(orch.warm_paths(), vec!["/product/a"]);
}

#[tokio::test]
async fn proximity_signal_fetches_then_queues_batch() {
  let (orch, fetcher) = setup();
  orch.navigate(en("/"));
  let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
  let mut groups = Grouped::new();
  groups.insert(
    "/product/[slug]".into(),
    vec![
      CandidateLink { element: ElementId(1), href: "/product/a".into(), rect },
      CandidateLink { element: ElementId(2), href: "/de/product/b".into(), rect },
    ],
  );
  groups.insert(
    "".into(),
    vec![CandidateLink { element: ElementId(3), href: "/product/a/reviews".into(), rect }],
  );

  orch.proximity_signal(groups).await;
  assert_eq!(fetcher.calls(), vec!["/product/a", "/product/b"]);
  assert!(orch.cache().get("/product/b").is_some());
  assert_eq!(orch.flush_transitions(), 1);
  assert_eq!(orch.warm_paths(), vec!["/product/a", "/product/b"]);
}

#[tokio::test]
async fn proximity_signal_skips_warm_paths() {
  let (orch, fetcher) = setup();
  warm_up(&orch, "/product/a").await;
  let mut groups = Grouped::new();
  groups.insert(
    "/product/[slug]".into(),
    vec![CandidateLink { element: ElementId(1), href: "/product/a".into(), rect: Rect::default() }],
  );
  orch.proximity_signal(groups).await;
  assert_eq!(orch.flush_transitions(), 0);
  assert_eq!(fetcher.calls().len(), 1);
}

struct FixedLinks(Vec<CandidateLink>);

impl LinkScanner for FixedLinks {
  fn scan(&self, prefixes: &[String]) -> Vec<CandidateLink> {
    self.0.iter().filter(|l| prefixes.iter().any(|p| l.href.starts_with(p))).cloned().collect()
  }
}

#[tokio::test(start_paused = true)]
async fn tracking_warms_links_near_pointer() {
  let (orch, _) = setup();
  orch.navigate(en("/"));
  let scanner = Arc::new(FixedLinks(vec![
    CandidateLink { element: ElementId(1), href: "/product/near".into(), rect: Rect::new(0.0, 0.0, 10.0, 10.0) },
    CandidateLink { element: ElementId(2), href: "/product/far".into(), rect: Rect::new(900.0, 900.0, 910.0, 910.0) },
  ]));
  let _driver = orch.spawn_background();
  let _tracking = orch.start_tracking(scanner.clone()).unwrap();
  assert!(orch.start_tracking(scanner).is_none());
  orch.pointer_moved(5.0, 5.0);

  let mut updates = orch.updates();
  tokio::time::timeout(Duration::from_secs(10), async {
    while orch.warm_paths().is_empty() {
      updates.changed().await.unwrap();
    }
  })
  .await
  .unwrap();
  assert_eq!(orch.warm_paths(), vec!["/product/near"]);
}

#[test]
fn touch_devices_are_not_tracked() {
  let fetcher = StubFetcher::default();
  let orch: Orchestrator<String> = Orchestrator::builder()
    .page("/product/*", product)
    .fetcher(fetcher)
    .device(DeviceProfile::desktop("Mozilla/5.0 (iPhone; CPU iPhone OS 17_0)"))
    .build()
    .unwrap();
  assert!(orch.start_tracking(Arc::new(FixedLinks(Vec::new()))).is_none());
}

#[test]
fn disabled_proximity_is_not_tracked() {
  let config = PrerenderConfig { proximity: ProximityOptions::disabled(), ..PrerenderConfig::default() };
  let orch = build(&Arc::new(StubFetcher::default()), config);
  assert!(orch.start_tracking(Arc::new(FixedLinks(Vec::new()))).is_none());
}

// -- Navigation --

#[test]
fn first_navigation_only_records() {
  let calls = Arc::new(AtomicUsize::new(0));
  let counter = Arc::clone(&calls);
  let orch: Orchestrator<String> = Orchestrator::builder()
    .page("/[slug]", page)
    .fetcher(StubFetcher::default())
    .on_resize(move || {
      counter.fetch_add(1, Ordering::SeqCst);
    })
    .build()
    .unwrap();

  assert_eq!(orch.navigate(en("/a")), NavigationEffects::default());
  assert_eq!(calls.load(Ordering::SeqCst), 0);
  assert_eq!(orch.active_path().as_deref(), Some("/a"));

  let effects = orch.navigate(en("/b"));
  assert!(effects.resized && !effects.cleared);
  assert_eq!(calls.load(Ordering::SeqCst), 1);

  orch.navigate(en("/b"));
  assert_eq!(calls.load(Ordering::SeqCst), 1);

  assert!(!orch.navigate(en("/c").server_render()).resized);
  assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn resize_can_be_disabled() {
  let config = PrerenderConfig { resize_on_path_change: false, ..PrerenderConfig::default() };
  let orch = build(&Arc::new(StubFetcher::default()), config);
  orch.navigate(en("/a"));
  assert!(!orch.navigate(en("/b")).resized);
}

#[tokio::test]
async fn locale_change_clears_everything() {
  let (orch, fetcher) = setup();
  orch.navigate(en("/"));
  warm_up(&orch, "/product/a").await;
  orch.pointer_over("/product/b");

  let effects = orch.navigate(RoutingContext::new("/", Some("de")));
  assert!(effects.cleared);
  assert!(orch.cache().is_empty());
  assert!(orch.warm_paths().is_empty());
  assert_eq!(orch.flush_transitions(), 0);
  assert_eq!(orch.path_state("/product/a"), PathState::Cold);

  // data is requested again, for the new locale
  orch.prefetch("/product/a").unwrap().await;
  assert_eq!(fetcher.calls().len(), 2);
  assert_eq!(orch.cache().get("/product/a").unwrap()["locale"], json!("de"));
}

#[tokio::test]
async fn locale_change_kept_when_reset_disabled() {
  let fetcher = Arc::new(StubFetcher::default());
  let config = PrerenderConfig { reset_on_locale_change: false, ..PrerenderConfig::default() };
  let orch = build(&fetcher, config);
  orch.navigate(en("/"));
  warm_up(&orch, "/product/a").await;
  assert!(!orch.navigate(RoutingContext::new("/", Some("de"))).cleared);
  assert_eq!(orch.warm_paths(), vec!["/product/a"]);
}

// -- Rendering --

#[test]
fn renders_live_without_warm_pages() {
  let (orch, _) = setup();
  orch.navigate(en("/product/a"));
  let frame = orch.render(live);
  assert_eq!(frame.slots.len(), 1);
  assert!(frame.is_live());
  assert_eq!(*frame.visible().unwrap().output, "live");
}

#[tokio::test]
async fn active_warm_page_replaces_live_render() {
  let (orch, _) = setup();
  orch.navigate(en("/"));
  warm_up(&orch, "/product/a").await;
  warm_up(&orch, "/about").await;

  let frame = orch.render(live);
  assert!(frame.is_live());
  assert_eq!(frame.prerendered().count(), 2);
  assert!(frame.prerendered().all(|slot| !slot.visible));

  orch.navigate(en("/en/product/a?ref=home"));
  let frame = orch.render(|| panic!("live render not needed"));
  let visible = frame.visible().unwrap();
  assert_eq!(visible.key, "/product/a");
  assert_eq!(*visible.output, "product:/product/a");
  assert_eq!(frame.slots.iter().filter(|slot| slot.visible).count(), 1);
  assert!(frame.slot(LIVE_SLOT_KEY).is_none());
}

#[tokio::test]
async fn warm_page_without_data_falls_back() {
  let (orch, _) = setup();
  orch.navigate(en("/"));
  orch.pointer_over("/product/a");
  orch.flush_transitions();
  orch.navigate(en("/product/a"));
  let frame = orch.render(live);
  assert!(frame.is_live());
  assert_eq!(frame.prerendered().count(), 0);
}

#[tokio::test]
async fn failed_data_falls_back() {
  let (orch, fetcher) = setup();
  fetcher.fail("/product/a", crate::errors::FetchError::http_status(500, "boom"));
  orch.navigate(en("/"));
  warm_up(&orch, "/product/a").await;
  orch.navigate(en("/product/a"));
  assert!(orch.render(live).is_live());
}

#[tokio::test]
async fn rerenders_reuse_output() {
  let (orch, _) = setup();
  orch.navigate(en("/"));
  warm_up(&orch, "/product/a").await;
  let first = orch.render(live);
  let second = orch.render(live);
  let a = &first.slot("/product/a").unwrap().output;
  let b = &second.slot("/product/a").unwrap().output;
  assert!(Arc::ptr_eq(a, b));
}

#[tokio::test]
async fn lazy_page_renders_once_loaded() {
  let fetcher = Arc::new(StubFetcher::default());
  let orch: Orchestrator<String> = Orchestrator::builder()
    .lazy_page("/product/[slug]", || async { Ok(Arc::new(product) as SharedRenderer<String>) })
    .shared_fetcher(fetcher)
    .build()
    .unwrap();
  orch.navigate(en("/"));
  warm_up(&orch, "/product/a").await;
  orch.navigate(en("/product/a"));
  assert_eq!(orch.renderer_state("/product/a"), Some(LoadState::Idle));

  let mut updates = orch.updates();
  assert!(orch.render(live).is_live());
  assert_eq!(orch.renderer_state("/product/a"), Some(LoadState::Loading));

  updates.changed().await.unwrap();
  let frame = orch.render(live);
  assert_eq!(*frame.visible().unwrap().output, "product:/product/a");
}

#[tokio::test]
async fn lazy_page_failure_always_falls_back() {
  let orch: Orchestrator<String> = Orchestrator::builder()
    .lazy_page("/product/[slug]", || async { Err(LoadError("chunk missing".into())) })
    .fetcher(StubFetcher::default())
    .build()
    .unwrap();
  orch.navigate(en("/"));
  warm_up(&orch, "/product/a").await;
  orch.navigate(en("/product/a"));

  let mut updates = orch.updates();
  assert!(orch.render(live).is_live());
  updates.changed().await.unwrap();
  assert_eq!(orch.renderer_state("/product/a"), Some(LoadState::Failed));
  assert!(orch.render(live).is_live());
}
