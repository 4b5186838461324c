/* src/client/core/rust/src/orchestrator/builder.rs */

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;

use super::render::RenderMemo;
use super::{Orchestrator, ResizeHook, Routing, Shared};
use crate::config::PrerenderConfig;
use crate::data::{PageDataCache, PageDataFetcher};
use crate::errors::{ConfigError, LoadError};
use crate::proximity::{DeviceProfile, PointerState, ProximityTracker};
use crate::renderer::{LazyRenderer, PageRenderer, RendererSlot, SharedRenderer};
use crate::revision::Revision;
use crate::route::{LocaleNormalizer, PageRegistry};
use crate::schedule::TransitionQueue;
use crate::visibility::{IntersectionSource, NoIntersection, VisibilitySensor};
use crate::warm_set::WarmSet;

pub struct OrchestratorBuilder<O> {
  pages: Vec<(String, RendererSlot<O>)>,
  config: PrerenderConfig,
  fetcher: Option<Arc<dyn PageDataFetcher>>,
  locales: Option<Vec<String>>,
  intersections: Option<Arc<dyn IntersectionSource>>,
  device: DeviceProfile,
  on_resize: Option<ResizeHook>,
}

impl<O: Send + Sync + 'static> OrchestratorBuilder<O> {
  pub(super) fn new() -> Self {
    Self {
      pages: Vec::new(),
      config: PrerenderConfig::default(),
      fetcher: None,
      locales: None,
      intersections: None,
      device: DeviceProfile::default(),
      on_resize: None,
    }
  }

  /// Register a page whose renderer is available up front. Patterns are
  /// matched in registration order.
  pub fn page(mut self, pattern: &str, renderer: impl PageRenderer<O> + 'static) -> Self {
    self.pages.push((pattern.to_string(), RendererSlot::Eager(Arc::new(renderer))));
    self
  }

  /// Register a page whose renderer is loaded on first need.
  pub fn lazy_page<F, Fut>(mut self, pattern: &str, loader: F) -> Self
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<SharedRenderer<O>, LoadError>> + Send + 'static,
  {
    self.pages.push((pattern.to_string(), RendererSlot::Lazy(LazyRenderer::new(loader))));
    self
  }

  pub fn config(mut self, config: PrerenderConfig) -> Self {
    self.config = config;
    self
  }

  pub fn fetcher(mut self, fetcher: impl PageDataFetcher + 'static) -> Self {
    self.fetcher = Some(Arc::new(fetcher));
    self
  }

  pub fn shared_fetcher(mut self, fetcher: Arc<dyn PageDataFetcher>) -> Self {
    self.fetcher = Some(fetcher);
    self
  }

  /// Overrides `config.locales`.
  pub fn locales<I, S>(mut self, locales: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.locales = Some(locales.into_iter().map(Into::into).collect());
    self
  }

  pub fn intersections(mut self, source: Arc<dyn IntersectionSource>) -> Self {
    self.intersections = Some(source);
    self
  }

  pub fn device(mut self, device: DeviceProfile) -> Self {
    self.device = device;
    self
  }

  pub fn on_resize(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
    self.on_resize = Some(Box::new(hook));
    self
  }

  pub fn build(self) -> Result<Orchestrator<O>, ConfigError> {
    let mut config = self.config;
    if let Some(locales) = self.locales {
      config.locales = locales;
    }
    config.validate()?;

    let fetcher = self.fetcher.ok_or(ConfigError::MissingFetcher)?;
    let mut pages = PageRegistry::new();
    for (pattern, slot) in self.pages {
      pages.register(&pattern, slot)?;
    }
    let normalizer = LocaleNormalizer::new(config.locales.iter().map(String::as_str))?;

    let revision = Revision::new();
    let intersections = self.intersections.unwrap_or_else(|| Arc::new(NoIntersection));
    let shared = Shared {
      cache: PageDataCache::with_revision(fetcher, revision.clone()),
      warm: Mutex::new(WarmSet::new(config.max_prerendered)),
      queue: TransitionQueue::new(),
      routing: Mutex::new(Routing::default()),
      sensor: VisibilitySensor::new(intersections),
      tracker: ProximityTracker::new(config.proximity.clone(), PointerState::default()),
      memo: Mutex::new(RenderMemo::new()),
      device: self.device,
      on_resize: self.on_resize,
      pages,
      normalizer,
      revision,
      config,
    };
    Ok(Orchestrator { shared: Arc::new(shared) })
  }
}
