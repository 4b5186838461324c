/* src/client/core/rust/src/orchestrator/mod.rs */

// Ties the sensors, the data cache and the warm set together and decides
// what the host mounts on every render.

mod builder;
mod render;

#[cfg(test)]
mod tests;

use std::future::Future;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

pub use builder::OrchestratorBuilder;
pub use render::{Frame, LIVE_SLOT_KEY, Slot, SlotKind};

use render::RenderMemo;

use crate::config::PrerenderConfig;
use crate::context::RoutingContext;
use crate::data::{FetchOutcome, PageDataCache};
use crate::proximity::{
  CandidateLink, DeviceProfile, Grouped, LinkScanner, PointerState, ProximityTracker, TrackHandle,
};
use crate::renderer::{LoadState, RendererSlot};
use crate::revision::Revision;
use crate::route::{LocaleNormalizer, PageRegistry, canonical_path, inbound_path};
use crate::schedule::TransitionQueue;
use crate::visibility::VisibilitySensor;
use crate::warm_set::{WarmAction, WarmSet};

pub(crate) type ResizeHook = Box<dyn Fn() + Send + Sync>;

/// Where a path stands in the prerender pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathState {
  Cold,
  /// Data requested or held, page not prerendered.
  Prefetching,
  Warm,
}

/// What a `navigate` call did besides recording the context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NavigationEffects {
  /// Cache, warm set and queued transitions were dropped (locale change).
  pub cleared: bool,
  /// The resize hook fired (path change).
  pub resized: bool,
}

#[derive(Default)]
struct Routing {
  ctx: Option<RoutingContext>,
  active: Option<String>,
}

struct Shared<O> {
  config: PrerenderConfig,
  pages: PageRegistry<RendererSlot<O>>,
  normalizer: LocaleNormalizer,
  cache: PageDataCache,
  warm: Mutex<WarmSet>,
  queue: TransitionQueue,
  revision: Revision,
  routing: Mutex<Routing>,
  sensor: VisibilitySensor,
  tracker: ProximityTracker,
  device: DeviceProfile,
  on_resize: Option<ResizeHook>,
  memo: Mutex<RenderMemo<O>>,
}

/// Aborts the transition driver when dropped.
pub struct BackgroundHandle {
  task: JoinHandle<()>,
}

impl Drop for BackgroundHandle {
  fn drop(&mut self) {
    self.task.abort();
  }
}

/// Prerender scheduler for one host application. Cheap to clone; clones
/// share all state.
pub struct Orchestrator<O> {
  shared: Arc<Shared<O>>,
}

impl<O> Clone for Orchestrator<O> {
  fn clone(&self) -> Self {
    Self { shared: Arc::clone(&self.shared) }
  }
}

impl<O: Send + Sync + 'static> Orchestrator<O> {
  pub fn builder() -> OrchestratorBuilder<O> {
    OrchestratorBuilder::new()
  }

  pub fn config(&self) -> &PrerenderConfig {
    &self.shared.config
  }

  pub fn cache(&self) -> &PageDataCache {
    &self.shared.cache
  }

  pub fn pointer(&self) -> &PointerState {
    self.shared.tracker.pointer()
  }

  /// Forward of the host's pointer-move listener.
  pub fn pointer_moved(&self, x: f64, y: f64) {
    self.shared.tracker.pointer().moved(x, y);
  }

  /// Coalesced change notifications: data landed, warm set changed, or a
  /// clear happened. Re-render on every change.
  pub fn updates(&self) -> watch::Receiver<u64> {
    self.shared.revision.subscribe()
  }

  pub fn warm_paths(&self) -> Vec<String> {
    self.shared.warm.lock().paths().to_vec()
  }

  /// Canonical form of the current path, once a context was recorded.
  pub fn active_path(&self) -> Option<String> {
    self.shared.routing.lock().active.clone()
  }

  /// Canonical path for an inbound `href` that has a registered page.
  pub fn resolve_link(&self, href: &str) -> Option<String> {
    self.shared.resolve_link(href)
  }

  pub fn path_state(&self, path: &str) -> PathState {
    let path = canonical_path(path, &self.shared.normalizer);
    if self.shared.warm.lock().contains(&path) {
      PathState::Warm
    } else if self.shared.cache.contains(&path) {
      PathState::Prefetching
    } else {
      PathState::Cold
    }
  }

  /// Renderer state of the page registered for `path`.
  pub fn renderer_state(&self, path: &str) -> Option<LoadState> {
    let path = canonical_path(path, &self.shared.normalizer);
    self.shared.pages.match_page(&path).map(|m| m.page.target.state())
  }

  // -- Event sources --

  /// Prefetch `link`'s data the first time it scrolls into view. Returns
  /// `false` for outbound or unregistered links, or when no intersection
  /// primitive exists.
  pub fn observe_link(&self, link: &CandidateLink) -> bool {
    let Some(path) = self.shared.resolve_link(&link.href) else {
      return false;
    };
    let shared = Arc::downgrade(&self.shared);
    self.shared.sensor.once_visible(link.element, move || {
      if let Some(shared) = Weak::upgrade(&shared) {
        shared.prefetch_detached(&path);
      }
    })
  }

  /// `href` entered the viewport: prefetch its data in the background.
  pub fn link_visible(&self, href: &str) -> bool {
    match self.shared.resolve_link(href) {
      Some(path) => self.shared.prefetch_detached(&path),
      None => false,
    }
  }

  /// Awaitable form of [`Orchestrator::link_visible`]. Dropping the future
  /// unpolled releases the path again.
  #[must_use]
  pub fn prefetch(&self, href: &str) -> Option<impl Future<Output = FetchOutcome> + Send + use<O>> {
    let path = self.shared.resolve_link(href)?;
    Some(self.shared.cache.fetch(&path, &self.shared.fetch_context()))
  }

  /// Pointer entered a link: prerender its page at low priority.
  pub fn pointer_over(&self, href: &str) -> bool {
    let Some(path) = self.shared.resolve_link(href) else {
      return false;
    };
    if self.shared.warm.lock().contains(&path) {
      return false;
    }
    self.shared.queue.push(vec![path]);
    true
  }

  /// Links the proximity tracker found closest to the pointer. Fetches the
  /// registered, not yet warm ones, then queues a single prerender batch
  /// once every fetch has settled.
  pub fn proximity_signal(&self, groups: Grouped) -> impl Future<Output = ()> + Send + use<O> {
    let shared = Arc::clone(&self.shared);
    let mut paths: Vec<String> = Vec::new();
    {
      let warm = shared.warm.lock();
      for link in groups.values().flatten() {
        if let Some(path) = shared.resolve_link(&link.href)
          && !warm.contains(&path)
          && !paths.contains(&path)
        {
          paths.push(path);
        }
      }
    }
    let fetches = shared.cache.fetch_many(&paths, &shared.fetch_context());
    async move {
      if paths.is_empty() {
        return;
      }
      fetches.await;
      debug!(count = paths.len(), "queueing proximity prerender");
      shared.queue.push(paths);
    }
  }

  /// Start sampling pointer proximity. `None` on touch devices, when
  /// disabled, or when already started.
  pub fn start_tracking(&self, scanner: Arc<dyn LinkScanner>) -> Option<TrackHandle> {
    if self.shared.device.is_touchable() {
      debug!("touch device, proximity tracking skipped");
      return None;
    }
    let for_grouper = Arc::downgrade(&self.shared);
    let for_callback = Arc::downgrade(&self.shared);
    self.shared.tracker.track(
      scanner,
      move |link| {
        let shared = for_grouper.upgrade()?;
        let path = shared.resolve_link(&link.href)?;
        shared.pages.match_page(&path).map(|m| m.page.pattern.template().to_string())
      },
      move |groups| {
        if let Some(shared) = for_callback.upgrade() {
          tokio::spawn(Orchestrator { shared }.proximity_signal(groups));
        }
      },
    )
  }

  /// Record the host's routing state after a navigation. The first call only
  /// records; later calls react to locale and path changes.
  pub fn navigate(&self, ctx: RoutingContext) -> NavigationEffects {
    let active = canonical_path(&ctx.path, &self.shared.normalizer);
    let previous = {
      let mut routing = self.shared.routing.lock();
      routing.active = Some(active);
      routing.ctx.replace(ctx.clone())
    };
    let Some(previous) = previous else {
      self.shared.revision.bump();
      return NavigationEffects::default();
    };

    let mut effects = NavigationEffects::default();
    let config = &self.shared.config;
    if previous.locale != ctx.locale && config.reset_on_locale_change {
      self.shared.reset();
      effects.cleared = true;
    }
    if previous.path != ctx.path {
      if config.resize_on_path_change && !ctx.is_server_render {
        if let Some(hook) = &self.shared.on_resize {
          hook();
        }
        effects.resized = true;
      }
      self.shared.revision.bump();
    }
    effects
  }

  /// Apply queued prerender batches in dispatch order. Returns how many were
  /// applied.
  pub fn flush_transitions(&self) -> usize {
    self.shared.flush()
  }

  /// Drain the transition queue in the background, yielding to other tasks
  /// before each drain. Must be called inside a tokio runtime.
  pub fn spawn_background(&self) -> BackgroundHandle {
    let shared = Arc::clone(&self.shared);
    let task = tokio::spawn(async move {
      loop {
        shared.queue.pushed().await;
        tokio::task::yield_now().await;
        shared.flush();
      }
    });
    BackgroundHandle { task }
  }

  // -- Rendering --

  /// Slots to mount for the current state: every warm page whose renderer
  /// and data are ready, hidden unless active, then the `live` render when
  /// no prerendered page is active.
  pub fn render(&self, live: impl FnOnce() -> O) -> Frame<O> {
    let shared = &self.shared;
    let active = self.active_path();
    let warm = self.warm_paths();
    let mut slots = Vec::with_capacity(warm.len() + 1);

    for path in &warm {
      let Some(matched) = shared.pages.match_page(path) else {
        continue;
      };
      let Some(renderer) = matched.page.target.resolve(&shared.revision) else {
        continue;
      };
      let Some(props) = shared.cache.get(path) else {
        continue;
      };
      let cached = shared.memo.lock().lookup(path, &props);
      let output = match cached {
        Some(output) => output,
        None => {
          let output = Arc::new(renderer.render(&props));
          shared.memo.lock().store(path, props, Arc::clone(&output));
          output
        }
      };
      let visible = active.as_deref() == Some(path.as_str());
      slots.push(Slot { key: path.clone(), kind: SlotKind::Prerendered, visible, output });
    }
    shared.memo.lock().retain(&warm);

    if !slots.iter().any(|slot| slot.visible) {
      slots.push(Slot {
        key: LIVE_SLOT_KEY.to_string(),
        kind: SlotKind::Live,
        visible: true,
        output: Arc::new(live()),
      });
    }
    Frame { slots }
  }
}

impl<O> Shared<O> {
  fn resolve_link(&self, href: &str) -> Option<String> {
    let path = inbound_path(href, &self.config.origin)?;
    let path = self.normalizer.drop_locale(&path).into_owned();
    self.pages.is_registered(&path).then_some(path)
  }

  fn fetch_context(&self) -> RoutingContext {
    self.routing.lock().ctx.clone().unwrap_or_default()
  }

  /// Claim and fetch `path` on the current runtime. Without a runtime
  /// nothing is claimed.
  fn prefetch_detached(&self, path: &str) -> bool {
    let Ok(handle) = Handle::try_current() else {
      warn!(path, "no async runtime, prefetch skipped");
      return false;
    };
    handle.spawn(self.cache.fetch(path, &self.fetch_context()));
    true
  }

  fn flush(&self) -> usize {
    let batches = self.queue.drain();
    if batches.is_empty() {
      return 0;
    }
    let active = self.routing.lock().active.clone().unwrap_or_default();
    let changed = {
      let mut warm = self.warm.lock();
      let before = warm.paths().to_vec();
      for batch in &batches {
        warm.apply(&WarmAction::Add(batch.clone()), &active);
      }
      warm.paths() != before.as_slice()
    };
    if changed {
      self.revision.bump();
    }
    batches.len()
  }

  /// Urgent: drop data, prerendered pages and anything still queued.
  fn reset(&self) {
    let dropped = self.queue.supersede();
    self.warm.lock().apply(&WarmAction::Clear, "");
    self.memo.lock().clear();
    self.cache.clear();
    debug!(dropped, "prerender state reset");
  }
}
