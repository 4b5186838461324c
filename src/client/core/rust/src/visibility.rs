/* src/client/core/rust/src/visibility.rs */

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Opaque host handle for an observed element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservationId(pub u64);

/// Receives `true` when the element intersects the viewport, `false` when it leaves.
pub type IntersectionCallback = Box<dyn FnMut(bool) + Send>;

/// Element-intersection primitive supplied by the host.
///
/// `observe` returns `None` when the primitive is unavailable. Implementations
/// must tolerate `unobserve` being called from inside a callback.
pub trait IntersectionSource: Send + Sync {
  fn observe(&self, element: ElementId, callback: IntersectionCallback) -> Option<ObservationId>;
  fn unobserve(&self, id: ObservationId);
}

/// Source for environments without an intersection primitive.
pub struct NoIntersection;

impl IntersectionSource for NoIntersection {
  fn observe(&self, _element: ElementId, _callback: IntersectionCallback) -> Option<ObservationId> {
    None
  }

  fn unobserve(&self, _id: ObservationId) {}
}

struct OnceState {
  callback: Option<Box<dyn FnOnce() + Send>>,
  id: Option<ObservationId>,
  fired: bool,
}

#[derive(Clone)]
pub struct VisibilitySensor {
  source: Arc<dyn IntersectionSource>,
}

impl VisibilitySensor {
  pub fn new(source: Arc<dyn IntersectionSource>) -> Self {
    Self { source }
  }

  /// Fire `callback` exactly once, the first time `element` enters the
  /// viewport, then stop observing. Returns `false` (and never fires) when
  /// the source cannot observe.
  pub fn once_visible<F>(&self, element: ElementId, callback: F) -> bool
  where
    F: FnOnce() + Send + 'static,
  {
    let state = Arc::new(Mutex::new(OnceState {
      callback: Some(Box::new(callback)),
      id: None,
      fired: false,
    }));
    let source: Weak<dyn IntersectionSource> = Arc::downgrade(&self.source);

    let shared = Arc::clone(&state);
    let on_intersect: IntersectionCallback = Box::new(move |intersecting| {
      if !intersecting {
        return;
      }
      let (callback, id) = {
        let mut guard = shared.lock();
        guard.fired = true;
        (guard.callback.take(), guard.id)
      };
      if let (Some(id), Some(source)) = (id, source.upgrade()) {
        source.unobserve(id);
      }
      if let Some(callback) = callback {
        callback();
      }
    });

    let Some(id) = self.source.observe(element, on_intersect) else {
      debug!(element = element.0, "intersection primitive unavailable, link not observed");
      return false;
    };

    let fired = {
      let mut guard = state.lock();
      guard.id = Some(id);
      guard.fired
    };
    // Reported synchronously from inside `observe`, before the id was known.
    if fired {
      self.source.unobserve(id);
    }
    true
  }
}
