/* src/client/core/rust/src/proximity/tracker.rs */

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

use super::geometry::{Point, Rect, pointer_distance};
use crate::config::ProximityOptions;
use crate::visibility::ElementId;

/// A link element seen during a scan of the document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLink {
  pub element: ElementId,
  pub href: String,
  pub rect: Rect,
}

/// Links grouped by destination page, nearest first within each group.
pub type Grouped = BTreeMap<String, Vec<CandidateLink>>;

/// Host-side document scan.
pub trait LinkScanner: Send + Sync {
  /// Links whose `href` attribute starts with any of `prefixes`, with their
  /// current bounding boxes.
  fn scan(&self, prefixes: &[String]) -> Vec<CandidateLink>;
}

/// Last known pointer position; `None` until the first move event.
#[derive(Debug, Clone, Default)]
pub struct PointerState {
  position: Arc<Mutex<Option<Point>>>,
}

impl PointerState {
  pub fn moved(&self, x: f64, y: f64) {
    *self.position.lock() = Some(Point::new(x, y));
  }

  pub fn position(&self) -> Option<Point> {
    *self.position.lock()
  }
}

/// Group `links` by `grouper`, drop those farther than `max_distance`, and
/// keep the `n_closest` nearest per group. Without a pointer position no
/// distance is computable and no groups are produced.
pub fn closest_to_pointer<G>(
  links: Vec<CandidateLink>,
  grouper: G,
  pointer: Option<Point>,
  options: &ProximityOptions,
) -> Grouped
where
  G: Fn(&CandidateLink) -> Option<String>,
{
  let Some(pointer) = pointer else {
    return Grouped::new();
  };

  let mut measured: BTreeMap<String, Vec<(f64, CandidateLink)>> = BTreeMap::new();
  for link in links {
    let Some(key) = grouper(&link) else {
      continue;
    };
    let distance = pointer_distance(&link.rect, pointer, options.relative_to);
    if let Some(max) = options.max_distance()
      && distance > max
    {
      continue;
    }
    let key = if options.group_by_page { key } else { String::new() };
    measured.entry(key).or_default().push((distance, link));
  }

  measured
    .into_iter()
    .map(|(key, mut group)| {
      group.sort_by(|a, b| a.0.total_cmp(&b.0));
      if let Some(n) = options.n_closest() {
        group.truncate(n);
      }
      (key, group.into_iter().map(|(_, link)| link).collect())
    })
    .collect()
}

/// Aborts the sampling task when dropped.
pub struct TrackHandle {
  task: JoinHandle<()>,
}

impl TrackHandle {
  pub fn is_finished(&self) -> bool {
    self.task.is_finished()
  }
}

impl Drop for TrackHandle {
  fn drop(&mut self) {
    self.task.abort();
  }
}

/// Periodically samples which links sit closest to the pointer.
pub struct ProximityTracker {
  options: ProximityOptions,
  pointer: PointerState,
  started: AtomicBool,
}

impl ProximityTracker {
  pub fn new(options: ProximityOptions, pointer: PointerState) -> Self {
    Self { options, pointer, started: AtomicBool::new(false) }
  }

  pub fn options(&self) -> &ProximityOptions {
    &self.options
  }

  pub fn pointer(&self) -> &PointerState {
    &self.pointer
  }

  /// One scan + grouping pass at the current pointer position.
  pub fn sample<G>(&self, scanner: &dyn LinkScanner, grouper: G) -> Grouped
  where
    G: Fn(&CandidateLink) -> Option<String>,
  {
    let Some(pointer) = self.pointer.position() else {
      return Grouped::new();
    };
    let links = scanner.scan(&self.options.included_path_prefixes);
    closest_to_pointer(links, grouper, Some(pointer), &self.options)
  }

  /// Start sampling every `interval_ms`. Only the first call on a tracker
  /// starts a task; later calls (and disabled options) return `None`.
  /// Must be called inside a tokio runtime.
  pub fn track<G, C>(
    &self,
    scanner: Arc<dyn LinkScanner>,
    grouper: G,
    callback: C,
  ) -> Option<TrackHandle>
  where
    G: Fn(&CandidateLink) -> Option<String> + Send + Sync + 'static,
    C: Fn(Grouped) + Send + Sync + 'static,
  {
    if !self.options.enabled {
      return None;
    }
    if self.started.swap(true, Ordering::SeqCst) {
      debug!("proximity tracker already running");
      return None;
    }

    let options = self.options.clone();
    let pointer = self.pointer.clone();
    let task = tokio::spawn(async move {
      let mut ticker = tokio::time::interval(options.interval());
      ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
      // first tick completes immediately; sampling starts one interval in
      ticker.tick().await;
      loop {
        ticker.tick().await;
        let Some(position) = pointer.position() else {
          continue;
        };
        let links = scanner.scan(&options.included_path_prefixes);
        callback(closest_to_pointer(links, &grouper, Some(position), &options));
      }
    });
    Some(TrackHandle { task })
  }

  pub fn is_started(&self) -> bool {
    self.started.load(Ordering::SeqCst)
  }
}
