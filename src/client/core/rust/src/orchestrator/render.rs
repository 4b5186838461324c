/* src/client/core/rust/src/orchestrator/render.rs */

use std::collections::HashMap;
use std::sync::Arc;

use crate::data::Props;

/// Key of the live fallback slot.
pub const LIVE_SLOT_KEY: &str = "__live";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotKind {
  /// Rendered ahead of time from prefetched props, hidden unless active.
  Prerendered,
  /// The host's own render of the current page.
  Live,
}

#[derive(Debug)]
pub struct Slot<O> {
  pub key: String,
  pub kind: SlotKind,
  pub visible: bool,
  pub output: Arc<O>,
}

impl<O> Clone for Slot<O> {
  fn clone(&self) -> Self {
    Self { key: self.key.clone(), kind: self.kind, visible: self.visible, output: Arc::clone(&self.output) }
  }
}

/// Everything the host mounts for one render pass, in order. Exactly one
/// slot is visible.
#[derive(Debug)]
pub struct Frame<O> {
  pub slots: Vec<Slot<O>>,
}

impl<O> Frame<O> {
  pub fn visible(&self) -> Option<&Slot<O>> {
    self.slots.iter().find(|slot| slot.visible)
  }

  pub fn is_live(&self) -> bool {
    self.visible().is_some_and(|slot| slot.kind == SlotKind::Live)
  }

  pub fn prerendered(&self) -> impl Iterator<Item = &Slot<O>> {
    self.slots.iter().filter(|slot| slot.kind == SlotKind::Prerendered)
  }

  pub fn slot(&self, key: &str) -> Option<&Slot<O>> {
    self.slots.iter().find(|slot| slot.key == key)
  }
}

/// Last output per path, reused while the props `Arc` is unchanged.
pub(super) struct RenderMemo<O> {
  entries: HashMap<String, (Props, Arc<O>)>,
}

impl<O> RenderMemo<O> {
  pub(super) fn new() -> Self {
    Self { entries: HashMap::new() }
  }

  pub(super) fn lookup(&self, path: &str, props: &Props) -> Option<Arc<O>> {
    let (cached, output) = self.entries.get(path)?;
    Arc::ptr_eq(cached, props).then(|| Arc::clone(output))
  }

  pub(super) fn store(&mut self, path: &str, props: Props, output: Arc<O>) {
    self.entries.insert(path.to_string(), (props, output));
  }

  /// Forget paths that left the warm set.
  pub(super) fn retain(&mut self, warm: &[String]) {
    self.entries.retain(|path, _| warm.iter().any(|w| w == path));
  }

  pub(super) fn clear(&mut self) {
    self.entries.clear();
  }
}
