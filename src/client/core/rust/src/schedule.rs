/* src/client/core/rust/src/schedule.rs */

use std::collections::VecDeque;

use parking_lot::Mutex;
use tokio::sync::Notify;

/// FIFO of non-urgent warm-set additions. Batches run in dispatch order when
/// drained; an urgent clear drops whatever is still queued.
#[derive(Default)]
pub struct TransitionQueue {
  batches: Mutex<VecDeque<Vec<String>>>,
  wake: Notify,
}

impl TransitionQueue {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&self, batch: Vec<String>) {
    if batch.is_empty() {
      return;
    }
    self.batches.lock().push_back(batch);
    self.wake.notify_one();
  }

  /// Take every queued batch, oldest first.
  pub fn drain(&self) -> Vec<Vec<String>> {
    self.batches.lock().drain(..).collect()
  }

  /// Drop every queued batch; returns how many were dropped.
  pub fn supersede(&self) -> usize {
    let mut batches = self.batches.lock();
    let dropped = batches.len();
    batches.clear();
    dropped
  }

  pub fn len(&self) -> usize {
    self.batches.lock().len()
  }

  pub fn is_empty(&self) -> bool {
    self.batches.lock().is_empty()
  }

  /// Resolves once something was pushed since the last wake-up.
  pub async fn pushed(&self) {
    self.wake.notified().await;
  }
}
