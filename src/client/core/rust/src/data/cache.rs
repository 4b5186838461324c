/* src/client/core/rust/src/data/cache.rs */

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use futures_util::future::join_all;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::{debug, warn};

use super::fetcher::PageDataFetcher;
use crate::context::RoutingContext;
use crate::errors::FetchError;
use crate::revision::Revision;

/// Shared, immutable page props.
pub type Props = Arc<Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
  Pending,
  Ready,
  Failed,
}

#[derive(Debug, Clone)]
pub struct PageDataEntry {
  pub state: EntryState,
  pub props: Option<Props>,
  pub requested_at: Instant,
  pub completed_at: Option<Instant>,
  pub error: Option<FetchError>,
}

impl PageDataEntry {
  fn pending() -> Self {
    Self {
      state: EntryState::Pending,
      props: None,
      requested_at: Instant::now(),
      completed_at: None,
      error: None,
    }
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
  /// Request issued and props stored.
  Fetched,
  /// An entry already existed; no request.
  Skipped,
  /// Request failed; the entry is now `Failed`.
  Failed,
  /// The cache was cleared while the request was in flight.
  Discarded,
}

struct CacheState {
  generation: u64,
  entries: HashMap<String, PageDataEntry>,
}

struct CacheInner {
  fetcher: Arc<dyn PageDataFetcher>,
  state: Mutex<CacheState>,
  revision: Revision,
}

/// Canonical path -> fetched props. One request per path per generation;
/// `clear` starts a new generation.
#[derive(Clone)]
pub struct PageDataCache {
  inner: Arc<CacheInner>,
}

impl PageDataCache {
  pub fn new(fetcher: Arc<dyn PageDataFetcher>) -> Self {
    Self::with_revision(fetcher, Revision::new())
  }

  pub fn with_revision(fetcher: Arc<dyn PageDataFetcher>, revision: Revision) -> Self {
    let state = CacheState { generation: 0, entries: HashMap::new() };
    Self { inner: Arc::new(CacheInner { fetcher, state: Mutex::new(state), revision }) }
  }

  /// Claim `path` and request its props. The `Pending` claim is taken before
  /// this returns, so a second call for the same path (even before the first
  /// future is polled) resolves to `Skipped` without a request. Failures are
  /// recorded on the entry, never returned as errors. Dropping the future
  /// before it settles releases the claim.
  pub fn fetch(
    &self,
    path: &str,
    ctx: &RoutingContext,
  ) -> impl Future<Output = FetchOutcome> + Send + use<> {
    let claim = {
      let mut state = self.inner.state.lock();
      if state.entries.contains_key(path) {
        None
      } else {
        state.entries.insert(path.to_string(), PageDataEntry::pending());
        Some(Claim::new(Arc::clone(&self.inner), path, state.generation))
      }
    };
    let request = claim.map(|claim| (claim, self.inner.fetcher.fetch(path, ctx)));

    async move {
      let Some((mut claim, request)) = request else {
        return FetchOutcome::Skipped;
      };
      debug!(path = %claim.path, "prefetching page data");
      let result = request.await;
      claim.settle(result)
    }
  }

  /// Fetch several distinct paths concurrently; every request settles.
  pub fn fetch_many(
    &self,
    paths: &[String],
    ctx: &RoutingContext,
  ) -> impl Future<Output = Vec<FetchOutcome>> + Send + use<> {
    let requests: Vec<_> = paths.iter().map(|path| self.fetch(path, ctx)).collect();
    join_all(requests)
  }

  /// Props, only once the entry is `Ready`.
  pub fn get(&self, path: &str) -> Option<Props> {
    let state = self.inner.state.lock();
    let entry = state.entries.get(path)?;
    match entry.state {
      EntryState::Ready => entry.props.clone(),
      EntryState::Pending | EntryState::Failed => None,
    }
  }

  pub fn state(&self, path: &str) -> Option<EntryState> {
    self.inner.state.lock().entries.get(path).map(|entry| entry.state)
  }

  pub fn entry(&self, path: &str) -> Option<PageDataEntry> {
    self.inner.state.lock().entries.get(path).cloned()
  }

  pub fn contains(&self, path: &str) -> bool {
    self.inner.state.lock().entries.contains_key(path)
  }

  /// Drop every entry. In-flight requests of the old generation will not
  /// write back.
  pub fn clear(&self) {
    {
      let mut state = self.inner.state.lock();
      state.generation += 1;
      state.entries.clear();
    }
    debug!("page data cache cleared");
    self.inner.revision.bump();
  }

  pub fn len(&self) -> usize {
    self.inner.state.lock().entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.inner.state.lock().entries.is_empty()
  }

  pub fn generation(&self) -> u64 {
    self.inner.state.lock().generation
  }

  pub fn revision(&self) -> &Revision {
    &self.inner.revision
  }
}

/// A `Pending` entry owned by one in-flight fetch.
struct Claim {
  inner: Arc<CacheInner>,
  path: String,
  generation: u64,
  settled: bool,
}

impl Claim {
  fn new(inner: Arc<CacheInner>, path: &str, generation: u64) -> Self {
    Self { inner, path: path.to_string(), generation, settled: false }
  }

  fn settle(&mut self, result: Result<Value, FetchError>) -> FetchOutcome {
    self.settled = true;
    self.inner.complete(&self.path, self.generation, result)
  }
}

impl Drop for Claim {
  fn drop(&mut self) {
    if self.settled {
      return;
    }
    let released = {
      let mut state = self.inner.state.lock();
      let pending = state.generation == self.generation
        && state.entries.get(&self.path).is_some_and(|entry| entry.state == EntryState::Pending);
      if pending {
        state.entries.remove(&self.path);
      }
      pending
    };
    if released {
      debug!(path = %self.path, "page data fetch dropped before settling, claim released");
    }
  }
}

impl CacheInner {
  fn complete(&self, path: &str, generation: u64, result: Result<Value, FetchError>) -> FetchOutcome {
    let outcome = {
      let mut state = self.state.lock();
      if state.generation != generation {
        debug!(path, "dropping page data fetched before a cache clear");
        return FetchOutcome::Discarded;
      }
      let Some(entry) = state.entries.get_mut(path) else {
        return FetchOutcome::Discarded;
      };
      entry.completed_at = Some(Instant::now());
      match result {
        Ok(props) => {
          entry.state = EntryState::Ready;
          entry.props = Some(Arc::new(props));
          FetchOutcome::Fetched
        }
        Err(err) => {
          warn!(path, error = %err, "page data fetch failed");
          entry.state = EntryState::Failed;
          entry.error = Some(err);
          FetchOutcome::Failed
        }
      }
    };
    self.revision.bump();
    outcome
  }
}
