/* src/client/core/rust/src/renderer.rs */

use std::future::Future;
use std::mem;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use crate::data::{BoxFuture, Props};
use crate::errors::LoadError;
use crate::revision::Revision;

/// Renders one page from its props. `O` is whatever the host's view layer
/// produces (a virtual node, an HTML string, ...).
pub trait PageRenderer<O>: Send + Sync {
  fn render(&self, props: &Props) -> O;
}

impl<O, F> PageRenderer<O> for F
where
  F: Fn(&Props) -> O + Send + Sync,
{
  fn render(&self, props: &Props) -> O {
    self(props)
  }
}

pub type SharedRenderer<O> = Arc<dyn PageRenderer<O>>;

pub type RendererLoader<O> = Box<dyn FnOnce() -> BoxFuture<Result<SharedRenderer<O>, LoadError>> + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
  Idle,
  Loading,
  Ready,
  Failed,
}

enum LazyState<O> {
  Idle(RendererLoader<O>),
  Loading,
  Ready(SharedRenderer<O>),
  Failed(LoadError),
}

/// Renderer behind a loader future, loaded the first time a page needs it.
pub struct LazyRenderer<O> {
  state: Arc<Mutex<LazyState<O>>>,
}

impl<O: 'static> LazyRenderer<O> {
  pub fn new<F, Fut>(loader: F) -> Self
  where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<SharedRenderer<O>, LoadError>> + Send + 'static,
  {
    let loader: RendererLoader<O> = Box::new(move || Box::pin(loader()));
    Self { state: Arc::new(Mutex::new(LazyState::Idle(loader))) }
  }

  pub fn state(&self) -> LoadState {
    match &*self.state.lock() {
      LazyState::Idle(_) => LoadState::Idle,
      LazyState::Loading => LoadState::Loading,
      LazyState::Ready(_) => LoadState::Ready,
      LazyState::Failed(_) => LoadState::Failed,
    }
  }

  pub fn error(&self) -> Option<LoadError> {
    match &*self.state.lock() {
      LazyState::Failed(err) => Some(err.clone()),
      _ => None,
    }
  }

  /// The loaded renderer, or `None` while it is not ready. The first call
  /// spawns the loader; `revision` is bumped once it settles.
  pub fn get_or_load(&self, revision: &Revision) -> Option<SharedRenderer<O>> {
    let loader = {
      let mut state = self.state.lock();
      match &*state {
        LazyState::Ready(renderer) => return Some(Arc::clone(renderer)),
        LazyState::Loading | LazyState::Failed(_) => return None,
        LazyState::Idle(_) => {}
      }
      if Handle::try_current().is_err() {
        debug!("no async runtime, lazy renderer stays idle");
        return None;
      }
      let LazyState::Idle(loader) = mem::replace(&mut *state, LazyState::Loading) else {
        return None;
      };
      loader
    };

    let state = Arc::clone(&self.state);
    let revision = revision.clone();
    tokio::spawn(async move {
      let loaded = match loader().await {
        Ok(renderer) => LazyState::Ready(renderer),
        Err(err) => {
          warn!(error = %err, "lazy page renderer failed");
          LazyState::Failed(err)
        }
      };
      *state.lock() = loaded;
      revision.bump();
    });
    None
  }
}

/// How a registered page gets its renderer.
pub enum RendererSlot<O> {
  Eager(SharedRenderer<O>),
  Lazy(LazyRenderer<O>),
}

impl<O: 'static> RendererSlot<O> {
  pub fn resolve(&self, revision: &Revision) -> Option<SharedRenderer<O>> {
    match self {
      Self::Eager(renderer) => Some(Arc::clone(renderer)),
      Self::Lazy(lazy) => lazy.get_or_load(revision),
    }
  }

  pub fn state(&self) -> LoadState {
    match self {
      Self::Eager(_) => LoadState::Ready,
      Self::Lazy(lazy) => lazy.state(),
    }
  }
}
