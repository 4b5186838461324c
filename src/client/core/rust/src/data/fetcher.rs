/* src/client/core/rust/src/data/fetcher.rs */

use std::future::Future;
use std::pin::Pin;

use crate::context::RoutingContext;
use crate::errors::FetchError;

pub type BoxFuture<T> = Pin<Box<dyn Future<Output = T> + Send>>;

/// Loads the props of one page. `path` is canonical (locale-free); the
/// locale to request comes from `ctx`. Timeouts are the fetcher's business.
pub trait PageDataFetcher: Send + Sync {
  fn fetch(&self, path: &str, ctx: &RoutingContext) -> BoxFuture<Result<serde_json::Value, FetchError>>;
}

impl<F> PageDataFetcher for F
where
  F: Fn(&str, &RoutingContext) -> BoxFuture<Result<serde_json::Value, FetchError>> + Send + Sync,
{
  fn fetch(&self, path: &str, ctx: &RoutingContext) -> BoxFuture<Result<serde_json::Value, FetchError>> {
    self(path, ctx)
  }
}
