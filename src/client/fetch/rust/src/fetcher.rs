/* src/client/fetch/rust/src/fetcher.rs */

use std::sync::Arc;

use prewarm_core::{BoxFuture, FetchError, PageDataFetcher, RouteSnapshot, RoutingContext};
use serde_json::Value;
use tracing::debug;

use crate::options::{NextDataOptions, data_endpoint};

/// Requests `pageProps` from the storefront's static data endpoint.
#[derive(Clone)]
pub struct NextDataFetcher {
  client: reqwest::Client,
  options: Arc<NextDataOptions>,
}

impl NextDataFetcher {
  pub fn new(options: NextDataOptions) -> Result<Self, reqwest::Error> {
    let client = reqwest::Client::builder().timeout(options.timeout_duration()).build()?;
    Ok(Self { client, options: Arc::new(options) })
  }

  pub fn with_client(client: reqwest::Client, options: NextDataOptions) -> Self {
    Self { client, options: Arc::new(options) }
  }

  pub fn options(&self) -> &NextDataOptions {
    &self.options
  }

  pub fn endpoint(&self, path: &str, locale: Option<&str>) -> String {
    data_endpoint(&self.options, path, locale)
  }

  /// GET the data endpoint for `path` and extract its page props.
  pub async fn fetch_props(&self, path: &str, locale: Option<&str>) -> Result<Value, FetchError> {
    let url = self.endpoint(path, locale);
    request(self.client.clone(), url, self.options.persist_router, path.to_string(), locale.map(String::from))
      .await
  }
}

impl PageDataFetcher for NextDataFetcher {
  fn fetch(&self, path: &str, ctx: &RoutingContext) -> BoxFuture<Result<Value, FetchError>> {
    let locale = ctx.locale.clone();
    let url = self.endpoint(path, locale.as_deref());
    Box::pin(request(self.client.clone(), url, self.options.persist_router, path.to_string(), locale))
  }
}

async fn request(
  client: reqwest::Client,
  url: String,
  persist_router: bool,
  path: String,
  locale: Option<String>,
) -> Result<Value, FetchError> {
  debug!(url = %url, "requesting page data");
  let resp = client.get(&url).send().await.map_err(|e| transport_error(&url, &e))?;

  let status = resp.status();
  if !status.is_success() {
    return Err(FetchError::http_status(status.as_u16(), format!("GET {url} returned {status}")));
  }

  let body: Value = resp.json().await.map_err(|e| {
    if e.is_timeout() {
      FetchError::timeout(format!("GET {url} timed out"))
    } else {
      FetchError::decode(format!("GET {url}: {e}"))
    }
  })?;
  let Some(mut props) = body.get("pageProps").cloned() else {
    return Err(FetchError::decode(format!("GET {url}: response has no pageProps")));
  };

  if persist_router {
    match props.as_object_mut() {
      Some(obj) => {
        let snapshot = RouteSnapshot::new(path, locale.as_deref());
        obj.insert("router".to_string(), snapshot.to_value());
      }
      None => debug!(url = %url, "pageProps is not an object, route snapshot not stored"),
    }
  }
  Ok(props)
}

fn transport_error(url: &str, err: &reqwest::Error) -> FetchError {
  if err.is_timeout() {
    FetchError::timeout(format!("GET {url} timed out"))
  } else {
    FetchError::network(format!("GET {url}: {err}"))
  }
}
