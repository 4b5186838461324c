/* src/client/core/rust/src/errors.rs */

use std::fmt;

use thiserror::Error;

/// Failure of a page data request. Recorded on the cache entry, never
/// propagated to the caller that requested the prefetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
  code: String,
  message: String,
  status: Option<u16>,
}

impl FetchError {
  pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
    Self { code: code.into(), message: message.into(), status: None }
  }

  pub fn network(msg: impl Into<String>) -> Self {
    Self::new("NETWORK_ERROR", msg)
  }

  pub fn http_status(status: u16, msg: impl Into<String>) -> Self {
    Self { code: "HTTP_STATUS".to_string(), message: msg.into(), status: Some(status) }
  }

  pub fn decode(msg: impl Into<String>) -> Self {
    Self::new("DECODE_ERROR", msg)
  }

  pub fn timeout(msg: impl Into<String>) -> Self {
    Self::new("TIMEOUT", msg)
  }

  pub fn code(&self) -> &str {
    &self.code
  }

  pub fn message(&self) -> &str {
    &self.message
  }

  pub fn status(&self) -> Option<u16> {
    self.status
  }
}

impl fmt::Display for FetchError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.status {
      Some(status) => write!(f, "{} ({status}): {}", self.code, self.message),
      None => write!(f, "{}: {}", self.code, self.message),
    }
  }
}

impl std::error::Error for FetchError {}

/// Rejected page pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
  #[error("page pattern must not be empty")]
  Empty,
  #[error("page pattern \"{0}\" must start with '/'")]
  NotRooted(String),
  #[error("page pattern \"{0}\" has more than one wildcard segment")]
  MultipleWildcards(String),
  #[error("page pattern \"{0}\" uses a catch-all segment; only single-segment wildcards are supported")]
  CatchAll(String),
  #[error("page pattern \"{0}\" could not be compiled")]
  Invalid(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error(transparent)]
  Pattern(#[from] PatternError),
  #[error("max_prerendered must be at least 1")]
  ZeroCapacity,
  #[error("proximity.interval_ms must be at least 1")]
  ZeroInterval,
  #[error("proximity.max_distance_px must be a non-negative number, got {0}")]
  InvalidDistance(f64),
  #[error("no page data fetcher configured")]
  MissingFetcher,
  #[error("invalid locale pattern: {0}")]
  Locale(#[from] regex::Error),
}

/// A lazy page renderer could not be loaded; the page renders live instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("page renderer failed to load: {0}")]
pub struct LoadError(pub String);

/// Decode failure for a warm-set action crossing a JSON boundary.
#[derive(Debug, Error)]
pub enum ActionError {
  #[error("unknown warm set action: {0}")]
  Unknown(String),
  #[error("malformed warm set action: {0}")]
  Malformed(#[from] serde_json::Error),
}
