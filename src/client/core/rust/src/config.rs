/* src/client/core/rust/src/config.rs */

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::proximity::RelativeTo;

/// Construction-time options for an orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrerenderConfig {
  /// Upper bound on pages kept prerendered at once.
  #[serde(default = "default_max_prerendered")]
  pub max_prerendered: usize,
  /// Drop prefetched data and prerendered pages when the locale changes.
  #[serde(default = "default_true")]
  pub reset_on_locale_change: bool,
  /// Fire the resize hook on every path change (responsive containers).
  #[serde(default = "default_true")]
  pub resize_on_path_change: bool,
  /// Build-time locale list; a leading `/<locale>/` is stripped from paths.
  #[serde(default)]
  pub locales: Vec<String>,
  /// Origin used to tell inbound links from outbound ones. Empty accepts
  /// root-relative hrefs only.
  #[serde(default)]
  pub origin: String,
  #[serde(default)]
  pub proximity: ProximityOptions,
}

impl Default for PrerenderConfig {
  fn default() -> Self {
    Self {
      max_prerendered: default_max_prerendered(),
      reset_on_locale_change: true,
      resize_on_path_change: true,
      locales: Vec::new(),
      origin: String::new(),
      proximity: ProximityOptions::default(),
    }
  }
}

impl PrerenderConfig {
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.max_prerendered == 0 {
      return Err(ConfigError::ZeroCapacity);
    }
    self.proximity.validate()
  }
}

/// Pointer-proximity heuristics. Ignored on touch devices.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProximityOptions {
  #[serde(default = "default_true")]
  pub enabled: bool,
  #[serde(default = "default_interval_ms")]
  pub interval_ms: u64,
  #[serde(default = "default_true")]
  pub group_by_page: bool,
  /// 0 disables the distance cut-off.
  #[serde(default = "default_max_distance_px")]
  pub max_distance_px: f64,
  /// 0 keeps every link of a group.
  #[serde(default = "default_n_closest_per_group")]
  pub n_closest_per_group: usize,
  #[serde(default)]
  pub relative_to: RelativeTo,
  #[serde(default = "default_included_path_prefixes")]
  pub included_path_prefixes: Vec<String>,
}

impl Default for ProximityOptions {
  fn default() -> Self {
    Self {
      enabled: true,
      interval_ms: default_interval_ms(),
      group_by_page: true,
      max_distance_px: default_max_distance_px(),
      n_closest_per_group: default_n_closest_per_group(),
      relative_to: RelativeTo::default(),
      included_path_prefixes: default_included_path_prefixes(),
    }
  }
}

impl ProximityOptions {
  pub fn disabled() -> Self {
    Self { enabled: false, ..Self::default() }
  }

  pub fn interval(&self) -> Duration {
    Duration::from_millis(self.interval_ms)
  }

  pub fn max_distance(&self) -> Option<f64> {
    (self.max_distance_px > 0.0).then_some(self.max_distance_px)
  }

  pub fn n_closest(&self) -> Option<usize> {
    (self.n_closest_per_group > 0).then_some(self.n_closest_per_group)
  }

  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.interval_ms == 0 {
      return Err(ConfigError::ZeroInterval);
    }
    if !self.max_distance_px.is_finite() || self.max_distance_px < 0.0 {
      return Err(ConfigError::InvalidDistance(self.max_distance_px));
    }
    Ok(())
  }
}

fn default_true() -> bool {
  true
}

fn default_max_prerendered() -> usize {
  8
}

fn default_interval_ms() -> u64 {
  1000
}

fn default_max_distance_px() -> f64 {
  100.0
}

fn default_n_closest_per_group() -> usize {
  2
}

fn default_included_path_prefixes() -> Vec<String> {
  vec!["/".to_string()]
}
