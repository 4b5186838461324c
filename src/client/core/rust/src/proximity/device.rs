/* src/client/core/rust/src/proximity/device.rs */

use serde::{Deserialize, Serialize};

const MOBILE_AGENTS: [&str; 7] =
  ["iPad", "iPod", "iPhone", "Android", "BlackBerry", "Opera Mini", "Windows Phone"];

/// What the host knows about the input device, as reported by the browser
/// (`navigator.maxTouchPoints`, `(pointer: coarse)`, `'orientation' in window`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DeviceProfile {
  pub max_touch_points: u32,
  pub coarse_pointer: bool,
  pub has_orientation: bool,
  pub user_agent: String,
}

impl DeviceProfile {
  pub fn desktop(user_agent: impl Into<String>) -> Self {
    Self { user_agent: user_agent.into(), ..Self::default() }
  }

  pub fn is_mobile(&self) -> bool {
    MOBILE_AGENTS.iter().any(|agent| self.user_agent.contains(agent))
  }

  /// No hovering pointer to track.
  pub fn is_touchable(&self) -> bool {
    self.max_touch_points > 0 || self.coarse_pointer || self.has_orientation || self.is_mobile()
  }
}
