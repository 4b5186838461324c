/* src/client/core/rust/src/context.rs */

use serde::{Deserialize, Serialize};

/// Routing state handed over by the host on every navigation and render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutingContext {
  /// Current path as the router reports it (may carry a query string).
  pub path: String,
  #[serde(default)]
  pub locale: Option<String>,
  #[serde(default)]
  pub is_server_render: bool,
}

impl RoutingContext {
  pub fn new(path: impl Into<String>, locale: Option<&str>) -> Self {
    Self { path: path.into(), locale: locale.map(String::from), is_server_render: false }
  }

  pub fn server_render(mut self) -> Self {
    self.is_server_render = true;
    self
  }
}
