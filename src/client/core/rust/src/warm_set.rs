/* src/client/core/rust/src/warm_set.rs */

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::errors::ActionError;

/// Bounded, insertion-ordered set of canonical paths kept prerendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WarmSet {
  paths: Vec<String>,
  capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WarmAction {
  Add(Vec<String>),
  Clear,
}

impl WarmAction {
  pub fn add_one(path: impl Into<String>) -> Self {
    Self::Add(vec![path.into()])
  }
}

impl WarmSet {
  pub fn new(capacity: usize) -> Self {
    Self { paths: Vec::with_capacity(capacity), capacity }
  }

  pub fn paths(&self) -> &[String] {
    &self.paths
  }

  pub fn capacity(&self) -> usize {
    self.capacity
  }

  pub fn contains(&self, path: &str) -> bool {
    self.paths.iter().any(|p| p == path)
  }

  pub fn len(&self) -> usize {
    self.paths.len()
  }

  pub fn is_empty(&self) -> bool {
    self.paths.is_empty()
  }

  /// Apply `action` in place; `active` is never evicted.
  pub fn apply(&mut self, action: &WarmAction, active: &str) {
    match action {
      WarmAction::Clear => self.paths.clear(),
      WarmAction::Add(paths) => {
        for path in paths {
          self.insert(path, active);
        }
      }
    }
  }

  fn insert(&mut self, path: &str, active: &str) {
    if self.contains(path) {
      return;
    }
    if self.paths.len() >= self.capacity {
      let Some(at) = self.paths.iter().position(|p| p != active) else {
        debug!(path, "warm set holds only the active path, skipping");
        return;
      };
      let evicted = self.paths.remove(at);
      debug!(evicted = %evicted, path, "evicting prerendered page");
    }
    self.paths.push(path.to_string());
  }
}

/// Pure form of [`WarmSet::apply`].
pub fn reduce(state: &WarmSet, action: &WarmAction, active: &str) -> WarmSet {
  let mut next = state.clone();
  next.apply(action, active);
  next
}

// -- JSON boundary --

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum PathsPayload {
  One(String),
  Many(Vec<String>),
}

#[derive(Serialize, Deserialize)]
struct AddPayload {
  paths: PathsPayload,
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
enum WireAction {
  Add { payload: AddPayload },
  Clear,
}

/// Decode `{"type":"add","payload":{"paths":...}}` or `{"type":"clear"}`.
/// `paths` may be a single string. Any other `type` is rejected.
pub fn decode_action(value: Value) -> Result<WarmAction, ActionError> {
  let tag = value.get("type").and_then(Value::as_str).unwrap_or_default();
  if !matches!(tag, "add" | "clear") {
    return Err(ActionError::Unknown(tag.to_string()));
  }
  let action = match serde_json::from_value(value)? {
    WireAction::Add { payload } => match payload.paths {
      PathsPayload::One(path) => WarmAction::Add(vec![path]),
      PathsPayload::Many(paths) => WarmAction::Add(paths),
    },
    WireAction::Clear => WarmAction::Clear,
  };
  Ok(action)
}

pub fn decode_action_str(input: &str) -> Result<WarmAction, ActionError> {
  decode_action(serde_json::from_str(input)?)
}

pub fn encode_action(action: &WarmAction) -> Value {
  let wire = match action {
    WarmAction::Add(paths) => WireAction::Add { payload: AddPayload { paths: PathsPayload::Many(paths.clone()) } },
    WarmAction::Clear => WireAction::Clear,
  };
  serde_json::to_value(wire).unwrap_or(Value::Null)
}
