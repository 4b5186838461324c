/* src/client/core/rust/src/proximity/geometry.rs */

use serde::{Deserialize, Serialize};

/// Client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
  pub x: f64,
  pub y: f64,
}

impl Point {
  pub fn new(x: f64, y: f64) -> Self {
    Self { x, y }
  }
}

/// Element bounding box in client coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
  pub left: f64,
  pub top: f64,
  pub right: f64,
  pub bottom: f64,
}

impl Rect {
  pub fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
    Self { left, top, right, bottom }
  }

  pub fn width(&self) -> f64 {
    self.right - self.left
  }

  pub fn height(&self) -> f64 {
    self.bottom - self.top
  }
}

/// Reference point on the element the pointer distance is measured to.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelativeTo {
  /// Top-left corner.
  Origin,
  Center,
  /// Nearest point of the box; zero inside it.
  #[default]
  Closest,
}

fn abs_min(a: f64, b: f64) -> f64 {
  if a.abs() <= b.abs() { a } else { b }
}

// Both deltas are element edge minus pointer, near edge first.
fn edge_delta(near: f64, far: f64) -> f64 {
  if near < 0.0 && far > 0.0 { 0.0 } else { abs_min(near, far) }
}

pub fn pointer_distance(rect: &Rect, pointer: Point, relative_to: RelativeTo) -> f64 {
  let mut dx = rect.left - pointer.x;
  let mut dy = rect.top - pointer.y;

  match relative_to {
    RelativeTo::Origin => {}
    RelativeTo::Center => {
      dx += rect.width() / 2.0;
      dy += rect.height() / 2.0;
    }
    RelativeTo::Closest => {
      dx = edge_delta(dx, rect.right - pointer.x);
      dy = edge_delta(dy, rect.bottom - pointer.y);
    }
  }

  dx.hypot(dy)
}
