/* src/client/core/rust/src/proximity/mod.rs */

// Pointer-proximity heuristics: which links is the pointer heading for.

mod device;
mod geometry;
mod tracker;


pub use device::DeviceProfile;
pub use geometry::{Point, Rect, RelativeTo, pointer_distance};
pub use tracker::{
  CandidateLink, Grouped, LinkScanner, PointerState, ProximityTracker, TrackHandle,
  closest_to_pointer,
};
