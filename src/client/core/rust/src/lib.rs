/* src/client/core/rust/src/lib.rs */

pub mod config;
pub mod context;
pub mod data;
pub mod errors;
pub mod orchestrator;
pub mod proximity;
pub mod renderer;
pub mod revision;
pub mod route;
pub mod schedule;
pub mod visibility;
pub mod warm_set;

// Re-exports for ergonomic use
pub use config::{PrerenderConfig, ProximityOptions};
pub use context::RoutingContext;
pub use data::{
  BoxFuture, EntryState, FetchOutcome, PageDataCache, PageDataEntry, PageDataFetcher, Props,
};
pub use errors::{ActionError, ConfigError, FetchError, LoadError, PatternError};
pub use orchestrator::{
  BackgroundHandle, Frame, LIVE_SLOT_KEY, NavigationEffects, Orchestrator, OrchestratorBuilder,
  PathState, Slot, SlotKind,
};
pub use proximity::{
  CandidateLink, DeviceProfile, Grouped, LinkScanner, Point, PointerState, ProximityTracker, Rect,
  RelativeTo, TrackHandle, closest_to_pointer, pointer_distance,
};
pub use renderer::{LazyRenderer, LoadState, PageRenderer, RendererSlot, SharedRenderer};
pub use revision::Revision;
pub use route::{
  LocaleNormalizer, PageMatch, PagePattern, PageRegistry, RouteSnapshot, canonical_path,
  href_to_path, inbound_path, parse_query,
};
pub use schedule::TransitionQueue;
pub use visibility::{ElementId, IntersectionSource, NoIntersection, VisibilitySensor};
pub use warm_set::{WarmAction, WarmSet, decode_action, decode_action_str, encode_action, reduce};
