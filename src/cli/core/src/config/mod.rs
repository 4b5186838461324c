/* src/cli/core/src/config/mod.rs */

mod loader;
mod types;


pub use loader::{find_prewarm_config, load_prewarm_config, resolve_explicit_config};
pub use types::{PagesSection, PrewarmConfig};
