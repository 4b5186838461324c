/* src/client/core/rust/src/data/mod.rs */

// Prefetched page props, keyed by canonical path.

mod cache;
mod fetcher;


pub use cache::{EntryState, FetchOutcome, PageDataCache, PageDataEntry, Props};
pub use fetcher::{BoxFuture, PageDataFetcher};
