/* src/client/fetch/rust/src/lib.rs */

mod fetcher;
mod options;


pub use fetcher::NextDataFetcher;
pub use options::{NextDataOptions, data_endpoint};
