//! idxbars core: index constituents, daily bar fetching, wide-table cleaning.
//!
//! Three stages, used strictly in sequence:
//! - constituent lister (`data::constituents`): index name → symbols and names
//! - price fetcher (`data::fetch`): symbols → merged wide table
//! - table extender (`extend`): merged table → filled table with derived columns
//!
//! Nothing is cached or persisted between calls.

pub mod config;
pub mod data;
pub mod domain;
pub mod extend;

pub use config::FetchConfig;
pub use data::{
    fetch_prices, list_constituents, list_constituents_with, load_index, DataError, IndexName,
    MergedTable, PriceFetch,
};
pub use extend::{extend, ExtendedTable};
