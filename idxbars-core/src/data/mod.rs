//! Constituent listing, price fetching, and merging

pub mod align;
pub mod constituents;
pub mod fetch;
pub mod provider;
pub mod schema;
pub mod yahoo;

pub use align::{merge_on_first, MergedTable};
pub use constituents::{
    list_constituents, list_constituents_with, ConstituentSource, Constituents, HttpPageFetcher,
    IndexName, IndexSpec, PageFetcher, WikipediaTable, INDEX_REGISTRY,
};
pub use fetch::{fetch_prices, load_index, PriceFetch};
pub use provider::{
    DataError, FetchProgress, NoProgress, PriceProvider, RawBar, StdoutProgress, Window,
};
pub use schema::{BarField, MergedSchema, DATE_COLUMN};
pub use yahoo::YahooProvider;
