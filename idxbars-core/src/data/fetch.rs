//! Fetch orchestrator: one request per symbol, sequentially, then merge.

use super::align::{merge_on_first, MergedTable};
use super::constituents::{ConstituentSource, IndexName, PageFetcher};
use super::provider::{DataError, FetchProgress, PriceProvider, RawBar, Window};
use tracing::info;

/// Result of a multi-symbol fetch.
#[derive(Debug)]
pub struct PriceFetch {
    /// Wide table aligned to the first symbol's dates.
    pub merged: MergedTable,
    /// Symbols in fetch order (the table's column order).
    pub instruments: Vec<String>,
    /// Display names, passed through unchanged from the lister.
    pub names: Vec<String>,
}

/// Fetch the trailing window of bars for every symbol and merge them.
///
/// Symbols are fetched one at a time in order. The first symbol that fails
/// aborts the call with `DataError::Fetch` naming it.
pub fn fetch_prices(
    provider: &dyn PriceProvider,
    symbols: &[String],
    names: &[String],
    window: Window,
    progress: &dyn FetchProgress,
) -> Result<PriceFetch, DataError> {
    let total = symbols.len();
    let mut series: Vec<(String, Vec<RawBar>)> = Vec::with_capacity(total);

    for (i, symbol) in symbols.iter().enumerate() {
        progress.on_start(symbol, i, total);

        let result = fetch_single(provider, symbol, window);
        progress.on_complete(symbol, i, total, result.as_ref().map(|bars| bars.len()));

        series.push((symbol.clone(), result?));
    }

    let merged = merge_on_first(&series)?;
    info!(
        provider = provider.name(),
        symbols = total,
        rows = merged.height(),
        "merged price table"
    );

    Ok(PriceFetch {
        merged,
        instruments: symbols.to_vec(),
        names: names.to_vec(),
    })
}

fn fetch_single(
    provider: &dyn PriceProvider,
    symbol: &str,
    window: Window,
) -> Result<Vec<RawBar>, DataError> {
    let bars = provider.fetch(symbol, window)?;
    if bars.is_empty() {
        return Err(DataError::fetch(symbol, "no data returned"));
    }
    Ok(bars)
}

/// List an index's constituents, then fetch and merge their prices.
pub fn load_index(
    index_name: &str,
    pages: &dyn PageFetcher,
    provider: &dyn PriceProvider,
    window: Window,
    progress: &dyn FetchProgress,
) -> Result<PriceFetch, DataError> {
    let index: IndexName = index_name.parse()?;
    let (symbols, names) = index.source().list(pages)?.into_parts();
    fetch_prices(provider, &symbols, &names, window, progress)
}
