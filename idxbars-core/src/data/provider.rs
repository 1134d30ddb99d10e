//! Price provider trait and structured error types.
//!
//! The PriceProvider trait abstracts over pricing sources (Yahoo Finance today)
//! so the fetcher can be driven by a fake in tests.

use chrono::NaiveDateTime;
use polars::prelude::PolarsError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Raw daily OHLCV bar as returned by a pricing source.
///
/// `timestamp` is the exchange-local bar time and may carry a time of day.
/// Missing fields are `NaN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// Structured error types for every stage of the pipeline.
///
/// Lister, fetcher and extender failures are distinct variants so callers
/// can tell "constituent list unavailable" apart from "one instrument's
/// prices unavailable".
#[derive(Debug, Error)]
pub enum DataError {
    #[error("unknown index '{name}' (supported: CAC40, SP500, FTSE100)")]
    UnknownIndex { name: String },

    #[error("constituent source for {index} unavailable: {reason}")]
    SourceUnavailable { index: String, reason: String },

    #[error("failed to fetch prices for {symbol}: {reason}")]
    Fetch { symbol: String, reason: String },

    #[error("merged table is missing column '{column}'")]
    MissingColumn { column: String },

    #[error("table error: {0}")]
    Polars(#[from] PolarsError),

    #[error("config error: {0}")]
    Config(String),
}

impl DataError {
    pub(crate) fn fetch(symbol: &str, reason: impl Into<String>) -> Self {
        DataError::Fetch {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Trailing history window requested from the pricing source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Window {
    #[serde(rename = "1y")]
    OneYear,
    #[serde(rename = "2y")]
    TwoYears,
    #[serde(rename = "5y")]
    FiveYears,
    #[default]
    #[serde(rename = "10y")]
    TenYears,
    #[serde(rename = "ytd")]
    YearToDate,
    #[serde(rename = "max")]
    Max,
}

impl Window {
    /// Period string understood by the chart API.
    pub fn as_str(&self) -> &'static str {
        match self {
            Window::OneYear => "1y",
            Window::TwoYears => "2y",
            Window::FiveYears => "5y",
            Window::TenYears => "10y",
            Window::YearToDate => "ytd",
            Window::Max => "max",
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Window {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1y" => Ok(Window::OneYear),
            "2y" => Ok(Window::TwoYears),
            "5y" => Ok(Window::FiveYears),
            "10y" => Ok(Window::TenYears),
            "ytd" => Ok(Window::YearToDate),
            "max" => Ok(Window::Max),
            other => Err(DataError::Config(format!(
                "unsupported window '{other}' (expected 1y, 2y, 5y, 10y, ytd or max)"
            ))),
        }
    }
}

/// Trait for pricing sources.
///
/// One call per symbol. Implementations return the bars in ascending
/// timestamp order, or `DataError::Fetch` naming the symbol.
pub trait PriceProvider {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch the trailing window of daily bars for a symbol.
    fn fetch(&self, symbol: &str, window: Window) -> Result<Vec<RawBar>, DataError>;
}

/// Progress callback for multi-symbol fetches.
pub trait FetchProgress {
    /// Called when starting to fetch a symbol.
    fn on_start(&self, symbol: &str, index: usize, total: usize);

    /// Called when a symbol fetch completes.
    fn on_complete(
        &self,
        symbol: &str,
        index: usize,
        total: usize,
        result: Result<usize, &DataError>,
    );
}

/// Simple progress reporter that prints to stdout.
pub struct StdoutProgress;

impl FetchProgress for StdoutProgress {
    fn on_start(&self, symbol: &str, index: usize, total: usize) {
        println!("[{}/{}] Fetching {symbol}...", index + 1, total);
    }

    fn on_complete(
        &self,
        symbol: &str,
        _index: usize,
        _total: usize,
        result: Result<usize, &DataError>,
    ) {
        match result {
            Ok(bars) => println!("  OK: {symbol} ({bars} bars)"),
            Err(e) => println!("  FAIL: {e}"),
        }
    }
}

/// Progress reporter that stays silent.
pub struct NoProgress;

impl FetchProgress for NoProgress {
    fn on_start(&self, _symbol: &str, _index: usize, _total: usize) {}

    fn on_complete(
        &self,
        _symbol: &str,
        _index: usize,
        _total: usize,
        _result: Result<usize, &DataError>,
    ) {
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_parses_period_strings() {
        assert_eq!("10y".parse::<Window>().unwrap(), Window::TenYears);
        assert_eq!(" YTD ".parse::<Window>().unwrap(), Window::YearToDate);
        assert!("3w".parse::<Window>().is_err());
    }

    #[test]
    fn default_window_is_ten_years() {
        assert_eq!(Window::default().as_str(), "10y");
    }

    #[test]
    fn fetch_error_names_symbol() {
        let err = DataError::fetch("AIR.PA", "HTTP 404");
        assert_eq!(err.to_string(), "failed to fetch prices for AIR.PA: HTTP 404");
    }
}
