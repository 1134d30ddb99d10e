//! Yahoo Finance price provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API for a trailing period
//! (`range=10y`). One request per symbol, no retries: a failure is reported
//! to the caller as `DataError::Fetch` for that symbol.
//!
//! Open, high, low and close are adjusted for splits and dividends by the
//! per-row ratio `adjclose / close`; volume is left as reported.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::provider::{DataError, PriceProvider, RawBar, Window};
use crate::config::FetchConfig;
use chrono::{DateTime, NaiveDateTime};
use serde::Deserialize;
use tracing::debug;

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    meta: Option<ChartMeta>,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct ChartMeta {
    /// Exchange offset from UTC in seconds.
    gmtoffset: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    #[serde(default)]
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance price provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new(config: &FetchConfig) -> Result<Self, DataError> {
        let client = config
            .http_client()
            .map_err(|e| DataError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.chart_base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Build the chart API URL for a symbol and trailing window.
    fn chart_url(&self, symbol: &str, window: Window) -> String {
        format!(
            "{}/v8/finance/chart/{symbol}?range={window}&interval=1d&includeAdjustedClose=true",
            self.base_url
        )
    }

    /// Parse a chart API JSON body into RawBars.
    ///
    /// Timestamps are shifted by the exchange `gmtoffset` so the resulting
    /// naive time is exchange-local. Rows where every field is null
    /// (holidays, halted sessions) are dropped. Prices are split and
    /// dividend adjusted when the body carries `adjclose`.
    pub fn parse_chart(symbol: &str, body: &str) -> Result<Vec<RawBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(body)
            .map_err(|e| DataError::fetch(symbol, format!("unparseable response: {e}")))?;

        let result = match resp.chart.result {
            Some(result) => result,
            None => {
                return Err(match resp.chart.error {
                    Some(err) => {
                        DataError::fetch(symbol, format!("{}: {}", err.code, err.description))
                    }
                    None => DataError::fetch(symbol, "empty result with no error"),
                })
            }
        };

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::fetch(symbol, "result array is empty"))?;

        let offset = data.meta.and_then(|m| m.gmtoffset).unwrap_or(0);
        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::fetch(symbol, "no data returned"))?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::fetch(symbol, "no quote data"))?;

        let adj_closes = data
            .indicators
            .adjclose
            .and_then(|v| v.into_iter().next())
            .map(|a| a.adjclose);

        let mut bars = Vec::with_capacity(timestamps.len());

        for (i, &ts) in timestamps.iter().enumerate() {
            let timestamp = exchange_local(ts, offset)
                .ok_or_else(|| DataError::fetch(symbol, format!("invalid timestamp: {ts}")))?;

            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            let adj_close = adj_closes
                .as_ref()
                .and_then(|v| v.get(i).copied().flatten());
            let ratio = adjustment_ratio(close, adj_close);
            let adjust = |v: Option<f64>| v.map_or(f64::NAN, |v| v * ratio);

            bars.push(RawBar {
                timestamp,
                open: adjust(open),
                high: adjust(high),
                low: adjust(low),
                close: adjust(close),
                volume: volume.unwrap_or(f64::NAN),
            });
        }

        if bars.is_empty() {
            return Err(DataError::fetch(symbol, "no data returned"));
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }
}

/// Price multiplier for one row. Rows without a usable pair stay unadjusted.
fn adjustment_ratio(close: Option<f64>, adj_close: Option<f64>) -> f64 {
    match (close, adj_close) {
        (Some(c), Some(a)) if c != 0.0 && c.is_finite() && a.is_finite() => a / c,
        _ => 1.0,
    }
}

fn exchange_local(ts: i64, gmtoffset: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(ts.checked_add(gmtoffset)?, 0).map(|dt| dt.naive_utc())
}

impl PriceProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, symbol: &str, window: Window) -> Result<Vec<RawBar>, DataError> {
        let url = self.chart_url(symbol, window);
        debug!(%symbol, %url, "requesting chart");

        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| DataError::fetch(symbol, e.to_string()))?;

        let status = resp.status();
        let body = resp
            .text()
            .map_err(|e| DataError::fetch(symbol, format!("failed to read body: {e}")))?;

        if !status.is_success() {
            // Yahoo reports unknown symbols as 404 with a chart error payload.
            return match Self::parse_chart(symbol, &body) {
                Err(e) => Err(e),
                Ok(_) => Err(DataError::fetch(symbol, format!("HTTP {status}"))),
            };
        }

        Self::parse_chart(symbol, &body)
    }
}
