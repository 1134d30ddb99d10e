//! Multi-symbol merge onto the first symbol's timeline.
//!
//! The row index of the merged table is taken from the **first** symbol's
//! bars, not the union of all calendars. Other symbols are aligned to it by
//! calendar date, ignoring time of day: bars outside that index are dropped,
//! and index rows a symbol has no bar for are null. Downstream consumers depend on this row
//! count, so it is kept as is.

use super::provider::{DataError, RawBar};
use super::schema::{field_column, BarField, MergedSchema, DATE_COLUMN};
use chrono::{NaiveDate, NaiveDateTime};
use polars::prelude::*;
use std::collections::HashMap;

/// Wide table: `date` (Datetime ms) plus five Float64 columns per symbol.
pub type MergedTable = DataFrame;

/// Merge per-symbol bar series into one wide table.
///
/// `series` is in fetch order; its first entry defines the date index.
pub fn merge_on_first(series: &[(String, Vec<RawBar>)]) -> Result<MergedTable, DataError> {
    let Some((_, first_bars)) = series.first() else {
        return Ok(DataFrame::empty_with_schema(&MergedSchema::schema(&[])));
    };

    let index: Vec<NaiveDateTime> = first_bars.iter().map(|b| b.timestamp).collect();

    let millis: Vec<i64> = index
        .iter()
        .map(|ts| ts.and_utc().timestamp_millis())
        .collect();
    let date = Series::new(DATE_COLUMN.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))?;

    let mut columns: Vec<Column> = Vec::with_capacity(1 + series.len() * BarField::ALL.len());
    columns.push(date.into());

    for (symbol, bars) in series {
        let aligned = align_to_index(&index, bars);
        for field in BarField::ALL {
            let values: Vec<Option<f64>> = aligned
                .iter()
                .map(|bar| bar.and_then(|b| present(field_value(b, field))))
                .collect();
            columns.push(Series::new(field_column(symbol, field).into(), values).into());
        }
    }

    Ok(DataFrame::new(columns)?)
}

/// For each index timestamp, the symbol's bar on the same calendar date (if any).
///
/// Daily bars of one session can carry different times of day across
/// listings (the live session is stamped with the last trade). When a series
/// has two bars on one date the later bar wins.
fn align_to_index<'a>(index: &[NaiveDateTime], bars: &'a [RawBar]) -> Vec<Option<&'a RawBar>> {
    let mut by_date: HashMap<NaiveDate, &RawBar> = HashMap::with_capacity(bars.len());
    for bar in bars {
        by_date.insert(bar.timestamp.date(), bar);
    }
    index
        .iter()
        .map(|ts| by_date.get(&ts.date()).copied())
        .collect()
}

fn field_value(bar: &RawBar, field: BarField) -> f64 {
    match field {
        BarField::Open => bar.open,
        BarField::High => bar.high,
        BarField::Low => bar.low,
        BarField::Close => bar.close,
        BarField::Volume => bar.volume,
    }
}

/// NaN means "missing" in RawBar; the table uses nulls instead.
fn present(v: f64) -> Option<f64> {
    if v.is_nan() {
        None
    } else {
        Some(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(date: &str, close: f64) -> RawBar {
        bar_at(date, 9, 30, close)
    }

    fn bar_at(date: &str, hour: u32, min: u32, close: f64) -> RawBar {
        RawBar {
            timestamp: NaiveDate::parse_from_str(date, "%Y-%m-%d")
                .unwrap()
                .and_hms_opt(hour, min, 0)
                .unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000.0,
        }
    }

    fn closes(df: &DataFrame, symbol: &str) -> Vec<Option<f64>> {
        df.column(&format!("{symbol} close"))
            .unwrap()
            .f64()
            .unwrap()
            .into_iter()
            .collect()
    }

    #[test]
    fn index_comes_from_first_symbol() {
        let input = vec![
            (
                "SPY".to_string(),
                vec![bar("2024-01-02", 100.0), bar("2024-01-04", 102.0)],
            ),
            (
                "QQQ".to_string(),
                vec![
                    bar("2024-01-02", 200.0),
                    bar("2024-01-03", 201.0),
                    bar("2024-01-04", 202.0),
                ],
            ),
        ];

        let merged = merge_on_first(&input).unwrap();

        // QQQ's 2024-01-03 bar is outside SPY's index and is dropped
        assert_eq!(merged.height(), 2);
        assert_eq!(merged.width(), 11);
        assert_eq!(closes(&merged, "QQQ"), vec![Some(200.0), Some(202.0)]);
    }

    #[test]
    fn missing_bars_are_null() {
        let input = vec![
            (
                "SPY".to_string(),
                vec![
                    bar("2024-01-02", 100.0),
                    bar("2024-01-03", 101.0),
                    bar("2024-01-04", 102.0),
                ],
            ),
            (
                "IWM".to_string(),
                vec![bar("2024-01-02", 50.0), bar("2024-01-04", 52.0)],
            ),
        ];

        let merged = merge_on_first(&input).unwrap();
        assert_eq!(closes(&merged, "IWM"), vec![Some(50.0), None, Some(52.0)]);
    }

    #[test]
    fn same_day_at_different_times_is_matched() {
        // The live session is stamped with each listing's own last trade time
        let input = vec![
            (
                "AAA".to_string(),
                vec![
                    bar_at("2024-01-02", 9, 0, 10.0),
                    bar_at("2024-01-03", 15, 12, 11.0),
                ],
            ),
            (
                "BBB".to_string(),
                vec![
                    bar_at("2024-01-02", 9, 0, 20.0),
                    bar_at("2024-01-03", 15, 14, 25.0),
                ],
            ),
        ];

        let merged = merge_on_first(&input).unwrap();
        assert_eq!(merged.height(), 2);
        assert_eq!(closes(&merged, "BBB"), vec![Some(20.0), Some(25.0)]);
    }

    #[test]
    fn later_bar_on_same_date_wins() {
        let input = vec![
            ("AAA".to_string(), vec![bar("2024-01-02", 10.0)]),
            (
                "BBB".to_string(),
                vec![
                    bar_at("2024-01-02", 9, 30, 20.0),
                    bar_at("2024-01-02", 16, 0, 21.0),
                ],
            ),
        ];

        let merged = merge_on_first(&input).unwrap();
        assert_eq!(closes(&merged, "BBB"), vec![Some(21.0)]);
    }

    #[test]
    fn nan_fields_become_null() {
        let mut partial = bar("2024-01-02", 10.0);
        partial.volume = f64::NAN;
        let merged = merge_on_first(&[("X".to_string(), vec![partial])]).unwrap();
        let volume = merged.column("X volume").unwrap().f64().unwrap();
        assert_eq!(volume.get(0), None);
        assert_eq!(volume.null_count(), 1);
    }

    #[test]
    fn empty_input_gives_date_only_table() {
        let merged = merge_on_first(&[]).unwrap();
        assert_eq!(merged.height(), 0);
        assert_eq!(merged.width(), 1);
    }
}
