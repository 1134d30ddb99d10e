//! Table extender: turn a merged price table into an analysis-ready one.
//!
//! Steps, in order:
//! 1. keep the five base columns per symbol (open, high, low, close, volume)
//! 2. forward-fill, then backward-fill, each column along the date axis
//! 3. per symbol, from the filled close: `% ret`, `% ret vol` (25-row
//!    sample std of `% ret`), `active`
//! 4. truncate the date index to a plain calendar date
//!
//! Pure transform: no network or disk access.

pub mod fill;
pub mod returns;

pub use fill::{backward_fill, fill_gaps, forward_fill};
pub use returns::{active_flags, pct_return, rolling_std};

use crate::data::provider::DataError;
use crate::data::schema::{
    active_column, field_column, ret_vol_column, return_column, BarField, MergedSchema,
    DATE_COLUMN,
};
use polars::prelude::*;
use tracing::debug;

/// Rows in the realized-volatility window.
pub const RET_VOL_WINDOW: usize = 25;

/// Wide table: `date` (Date), filled base columns grouped by field, then
/// `% ret`, `% ret vol`, `active` per symbol.
pub type ExtendedTable = DataFrame;

/// Fill a merged table and add derived columns for `symbols`.
///
/// Fails with `DataError::MissingColumn` if any base column (or the date
/// column) is absent, before any work is done.
pub fn extend(symbols: &[String], merged: &DataFrame) -> Result<ExtendedTable, DataError> {
    MergedSchema::validate(merged, symbols)?;

    let date = merged.column(DATE_COLUMN)?.cast(&DataType::Date)?;

    let mut base: Vec<Column> = Vec::with_capacity(symbols.len() * BarField::ALL.len());
    let mut closes: Vec<Vec<Option<f64>>> = Vec::with_capacity(symbols.len());

    for field in BarField::ALL {
        for symbol in symbols {
            let name = field_column(symbol, field);
            let filled = fill_gaps(&read_f64(merged, &name)?);
            if field == BarField::Close {
                closes.push(filled.clone());
            }
            base.push(Series::new(name.into(), filled).into());
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(1 + base.len() + symbols.len() * 3);
    columns.push(date);
    columns.extend(base);

    for (symbol, close) in symbols.iter().zip(&closes) {
        let ret = pct_return(close);
        let vol = rolling_std(&ret, RET_VOL_WINDOW);
        let active = active_flags(close);

        columns.push(Series::new(return_column(symbol).into(), ret).into());
        columns.push(Series::new(ret_vol_column(symbol).into(), vol).into());
        columns.push(Series::new(active_column(symbol).into(), active).into());
    }

    let out = DataFrame::new(columns)?;
    debug!(
        symbols = symbols.len(),
        rows = out.height(),
        cols = out.width(),
        "extended table"
    );
    Ok(out)
}

/// Column values as `Option<f64>`, with `NaN` read as missing.
fn read_f64(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, DataError> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    Ok(column
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}
