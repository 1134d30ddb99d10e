//! Column naming for the merged and extended tables.
//!
//! Every instrument column lives in one flat table and is namespaced as
//! `"<symbol> <field>"`, e.g. `"AAPL open"`.

use super::provider::DataError;
use polars::prelude::*;

/// Name of the date index column.
pub const DATE_COLUMN: &str = "date";

/// The five base fields kept per instrument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BarField {
    Open,
    High,
    Low,
    Close,
    Volume,
}

impl BarField {
    pub const ALL: [BarField; 5] = [
        BarField::Open,
        BarField::High,
        BarField::Low,
        BarField::Close,
        BarField::Volume,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BarField::Open => "open",
            BarField::High => "high",
            BarField::Low => "low",
            BarField::Close => "close",
            BarField::Volume => "volume",
        }
    }
}

/// `"<symbol> <field>"`
pub fn field_column(symbol: &str, field: BarField) -> String {
    format!("{symbol} {}", field.as_str())
}

/// Close-to-close percentage return column.
pub fn return_column(symbol: &str) -> String {
    format!("{symbol} % ret")
}

/// Rolling realized volatility of the return column.
pub fn ret_vol_column(symbol: &str) -> String {
    format!("{symbol} % ret vol")
}

/// Active-trading flag column.
pub fn active_column(symbol: &str) -> String {
    format!("{symbol} active")
}

/// Expected layout of a merged table.
pub struct MergedSchema;

impl MergedSchema {
    /// Schema of a merged table for the given symbols, in column order.
    pub fn schema(symbols: &[String]) -> Schema {
        let mut fields = vec![Field::new(
            DATE_COLUMN.into(),
            DataType::Datetime(TimeUnit::Milliseconds, None),
        )];
        for symbol in symbols {
            for field in BarField::ALL {
                fields.push(Field::new(
                    field_column(symbol, field).into(),
                    DataType::Float64,
                ));
            }
        }
        Schema::from_iter(fields)
    }

    /// Check that every base column the extender reads is present.
    pub fn validate(df: &DataFrame, symbols: &[String]) -> Result<(), DataError> {
        let actual = df.schema();
        if !actual.contains(DATE_COLUMN) {
            return Err(DataError::MissingColumn {
                column: DATE_COLUMN.to_string(),
            });
        }
        for symbol in symbols {
            for field in BarField::ALL {
                let name = field_column(symbol, field);
                if !actual.contains(&name) {
                    return Err(DataError::MissingColumn { column: name });
                }
            }
        }
        Ok(())
    }
}
