use std::fmt;

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::Result;

/// Numeric placeholder the source uses for "unknown".
pub const NUMERIC_SENTINEL: f64 = -1.0;
/// Text placeholder the source uses for "unknown".
pub const TEXT_SENTINEL: &str = " ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Numeric,
    Categorical,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "numeric",
            ColumnKind::Categorical => "categorical",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A frame whose columns are either Float64 (`Numeric`) or String (`Categorical`),
/// with the classification kept alongside.
#[derive(Debug, Clone)]
pub struct NormalizedTable {
    frame: DataFrame,
    kinds: Vec<(String, ColumnKind)>,
}

impl NormalizedTable {
    pub(crate) fn new(frame: DataFrame, kinds: Vec<(String, ColumnKind)>) -> Self {
        Self { frame, kinds }
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn kinds(&self) -> &[(String, ColumnKind)] {
        &self.kinds
    }

    pub fn kind_of(&self, column: &str) -> Option<ColumnKind> {
        self.kinds
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, kind)| *kind)
    }
}

pub fn parse_number(value: &str) -> Option<f64> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|number| number.is_finite())
}

pub fn is_sentinel(value: &str) -> bool {
    value == TEXT_SENTINEL || parse_number(value) == Some(NUMERIC_SENTINEL)
}

/// Nulls out sentinel cells, then tags each column `Numeric` when every remaining
/// value parses as a number and `Categorical` otherwise.
///
/// Columns that fail coercion keep their original text; nothing is dropped.
pub fn normalize_noisy_values(df: &DataFrame) -> Result<NormalizedTable> {
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());
    let mut kinds = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let name = column.name().clone();
        let (series, kind) = match column.dtype() {
            DataType::Float32
            | DataType::Float64
            | DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64 => normalize_numeric(column)?,
            DataType::String => normalize_text(column)?,
            _ => normalize_text(&column.cast(&DataType::String)?)?,
        };

        debug!(column = %name, kind = %kind, "classified column");
        kinds.push((name.to_string(), kind));
        columns.push(series.with_name(name).into());
    }

    let frame = DataFrame::new(columns)?;
    let numeric = kinds
        .iter()
        .filter(|(_, kind)| *kind == ColumnKind::Numeric)
        .count();
    info!(
        numeric,
        categorical = kinds.len() - numeric,
        "normalized noisy values"
    );

    Ok(NormalizedTable::new(frame, kinds))
}

fn normalize_numeric(column: &Column) -> Result<(Series, ColumnKind)> {
    let floats = column.cast(&DataType::Float64)?;
    let floats = floats.f64()?;

    // Infinite values cannot be summed or averaged, so classify as text.
    if floats.into_iter().flatten().any(f64::is_infinite) {
        return normalize_text(&column.cast(&DataType::String)?);
    }

    let values: Vec<Option<f64>> = floats
        .into_iter()
        .map(|value| value.filter(|number| !number.is_nan() && *number != NUMERIC_SENTINEL))
        .collect();
    Ok((Series::new("".into(), values), ColumnKind::Numeric))
}

fn normalize_text(column: &Column) -> Result<(Series, ColumnKind)> {
    let cleaned: Vec<Option<&str>> = column
        .str()?
        .into_iter()
        .map(|value| value.filter(|text| !is_sentinel(text)))
        .collect();

    let parsed: Vec<Option<f64>> = cleaned
        .iter()
        .map(|value| value.and_then(parse_number))
        .collect();

    let all_numeric = cleaned
        .iter()
        .zip(parsed.iter())
        .all(|(text, number)| text.is_none() || number.is_some());

    if all_numeric {
        Ok((Series::new("".into(), parsed), ColumnKind::Numeric))
    } else {
        Ok((Series::new("".into(), cleaned), ColumnKind::Categorical))
    }
}
