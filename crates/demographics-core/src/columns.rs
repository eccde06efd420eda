use std::collections::HashMap;

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Trims, turns internal spaces into underscores, then drops anything outside `[0-9A-Za-z_]`.
///
/// Spaces must become underscores before stripping, otherwise `"Pop 2020"` would
/// collapse to `"Pop2020"`.
pub fn normalize_column_name(raw: &str) -> String {
    raw.trim()
        .replace(' ', "_")
        .chars()
        .filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_')
        .collect()
}

/// Renames every column to its normalized form.
///
/// Two raw names that normalize to the same identifier are rejected with
/// `ColumnCollision` instead of one silently shadowing the other.
pub fn clean_column_names(df: &DataFrame) -> Result<DataFrame> {
    let mut origins: HashMap<String, String> = HashMap::new();
    let mut columns: Vec<Column> = Vec::with_capacity(df.width());

    for column in df.get_columns() {
        let raw = column.name().as_str();
        let cleaned = normalize_column_name(raw);

        if cleaned.is_empty() {
            return Err(PipelineError::EmptyColumnName {
                raw: raw.to_string(),
            });
        }

        if let Some(first) = origins.get(&cleaned) {
            return Err(PipelineError::ColumnCollision {
                column: cleaned,
                first: first.clone(),
                second: raw.to_string(),
            });
        }

        if cleaned != raw {
            debug!(raw, cleaned = %cleaned, "renamed column");
        }

        let mut series = column.as_materialized_series().clone();
        series.rename(cleaned.as_str().into());
        columns.push(series.into());
        origins.insert(cleaned, raw.to_string());
    }

    let cleaned = DataFrame::new(columns)?;
    info!(columns = cleaned.width(), "cleaned column names");
    Ok(cleaned)
}
