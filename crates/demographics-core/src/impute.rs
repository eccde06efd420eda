use std::collections::BTreeMap;

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::noisy::{ColumnKind, NormalizedTable};

/// Median of the given values; the mean of the two middle values for an even count.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Most frequent value. Ties go to the value that sorts first.
pub fn mode<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<&'a str> {
    let mut counts: BTreeMap<&'a str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&'a str, usize)> = None;
    for (value, count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((value, count)),
        }
    }
    best.map(|(value, _)| value)
}

/// Fills numeric nulls with the column median and categorical nulls with the column mode.
///
/// A column with missing cells but no values to derive a fill from fails with
/// `NoImputationSource`.
pub fn impute_missing_values(table: &NormalizedTable) -> Result<NormalizedTable> {
    let frame = table.frame();
    let mut columns: Vec<Column> = Vec::with_capacity(frame.width());
    let mut filled_cells = 0usize;

    for (name, kind) in table.kinds() {
        let column = frame.column(name)?;
        let missing = column.null_count();

        let series = match kind {
            _ if missing == 0 => column.as_materialized_series().clone(),
            ColumnKind::Numeric => {
                let values = column.f64()?;
                let present: Vec<f64> = values.into_iter().flatten().collect();
                let fill = median(&present).ok_or_else(|| PipelineError::NoImputationSource {
                    column: name.clone(),
                })?;
                debug!(column = %name, missing, fill, "imputing median");
                let filled: Vec<f64> = values
                    .into_iter()
                    .map(|value| value.unwrap_or(fill))
                    .collect();
                Series::new(name.as_str().into(), filled)
            }
            ColumnKind::Categorical => {
                let values = column.str()?;
                let fill = mode(values.into_iter().flatten()).ok_or_else(|| {
                    PipelineError::NoImputationSource {
                        column: name.clone(),
                    }
                })?;
                debug!(column = %name, missing, fill, "imputing mode");
                let filled: Vec<&str> = values
                    .into_iter()
                    .map(|value| value.unwrap_or(fill))
                    .collect();
                Series::new(name.as_str().into(), filled)
            }
        };

        filled_cells += missing;
        columns.push(series.into());
    }

    let imputed = DataFrame::new(columns)?;
    info!(filled_cells, "imputed missing values");
    Ok(NormalizedTable::new(imputed, table.kinds().to_vec()))
}
