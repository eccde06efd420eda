use std::collections::{BTreeMap, HashMap};

use polars::prelude::*;
use tracing::{info, warn};

use crate::config::UnmappedStatePolicy;
use crate::error::{PipelineError, Result};
use crate::noisy::{ColumnKind, NormalizedTable};
use crate::states::NATIONAL_TOTAL_LABEL;

/// Name of the key column in the aggregated table.
pub const STATE_COLUMN: &str = "State";

/// Sums each aggregation column per distinct value of `group_column`.
///
/// Output is `[State, agg_1, ..., agg_n]`, one row per group, sorted by group key.
/// Rows with a null group key are left out of every group.
pub fn aggregate_by_state(
    table: &NormalizedTable,
    group_column: &str,
    agg_cols: &[String],
) -> Result<DataFrame> {
    if agg_cols.is_empty() {
        return Err(PipelineError::EmptyAggregation);
    }

    let group_kind = table
        .kind_of(group_column)
        .ok_or_else(|| PipelineError::MissingColumn {
            column: group_column.to_string(),
        })?;

    for column in agg_cols {
        match table.kind_of(column) {
            None => {
                return Err(PipelineError::MissingColumn {
                    column: column.clone(),
                })
            }
            Some(ColumnKind::Categorical) => {
                return Err(PipelineError::NonNumericColumn {
                    column: column.clone(),
                })
            }
            Some(ColumnKind::Numeric) => {}
        }
    }

    let frame = table.frame();
    let keys = group_keys(frame.column(group_column)?, group_kind)?;
    let measures = agg_cols
        .iter()
        .map(|column| frame.column(column)?.f64().cloned())
        .collect::<PolarsResult<Vec<Float64Chunked>>>()?;

    let mut sums: BTreeMap<String, Vec<f64>> = BTreeMap::new();
    let mut skipped = 0usize;
    for (idx, key) in keys.into_iter().enumerate() {
        let Some(key) = key else {
            skipped += 1;
            continue;
        };

        let totals = sums
            .entry(key)
            .or_insert_with(|| vec![0.0; measures.len()]);
        for (total, measure) in totals.iter_mut().zip(measures.iter()) {
            if let Some(value) = measure.get(idx) {
                *total += value;
            }
        }
    }

    if skipped > 0 {
        warn!(
            skipped,
            column = group_column,
            "rows without a group key were not aggregated"
        );
    }

    let states: Vec<&str> = sums.keys().map(String::as_str).collect();
    let mut columns: Vec<Column> = Vec::with_capacity(agg_cols.len() + 1);
    columns.push(Series::new(STATE_COLUMN.into(), states).into());
    for (position, name) in agg_cols.iter().enumerate() {
        let values: Vec<f64> = sums.values().map(|totals| totals[position]).collect();
        columns.push(Series::new(name.as_str().into(), values).into());
    }

    let aggregated = DataFrame::new(columns)?;
    info!(
        groups = aggregated.height(),
        columns = agg_cols.len(),
        "aggregated by state"
    );
    Ok(aggregated)
}

fn group_keys(column: &Column, kind: ColumnKind) -> Result<Vec<Option<String>>> {
    let keys: Vec<Option<String>> = match kind {
        ColumnKind::Categorical => column
            .str()?
            .into_iter()
            .map(|value| value.map(str::to_string))
            .collect(),
        // f64 Display drops a trailing ".0", so 6.0 groups as "6".
        ColumnKind::Numeric => column
            .f64()?
            .into_iter()
            .map(|value| value.map(|number| number.to_string()))
            .collect(),
    };
    Ok(keys)
}

/// Replaces every `State` value with its full name from `state_map`.
///
/// No state may end up labelled `United States`; that row belongs to the national total.
pub fn map_state_names(
    aggregated: &DataFrame,
    state_map: &HashMap<String, String>,
    policy: UnmappedStatePolicy,
) -> Result<DataFrame> {
    let states = aggregated.column(STATE_COLUMN)?.str()?;
    let mut mapped: Vec<Option<String>> = Vec::with_capacity(states.len());
    let mut retained = 0usize;

    for state in states.into_iter() {
        let Some(state) = state else {
            mapped.push(None);
            continue;
        };

        let label = match (state_map.get(state), policy) {
            (Some(full_name), _) => full_name.clone(),
            (None, UnmappedStatePolicy::Fail) => {
                return Err(PipelineError::UnmappedState {
                    value: state.to_string(),
                })
            }
            (None, UnmappedStatePolicy::Retain) => {
                warn!(state, "state has no full name, keeping original value");
                retained += 1;
                state.to_string()
            }
        };

        if label == NATIONAL_TOTAL_LABEL {
            return Err(PipelineError::ReservedStateLabel {
                value: state.to_string(),
                label,
            });
        }
        mapped.push(Some(label));
    }

    let labels: Vec<Option<&str>> = mapped.iter().map(|label| label.as_deref()).collect();
    let mut output = aggregated.clone();
    output.with_column(Series::new(STATE_COLUMN.into(), labels))?;

    info!(
        states = output.height(),
        retained,
        policy = %policy,
        "mapped state names"
    );
    Ok(output)
}

/// Appends a `United States` row holding the sum of every aggregation column.
pub fn add_national_total(aggregated: &DataFrame, agg_cols: &[String]) -> Result<DataFrame> {
    if agg_cols.is_empty() {
        return Err(PipelineError::EmptyAggregation);
    }

    let mut totals: HashMap<&str, f64> = HashMap::with_capacity(agg_cols.len());
    for name in agg_cols {
        let column = aggregated
            .column(name)
            .map_err(|_| PipelineError::MissingColumn {
                column: name.clone(),
            })?;
        let total: f64 = column.f64()?.into_iter().flatten().sum();
        totals.insert(name.as_str(), total);
    }

    let mut row: Vec<Column> = Vec::with_capacity(aggregated.width());
    for column in aggregated.get_columns() {
        let name = column.name().as_str();
        if name == STATE_COLUMN {
            row.push(Series::new(STATE_COLUMN.into(), [NATIONAL_TOTAL_LABEL]).into());
        } else {
            let total = totals
                .get(name)
                .copied()
                .ok_or_else(|| PipelineError::MissingColumn {
                    column: name.to_string(),
                })?;
            row.push(Series::new(name.into(), [total]).into());
        }
    }

    let total_row = DataFrame::new(row)?;
    let mut output = aggregated.clone();
    output.vstack_mut(&total_row)?;

    info!(rows = output.height(), "added national total");
    Ok(output)
}
