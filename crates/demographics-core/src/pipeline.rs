use std::fmt;

use polars::prelude::DataFrame;
use thiserror::Error;
use tracing::info;

use crate::aggregate::{add_national_total, aggregate_by_state, map_state_names};
use crate::columns::clean_column_names;
use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::impute::impute_missing_values;
use crate::io::{load_table, save_table};
use crate::noisy::normalize_noisy_values;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Load,
    CleanColumnNames,
    NormalizeNoisyValues,
    ImputeMissingValues,
    AggregateByState,
    MapStateNames,
    AddNationalTotal,
    Save,
}

impl Stage {
    pub fn number(&self) -> u8 {
        match self {
            Stage::Load => 1,
            Stage::CleanColumnNames => 2,
            Stage::NormalizeNoisyValues => 3,
            Stage::ImputeMissingValues => 4,
            Stage::AggregateByState => 5,
            Stage::MapStateNames => 6,
            Stage::AddNationalTotal => 7,
            Stage::Save => 8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::CleanColumnNames => "clean_column_names",
            Stage::NormalizeNoisyValues => "normalize_noisy_values",
            Stage::ImputeMissingValues => "impute_missing_values",
            Stage::AggregateByState => "aggregate_by_state",
            Stage::MapStateNames => "map_state_names",
            Stage::AddNationalTotal => "add_national_total",
            Stage::Save => "save",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("step {} ({stage}) failed: {source}", .stage.number())]
pub struct RunError {
    pub stage: Stage,
    #[source]
    pub source: PipelineError,
}

trait StageResultExt<T> {
    fn at(self, stage: Stage) -> Result<T, RunError>;
}

impl<T> StageResultExt<T> for Result<T, PipelineError> {
    fn at(self, stage: Stage) -> Result<T, RunError> {
        self.map_err(|source| RunError { stage, source })
    }
}

/// County rows in, one row per state plus a national total out.
///
/// Every stage is a free function over its input; the pipeline only threads the
/// results from one stage into the next.
#[derive(Debug, Clone)]
pub struct DemographicsPipeline {
    config: PipelineConfig,
}

impl DemographicsPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Load, transform and save. Nothing is written unless every earlier stage succeeded.
    pub fn run(&self) -> Result<DataFrame, RunError> {
        info!(
            input = %self.config.input_path.display(),
            output = %self.config.output_path.display(),
            "starting demographics pipeline"
        );

        let raw = load_table(&self.config.input_path).at(Stage::Load)?;
        let aggregated = self.process(&raw)?;
        save_table(&aggregated, &self.config.output_path).at(Stage::Save)?;

        info!(rows = aggregated.height(), "demographics pipeline complete");
        Ok(aggregated)
    }

    /// Runs the in-memory stages, from column cleaning through the national total.
    pub fn process(&self, raw: &DataFrame) -> Result<DataFrame, RunError> {
        let config = &self.config;

        let cleaned = clean_column_names(raw).at(Stage::CleanColumnNames)?;
        let normalized = normalize_noisy_values(&cleaned).at(Stage::NormalizeNoisyValues)?;
        let imputed = impute_missing_values(&normalized).at(Stage::ImputeMissingValues)?;
        let aggregated = aggregate_by_state(&imputed, &config.group_column, &config.agg_cols)
            .at(Stage::AggregateByState)?;
        let mapped = map_state_names(&aggregated, &config.state_map, config.unmapped_state)
            .at(Stage::MapStateNames)?;
        add_national_total(&mapped, &config.agg_cols).at(Stage::AddNationalTotal)
    }
}
