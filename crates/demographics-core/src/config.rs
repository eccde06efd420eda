use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::states::{default_state_map, NATIONAL_TOTAL_LABEL};

pub const DEFAULT_GROUP_COLUMN: &str = "State";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// What to do with a grouping value that has no state map entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnmappedStatePolicy {
    /// Abort the run with `UnmappedState`.
    #[default]
    Fail,
    /// Keep the original grouping value as the label.
    Retain,
}

impl UnmappedStatePolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            UnmappedStatePolicy::Fail => "fail",
            UnmappedStatePolicy::Retain => "retain",
        }
    }
}

impl fmt::Display for UnmappedStatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for UnmappedStatePolicy {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fail" => Ok(UnmappedStatePolicy::Fail),
            "retain" | "keep" => Ok(UnmappedStatePolicy::Retain),
            other => Err(format!("unknown unmapped state policy '{other}'")),
        }
    }
}

/// Everything the pipeline needs from the outside world.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,

    /// Columns summed per state, in output order.
    pub agg_cols: Vec<String>,

    #[serde(default = "default_group_column")]
    pub group_column: String,

    #[serde(default = "default_states")]
    pub state_map: HashMap<String, String>,

    #[serde(default)]
    pub unmapped_state: UnmappedStatePolicy,
}

fn default_group_column() -> String {
    DEFAULT_GROUP_COLUMN.to_string()
}

fn default_states() -> HashMap<String, String> {
    default_state_map().clone()
}

impl PipelineConfig {
    pub fn new(
        input_path: impl Into<PathBuf>,
        output_path: impl Into<PathBuf>,
        agg_cols: Vec<String>,
    ) -> Self {
        Self {
            input_path: input_path.into(),
            output_path: output_path.into(),
            agg_cols,
            group_column: default_group_column(),
            state_map: default_states(),
            unmapped_state: UnmappedStatePolicy::default(),
        }
    }

    pub fn with_state_map(mut self, state_map: HashMap<String, String>) -> Self {
        self.state_map = state_map;
        self
    }

    pub fn with_unmapped_state(mut self, policy: UnmappedStatePolicy) -> Self {
        self.unmapped_state = policy;
        self
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agg_cols.is_empty() {
            return Err(ConfigError::Invalid(
                "agg_cols must name at least one column".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for column in &self.agg_cols {
            if !seen.insert(column.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "agg_cols lists '{column}' more than once"
                )));
            }
        }

        if self.group_column.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "group_column must not be blank".to_string(),
            ));
        }

        if let Some((abbreviation, _)) = self
            .state_map
            .iter()
            .find(|(_, name)| name.as_str() == NATIONAL_TOTAL_LABEL)
        {
            return Err(ConfigError::Invalid(format!(
                "state_map maps '{abbreviation}' to '{NATIONAL_TOTAL_LABEL}', which is reserved for the national total"
            )));
        }

        Ok(())
    }
}
