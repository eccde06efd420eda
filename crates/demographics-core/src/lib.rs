pub mod aggregate;
pub mod columns;
pub mod config;
pub mod error;
pub mod impute;
pub mod io;
pub mod noisy;
pub mod pipeline;
pub mod states;

pub use config::{ConfigError, PipelineConfig, UnmappedStatePolicy};
pub use error::{PipelineError, Result};
pub use noisy::{ColumnKind, NormalizedTable};
pub use pipeline::{DemographicsPipeline, RunError, Stage};
