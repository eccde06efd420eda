use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use comfy_table::Table;
use demographics_core::{DemographicsPipeline, PipelineConfig, UnmappedStatePolicy};
use polars::prelude::{AnyValue, DataFrame};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "County demographics to state totals", long_about = None)]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Aggregate a county CSV into per-state totals with a national row
    Run(RunArgs),
    /// Print the state abbreviations known to the built-in state map
    States,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// TOML file providing input/output paths, aggregation columns and state map
    #[arg(long)]
    config: Option<PathBuf>,
    /// Input CSV path (overrides the config file)
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output CSV path (overrides the config file)
    #[arg(long)]
    output: Option<PathBuf>,
    /// Column to sum per state; repeat for several (overrides the config file)
    #[arg(long = "agg-col")]
    agg_cols: Vec<String>,
    /// What to do with states missing from the state map: fail or retain
    #[arg(long, value_parser = parse_policy)]
    unmapped_state: Option<UnmappedStatePolicy>,
    /// Number of trailing rows to print once the run completes
    #[arg(long, default_value_t = 5)]
    tail: usize,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.json_logs);

    match cli.command {
        Command::Run(args) => handle_run(args),
        Command::States => {
            let mut states: Vec<_> = demographics_core::states::default_state_map()
                .iter()
                .collect();
            states.sort();
            let mut table = Table::new();
            table.set_header(vec!["Abbreviation", "State"]);
            for (abbreviation, name) in states {
                table.add_row(vec![abbreviation.as_str(), name.as_str()]);
            }
            println!("{table}");
            Ok(())
        }
    }
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

fn handle_run(args: RunArgs) -> Result<()> {
    let config = resolve_config(&args)?;
    let pipeline = DemographicsPipeline::new(config);

    let aggregated = pipeline.run().context("demographics pipeline failed")?;
    info!(
        output = %pipeline.config().output_path.display(),
        "aggregated dataset saved"
    );

    println!("{}", render_tail(&aggregated, args.tail));
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_path(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let input = args
                .input
                .clone()
                .context("--input is required when no --config is given")?;
            let output = args
                .output
                .clone()
                .context("--output is required when no --config is given")?;
            PipelineConfig::new(input, output, args.agg_cols.clone())
        }
    };

    if let Some(input) = &args.input {
        config.input_path = input.clone();
    }
    if let Some(output) = &args.output {
        config.output_path = output.clone();
    }
    if !args.agg_cols.is_empty() {
        config.agg_cols = args.agg_cols.clone();
    }
    if let Some(policy) = args.unmapped_state {
        config.unmapped_state = policy;
    }

    config.validate().context("invalid pipeline configuration")?;
    Ok(config)
}

fn parse_policy(value: &str) -> Result<UnmappedStatePolicy, String> {
    UnmappedStatePolicy::try_from(value)
}

fn render_tail(df: &DataFrame, rows: usize) -> Table {
    let tail = df.tail(Some(rows));
    let mut table = Table::new();
    table.set_header(
        tail.get_columns()
            .iter()
            .map(|column| column.name().to_string())
            .collect::<Vec<_>>(),
    );

    for idx in 0..tail.height() {
        let cells: Vec<String> = tail
            .get_columns()
            .iter()
            .map(|column| match column.get(idx) {
                Ok(AnyValue::String(text)) => text.to_string(),
                Ok(AnyValue::Null) | Err(_) => String::new(),
                Ok(value) => value.to_string(),
            })
            .collect();
        table.add_row(cells);
    }

    table
}
