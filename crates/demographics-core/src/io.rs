use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, Trim};
use polars::prelude::*;
use tracing::info;

use crate::error::{PipelineError, Result};

/// Tokens read as missing on load, on top of empty fields.
pub const MISSING_TOKENS: [&str; 18] = [
    "#N/A", "#N/A N/A", "#NA", "-NaN", "-nan", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a",
    "nan", "null", "-1.#IND", "-1.#QNAN", "1.#IND", "1.#QNAN",
];

type RawColumns = (Vec<String>, Vec<Vec<Option<String>>>);

/// Reads a comma-delimited file with a header row into a frame of string columns.
pub fn load_table(path: &Path) -> Result<DataFrame> {
    let file = File::open(path).map_err(|source| PipelineError::SourceUnavailable {
        path: path.to_path_buf(),
        source,
    })?;

    let (headers, values) = read_columns(file).map_err(|source| PipelineError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    if headers.is_empty() {
        return Err(PipelineError::MissingHeader {
            path: path.to_path_buf(),
        });
    }

    let frame = build_frame(headers, values)?;
    info!(
        path = %path.display(),
        rows = frame.height(),
        columns = frame.width(),
        "loaded source table"
    );
    Ok(frame)
}

fn read_columns<R: Read>(reader: R) -> std::result::Result<RawColumns, csv::Error> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(Trim::None)
        .flexible(false)
        .from_reader(reader);

    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut values: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];

    for record in reader.records() {
        let record = record?;
        for (idx, field) in record.iter().enumerate() {
            values[idx].push(parse_cell(field));
        }
    }

    Ok((headers, values))
}

fn parse_cell(field: &str) -> Option<String> {
    if field.is_empty() || MISSING_TOKENS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

fn build_frame(headers: Vec<String>, values: Vec<Vec<Option<String>>>) -> Result<DataFrame> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for (idx, header) in headers.iter().enumerate() {
        if let Some(previous) = seen.insert(header.as_str(), idx) {
            return Err(PipelineError::ColumnCollision {
                column: header.clone(),
                first: headers[previous].clone(),
                second: header.clone(),
            });
        }
    }

    let columns: Vec<Column> = headers
        .iter()
        .zip(values.iter())
        .map(|(name, cells)| {
            let cells: Vec<Option<&str>> = cells.iter().map(|cell| cell.as_deref()).collect();
            Series::new(name.as_str().into(), cells).into()
        })
        .collect();

    Ok(DataFrame::new(columns)?)
}

/// Writes the frame as comma-delimited text with a header row, replacing any existing file.
///
/// The frame is serialized fully in memory first so a failure never leaves a partial file.
pub fn save_table(df: &DataFrame, path: &Path) -> Result<()> {
    let mut frame = df.clone();
    let mut buffer = Vec::new();
    CsvWriter::new(&mut buffer)
        .include_header(true)
        .with_separator(b',')
        .finish(&mut frame)?;

    std::fs::write(path, &buffer).map_err(|source| PipelineError::DestinationUnwritable {
        path: path.to_path_buf(),
        source,
    })?;

    info!(
        path = %path.display(),
        rows = frame.height(),
        "saved aggregated table"
    );
    Ok(())
}
