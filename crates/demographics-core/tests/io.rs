use std::fs;

use demographics_core::io::{load_table, save_table};
use demographics_core::PipelineError;
use polars::prelude::*;

#[test]
fn load_keeps_raw_headers_and_row_order() -> PolarsResult<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("counties.csv");
    fs::write(&input, " State ,Pop 2020,Note\nCA,-1, \nTX,50,NA\nCA,100,\n").expect("write");

    let df = load_table(&input).expect("load failed");
    let names: Vec<&str> = df
        .get_columns()
        .iter()
        .map(|column| column.name().as_str())
        .collect();
    assert_eq!(names, vec![" State ", "Pop 2020", "Note"]);

    let states = df.column(" State ")?.str()?;
    assert_eq!(states.get(0), Some("CA"));
    assert_eq!(states.get(1), Some("TX"));
    assert_eq!(states.get(2), Some("CA"));

    let pop = df.column("Pop 2020")?.str()?;
    assert_eq!(pop.get(0), Some("-1"));

    let note = df.column("Note")?.str()?;
    assert_eq!(note.get(0), Some(" "));
    assert_eq!(note.get(1), None);
    assert_eq!(note.get(2), None);
    Ok(())
}

#[test]
fn empty_source_has_no_header() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("empty.csv");
    fs::write(&input, "").expect("write");

    assert!(matches!(
        load_table(&input),
        Err(PipelineError::MissingHeader { .. })
    ));
}

#[test]
fn duplicate_raw_headers_are_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("dupes.csv");
    fs::write(&input, "State,Pop,Pop\nCA,1,2\n").expect("write");

    assert!(matches!(
        load_table(&input),
        Err(PipelineError::ColumnCollision { column, .. }) if column == "Pop"
    ));
}

#[test]
fn save_writes_header_then_rows() -> PolarsResult<()> {
    let dir = tempfile::tempdir().expect("tempdir");
    let output = dir.path().join("states.csv");
    let df = df!(
        "State" => &["California", "United States"],
        "Pop" => &[200.5f64, 200.5],
    )?;

    save_table(&df, &output).expect("save failed");
    let written = fs::read_to_string(&output).expect("read back");
    let lines: Vec<&str> = written.lines().collect();
    assert_eq!(lines, vec!["State,Pop", "California,200.5", "United States,200.5"]);
    Ok(())
}
