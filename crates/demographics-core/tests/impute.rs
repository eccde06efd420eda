use demographics_core::impute::{impute_missing_values, median, mode};
use demographics_core::noisy::normalize_noisy_values;
use demographics_core::PipelineError;
use polars::prelude::*;

#[test]
fn median_handles_odd_and_even_counts() {
    assert_eq!(median(&[]), None);
    assert_eq!(median(&[100.0]), Some(100.0));
    assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
    assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
}

#[test]
fn mode_breaks_ties_by_sort_order() {
    assert_eq!(mode(Vec::<&str>::new()), None);
    assert_eq!(mode(["TX", "CA", "TX"]), Some("TX"));
    assert_eq!(mode(["TX", "CA", "NY", "CA", "TX"]), Some("CA"));
    assert_eq!(mode(["b", "a"]), Some("a"));
}

#[test]
fn fills_numeric_with_median_and_text_with_mode() -> PolarsResult<()> {
    let df = df!(
        "State" => &[Some("CA"), Some(" "), Some("TX"), Some("CA")],
        "Pop" => &[Some("-1"), Some("100"), Some("50"), Some("10")],
    )?;

    let normalized = normalize_noisy_values(&df).expect("normalize failed");
    let imputed = impute_missing_values(&normalized).expect("impute failed");
    let frame = imputed.frame();

    for column in frame.get_columns() {
        assert_eq!(column.null_count(), 0, "{} still has nulls", column.name());
    }

    let pop = frame.column("Pop")?.f64()?;
    assert_eq!(pop.get(0), Some(50.0));

    let state = frame.column("State")?.str()?;
    assert_eq!(state.get(1), Some("CA"));
    assert_eq!(imputed.kinds(), normalized.kinds());
    Ok(())
}

#[test]
fn entirely_missing_column_has_no_imputation_source() -> PolarsResult<()> {
    let df = df!(
        "State" => &["CA", "TX"],
        "Households" => &["-1", "-1"],
    )?;

    let normalized = normalize_noisy_values(&df).expect("normalize failed");
    match impute_missing_values(&normalized) {
        Err(PipelineError::NoImputationSource { column }) => assert_eq!(column, "Households"),
        other => panic!("expected NoImputationSource, got {other:?}"),
    }
    Ok(())
}

#[test]
fn entirely_missing_text_column_has_no_imputation_source() -> PolarsResult<()> {
    let df = df!(
        "State" => &[" ", " "],
        "Pop" => &["1", "2"],
    )?;

    let normalized = normalize_noisy_values(&df).expect("normalize failed");
    assert!(matches!(
        impute_missing_values(&normalized),
        Err(PipelineError::NoImputationSource { column }) if column == "State"
    ));
    Ok(())
}

#[test]
fn header_only_table_needs_no_imputation() -> PolarsResult<()> {
    let df = df!(
        "State" => Vec::<&str>::new(),
        "Pop" => Vec::<&str>::new(),
    )?;

    let normalized = normalize_noisy_values(&df).expect("normalize failed");
    let imputed = impute_missing_values(&normalized).expect("impute failed");
    assert_eq!(imputed.frame().height(), 0);
    Ok(())
}
