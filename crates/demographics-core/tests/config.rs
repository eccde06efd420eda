use std::path::PathBuf;

use demographics_core::config::DEFAULT_GROUP_COLUMN;
use demographics_core::states::default_state_map;
use demographics_core::{ConfigError, PipelineConfig, UnmappedStatePolicy};

#[test]
fn parses_full_config() {
    let config = PipelineConfig::from_toml_str(
        r#"
input_path = "data/counties.csv"
output_path = "data/states.csv"
agg_cols = ["TotalPop", "VotingAgeCitizen"]
group_column = "StateCode"
unmapped_state = "retain"

[state_map]
CA = "California"
"#,
    )
    .expect("config should parse");

    assert_eq!(config.input_path, PathBuf::from("data/counties.csv"));
    assert_eq!(config.output_path, PathBuf::from("data/states.csv"));
    assert_eq!(config.agg_cols, vec!["TotalPop", "VotingAgeCitizen"]);
    assert_eq!(config.group_column, "StateCode");
    assert_eq!(config.unmapped_state, UnmappedStatePolicy::Retain);
    assert_eq!(config.state_map.len(), 1);
    assert_eq!(config.state_map.get("CA").map(String::as_str), Some("California"));
}

#[test]
fn optional_fields_fall_back_to_defaults() {
    let config = PipelineConfig::from_toml_str(
        r#"
input_path = "in.csv"
output_path = "out.csv"
agg_cols = ["TotalPop"]
"#,
    )
    .expect("config should parse");

    assert_eq!(config.group_column, DEFAULT_GROUP_COLUMN);
    assert_eq!(config.unmapped_state, UnmappedStatePolicy::Fail);
    assert_eq!(&config.state_map, default_state_map());
}

#[test]
fn rejects_empty_and_duplicate_aggregation_lists() {
    let empty = PipelineConfig::from_toml_str(
        r#"
input_path = "in.csv"
output_path = "out.csv"
agg_cols = []
"#,
    );
    assert!(matches!(empty, Err(ConfigError::Invalid(_))));

    let duplicate = PipelineConfig::from_toml_str(
        r#"
input_path = "in.csv"
output_path = "out.csv"
agg_cols = ["TotalPop", "TotalPop"]
"#,
    );
    assert!(matches!(duplicate, Err(ConfigError::Invalid(message)) if message.contains("TotalPop")));
}

#[test]
fn rejects_unknown_policy() {
    let result = PipelineConfig::from_toml_str(
        r#"
input_path = "in.csv"
output_path = "out.csv"
agg_cols = ["TotalPop"]
unmapped_state = "guess"
"#,
    );
    assert!(matches!(result, Err(ConfigError::Parse(_))));
}

#[test]
fn missing_config_file_is_a_read_error() {
    let result = PipelineConfig::from_path(&PathBuf::from("/nonexistent/demographics.toml"));
    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[test]
fn policy_parses_from_text() {
    assert_eq!(
        UnmappedStatePolicy::try_from(" Retain "),
        Ok(UnmappedStatePolicy::Retain)
    );
    assert_eq!(
        UnmappedStatePolicy::try_from("fail"),
        Ok(UnmappedStatePolicy::Fail)
    );
    assert!(UnmappedStatePolicy::try_from("drop").is_err());
}

#[test]
fn default_state_map_covers_states_dc_and_puerto_rico() {
    let states = default_state_map();
    assert_eq!(states.len(), 52);
    assert_eq!(states.get("DC").map(String::as_str), Some("District of Columbia"));
    assert_eq!(states.get("WY").map(String::as_str), Some("Wyoming"));
}

#[test]
fn rejects_state_map_targeting_the_national_label() {
    let config = PipelineConfig::from_toml_str(
        r#"
input_path = "in.csv"
output_path = "out.csv"
agg_cols = ["TotalPop"]

[state_map]
CA = "California"
US = "United States"
"#,
    );
    assert!(matches!(config, Err(ConfigError::Invalid(message)) if message.contains("'US'")));
}
