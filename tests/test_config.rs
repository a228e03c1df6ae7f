// Configuration and validation tests
// Author: Gabriel Demetrios Lafis

use std::io::Write;

use rust_tabular_model_engine::utils::{
    validate_homogeneous, validate_not_missing, validate_range, validate_required_fields,
};
use rust_tabular_model_engine::{Config, Row, Value};

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.logging.level, "info");
    assert_eq!(config.loader.csv_delimiter, ',');
    assert!(config.loader.csv_has_header);
    assert_eq!(config.log_level_filter(), log::LevelFilter::Info);
}

#[test]
fn test_config_from_json_file() {
    let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
    write!(
        file,
        r#"{{
            "logging": {{"level": "debug", "file": null}},
            "loader": {{"csv_delimiter": ";", "csv_has_header": false}}
        }}"#
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.loader.csv_delimiter, ';');
    assert!(!config.loader.csv_has_header);
    assert_eq!(config.log_level_filter(), log::LevelFilter::Debug);
}

#[test]
fn test_config_from_yaml_file() {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    write!(
        file,
        "logging:\n  level: warn\n  file: null\nloader:\n  csv_delimiter: \",\"\n  csv_has_header: true\n"
    )
    .unwrap();

    let config = Config::from_file(file.path()).unwrap();
    assert_eq!(config.logging.level, "warn");
    assert_eq!(config.log_level_filter(), log::LevelFilter::Warn);
}

#[test]
fn test_config_rejects_unknown_format() {
    let file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_validate_homogeneous() {
    let same_shape = vec![
        Row::from(vec![("a", Value::from(1)), ("b", Value::from(2))]),
        Row::from(vec![("a", Value::from(3)), ("b", Value::from(4))]),
    ];
    assert!(validate_homogeneous(&same_shape).is_ok());

    let ragged = vec![
        Row::from(vec![("a", Value::from(1)), ("b", Value::from(2))]),
        Row::from(vec![("a", Value::from(3))]),
    ];
    assert!(validate_homogeneous(&ragged).is_err());

    assert!(validate_homogeneous(&[]).is_ok());
}

#[test]
fn test_validate_required_fields() {
    let rows = vec![Row::from(vec![("a", Value::from(1))])];

    assert!(validate_required_fields(&rows, &["a"]).is_ok());
    assert!(validate_required_fields(&rows, &["a", "b"]).is_err());
}

#[test]
fn test_validate_not_missing_and_range() {
    assert!(validate_not_missing(&Value::Integer(0), "x").is_ok());
    assert!(validate_not_missing(&Value::Null, "x").is_err());
    assert!(validate_not_missing(&Value::Float(f64::NAN), "x").is_err());

    assert!(validate_range(0.5, 0.0, 1.0, "fraction").is_ok());
    assert!(validate_range(1.5, 0.0, 1.0, "fraction").is_err());
}
