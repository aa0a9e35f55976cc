use askdb::cli::Args;
use askdb::config::{Config, JsonConfig, DEFAULT_MODEL};
use askdb::dispatcher::{ArgumentSource, ToolBinding};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_load_yaml_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".askdb.yaml");
    fs::write(
        &path,
        r#"
api:
  endpoint: http://localhost:1234/v1
  timeout_secs: 30
model:
  default_model: mistral
  sql_model: sqlcoder
database:
  path: chinook.db
  read_only: true
dispatch:
  binding: native
  arguments: model
"#,
    )
    .unwrap();

    let config = JsonConfig::load_from(&path).unwrap();
    assert_eq!(config.api.endpoint.as_deref(), Some("http://localhost:1234/v1"));
    assert_eq!(config.api.timeout_secs, Some(30));
    assert_eq!(config.model.default_model.as_deref(), Some("mistral"));
    assert_eq!(config.model.sql_model.as_deref(), Some("sqlcoder"));
    assert_eq!(config.database.path.as_deref(), Some("chinook.db"));
    assert!(config.database.read_only);
    assert_eq!(config.dispatch.binding, ToolBinding::Native);
    assert_eq!(config.dispatch.arguments, ArgumentSource::Model);
}

#[test]
fn test_load_partial_json_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".askdb.json");
    fs::write(&path, r#"{"database": {"path": "music.db"}}"#).unwrap();

    let config = JsonConfig::load_from(&path).unwrap();
    assert_eq!(config.database.path.as_deref(), Some("music.db"));
    assert!(!config.database.read_only);
    assert_eq!(config.dispatch.binding, ToolBinding::Prompt);
    assert_eq!(config.dispatch.arguments, ArgumentSource::RawInput);
    assert!(config.api.endpoint.is_none());
}

#[test]
fn test_invalid_config_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.json");
    fs::write(&path, "{ not json").unwrap();

    let err = JsonConfig::load_from(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn test_write_example_round_trips_and_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("askdb.yaml");

    JsonConfig::write_example(&path).unwrap();
    let loaded = JsonConfig::load_from(&path).unwrap();
    assert_eq!(loaded.model.default_model.as_deref(), Some(DEFAULT_MODEL));

    assert!(JsonConfig::write_example(&path).is_err());
}

#[test]
fn test_cli_arguments_take_precedence() {
    let mut file = JsonConfig::default();
    file.model.default_model = Some("from-file".to_string());
    file.database.path = Some("file.db".to_string());
    file.dispatch.binding = ToolBinding::Native;

    let args = Args {
        model: Some("from-cli".to_string()),
        database: Some("cli.db".to_string()),
        api_endpoint: Some("http://example.test/v1".to_string()),
        read_only: true,
        ..Default::default()
    };

    let config = Config::resolve(&args, file).unwrap();
    assert_eq!(config.model, "from-cli");
    assert_eq!(config.database_path.to_str(), Some("cli.db"));
    assert_eq!(config.api_endpoint, "http://example.test/v1");
    assert!(config.read_only);
    assert_eq!(config.binding, ToolBinding::Native);

    let dispatcher = config.dispatcher_config();
    assert_eq!(dispatcher.model, "from-cli");
    assert_eq!(dispatcher.binding, ToolBinding::Native);
}

#[test]
fn test_file_timeout_is_applied_and_zero_rejected() {
    let mut file = JsonConfig::default();
    file.api.timeout_secs = Some(30);
    let config = Config::resolve(&Args::default(), file).unwrap();
    assert_eq!(config.request_timeout, Some(Duration::from_secs(30)));

    let mut file = JsonConfig::default();
    file.api.timeout_secs = Some(0);
    let err = Config::resolve(&Args::default(), file).unwrap_err();
    assert!(format!("{:#}", err).contains("api.timeout_secs"));
}
