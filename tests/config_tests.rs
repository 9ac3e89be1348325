use gq_cli::error::ConfigError;
use gq_cli::{Config, ProviderKind};
use std::fs;
use tempfile::TempDir;

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(".gq.yaml");
    fs::write(&path, contents).unwrap();
    path
}

#[test]
fn test_load_config_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(
        &dir,
        "defaultProvider: bedrock\nbedrock:\n  modelName: amazon.titan-text-express-v1\n  awsRegion: us-east-1\n",
    );

    let config = Config::load(&path).unwrap();
    assert_eq!(config.resolve_provider(None).unwrap(), ProviderKind::Bedrock);
    assert_eq!(
        config.bedrock().unwrap().model_name,
        "amazon.titan-text-express-v1"
    );
}

#[test]
fn test_missing_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.yaml");

    let err = Config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::ReadFailed { .. }));
    assert!(err.to_string().contains("absent.yaml"));
}

#[test]
fn test_invalid_config_reports_path() {
    let dir = TempDir::new().unwrap();
    let path = write_config(&dir, "gemini:\n  temperature: [not, a, number]\n");

    let err = Config::load(&path).unwrap_err();
    match err {
        ConfigError::ParseFailed { path: reported, .. } => {
            assert!(reported.ends_with(".gq.yaml"));
        }
        other => panic!("expected ParseFailed, got {:?}", other),
    }
}

#[test]
fn test_default_path_location() {
    let home = TempDir::new().unwrap();
    std::env::set_var("HOME", home.path());

    let path = Config::default_path().unwrap();
    assert_eq!(path, home.path().join(".config").join("gq").join(".gq.yaml"));
}
