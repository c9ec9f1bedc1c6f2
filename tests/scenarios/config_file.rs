//! Sample configuration

use learnflow::config;
use std::path::PathBuf;

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config.example.toml")
}

#[test]
fn test_sample_config_is_valid() {
    let cfg = config::load(sample_path()).unwrap();
    let result = config::validate(&cfg);

    assert!(!result.has_errors(), "errors: {:?}", result.errors);
    assert!(result.warnings.is_empty(), "warnings: {:?}", result.warnings);
    assert!(!cfg.fabric.switches.is_empty());
    assert!(!cfg.traffic.is_empty());
}

#[test]
fn test_missing_config_file() {
    assert!(matches!(
        config::load("does/not/exist.toml"),
        Err(learnflow::Error::Io(_))
    ));
}
