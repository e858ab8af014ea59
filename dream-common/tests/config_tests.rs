//! Tests for configuration loading and root folder resolution
//!
//! Covers:
//! - Missing TOML files fall back to defaults instead of failing
//! - Malformed TOML files are reported
//! - Root folder priority: CLI → DREAM_ROOT_FOLDER → DREAM_ROOT → TOML → default
//!
//! Tests that manipulate DREAM_ROOT_FOLDER or DREAM_ROOT are marked with
//! #[serial] so they never race each other.

use dream_common::config::{
    load_toml_or_default, CompiledDefaults, LoggingConfig, RootFolderResolver, TomlConfig, ENV_ROOT, ENV_ROOT_FOLDER,
};
use dream_common::Error;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use tempfile::TempDir;

fn clear_root_env() {
    env::remove_var(ENV_ROOT_FOLDER);
    env::remove_var(ENV_ROOT);
}

#[test]
fn test_compiled_defaults_for_current_platform() {
    let defaults = CompiledDefaults::for_current_platform();

    assert!(!defaults.root_folder.as_os_str().is_empty());
    assert!(defaults.root_folder.to_string_lossy().contains("dreamlens"));
    assert_eq!(defaults.log_level, "info");
}

#[test]
#[serial]
fn test_resolver_with_no_overrides_uses_default() {
    clear_root_env();

    let root_folder = RootFolderResolver::new("test-module").resolve();

    assert_eq!(root_folder, CompiledDefaults::for_current_platform().root_folder);
}

#[test]
#[serial]
fn test_resolver_env_var_root_folder() {
    clear_root_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/dream-test-env-folder");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/dream-test-env-folder"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_root_folder_takes_precedence_over_root() {
    clear_root_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/dream-priority-1");
    env::set_var(ENV_ROOT, "/tmp/dream-priority-2");

    let root_folder = RootFolderResolver::new("test-module").resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/dream-priority-1"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_cli_beats_environment() {
    clear_root_env();
    env::set_var(ENV_ROOT_FOLDER, "/tmp/dream-env");

    let root_folder = RootFolderResolver::new("test-module")
        .with_cli_arg(Some(PathBuf::from("/tmp/dream-cli")))
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/dream-cli"));

    clear_root_env();
}

#[test]
#[serial]
fn test_resolver_toml_used_when_env_absent() {
    clear_root_env();
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/tmp/dream-toml")),
        ..Default::default()
    };

    let root_folder = RootFolderResolver::new("test-module")
        .with_toml(&config)
        .resolve();
    assert_eq!(root_folder, PathBuf::from("/tmp/dream-toml"));
}

#[test]
fn test_missing_toml_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("does-not-exist.toml");

    let config: TomlConfig = load_toml_or_default(&path).unwrap();

    assert!(config.root_folder.is_none());
    assert!(config.artifacts_dir.is_none());
    assert_eq!(config.logging, LoggingConfig::default());
}

#[test]
fn test_toml_file_is_parsed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dream-analysis.toml");
    std::fs::write(
        &path,
        r#"
root_folder = "/srv/dreams"
artifacts_dir = "/srv/dreams/models"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config: TomlConfig = load_toml_or_default(&path).unwrap();

    assert_eq!(config.root_folder, Some(PathBuf::from("/srv/dreams")));
    assert_eq!(config.artifacts_dir, Some(PathBuf::from("/srv/dreams/models")));
    assert_eq!(config.logging.level, "debug");
}

#[test]
fn test_malformed_toml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("broken.toml");
    std::fs::write(&path, "root_folder = [unterminated").unwrap();

    let result: Result<TomlConfig, Error> = load_toml_or_default(&path);

    assert!(matches!(result, Err(Error::Toml(_))));
}
