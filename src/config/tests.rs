//! Tests for config functionality.

use crate::config::{CONFIG_PATH_ENV, Config, ConfigSource, DEFAULT_CONFIG_FILE};
use crate::error::PromptError;
use serial_test::serial;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

fn no_env(_: &str) -> Option<String> {
    None
}

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> + use<> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name| map.get(name).cloned()
}

fn write_config(dir: &Path, name: &str, yaml: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, yaml).unwrap();
    path
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.base_url, "https://cloud.langfuse.com");
    assert_eq!(config.public_key, "");
    assert_eq!(config.secret_key, "");
    assert_eq!(config.timeout_secs, 30);
    assert_eq!(config.default_label, "production");
    assert!(!config.keep_original_on_error);
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
public_key: pk-lf-123
default_label: staging
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.public_key, "pk-lf-123");
    assert_eq!(config.default_label, "staging");

    // Unspecified values should use defaults
    assert_eq!(config.base_url, "https://cloud.langfuse.com");
    assert_eq!(config.timeout_secs, 30);
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
base_url: https://langfuse.internal.example.com
public_key: pk-lf-1
secret_key: sk-lf-1
timeout_secs: 5
default_label: latest
keep_original_on_error: true
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.base_url, "https://langfuse.internal.example.com");
    assert_eq!(config.public_key, "pk-lf-1");
    assert_eq!(config.secret_key, "sk-lf-1");
    assert_eq!(config.timeout_secs, 5);
    assert_eq!(config.default_label, "latest");
    assert!(config.keep_original_on_error);
}

#[test]
fn test_parse_yaml_with_unknown_fields() {
    let yaml = r#"
public_key: pk
future_option: true
nested:
  thing: 1
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.public_key, "pk");
}

#[test]
fn test_parse_invalid_yaml() {
    let err = Config::from_yaml("timeout_secs: [not a number").unwrap_err();
    assert!(matches!(err, PromptError::UserError(_)));
    assert!(err.to_string().contains("failed to parse config YAML"));
}

#[test]
fn test_validate_zero_timeout() {
    let err = Config::from_yaml("timeout_secs: 0").unwrap_err();
    assert!(err.to_string().contains("timeout_secs must be greater than 0"));
}

#[test]
fn test_validate_empty_base_url() {
    let err = Config::from_yaml("base_url: ''").unwrap_err();
    assert!(err.to_string().contains("base_url must not be empty"));
}

#[test]
fn test_to_yaml() {
    let config = Config::default();
    let yaml = config.to_yaml().unwrap();
    assert!(yaml.contains("default_label: production"));
    assert_eq!(Config::from_yaml(&yaml).unwrap(), config);
}

#[test]
fn test_redacted_hides_secret_only() {
    let config = Config {
        public_key: "pk-lf-1".to_string(),
        secret_key: "sk-lf-very-secret".to_string(),
        ..Config::default()
    };
    let yaml = config.redacted().to_yaml().unwrap();
    assert!(yaml.contains("pk-lf-1"));
    assert!(!yaml.contains("sk-lf-very-secret"));

    assert_eq!(Config::default().redacted().secret_key, "");
}

#[test]
fn test_credentials_and_timeout() {
    let config = Config {
        public_key: "pk".to_string(),
        secret_key: "sk".to_string(),
        timeout_secs: 7,
        ..Config::default()
    };
    let creds = config.credentials();
    assert_eq!(creds.base_url, "https://cloud.langfuse.com");
    assert_eq!(creds.public_key, "pk");
    assert_eq!(creds.secret_key, "sk");
    assert_eq!(config.timeout().as_secs(), 7);
}

#[test]
fn test_config_load_from_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "config.yaml", "public_key: from-file\n");

    let config = Config::load(&path).unwrap();
    assert_eq!(config.public_key, "from-file");
}

#[test]
fn test_config_load_missing_file() {
    let err = Config::load("/nonexistent/langfuse-prompt.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_resolve_defaults_without_any_file() {
    let dir = TempDir::new().unwrap();
    let (config, source) = Config::resolve_with(None, dir.path(), no_env).unwrap();
    assert_eq!(source, ConfigSource::Defaults);
    assert_eq!(config, Config::default());
}

#[test]
fn test_resolve_working_dir_file() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), DEFAULT_CONFIG_FILE, "default_label: wd\n");

    let (config, source) = Config::resolve_with(None, dir.path(), no_env).unwrap();
    assert_eq!(source, ConfigSource::WorkingDir(path));
    assert_eq!(config.default_label, "wd");
}

#[test]
fn test_resolve_env_path_beats_working_dir() {
    let dir = TempDir::new().unwrap();
    write_config(dir.path(), DEFAULT_CONFIG_FILE, "default_label: wd\n");
    let env_path = write_config(dir.path(), "env.yaml", "default_label: env\n");

    let env = env_from(&[(CONFIG_PATH_ENV, env_path.to_str().unwrap())]);
    let (config, source) = Config::resolve_with(None, dir.path(), env).unwrap();
    assert_eq!(source, ConfigSource::Env(env_path));
    assert_eq!(config.default_label, "env");
}

#[test]
fn test_resolve_flag_beats_env_path() {
    let dir = TempDir::new().unwrap();
    let env_path = write_config(dir.path(), "env.yaml", "default_label: env\n");
    let flag_path = write_config(dir.path(), "flag.yaml", "default_label: flag\n");

    let env = env_from(&[(CONFIG_PATH_ENV, env_path.to_str().unwrap())]);
    let (config, source) = Config::resolve_with(Some(flag_path.as_path()), dir.path(), env).unwrap();
    assert_eq!(source, ConfigSource::Flag(flag_path));
    assert_eq!(config.default_label, "flag");
}

#[test]
fn test_resolve_missing_flag_file_is_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");
    let err = Config::resolve_with(Some(missing.as_path()), dir.path(), no_env).unwrap_err();
    assert!(matches!(err, PromptError::UserError(_)));
}

#[test]
fn test_resolve_env_overrides_connection_fields() {
    let dir = TempDir::new().unwrap();
    write_config(
        dir.path(),
        DEFAULT_CONFIG_FILE,
        "base_url: https://file.example.com\npublic_key: pk-file\nsecret_key: sk-file\n",
    );

    let env = env_from(&[
        ("LANGFUSE_BASE_URL", "https://env.example.com"),
        ("LANGFUSE_PUBLIC_KEY", "pk-env"),
        ("LANGFUSE_SECRET_KEY", ""),
    ]);
    let (config, _) = Config::resolve_with(None, dir.path(), env).unwrap();
    assert_eq!(config.base_url, "https://env.example.com");
    assert_eq!(config.public_key, "pk-env");
    // Empty variables do not override.
    assert_eq!(config.secret_key, "sk-file");
}

#[test]
fn test_resolve_host_is_base_url_fallback() {
    let dir = TempDir::new().unwrap();
    let env = env_from(&[("LANGFUSE_HOST", "https://host.example.com")]);
    let (config, _) = Config::resolve_with(None, dir.path(), env).unwrap();
    assert_eq!(config.base_url, "https://host.example.com");

    let env = env_from(&[
        ("LANGFUSE_HOST", "https://host.example.com"),
        ("LANGFUSE_BASE_URL", "https://base.example.com"),
    ]);
    let (config, _) = Config::resolve_with(None, dir.path(), env).unwrap();
    assert_eq!(config.base_url, "https://base.example.com");
}

#[test]
#[serial]
fn test_resolve_reads_process_environment() {
    let dir = TempDir::new().unwrap();
    let path = write_config(dir.path(), "process.yaml", "public_key: pk-process\n");

    unsafe {
        std::env::set_var(CONFIG_PATH_ENV, &path);
        std::env::set_var("LANGFUSE_SECRET_KEY", "sk-process");
    }

    let result = Config::resolve(None);

    unsafe {
        std::env::remove_var(CONFIG_PATH_ENV);
        std::env::remove_var("LANGFUSE_SECRET_KEY");
    }

    let (config, source) = result.unwrap();
    assert_eq!(source, ConfigSource::Env(path));
    assert_eq!(config.public_key, "pk-process");
    assert_eq!(config.secret_key, "sk-process");
}
