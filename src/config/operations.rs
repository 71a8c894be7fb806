//! Config loading, resolution, validation, and utility operations.

use super::model::{Config, ConfigSource};
use crate::error::{PromptError, Result};
use crate::langfuse::Credentials;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = ".langfuse-prompt.yaml";

/// Environment variable naming a config file.
pub const CONFIG_PATH_ENV: &str = "LANGFUSE_PROMPT_CONFIG";

const BASE_URL_ENV: &str = "LANGFUSE_BASE_URL";
const HOST_ENV: &str = "LANGFUSE_HOST";
const PUBLIC_KEY_ENV: &str = "LANGFUSE_PUBLIC_KEY";
const SECRET_KEY_ENV: &str = "LANGFUSE_SECRET_KEY";

const REDACTED: &str = "<redacted>";

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the config file
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(PromptError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            PromptError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes as null rather than an empty mapping.
        if yaml.trim().is_empty() {
            return Ok(Config::default());
        }

        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| PromptError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            PromptError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `timeout_secs` must be positive
    /// - `base_url` must be non-empty
    pub fn validate(&self) -> Result<()> {
        if self.timeout_secs == 0 {
            return Err(PromptError::UserError(
                "config validation failed: timeout_secs must be greater than 0".to_string(),
            ));
        }

        if self.base_url.trim().is_empty() {
            return Err(PromptError::UserError(
                "config validation failed: base_url must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Resolve the effective config from the process environment.
    ///
    /// Lookup order: `explicit` (must exist), then the file named by
    /// `LANGFUSE_PROMPT_CONFIG`, then `.langfuse-prompt.yaml` in the working
    /// directory if present, then defaults. Connection fields are then
    /// overridden from `LANGFUSE_BASE_URL` (or `LANGFUSE_HOST`),
    /// `LANGFUSE_PUBLIC_KEY` and `LANGFUSE_SECRET_KEY`.
    pub fn resolve(explicit: Option<&Path>) -> Result<(Self, ConfigSource)> {
        let working_dir = std::env::current_dir().map_err(|e| {
            PromptError::UserError(format!("failed to determine working directory: {}", e))
        })?;
        Self::resolve_with(explicit, &working_dir, |name| std::env::var(name).ok())
    }

    /// [`Config::resolve`] with an explicit working directory and environment.
    pub fn resolve_with<F>(
        explicit: Option<&Path>,
        working_dir: &Path,
        env: F,
    ) -> Result<(Self, ConfigSource)>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |name: &str| env(name).filter(|value| !value.trim().is_empty());

        let source = match (explicit, lookup(CONFIG_PATH_ENV)) {
            (Some(path), _) => ConfigSource::Flag(path.to_path_buf()),
            (None, Some(path)) => ConfigSource::Env(PathBuf::from(path)),
            (None, None) => {
                let candidate = working_dir.join(DEFAULT_CONFIG_FILE);
                if candidate.is_file() {
                    ConfigSource::WorkingDir(candidate)
                } else {
                    ConfigSource::Defaults
                }
            }
        };

        let mut config = match &source {
            ConfigSource::Flag(path) | ConfigSource::Env(path) | ConfigSource::WorkingDir(path) => {
                Self::load(path)?
            }
            ConfigSource::Defaults => Config::default(),
        };
        log::debug!("config source: {}", source);

        if let Some(base_url) = lookup(BASE_URL_ENV).or_else(|| lookup(HOST_ENV)) {
            log::debug!("base_url overridden from environment");
            config.base_url = base_url;
        }
        if let Some(public_key) = lookup(PUBLIC_KEY_ENV) {
            log::debug!("public_key overridden from environment");
            config.public_key = public_key;
        }
        if let Some(secret_key) = lookup(SECRET_KEY_ENV) {
            log::debug!("secret_key overridden from environment");
            config.secret_key = secret_key;
        }

        config.validate()?;
        Ok((config, source))
    }

    /// Langfuse credentials from the connection fields.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.base_url, &self.public_key, &self.secret_key)
    }

    /// Request timeout as a duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Copy of the config safe to print.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if !config.secret_key.is_empty() {
            config.secret_key = REDACTED.to_string();
        }
        config
    }
}
