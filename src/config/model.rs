//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Configuration for Langfuse access and rendering defaults.
///
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Connection settings
    // =========================================================================
    /// Langfuse host, with or without a path prefix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Project public key (`pk-lf-...`).
    #[serde(default)]
    pub public_key: String,

    /// Project secret key (`sk-lf-...`).
    #[serde(default)]
    pub secret_key: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // =========================================================================
    // Rendering defaults
    // =========================================================================
    /// Label requested when an item does not name one.
    #[serde(default = "default_label")]
    pub default_label: String,

    /// Keep failed placeholders verbatim unless an item says otherwise.
    #[serde(default)]
    pub keep_original_on_error: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            public_key: String::new(),
            secret_key: String::new(),
            timeout_secs: default_timeout_secs(),
            default_label: default_label(),
            keep_original_on_error: false,
        }
    }
}

fn default_base_url() -> String {
    "https://cloud.langfuse.com".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_label() -> String {
    "production".to_string()
}

/// Where the effective config file came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// `--config PATH`.
    Flag(PathBuf),
    /// The config path environment variable.
    Env(PathBuf),
    /// The default file in the working directory.
    WorkingDir(PathBuf),
    /// No file; built-in defaults.
    Defaults,
}

impl fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigSource::Flag(path) => write!(f, "{} (--config)", path.display()),
            ConfigSource::Env(path) => write!(f, "{} (LANGFUSE_PROMPT_CONFIG)", path.display()),
            ConfigSource::WorkingDir(path) => write!(f, "{}", path.display()),
            ConfigSource::Defaults => write!(f, "built-in defaults"),
        }
    }
}
