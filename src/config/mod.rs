//! Configuration model for langfuse-prompt.
//!
//! This module defines the Config struct that represents `.langfuse-prompt.yaml`.
//! It supports forward-compatible YAML parsing (unknown fields are ignored),
//! defaults for optional fields, environment overrides for the Langfuse
//! connection, and validation of config values.

mod model;
mod operations;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{Config, ConfigSource};
pub use operations::{CONFIG_PATH_ENV, DEFAULT_CONFIG_FILE};
