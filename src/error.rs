//! Error types for the langfuse-prompt crate.
//!
//! Each concern has its own thiserror enum ([`crate::vars::ParseError`],
//! [`crate::langfuse::LangfuseError`]); [`PromptError`] wraps them for the CLI
//! and maps each to an exit code.

use crate::exit_codes;
use crate::langfuse::LangfuseError;
use crate::vars::ParseError;
use thiserror::Error;

/// Main error type for langfuse-prompt operations.
#[derive(Error, Debug)]
pub enum PromptError {
    /// User provided invalid arguments, input, or configuration.
    #[error("{0}")]
    UserError(String),

    /// Vars for an item could not be parsed.
    #[error(transparent)]
    Vars(#[from] ParseError),

    /// Fetching a prompt failed.
    #[error("prompt fetch failed: {0}")]
    Fetch(#[from] LangfuseError),

    /// Writing output failed.
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

impl PromptError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            PromptError::UserError(_) => exit_codes::USER_ERROR,
            PromptError::Vars(_) => exit_codes::VARS_PARSE_FAILURE,
            PromptError::Fetch(_) => exit_codes::FETCH_FAILURE,
            PromptError::Io(_) => exit_codes::USER_ERROR,
        }
    }
}

/// Result type alias for langfuse-prompt operations.
pub type Result<T> = std::result::Result<T, PromptError>;
