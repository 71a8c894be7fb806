//! Langfuse prompt retrieval.
//!
//! Fetches raw prompt templates from the Langfuse public API:
//!
//! ```text
//! GET {base_url}/api/public/v2/prompts/{name}?label={label}
//! Authorization: Basic base64(public_key:secret_key)
//! ```
//!
//! The [`PromptSource`] trait is the seam between the batch pipeline and the
//! network, so the pipeline can run against an in-memory source in tests.

mod client;
mod credentials;


pub use client::{DEFAULT_TIMEOUT, LangfuseClient, build_client};
pub use credentials::Credentials;

use thiserror::Error;

/// Prompt fetch errors.
#[derive(Debug, Error)]
pub enum LangfuseError {
    /// The configured base URL cannot be used.
    #[error("invalid Langfuse base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The HTTP client could not be built.
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The request did not complete.
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Langfuse answered with a non-success status.
    #[error("Langfuse returned HTTP {status} for prompt '{name}': {body}")]
    Status {
        name: String,
        status: u16,
        body: String,
    },

    /// The response body was not the expected JSON.
    #[error("could not decode response for prompt '{name}': {message}")]
    Decode { name: String, message: String },

    /// The prompt exists but is not a text prompt.
    #[error("prompt '{name}' is not a text prompt (found {found})")]
    UnexpectedPromptType { name: String, found: String },
}

/// Anything that can resolve a prompt name and label to a raw template.
pub trait PromptSource {
    /// Return the raw template text. A prompt with no text yields `""`.
    fn fetch_template(&self, name: &str, label: &str) -> Result<String, LangfuseError>;
}
