//! Blocking HTTP client for the Langfuse prompts endpoint.

use super::{Credentials, LangfuseError, PromptSource};
use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Default request timeout (30 seconds).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// User agent sent with every request.
const USER_AGENT: &str = concat!("langfuse-prompt/", env!("CARGO_PKG_VERSION"));

/// Path below the base URL, before the prompt name.
const PROMPTS_PATH: [&str; 4] = ["api", "public", "v2", "prompts"];

/// Longest error body carried into an error message.
const MAX_ERROR_BODY_CHARS: usize = 500;

/// Builds an HTTP client with the given request timeout.
///
/// # Errors
///
/// Returns error if client construction fails
pub fn build_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
}

#[derive(Debug, Deserialize)]
struct PromptResponse {
    #[serde(default)]
    prompt: Option<Value>,
}

/// Langfuse API client. Built once and reused across items.
#[derive(Debug)]
pub struct LangfuseClient {
    http: Client,
    base_url: Url,
    public_key: String,
    secret_key: String,
}

impl LangfuseClient {
    /// Create a client for `credentials`.
    ///
    /// # Errors
    ///
    /// Returns [`LangfuseError::InvalidBaseUrl`] when the base URL does not
    /// parse or cannot carry a path, and [`LangfuseError::Client`] when the
    /// HTTP client cannot be built.
    pub fn new(credentials: &Credentials, timeout: Duration) -> Result<Self, LangfuseError> {
        let base_url = parse_base_url(&credentials.base_url)?;
        let http = build_client(timeout).map_err(LangfuseError::Client)?;
        Ok(Self {
            http,
            base_url,
            public_key: credentials.public_key.clone(),
            secret_key: credentials.secret_key.clone(),
        })
    }

    /// URL for fetching `name` at `label`.
    ///
    /// The name is encoded as a single path segment, so folder-style names
    /// (`team/greeting`) become `team%2Fgreeting`.
    pub fn prompt_url(&self, name: &str, label: &str) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(PROMPTS_PATH).push(name);
        }
        url.query_pairs_mut().append_pair("label", label);
        url
    }
}

impl PromptSource for LangfuseClient {
    fn fetch_template(&self, name: &str, label: &str) -> Result<String, LangfuseError> {
        let url = self.prompt_url(name, label);
        log::info!("fetching prompt '{}' (label '{}')", name, label);
        log::debug!("GET {}", url);

        let response = self
            .http
            .get(url.clone())
            .basic_auth(&self.public_key, Some(&self.secret_key))
            .send()
            .map_err(|source| LangfuseError::Request {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        log::debug!("prompt '{}' responded with {}", name, status);

        let body = response.text().map_err(|source| LangfuseError::Request {
            url: url.to_string(),
            source,
        })?;

        if !status.is_success() {
            return Err(LangfuseError::Status {
                name: name.to_string(),
                status: status.as_u16(),
                body: truncate(&body, MAX_ERROR_BODY_CHARS),
            });
        }

        let parsed: PromptResponse =
            serde_json::from_str(&body).map_err(|e| LangfuseError::Decode {
                name: name.to_string(),
                message: e.to_string(),
            })?;

        template_text(name, parsed.prompt)
    }
}

/// Parse the base URL, dropping any query or fragment.
fn parse_base_url(raw: &str) -> Result<Url, LangfuseError> {
    let invalid = |reason: String| LangfuseError::InvalidBaseUrl {
        url: raw.to_string(),
        reason,
    };
    let mut url = Url::parse(raw.trim()).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot be a base".to_string()));
    }
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    url.set_query(None);
    url.set_fragment(None);
    Ok(url)
}

/// Extract the template from the `prompt` field. Missing or null is empty.
fn template_text(name: &str, prompt: Option<Value>) -> Result<String, LangfuseError> {
    match prompt {
        None | Some(Value::Null) => Ok(String::new()),
        Some(Value::String(text)) => Ok(text),
        Some(other) => Err(LangfuseError::UnexpectedPromptType {
            name: name.to_string(),
            found: json_kind(&other).to_string(),
        }),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}
