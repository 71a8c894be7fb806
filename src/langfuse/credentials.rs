//! Langfuse API credentials.

use crate::error::{PromptError, Result};
use std::fmt;

/// Base URL and key pair for the Langfuse public API.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub base_url: String,
    pub public_key: String,
    pub secret_key: String,
}

impl Credentials {
    pub fn new(
        base_url: impl Into<String>,
        public_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            public_key: public_key.into(),
            secret_key: secret_key.into(),
        }
    }

    /// Check that every field is present.
    ///
    /// Whitespace-only values count as missing.
    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("base_url", &self.base_url, "LANGFUSE_BASE_URL"),
            ("public_key", &self.public_key, "LANGFUSE_PUBLIC_KEY"),
            ("secret_key", &self.secret_key, "LANGFUSE_SECRET_KEY"),
        ];
        for (field, value, env_var) in fields {
            if value.trim().is_empty() {
                return Err(PromptError::UserError(format!(
                    "missing Langfuse credential '{}' (set it in the config file or via {})",
                    field, env_var
                )));
            }
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("base_url", &self.base_url)
            .field("public_key", &self.public_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}
