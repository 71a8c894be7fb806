//! Fetch prompt templates from Langfuse and render their `{{expression}}`
//! placeholders against caller-supplied variables.
//!
//! The rendering core is pure and never fails:
//!
//! ```
//! use langfuse_prompt::template::{render, RenderOptions};
//! use langfuse_prompt::vars::parse_vars;
//! use serde_json::json;
//!
//! let context = parse_vars(Some(json!({"name": "Ada"}))).unwrap();
//! let text = render("Hi {{name.toUpperCase()}}{{missing}}", &context, RenderOptions::default());
//! assert_eq!(text, "Hi ADA");
//! ```
//!
//! [`pipeline`] ties it to a [`langfuse::PromptSource`] for single items and
//! batches.

pub mod config;
pub mod error;
pub mod exit_codes;
pub mod expr;
pub mod langfuse;
pub mod pipeline;
pub mod template;
pub mod vars;
