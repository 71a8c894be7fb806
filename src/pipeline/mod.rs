//! Per-item prompt pipeline: normalize vars, fetch the template, render.
//!
//! Vars are parsed before anything touches the network, so an item with
//! unparseable vars never costs a request.

mod batch;


pub use batch::{BatchItem, BatchOptions, BatchSummary, ItemDefaults, parse_batch_input, run_batch};

use crate::error::{PromptError, Result};
use crate::langfuse::PromptSource;
use crate::template::{self, RenderOptions};
use crate::vars::{self, VariableContext};
use serde::Serialize;
use serde_json::Value;

/// One prompt to fetch and render.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptRequest {
    pub name: String,
    pub label: String,
    /// Raw vars in any accepted shape.
    pub vars: Option<Value>,
    pub keep_original_on_error: bool,
}

/// Output record for one processed item.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptRecord {
    pub name: String,
    /// `None` when the requested label was empty.
    pub label: Option<String>,
    pub raw_template: String,
    pub vars: VariableContext,
    pub prompt: String,
}

/// Fetch and render one prompt.
///
/// # Errors
///
/// - [`PromptError::UserError`] for an empty prompt name
/// - [`PromptError::Vars`] when a vars string is not JSON (checked first)
/// - [`PromptError::Fetch`] when the template cannot be fetched
pub fn process_item(source: &dyn PromptSource, request: &PromptRequest) -> Result<PromptRecord> {
    if request.name.trim().is_empty() {
        return Err(PromptError::UserError("prompt name is required".to_string()));
    }

    let context = vars::parse_vars(request.vars.clone())?;
    let raw_template = source.fetch_template(&request.name, &request.label)?;
    let prompt = template::render(
        &raw_template,
        &context,
        RenderOptions::keep_original(request.keep_original_on_error),
    );

    Ok(PromptRecord {
        name: request.name.clone(),
        label: (!request.label.is_empty()).then(|| request.label.clone()),
        raw_template,
        vars: context,
        prompt,
    })
}
