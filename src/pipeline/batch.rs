//! Batch host: run the pipeline over a sequence of items.

use super::{PromptRequest, process_item};
use crate::error::{PromptError, Result};
use crate::langfuse::PromptSource;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::Write;

/// One batch input item. Missing fields fall back to [`ItemDefaults`].
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchItem {
    #[serde(default)]
    pub prompt_name: Option<String>,
    #[serde(default)]
    pub prompt_label: Option<String>,
    #[serde(default)]
    pub vars: Option<Value>,
    #[serde(default)]
    pub keep_original_on_error: Option<bool>,
}

/// Values used when an item leaves a field out.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ItemDefaults {
    pub name: Option<String>,
    pub label: String,
    pub keep_original_on_error: bool,
}

impl BatchItem {
    /// Resolve against defaults.
    pub fn into_request(self, defaults: &ItemDefaults) -> Result<PromptRequest> {
        let name = self
            .prompt_name
            .or_else(|| defaults.name.clone())
            .ok_or_else(|| {
                PromptError::UserError(
                    "item has no promptName and no default name was given".to_string(),
                )
            })?;
        Ok(PromptRequest {
            name,
            label: self.prompt_label.unwrap_or_else(|| defaults.label.clone()),
            vars: self.vars,
            keep_original_on_error: self
                .keep_original_on_error
                .unwrap_or(defaults.keep_original_on_error),
        })
    }
}

/// Batch behavior switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchOptions {
    /// Record a failed item and keep going instead of stopping.
    pub continue_on_fail: bool,
}

/// Counts for a finished batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Serialize)]
struct FailureRecord<'a> {
    index: usize,
    error: &'a str,
}

/// Parse batch input: a JSON array of items, or a stream of JSON values
/// (JSON Lines). Blank input is an empty batch.
pub fn parse_batch_input(text: &str) -> Result<Vec<Value>> {
    let trimmed = text.trim_start();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let invalid = |e: serde_json::Error| PromptError::UserError(format!("invalid batch input: {}", e));

    if trimmed.starts_with('[') {
        return serde_json::from_str(trimmed).map_err(invalid);
    }

    serde_json::Deserializer::from_str(trimmed)
        .into_iter::<Value>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(invalid)
}

/// Process `items` in order, writing one JSON record per line to `out`.
///
/// Items are independent: one item's failure never changes another item's
/// output. Without [`BatchOptions::continue_on_fail`] the first failure stops
/// the batch and is returned; records already written stay written.
pub fn run_batch<W: Write>(
    source: &dyn PromptSource,
    items: Vec<Value>,
    defaults: &ItemDefaults,
    options: BatchOptions,
    out: &mut W,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (index, item) in items.into_iter().enumerate() {
        match process_value(source, item, defaults) {
            Ok(record) => {
                serde_json::to_writer(&mut *out, &record).map_err(std::io::Error::from)?;
                writeln!(out)?;
                summary.succeeded += 1;
            }
            Err(err) if options.continue_on_fail => {
                log::warn!("item {} failed: {}", index, err);
                let message = err.to_string();
                let failure = FailureRecord {
                    index,
                    error: &message,
                };
                serde_json::to_writer(&mut *out, &failure).map_err(std::io::Error::from)?;
                writeln!(out)?;
                summary.failed += 1;
            }
            Err(err) => {
                log::error!("item {} failed, stopping batch: {}", index, err);
                out.flush()?;
                return Err(err);
            }
        }
    }

    out.flush()?;
    log::info!(
        "batch finished: {} succeeded, {} failed",
        summary.succeeded,
        summary.failed
    );
    Ok(summary)
}

fn process_value(
    source: &dyn PromptSource,
    item: Value,
    defaults: &ItemDefaults,
) -> Result<super::PromptRecord> {
    let item: BatchItem = serde_json::from_value(item)
        .map_err(|e| PromptError::UserError(format!("invalid batch item: {}", e)))?;
    let request = item.into_request(defaults)?;
    process_item(source, &request)
}
