//! Placeholder rendering for prompt templates.
//!
//! Every `{{expr}}` span in a template is replaced by the canonical string
//! form of `expr` evaluated against a [`VariableContext`]. See
//! [`crate::expr`] for the expression language.
//!
//! # Syntax
//!
//! - `{{expr}}` - Placeholder. `expr` may not contain a line break and ends at
//!   the first `}}`.
//! - There is no escape for a literal `{{`.
//!
//! # Fallback
//!
//! Rendering never fails. A placeholder whose expression fails to parse or
//! evaluate, or evaluates to `null`/`undefined`, is replaced by either the
//! empty string or its original text, depending on
//! [`RenderOptions::keep_original_on_error`].

#[cfg(test)]
mod tests;

use crate::expr::{Bindings, Expression, Value};
use crate::vars::VariableContext;
use regex::{Captures, Regex};
use std::sync::LazyLock;

/// `{{`, then the shortest run of non-line-terminators, then `}}`.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^\n\r\x{2028}\x{2029}]*?)\}\}").expect("Invalid placeholder regex")
});

/// Rendering switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Keep a failed placeholder's original `{{expr}}` text instead of
    /// dropping it.
    pub keep_original_on_error: bool,
}

impl RenderOptions {
    pub fn keep_original(keep_original_on_error: bool) -> Self {
        Self {
            keep_original_on_error,
        }
    }
}

/// Render `template` against `context`.
pub fn render(template: &str, context: &VariableContext, options: RenderOptions) -> String {
    if !template.contains("{{") {
        return template.to_string();
    }

    let bindings = Bindings::new(context.as_map());
    if let Some(name) = bindings.invalid_name() {
        log::warn!(
            "variable '{}' is not a valid identifier, every placeholder will use the fallback",
            name
        );
    }

    PLACEHOLDER_REGEX
        .replace_all(template, |caps: &Captures| {
            let original = &caps[0];
            match substitute(&caps[1], &bindings) {
                Ok(text) => text,
                Err(reason) => {
                    log::debug!("placeholder {} fell back: {}", original, reason);
                    fallback(original, options)
                }
            }
        })
        .into_owned()
}

fn substitute(source: &str, bindings: &Bindings) -> Result<String, String> {
    let value = Expression::parse(source)
        .and_then(|expr| expr.evaluate(bindings))
        .map_err(|e| e.to_string())?;
    match value {
        Value::Undefined => Err("evaluated to undefined".to_string()),
        Value::Null => Err("evaluated to null".to_string()),
        value => Ok(value.to_js_string()),
    }
}

fn fallback(original: &str, options: RenderOptions) -> String {
    if options.keep_original_on_error {
        original.to_string()
    } else {
        String::new()
    }
}
