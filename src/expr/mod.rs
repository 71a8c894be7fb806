//! Embedded expression evaluator for placeholder contents.
//!
//! Placeholders hold JavaScript-style expressions (`name.toUpperCase()`,
//! `count + 1`, `user?.email ?? "n/a"`). This module evaluates them against a
//! set of bindings built from the variable context:
//!
//! - **Lexer**: tokens, comments, string escapes
//! - **Parser**: precedence-climbing parser producing an AST
//! - **Evaluator**: tree-walking evaluation with JavaScript coercion rules
//! - **Methods**: read-only built-in methods on strings, arrays and numbers
//!
//! # Binding contract
//!
//! The only free names an expression can reach are the context keys, plus
//! `undefined`, `NaN` and `Infinity` (which context keys shadow). There are no
//! globals, no assignment, no function definitions and no I/O.
//!
//! If any context key cannot be used as an identifier (`"first name"`,
//! `"class"`), the bindings are unusable as a whole and every evaluation fails
//! with [`EvalError::InvalidBinding`].
//!
//! Nesting and tree height are capped; deeper input fails with
//! [`EvalError::Range`] before anything recurses past the cap.

mod eval;
mod lexer;
mod methods;
mod parser;
mod value;

#[cfg(test)]
mod tests;

pub use value::{NativeFunction, Value, format_number};

use serde_json::{Map, Value as JsonValue};
use std::collections::HashMap;
use thiserror::Error;

/// Failure evaluating a single expression.
///
/// Never surfaced to callers of the renderer; it only selects the fallback.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("syntax error: {0}")]
    Syntax(String),

    #[error("reference error: {0}")]
    Reference(String),

    #[error("type error: {0}")]
    Type(String),

    #[error("range error: {0}")]
    Range(String),

    /// A context key is not usable as an identifier.
    #[error("'{0}' cannot be bound as a variable name")]
    InvalidBinding(String),
}

/// Names visible to expressions, converted once per render.
#[derive(Debug, Default)]
pub struct Bindings {
    values: HashMap<String, Value>,
    invalid: Option<String>,
}

impl Bindings {
    /// Build bindings from a JSON object.
    pub fn new(context: &Map<String, JsonValue>) -> Self {
        let invalid = context
            .keys()
            .find(|name| !is_bindable(name))
            .cloned();
        let values = context
            .iter()
            .map(|(name, value)| (name.clone(), Value::from(value)))
            .collect();
        Self { values, invalid }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// The first context key that cannot be bound, if any.
    pub fn invalid_name(&self) -> Option<&str> {
        self.invalid.as_deref()
    }
}

/// Whether a context key can be bound as an identifier.
pub fn is_bindable(name: &str) -> bool {
    lexer::is_identifier(name) && !parser::is_reserved_word(name)
}

/// A parsed expression, ready to evaluate against any bindings.
#[derive(Debug, Clone)]
pub struct Expression {
    ast: parser::Expr,
}

impl Expression {
    /// Parse expression source.
    ///
    /// The source is parsed as if parenthesized, so `a) + (b` is a valid
    /// expression and `a; b` is not.
    pub fn parse(source: &str) -> Result<Self, EvalError> {
        let ast = parser::parse(&format!("({})", source))?;
        Ok(Self { ast })
    }

    pub fn evaluate(&self, bindings: &Bindings) -> Result<Value, EvalError> {
        if let Some(name) = bindings.invalid_name() {
            return Err(EvalError::InvalidBinding(name.to_string()));
        }
        eval::evaluate(&self.ast, bindings)
    }
}

/// Parse and evaluate `source` in one step.
pub fn evaluate(source: &str, bindings: &Bindings) -> Result<Value, EvalError> {
    Expression::parse(source)?.evaluate(bindings)
}
