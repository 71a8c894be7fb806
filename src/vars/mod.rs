//! Variable context normalization.
//!
//! Callers hand over "vars" in whatever shape they have: an assignment list
//! (`{"assignments": [{"name": "x", "value": 1}]}`), a JSON string, a plain
//! object, or nothing at all. This module classifies that input into
//! [`RawVars`] and flattens it into a [`VariableContext`].
//!
//! Only one input is rejected: a string that is not valid JSON. Every other
//! malformed shape degrades to an empty or partial context.


use crate::expr;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Field that marks an object as an assignment list.
const ASSIGNMENTS_FIELD: &str = "assignments";

/// A vars string could not be parsed as JSON.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("failed to parse vars as JSON: {message}")]
pub struct ParseError {
    pub message: String,
}

/// Classified vars input.
#[derive(Debug, Clone, PartialEq)]
pub enum RawVars {
    /// Object carrying an `assignments` field (its value, whatever its shape).
    AssignmentList(Value),
    /// JSON text still to be parsed.
    JsonString(String),
    /// Object used as the context directly. An array lands here keyed by
    /// index, and those keys can never be bound.
    PlainObject(Map<String, Value>),
    /// Null, absent, or a scalar with nothing to bind.
    Empty,
}

impl RawVars {
    /// Classify raw input. The assignments check runs before the plain-object
    /// fallback.
    pub fn classify(input: Option<Value>) -> Self {
        match input {
            Some(Value::Object(mut map)) => match map.remove(ASSIGNMENTS_FIELD) {
                Some(assignments) => RawVars::AssignmentList(assignments),
                None => RawVars::PlainObject(map),
            },
            Some(Value::String(text)) => RawVars::JsonString(text),
            Some(Value::Array(items)) => RawVars::PlainObject(
                items
                    .into_iter()
                    .enumerate()
                    .map(|(index, item)| (index.to_string(), item))
                    .collect(),
            ),
            _ => RawVars::Empty,
        }
    }
}

impl From<Option<Value>> for RawVars {
    fn from(input: Option<Value>) -> Self {
        RawVars::classify(input)
    }
}

/// Name-to-value mapping that placeholder expressions are evaluated against.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VariableContext(Map<String, Value>);

impl VariableContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Bind `name`, replacing any earlier value.
    pub fn insert(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Map<String, Value>> for VariableContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, Value)> for VariableContext {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Flatten classified vars into a context.
///
/// # Errors
///
/// Returns [`ParseError`] only for a [`RawVars::JsonString`] that is not valid
/// JSON (the empty string included).
pub fn build_context(raw: RawVars) -> Result<VariableContext, ParseError> {
    match raw {
        RawVars::AssignmentList(assignments) => Ok(from_assignments(&assignments)),
        RawVars::PlainObject(map) => Ok(VariableContext(map)),
        RawVars::Empty => Ok(VariableContext::new()),
        RawVars::JsonString(text) => {
            let parsed: Value = serde_json::from_str(&text).map_err(|e| ParseError {
                message: e.to_string(),
            })?;
            // Nested strings are not parsed a second time.
            match RawVars::classify(Some(parsed)) {
                RawVars::JsonString(_) => Ok(VariableContext::new()),
                other => build_context(other),
            }
        }
    }
}

/// Classify then flatten in one step.
pub fn parse_vars(input: Option<Value>) -> Result<VariableContext, ParseError> {
    build_context(RawVars::classify(input))
}

/// Apply assignment records in order. Later records win on duplicate names.
fn from_assignments(assignments: &Value) -> VariableContext {
    let Value::Array(records) = assignments else {
        log::debug!("vars assignments field is not an array, using empty context");
        return VariableContext::new();
    };

    let mut context = VariableContext::new();
    for (index, record) in records.iter().enumerate() {
        match assignment(record) {
            Some((name, value)) => context.insert(name, value.clone()),
            None => log::debug!("skipping malformed vars assignment at index {}", index),
        }
    }
    context
}

/// A record binds when it has a truthy `name` and a `value` key.
///
/// Non-string names bind under their JavaScript string form (`5` as `"5"`).
fn assignment(record: &Value) -> Option<(String, &Value)> {
    let record = record.as_object()?;
    let name = expr::Value::from(record.get("name")?);
    if !name.truthy() {
        return None;
    }
    let value = record.get("value")?;
    Some((name.to_js_string(), value))
}
