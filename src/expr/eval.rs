//! Tree-walking evaluator.

use super::methods;
use super::parser::{BinaryOp, Expr, LogicalOp, PropertyKey, UnaryOp};
use super::value::{Value, compare_strings};
use super::{Bindings, EvalError};
use std::cmp::Ordering;

/// Control flow out of a sub-expression.
enum Interrupt {
    /// `?.` met a nullish value; the enclosing optional chain yields `undefined`.
    ShortCircuit,
    Error(EvalError),
}

impl From<EvalError> for Interrupt {
    fn from(err: EvalError) -> Self {
        Interrupt::Error(err)
    }
}

type Flow<T> = std::result::Result<T, Interrupt>;

pub(crate) fn evaluate(expr: &Expr, bindings: &Bindings) -> Result<Value, EvalError> {
    let evaluator = Evaluator { bindings };
    match evaluator.eval(expr) {
        Ok(value) => Ok(value),
        // Only reachable if a chain escaped its boundary; treat it as the boundary would.
        Err(Interrupt::ShortCircuit) => Ok(Value::Undefined),
        Err(Interrupt::Error(err)) => Err(err),
    }
}

struct Evaluator<'a> {
    bindings: &'a Bindings,
}

impl Evaluator<'_> {
    fn eval(&self, expr: &Expr) -> Flow<Value> {
        match expr {
            Expr::Undefined => Ok(Value::Undefined),
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::string(s.as_str())),
            Expr::Ident(name) => Ok(self.lookup(name)?),
            Expr::Array(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Flow<Vec<_>>>()?;
                Ok(Value::array(values))
            }
            Expr::Object(entries) => {
                let mut props: Vec<(String, Value)> = Vec::with_capacity(entries.len());
                for (key, value_expr) in entries {
                    let key = self.property_key(key)?;
                    let value = self.eval(value_expr)?;
                    match props.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => props.push((key, value)),
                    }
                }
                Ok(Value::object(props))
            }
            Expr::Member {
                object,
                property,
                optional,
            } => {
                let target = self.eval(object)?;
                if *optional && target.is_nullish() {
                    return Err(Interrupt::ShortCircuit);
                }
                let key = self.property_key(property)?;
                Ok(get_property(&target, &key)?)
            }
            Expr::Call {
                callee,
                args,
                optional,
            } => {
                let function = self.eval(callee)?;
                if *optional && function.is_nullish() {
                    return Err(Interrupt::ShortCircuit);
                }
                let Value::Function(native) = function else {
                    return Err(EvalError::Type(format!(
                        "{} is not a function",
                        describe_callee(callee)
                    ))
                    .into());
                };
                let args = args
                    .iter()
                    .map(|arg| self.eval(arg))
                    .collect::<Flow<Vec<_>>>()?;
                Ok(methods::call(&native, &args)?)
            }
            Expr::OptionalChain(inner) => match self.eval(inner) {
                Err(Interrupt::ShortCircuit) => Ok(Value::Undefined),
                other => other,
            },
            Expr::Unary { op, operand } => self.eval_unary(*op, operand),
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                Ok(binary(*op, &left, &right))
            }
            Expr::Logical { op, left, right } => {
                let left = self.eval(left)?;
                let take_left = match op {
                    LogicalOp::And => !left.truthy(),
                    LogicalOp::Or => left.truthy(),
                    LogicalOp::Coalesce => !left.is_nullish(),
                };
                if take_left { Ok(left) } else { self.eval(right) }
            }
            Expr::Conditional {
                test,
                consequent,
                alternate,
            } => {
                if self.eval(test)?.truthy() {
                    self.eval(consequent)
                } else {
                    self.eval(alternate)
                }
            }
            Expr::Sequence(items) => {
                let mut last = Value::Undefined;
                for item in items {
                    last = self.eval(item)?;
                }
                Ok(last)
            }
        }
    }

    fn lookup(&self, name: &str) -> Result<Value, EvalError> {
        if let Some(value) = self.bindings.get(name) {
            return Ok(value.clone());
        }
        match name {
            "undefined" => Ok(Value::Undefined),
            "NaN" => Ok(Value::Number(f64::NAN)),
            "Infinity" => Ok(Value::Number(f64::INFINITY)),
            _ => Err(EvalError::Reference(format!("{} is not defined", name))),
        }
    }

    fn property_key(&self, key: &PropertyKey) -> Flow<String> {
        match key {
            PropertyKey::Named(name) => Ok(name.clone()),
            PropertyKey::Computed(expr) => Ok(self.eval(expr)?.to_js_string()),
        }
    }

    fn eval_unary(&self, op: UnaryOp, operand: &Expr) -> Flow<Value> {
        if op == UnaryOp::TypeOf {
            // `typeof undeclared` is not a reference error.
            if let Expr::Ident(name) = operand {
                return Ok(match self.lookup(name) {
                    Ok(value) => Value::string(value.type_of()),
                    Err(_) => Value::string("undefined"),
                });
            }
            return Ok(Value::string(self.eval(operand)?.type_of()));
        }

        let value = self.eval(operand)?;
        Ok(match op {
            UnaryOp::Not => Value::Bool(!value.truthy()),
            UnaryOp::Negate => Value::Number(-value.to_number()),
            UnaryOp::Plus => Value::Number(value.to_number()),
            UnaryOp::Void => Value::Undefined,
            UnaryOp::TypeOf => Value::string(value.type_of()),
        })
    }
}

fn describe_callee(callee: &Expr) -> String {
    match callee {
        Expr::Ident(name) => name.clone(),
        Expr::Member {
            object,
            property: PropertyKey::Named(name),
            ..
        } => format!("{}.{}", describe_callee(object), name),
        _ => "expression".to_string(),
    }
}

/// Canonical array index: `"3"` is an index, `"03"` and `"-1"` are not.
fn array_index(key: &str) -> Option<usize> {
    let index: usize = key.parse().ok()?;
    (index.to_string() == key).then_some(index)
}

/// Property read, including built-in properties and methods.
pub(crate) fn get_property(target: &Value, key: &str) -> Result<Value, EvalError> {
    match target {
        Value::Undefined | Value::Null => Err(EvalError::Type(format!(
            "cannot read properties of {} (reading '{}')",
            target.to_js_string(),
            key
        ))),
        Value::String(s) => {
            if key == "length" {
                return Ok(Value::Number(s.encode_utf16().count() as f64));
            }
            if let Some(index) = array_index(key) {
                return Ok(match s.encode_utf16().nth(index) {
                    Some(unit) => Value::string(String::from_utf16_lossy(&[unit])),
                    None => Value::Undefined,
                });
            }
            Ok(methods::lookup(target, key).unwrap_or(Value::Undefined))
        }
        Value::Array(items) => {
            if key == "length" {
                return Ok(Value::Number(items.len() as f64));
            }
            if let Some(index) = array_index(key) {
                return Ok(items.get(index).cloned().unwrap_or(Value::Undefined));
            }
            Ok(methods::lookup(target, key).unwrap_or(Value::Undefined))
        }
        Value::Object(_) => match target.own_property(key) {
            Some(value) => Ok(value.clone()),
            None => Ok(methods::lookup(target, key).unwrap_or(Value::Undefined)),
        },
        Value::Function(native) => Ok(match key {
            "name" => Value::string(native.name),
            _ => methods::lookup(target, key).unwrap_or(Value::Undefined),
        }),
        Value::Bool(_) | Value::Number(_) => {
            Ok(methods::lookup(target, key).unwrap_or(Value::Undefined))
        }
    }
}

fn binary(op: BinaryOp, left: &Value, right: &Value) -> Value {
    match op {
        BinaryOp::Add => {
            let (l, r) = (left.to_primitive(), right.to_primitive());
            if matches!(l, Value::String(_)) || matches!(r, Value::String(_)) {
                let mut out = l.to_js_string();
                out.push_str(&r.to_js_string());
                Value::string(out)
            } else {
                Value::Number(l.to_number() + r.to_number())
            }
        }
        BinaryOp::Sub => Value::Number(left.to_number() - right.to_number()),
        BinaryOp::Mul => Value::Number(left.to_number() * right.to_number()),
        BinaryOp::Div => Value::Number(left.to_number() / right.to_number()),
        BinaryOp::Rem => Value::Number(left.to_number() % right.to_number()),
        BinaryOp::Pow => Value::Number(power(left.to_number(), right.to_number())),
        BinaryOp::Lt => Value::Bool(compare(left, right) == Some(Ordering::Less)),
        BinaryOp::Gt => Value::Bool(compare(left, right) == Some(Ordering::Greater)),
        BinaryOp::Le => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Less | Ordering::Equal)
        )),
        BinaryOp::Ge => Value::Bool(matches!(
            compare(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        )),
        BinaryOp::Eq => Value::Bool(left.loose_equals(right)),
        BinaryOp::Ne => Value::Bool(!left.loose_equals(right)),
        BinaryOp::StrictEq => Value::Bool(left.strict_equals(right)),
        BinaryOp::StrictNe => Value::Bool(!left.strict_equals(right)),
    }
}

/// Relational comparison; `None` when either side is NaN.
fn compare(left: &Value, right: &Value) -> Option<Ordering> {
    let (l, r) = (left.to_primitive(), right.to_primitive());
    if let (Value::String(a), Value::String(b)) = (&l, &r) {
        return Some(compare_strings(a, b));
    }
    l.to_number().partial_cmp(&r.to_number())
}

fn power(base: f64, exponent: f64) -> f64 {
    if exponent.is_nan() || (base.abs() == 1.0 && exponent.is_infinite()) {
        return f64::NAN;
    }
    base.powf(exponent)
}
