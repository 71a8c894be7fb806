//! Built-in methods callable on bound values.
//!
//! Only methods that read their receiver are provided; nothing here can
//! mutate a value or reach outside the expression.

use super::EvalError;
use super::value::{NativeFunction, Value, format_number, from_utf16_units, is_js_whitespace, utf16_units};

const STRING_METHODS: &[&str] = &[
    "at",
    "charAt",
    "concat",
    "endsWith",
    "includes",
    "indexOf",
    "lastIndexOf",
    "padEnd",
    "padStart",
    "repeat",
    "replace",
    "replaceAll",
    "slice",
    "split",
    "startsWith",
    "substring",
    "toLowerCase",
    "toString",
    "toUpperCase",
    "trim",
    "trimEnd",
    "trimStart",
];

const ARRAY_METHODS: &[&str] = &[
    "at",
    "concat",
    "includes",
    "indexOf",
    "join",
    "lastIndexOf",
    "slice",
    "toString",
];

const NUMBER_METHODS: &[&str] = &["toFixed", "toString"];

const BOOLEAN_METHODS: &[&str] = &["toString"];

const OBJECT_METHODS: &[&str] = &["hasOwnProperty", "toString"];

const FUNCTION_METHODS: &[&str] = &["toString"];

/// Resolve `receiver.name` to a bound method, if the receiver's type has one.
pub(crate) fn lookup(receiver: &Value, name: &str) -> Option<Value> {
    let table = match receiver {
        Value::String(_) => STRING_METHODS,
        Value::Array(_) => ARRAY_METHODS,
        Value::Number(_) => NUMBER_METHODS,
        Value::Bool(_) => BOOLEAN_METHODS,
        Value::Object(_) => OBJECT_METHODS,
        Value::Function(_) => FUNCTION_METHODS,
        Value::Undefined | Value::Null => return None,
    };
    table
        .iter()
        .copied()
        .find(|method| *method == name)
        .map(|method| Value::function(method, receiver.clone()))
}

pub(crate) fn call(function: &NativeFunction, args: &[Value]) -> Result<Value, EvalError> {
    let name = function.name;
    match &function.receiver {
        Value::String(s) => string_method(s, name, args),
        Value::Array(items) => array_method(items, name, args),
        Value::Number(n) => number_method(*n, name, args),
        receiver @ (Value::Bool(_) | Value::Object(_) | Value::Function(_)) => match name {
            "toString" => Ok(Value::string(receiver.to_js_string())),
            "hasOwnProperty" => {
                let key = arg(args, 0).to_js_string();
                Ok(Value::Bool(receiver.own_property(&key).is_some()))
            }
            _ => Err(not_a_function(name)),
        },
        Value::Undefined | Value::Null => Err(not_a_function(name)),
    }
}

fn not_a_function(name: &str) -> EvalError {
    EvalError::Type(format!("{} is not a function", name))
}

/// Longest string a method may produce, in UTF-16 code units.
const MAX_STRING_UNITS: f64 = ((1u64 << 29) - 24) as f64;

fn arg(args: &[Value], index: usize) -> Value {
    args.get(index).cloned().unwrap_or(Value::Undefined)
}

fn check_length(units: f64) -> Result<(), EvalError> {
    if units > MAX_STRING_UNITS {
        return Err(EvalError::Range("invalid string length".to_string()));
    }
    Ok(())
}

/// Resolve a relative index argument (`slice`, `at`) against `len`.
fn relative_index(value: &Value, len: usize, default: usize) -> usize {
    if matches!(value, Value::Undefined) {
        return default;
    }
    let n = value.to_integer();
    if n < 0.0 {
        (len as f64 + n).max(0.0) as usize
    } else {
        n.min(len as f64) as usize
    }
}

/// Clamp an absolute index argument (`substring`, `includes`) into `0..=len`.
fn clamped_index(value: &Value, len: usize, default: usize) -> usize {
    if matches!(value, Value::Undefined) {
        return default;
    }
    value.to_integer().clamp(0.0, len as f64) as usize
}

fn find_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.is_empty() {
        return (from <= haystack.len()).then_some(from);
    }
    if needle.len() > haystack.len() {
        return None;
    }
    (from..=haystack.len() - needle.len()).find(|&i| haystack[i..].starts_with(needle))
}

fn rfind_units(haystack: &[u16], needle: &[u16], from: usize) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    let last = from.min(haystack.len() - needle.len());
    (0..=last).rev().find(|&i| haystack[i..].starts_with(needle))
}

fn index_result(found: Option<usize>) -> Value {
    Value::Number(found.map(|i| i as f64).unwrap_or(-1.0))
}

fn string_method(s: &str, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let units = utf16_units(s);
    let len = units.len();

    let value = match name {
        "toString" => Value::string(s),
        "toUpperCase" => Value::string(s.to_uppercase()),
        "toLowerCase" => Value::string(s.to_lowercase()),
        "trim" => Value::string(s.trim_matches(is_js_whitespace)),
        "trimStart" => Value::string(s.trim_start_matches(is_js_whitespace)),
        "trimEnd" => Value::string(s.trim_end_matches(is_js_whitespace)),
        "at" => {
            let n = arg(args, 0).to_integer();
            let index = if n < 0.0 { len as f64 + n } else { n };
            if index < 0.0 || index >= len as f64 {
                Value::Undefined
            } else {
                Value::string(from_utf16_units(&units[index as usize..index as usize + 1]))
            }
        }
        "charAt" => {
            let n = arg(args, 0).to_integer();
            if n < 0.0 || n >= len as f64 {
                Value::string("")
            } else {
                Value::string(from_utf16_units(&units[n as usize..n as usize + 1]))
            }
        }
        "concat" => {
            let mut out = s.to_string();
            for value in args {
                out.push_str(&value.to_js_string());
            }
            Value::string(out)
        }
        "includes" => {
            let needle = utf16_units(&arg(args, 0).to_js_string());
            let from = clamped_index(&arg(args, 1), len, 0);
            Value::Bool(find_units(&units, &needle, from).is_some())
        }
        "startsWith" => {
            let needle = utf16_units(&arg(args, 0).to_js_string());
            let from = clamped_index(&arg(args, 1), len, 0);
            Value::Bool(units[from..].starts_with(&needle))
        }
        "endsWith" => {
            let needle = utf16_units(&arg(args, 0).to_js_string());
            let end = clamped_index(&arg(args, 1), len, len);
            Value::Bool(units[..end].ends_with(&needle))
        }
        "indexOf" => {
            let needle = utf16_units(&arg(args, 0).to_js_string());
            let from = clamped_index(&arg(args, 1), len, 0);
            index_result(find_units(&units, &needle, from))
        }
        "lastIndexOf" => {
            let needle = utf16_units(&arg(args, 0).to_js_string());
            let position = arg(args, 1).to_number();
            let from = if position.is_nan() {
                len
            } else {
                position.trunc().clamp(0.0, len as f64) as usize
            };
            index_result(rfind_units(&units, &needle, from))
        }
        "slice" => {
            let start = relative_index(&arg(args, 0), len, 0);
            let end = relative_index(&arg(args, 1), len, len);
            if start >= end {
                Value::string("")
            } else {
                Value::string(from_utf16_units(&units[start..end]))
            }
        }
        "substring" => {
            let a = clamped_index(&arg(args, 0), len, 0);
            let b = clamped_index(&arg(args, 1), len, len);
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            Value::string(from_utf16_units(&units[start..end]))
        }
        "padStart" | "padEnd" => {
            let target = arg(args, 0).to_integer();
            let filler = match arg(args, 1) {
                Value::Undefined => vec![u16::from(b' ')],
                other => utf16_units(&other.to_js_string()),
            };
            if target <= len as f64 || filler.is_empty() {
                Value::string(s)
            } else {
                check_length(target)?;
                let pad: Vec<u16> = filler
                    .iter()
                    .copied()
                    .cycle()
                    .take(target as usize - len)
                    .collect();
                let padded = if name == "padStart" {
                    [pad, units].concat()
                } else {
                    [units, pad].concat()
                };
                Value::string(from_utf16_units(&padded))
            }
        }
        "repeat" => {
            let count = arg(args, 0).to_integer();
            if count < 0.0 || count.is_infinite() {
                return Err(EvalError::Range(format!(
                    "invalid count value: {}",
                    format_number(count)
                )));
            }
            check_length(count * len as f64)?;
            Value::string(s.repeat(count as usize))
        }
        "replace" | "replaceAll" => {
            let pattern = utf16_units(&arg(args, 0).to_js_string());
            let replacement = arg(args, 1).to_js_string();
            Value::string(replace(&units, &pattern, &replacement, name == "replaceAll"))
        }
        "split" => {
            let limit = match arg(args, 1) {
                Value::Undefined => u32::MAX as usize,
                other => other.to_number().max(0.0).min(u32::MAX as f64) as usize,
            };
            let parts: Vec<Value> = match arg(args, 0) {
                Value::Undefined => vec![Value::string(s)],
                separator => split(&units, &utf16_units(&separator.to_js_string()))
                    .into_iter()
                    .map(Value::string)
                    .collect(),
            };
            Value::array(parts.into_iter().take(limit).collect())
        }
        _ => return Err(not_a_function(name)),
    };
    Ok(value)
}

fn split(units: &[u16], separator: &[u16]) -> Vec<String> {
    if separator.is_empty() {
        return units.iter().map(|u| from_utf16_units(&[*u])).collect();
    }
    let mut parts = Vec::new();
    let mut start = 0;
    while let Some(found) = find_units(units, separator, start) {
        parts.push(from_utf16_units(&units[start..found]));
        start = found + separator.len();
    }
    parts.push(from_utf16_units(&units[start..]));
    parts
}

fn replace(units: &[u16], pattern: &[u16], replacement: &str, all: bool) -> String {
    let mut out: Vec<u16> = Vec::with_capacity(units.len());
    let mut cursor = 0;
    let mut search_from = 0;

    while let Some(found) = find_units(units, pattern, search_from) {
        out.extend_from_slice(&units[cursor..found]);
        let matched_end = found + pattern.len();
        out.extend(expand_replacement(replacement, units, found, matched_end));
        cursor = matched_end;
        if !all {
            break;
        }
        // An empty pattern matches between every code unit.
        search_from = if pattern.is_empty() {
            if found < units.len() {
                out.push(units[found]);
            }
            cursor = found + 1;
            found + 1
        } else {
            matched_end
        };
        if search_from > units.len() {
            break;
        }
    }

    if cursor < units.len() {
        out.extend_from_slice(&units[cursor..]);
    }
    from_utf16_units(&out)
}

/// Expand `$$`, `$&`, `` $` `` and `$'` in a replacement string.
fn expand_replacement(replacement: &str, units: &[u16], start: usize, end: usize) -> Vec<u16> {
    let template = utf16_units(replacement);
    let mut out = Vec::with_capacity(template.len());
    let mut i = 0;
    while i < template.len() {
        if template[i] == u16::from(b'$') && i + 1 < template.len() {
            let next = template[i + 1];
            let expansion: Option<&[u16]> = match next {
                n if n == u16::from(b'$') => Some(&template[i..i + 1]),
                n if n == u16::from(b'&') => Some(&units[start..end]),
                n if n == u16::from(b'`') => Some(&units[..start]),
                n if n == u16::from(b'\'') => Some(&units[end..]),
                _ => None,
            };
            if let Some(expansion) = expansion {
                out.extend_from_slice(expansion);
                i += 2;
                continue;
            }
        }
        out.push(template[i]);
        i += 1;
    }
    out
}

fn array_method(items: &[Value], name: &str, args: &[Value]) -> Result<Value, EvalError> {
    let len = items.len();
    let value = match name {
        "join" | "toString" => {
            let separator = match arg(args, 0) {
                Value::Undefined => ",".to_string(),
                other if name == "join" => other.to_js_string(),
                _ => ",".to_string(),
            };
            let joined = items
                .iter()
                .map(|item| {
                    if item.is_nullish() {
                        String::new()
                    } else {
                        item.to_js_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(&separator);
            Value::string(joined)
        }
        "at" => {
            let n = arg(args, 0).to_integer();
            let index = if n < 0.0 { len as f64 + n } else { n };
            if index < 0.0 || index >= len as f64 {
                Value::Undefined
            } else {
                items[index as usize].clone()
            }
        }
        "includes" => {
            let needle = arg(args, 0);
            let from = relative_index(&arg(args, 1), len, 0);
            Value::Bool(items[from..].iter().any(|item| item.same_value_zero(&needle)))
        }
        "indexOf" => {
            let needle = arg(args, 0);
            let from = relative_index(&arg(args, 1), len, 0);
            index_result(
                items[from..]
                    .iter()
                    .position(|item| item.strict_equals(&needle))
                    .map(|i| i + from),
            )
        }
        "lastIndexOf" => {
            let needle = arg(args, 0);
            index_result(items.iter().rposition(|item| item.strict_equals(&needle)))
        }
        "slice" => {
            let start = relative_index(&arg(args, 0), len, 0);
            let end = relative_index(&arg(args, 1), len, len);
            if start >= end {
                Value::array(Vec::new())
            } else {
                Value::array(items[start..end].to_vec())
            }
        }
        "concat" => {
            let mut out = items.to_vec();
            for value in args {
                match value {
                    Value::Array(more) => out.extend(more.iter().cloned()),
                    other => out.push(other.clone()),
                }
            }
            Value::array(out)
        }
        _ => return Err(not_a_function(name)),
    };
    Ok(value)
}

fn number_method(n: f64, name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        "toFixed" => {
            let digits = arg(args, 0).to_integer();
            if !(0.0..=100.0).contains(&digits) {
                return Err(EvalError::Range(
                    "toFixed() digits argument must be between 0 and 100".to_string(),
                ));
            }
            if !n.is_finite() || n.abs() >= 1e21 {
                return Ok(Value::string(format_number(n)));
            }
            let fixed = to_fixed(n.abs(), digits as usize);
            // `(-0).toFixed(2)` is "0.00".
            if n < 0.0 {
                Ok(Value::string(format!("-{}", fixed)))
            } else {
                Ok(Value::string(fixed))
            }
        }
        "toString" => match arg(args, 0) {
            Value::Undefined => Ok(Value::string(format_number(n))),
            radix => {
                let radix = radix.to_integer();
                if !(2.0..=36.0).contains(&radix) {
                    return Err(EvalError::Range(
                        "toString() radix must be between 2 and 36".to_string(),
                    ));
                }
                Ok(Value::string(format_radix(n, radix as u32)))
            }
        },
        _ => Err(not_a_function(name)),
    }
}

/// Fixed-point digits of a non-negative number, rounding exact ties up.
///
/// `format!` rounds the exact binary value correctly except at ties, where it
/// picks the even digit. A tie needs at most `digits + 1` fractional bits, so
/// only those values are checked.
fn to_fixed(abs: f64, digits: usize) -> String {
    let fixed = format!("{:.*}", digits, abs);
    let scaled = abs * 2f64.powi(digits as i32 + 1);
    if scaled.fract() != 0.0 {
        return fixed;
    }
    let exact = format!("{:.*}", digits + 1, abs);
    match exact.strip_suffix('5') {
        Some(head) => round_up_last_digit(head.strip_suffix('.').unwrap_or(head)),
        None => fixed,
    }
}

/// Add one unit in the last place of a decimal digit string.
fn round_up_last_digit(text: &str) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    for c in chars.iter_mut().rev() {
        match *c {
            '.' => continue,
            '9' => *c = '0',
            digit => {
                *c = char::from_digit(digit.to_digit(10).unwrap_or(0) + 1, 10).unwrap_or(digit);
                return chars.into_iter().collect();
            }
        }
    }
    std::iter::once('1').chain(chars).collect()
}

/// Format a number in the given radix, with up to 20 fractional digits.
fn format_radix(n: f64, radix: u32) -> String {
    if radix == 10 || !n.is_finite() {
        return format_number(n);
    }

    let negative = n < 0.0;
    let abs = n.abs();
    let mut integer = abs.trunc();
    let mut fraction = abs - integer;

    let mut digits = Vec::new();
    if integer == 0.0 {
        digits.push('0');
    }
    while integer >= 1.0 {
        let digit = (integer % radix as f64) as u32;
        digits.push(std::char::from_digit(digit, radix).unwrap_or('0'));
        integer = (integer / radix as f64).trunc();
    }
    digits.reverse();

    let mut out: String = digits.into_iter().collect();
    if fraction > 0.0 {
        out.push('.');
        for _ in 0..20 {
            fraction *= radix as f64;
            let digit = fraction.trunc() as u32;
            out.push(std::char::from_digit(digit, radix).unwrap_or('0'));
            fraction -= digit as f64;
            if fraction <= 0.0 {
                break;
            }
        }
    }

    if negative { format!("-{}", out) } else { out }
}
