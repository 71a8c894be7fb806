//! End-to-end tests for expression evaluation.

use super::*;
use serde_json::json;

fn bindings(value: serde_json::Value) -> Bindings {
    match value {
        serde_json::Value::Object(map) => Bindings::new(&map),
        _ => panic!("bindings must be an object"),
    }
}

fn eval_str(source: &str, context: serde_json::Value) -> String {
    evaluate(source, &bindings(context))
        .unwrap_or_else(|e| panic!("{} failed: {}", source, e))
        .to_js_string()
}

fn eval_err(source: &str, context: serde_json::Value) -> EvalError {
    eval_err_with(source, &bindings(context))
}

fn eval_err_with(source: &str, bindings: &Bindings) -> EvalError {
    match evaluate(source, bindings) {
        Ok(value) => panic!("{} unexpectedly gave {:?}", source, value.to_js_string()),
        Err(err) => err,
    }
}

#[test]
fn test_identifier_lookup() {
    assert_eq!(eval_str("name", json!({"name": "Ada"})), "Ada");
    assert_eq!(eval_str("  name  ", json!({"name": "Ada"})), "Ada");
}

#[test]
fn test_member_access_and_methods() {
    let ctx = json!({"user": {"name": "ada", "tags": ["a", "b", "c"]}});
    assert_eq!(eval_str("user.name.toUpperCase()", ctx.clone()), "ADA");
    assert_eq!(eval_str("user.tags.length", ctx.clone()), "3");
    assert_eq!(eval_str("user.tags[1]", ctx.clone()), "b");
    assert_eq!(eval_str("user['name']", ctx.clone()), "ada");
    assert_eq!(eval_str("user.tags.join(' | ')", ctx), "a | b | c");
}

#[test]
fn test_arithmetic_and_concatenation() {
    let ctx = json!({"a": 1, "b": 2, "s": "x"});
    assert_eq!(eval_str("a + b", ctx.clone()), "3");
    assert_eq!(eval_str("s + a + b", ctx.clone()), "x12");
    assert_eq!(eval_str("a + b + s", ctx.clone()), "3x");
    assert_eq!(eval_str("2 ** 10", ctx.clone()), "1024");
    assert_eq!(eval_str("7 % 3", ctx.clone()), "1");
    assert_eq!(eval_str("1 / 0", ctx.clone()), "Infinity");
    assert_eq!(eval_str("0.1 + 0.2", ctx), "0.30000000000000004");
}

#[test]
fn test_array_and_object_stringification() {
    let ctx = json!({"list": [1, null, "x"], "obj": {"a": 1}});
    assert_eq!(eval_str("list", ctx.clone()), "1,,x");
    assert_eq!(eval_str("obj", ctx.clone()), "[object Object]");
    assert_eq!(eval_str("[]", ctx.clone()), "");
    assert_eq!(eval_str("[1, [2, 3]]", ctx), "1,2,3");
}

#[test]
fn test_conditional_and_logical() {
    let ctx = json!({"n": 0, "name": "", "missing": null});
    assert_eq!(eval_str("n ? 'yes' : 'no'", ctx.clone()), "no");
    assert_eq!(eval_str("name || 'anon'", ctx.clone()), "anon");
    assert_eq!(eval_str("name ?? 'anon'", ctx.clone()), "");
    assert_eq!(eval_str("missing ?? 'fallback'", ctx.clone()), "fallback");
    assert_eq!(eval_str("n && nope", ctx), "0");
}

#[test]
fn test_mixing_coalesce_with_logical_is_syntax_error() {
    assert!(matches!(
        eval_err("a ?? b || c", json!({"a": 1, "b": 2, "c": 3})),
        EvalError::Syntax(_)
    ));
    assert_eq!(eval_str("(a ?? b) || c", json!({"a": null, "b": 0, "c": 3})), "3");
}

#[test]
fn test_optional_chaining() {
    let ctx = json!({"user": null, "profile": {"email": "a@b.c"}});
    let value = evaluate("user?.email", &bindings(ctx.clone())).unwrap();
    assert!(matches!(value, Value::Undefined));
    assert!(evaluate("user?.email.length", &bindings(ctx.clone()))
        .unwrap()
        .is_nullish());
    assert_eq!(eval_str("profile?.email", ctx.clone()), "a@b.c");
    assert_eq!(eval_str("user?.email ?? 'none'", ctx), "none");
}

#[test]
fn test_equality() {
    let ctx = json!({"n": 1, "s": "1", "a": [1], "b": [1]});
    assert_eq!(eval_str("n == s", ctx.clone()), "true");
    assert_eq!(eval_str("n === s", ctx.clone()), "false");
    assert_eq!(eval_str("a === a", ctx.clone()), "true");
    assert_eq!(eval_str("a === b", ctx.clone()), "false");
    assert_eq!(eval_str("null == undefined", ctx.clone()), "true");
    assert_eq!(eval_str("NaN === NaN", ctx), "false");
}

#[test]
fn test_typeof() {
    let ctx = json!({"s": "x", "o": {}, "n": null});
    assert_eq!(eval_str("typeof s", ctx.clone()), "string");
    assert_eq!(eval_str("typeof o", ctx.clone()), "object");
    assert_eq!(eval_str("typeof n", ctx.clone()), "object");
    assert_eq!(eval_str("typeof nothing", ctx.clone()), "undefined");
    assert_eq!(eval_str("typeof s.trim", ctx), "function");
}

#[test]
fn test_unknown_identifier_is_reference_error() {
    assert!(matches!(
        eval_err("nothing", json!({})),
        EvalError::Reference(_)
    ));
}

#[test]
fn test_property_of_undefined_is_type_error() {
    assert!(matches!(
        eval_err("user.name.first", json!({"user": {}})),
        EvalError::Type(_)
    ));
}

#[test]
fn test_calling_non_function_is_type_error() {
    assert!(matches!(
        eval_err("name()", json!({"name": "x"})),
        EvalError::Type(_)
    ));
    assert!(matches!(
        eval_err("name.nope()", json!({"name": "x"})),
        EvalError::Type(_)
    ));
}

#[test]
fn test_syntax_errors() {
    for source in ["", "   ", " +++ ", "bad(", "a b", "a; b", "a = 1", "`t`"] {
        assert!(
            matches!(eval_err(source, json!({"a": 1, "b": 2})), EvalError::Syntax(_)),
            "expected syntax error for {:?}",
            source
        );
    }
}

#[test]
fn test_parenthesized_wrapping_quirk() {
    assert_eq!(eval_str("a) + (b", json!({"a": 1, "b": 2})), "3");
}

#[test]
fn test_line_comment_swallows_closing_paren() {
    assert!(matches!(
        eval_err("a // note", json!({"a": 1})),
        EvalError::Syntax(_)
    ));
    assert_eq!(eval_str("a /* note */", json!({"a": 1})), "1");
}

#[test]
fn test_invalid_binding_fails_everything() {
    let b = bindings(json!({"ok": 1, "first name": "x"}));
    assert_eq!(b.invalid_name(), Some("first name"));
    assert_eq!(
        eval_err_with("ok", &b),
        EvalError::InvalidBinding("first name".to_string())
    );
    assert_eq!(
        eval_err_with("1 + 1", &b),
        EvalError::InvalidBinding("first name".to_string())
    );
}

#[test]
fn test_reserved_word_binding_is_invalid() {
    let b = bindings(json!({"class": "a"}));
    assert!(matches!(
        evaluate("1", &b),
        Err(EvalError::InvalidBinding(_))
    ));
}

#[test]
fn test_is_bindable() {
    assert!(is_bindable("name"));
    assert!(is_bindable("_x"));
    assert!(is_bindable("undefined"));
    assert!(!is_bindable("if"));
    assert!(!is_bindable("null"));
    assert!(!is_bindable("a-b"));
    assert!(!is_bindable("1a"));
}

#[test]
fn test_context_shadows_constants() {
    assert_eq!(eval_str("NaN", json!({"NaN": "shadowed"})), "shadowed");
    assert_eq!(eval_str("Infinity", json!({})), "Infinity");
}

#[test]
fn test_string_methods() {
    let ctx = json!({"s": "  Hello World  "});
    assert_eq!(eval_str("s.trim()", ctx.clone()), "Hello World");
    assert_eq!(eval_str("s.trim().split(' ').length", ctx.clone()), "2");
    assert_eq!(eval_str("s.trim().slice(-5)", ctx.clone()), "World");
    assert_eq!(eval_str("s.includes('World')", ctx.clone()), "true");
    assert_eq!(eval_str("s.trim().replace('o', '0')", ctx.clone()), "Hell0 World");
    assert_eq!(eval_str("s.trim().replaceAll('o', '0')", ctx.clone()), "Hell0 W0rld");
    assert_eq!(eval_str("'7'.padStart(3, '0')", ctx.clone()), "007");
    assert_eq!(eval_str("'ab'.repeat(3)", ctx), "ababab");
}

#[test]
fn test_number_methods() {
    let ctx = json!({"price": 3.14159});
    assert_eq!(eval_str("price.toFixed(2)", ctx.clone()), "3.14");
    assert_eq!(eval_str("(255).toString(16)", ctx), "ff");
}

#[test]
fn test_to_fixed_ties_round_up() {
    let ctx = json!({"a": 1.25, "b": 2.5, "c": 0.125});
    assert_eq!(
        eval_str(
            "[a.toFixed(1), b.toFixed(0), c.toFixed(2), (-2.5).toFixed(0)].join('|')",
            ctx
        ),
        "1.3|3|0.13|-3"
    );
}

#[test]
fn test_huge_repeat_is_range_error() {
    assert!(matches!(
        eval_err("'x'.repeat(1e12)", json!({})),
        EvalError::Range(_)
    ));
}

#[test]
fn test_expression_can_be_reused() {
    let expr = Expression::parse("greeting + ', ' + name").unwrap();
    let first = bindings(json!({"greeting": "Hi", "name": "A"}));
    let second = bindings(json!({"greeting": "Yo", "name": "B"}));
    assert_eq!(expr.evaluate(&first).unwrap().to_js_string(), "Hi, A");
    assert_eq!(expr.evaluate(&second).unwrap().to_js_string(), "Yo, B");
}
