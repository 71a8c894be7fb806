use super::*;
use serde_json::json;

fn ctx(value: serde_json::Value) -> VariableContext {
    match value {
        serde_json::Value::Object(map) => VariableContext::from(map),
        _ => panic!("context must be an object"),
    }
}

fn drop_failed(template: &str, context: serde_json::Value) -> String {
    render(template, &ctx(context), RenderOptions::keep_original(false))
}

fn keep_failed(template: &str, context: serde_json::Value) -> String {
    render(template, &ctx(context), RenderOptions::keep_original(true))
}

#[test]
fn test_template_without_placeholders_is_unchanged() {
    let template = "Plain text with { single } braces and }} stray closers";
    assert_eq!(drop_failed(template, json!({"x": 1})), template);
    assert_eq!(keep_failed(template, json!({})), template);
    assert_eq!(drop_failed("", json!({})), "");
}

#[test]
fn test_substitutes_bound_variable() {
    assert_eq!(drop_failed("Hi {{name}}", json!({"name": "Ada"})), "Hi Ada");
    assert_eq!(drop_failed("Hi {{ name }}!", json!({"name": "Ada"})), "Hi Ada!");
}

#[test]
fn test_missing_variable_fallback() {
    assert_eq!(drop_failed("{{missing}}", json!({})), "");
    assert_eq!(keep_failed("{{missing}}", json!({})), "{{missing}}");
}

#[test]
fn test_syntax_error_behaves_like_missing_variable() {
    assert_eq!(drop_failed("{{ +++ }}", json!({})), "");
    assert_eq!(keep_failed("{{ +++ }}", json!({})), "{{ +++ }}");
}

#[test]
fn test_empty_placeholder_falls_back() {
    assert_eq!(drop_failed("a{{}}b", json!({})), "ab");
    assert_eq!(keep_failed("a{{}}b", json!({})), "a{{}}b");
}

#[test]
fn test_placeholders_are_independent() {
    assert_eq!(
        drop_failed("{{a}}-{{bad(}}-{{b}}", json!({"a": 1, "b": 2})),
        "1--2"
    );
    assert_eq!(
        keep_failed("{{a}}-{{bad(}}-{{b}}", json!({"a": 1, "b": 2})),
        "1-{{bad(}}-2"
    );
}

#[test]
fn test_null_and_undefined_results_fall_back() {
    let context = json!({"nothing": null, "obj": {}});
    assert_eq!(drop_failed("[{{nothing}}]", context.clone()), "[]");
    assert_eq!(keep_failed("[{{nothing}}]", context.clone()), "[{{nothing}}]");
    assert_eq!(keep_failed("[{{obj.missing}}]", context.clone()), "[{{obj.missing}}]");
    assert_eq!(keep_failed("[{{void 0}}]", context), "[{{void 0}}]");
}

#[test]
fn test_falsy_values_are_substituted() {
    let context = json!({"zero": 0, "no": false, "empty": ""});
    assert_eq!(keep_failed("{{zero}}|{{no}}|{{empty}}", context), "0|false|");
}

#[test]
fn test_canonical_string_forms() {
    let context = json!({
        "list": [1, "two", null],
        "obj": {"k": "v"},
        "big": 1e21,
        "float": 2.5,
        "whole": 3.0,
    });
    assert_eq!(drop_failed("{{list}}", context.clone()), "1,two,");
    assert_eq!(drop_failed("{{obj}}", context.clone()), "[object Object]");
    assert_eq!(drop_failed("{{big}}", context.clone()), "1e+21");
    assert_eq!(drop_failed("{{float}}", context.clone()), "2.5");
    assert_eq!(drop_failed("{{whole}}", context), "3");
}

#[test]
fn test_expressions_in_placeholders() {
    let context = json!({"user": {"name": "ada", "langs": ["rust", "ml"]}, "n": 2});
    assert_eq!(
        drop_failed(
            "{{user.name.toUpperCase()}} knows {{user.langs.join(', ')}}",
            context.clone()
        ),
        "ADA knows rust, ml"
    );
    assert_eq!(drop_failed("{{n > 1 ? 'many' : 'one'}}", context.clone()), "many");
    assert_eq!(drop_failed("{{user?.email ?? 'n/a'}}", context), "n/a");
}

#[test]
fn test_placeholder_ends_at_first_closing_pair() {
    assert_eq!(drop_failed("{{a}}}", json!({"a": 1})), "1}");
    assert_eq!(drop_failed("{{{a}}", json!({"a": 1})), "");
    assert_eq!(keep_failed("{{{a}}", json!({"a": 1})), "{{{a}}");
}

#[test]
fn test_placeholder_does_not_span_lines() {
    let template = "{{a\n}} {{b}}";
    assert_eq!(drop_failed(template, json!({"a": 1, "b": 2})), "{{a\n}} 2");
}

#[test]
fn test_unclosed_placeholder_is_literal() {
    assert_eq!(drop_failed("Hi {{name", json!({"name": "Ada"})), "Hi {{name");
}

#[test]
fn test_invalid_binding_name_fails_every_placeholder() {
    let context = json!({"name": "Ada", "first name": "A"});
    assert_eq!(drop_failed("Hi {{name}}", context.clone()), "Hi ");
    assert_eq!(keep_failed("Hi {{name}}", context.clone()), "Hi {{name}}");
    assert_eq!(keep_failed("no placeholders", context), "no placeholders");
}

#[test]
fn test_reserved_word_binding_fails_every_placeholder() {
    assert_eq!(drop_failed("{{x}}", json!({"x": 1, "default": 2})), "");
}

#[test]
fn test_parenthesized_wrapping_is_observable() {
    assert_eq!(drop_failed("{{a) + (b}}", json!({"a": 1, "b": 2})), "3");
}

#[test]
fn test_rendering_is_idempotent() {
    let context = json!({"name": "Ada", "n": 3});
    let once = keep_failed("Hi {{name}}, {{n * 2}} {{missing}}", context.clone());
    let twice = keep_failed(&once, context);
    assert_eq!(once, twice);
}

#[test]
fn test_output_may_introduce_new_placeholders() {
    let context = json!({"open": "{{", "name": "Ada"});
    let once = drop_failed("{{open}}name}}", context.clone());
    assert_eq!(once, "{{name}}");
    assert_eq!(drop_failed(&once, context), "Ada");
}

#[test]
fn test_unicode_text_is_preserved() {
    let context = json!({"emoji": "🎉", "name": "Zoë"});
    assert_eq!(
        drop_failed("✨ {{emoji}} für {{name}} ✨", context),
        "✨ 🎉 für Zoë ✨"
    );
}

#[test]
fn test_deeply_nested_placeholder_falls_back() {
    let depth = 50_000;
    let nested = format!("{{{{{}1{}}}}}", "(".repeat(depth), ")".repeat(depth));
    let template = format!("a{}b", nested);

    assert_eq!(drop_failed(&template, json!({})), "ab");
    assert_eq!(keep_failed(&template, json!({})), template);

    let negations = format!("{{{{{}x}}}}|{{{{x}}}}", "!".repeat(depth));
    assert_eq!(drop_failed(&negations, json!({"x": 1})), "|1");

    let chain = format!("{{{{x{}}}}}", " + x".repeat(depth));
    assert_eq!(drop_failed(&chain, json!({"x": 1})), "");
}
