use crate::{
    build_expression, parse, process_accessor_values, EvaluationContext, ParsingContext,
    StyleValue, ValueType,
};
use serde_json::json;

#[test]
fn test_processed_values_are_keyed_by_accessor_key() {
    let mut ctx = ParsingContext::new();
    parse(&json!(["get", "width"]), ValueType::Number, &mut ctx).unwrap();

    let processed = process_accessor_values(&json!({"width": 4}), ctx.properties());

    let key = ctx.properties().keys().next().unwrap();
    assert_eq!(processed[key].value, StyleValue::Number(4.0));
    assert_eq!(processed[key].slug, "width_0");
    assert_eq!(processed[key].value_type, ValueType::Number);
}

#[test]
fn test_same_path_different_types_resolve_separately() {
    let mut ctx = ParsingContext::new();
    parse(&json!(["get", "val"]), ValueType::Number, &mut ctx).unwrap();
    parse(&json!(["get", "val"]), ValueType::String, &mut ctx).unwrap();

    let processed = process_accessor_values(&json!({"val": 3}), ctx.properties());

    assert_eq!(processed.len(), 2);
    let values: Vec<StyleValue> = processed.values().map(|entry| entry.value.clone()).collect();
    assert!(values.contains(&StyleValue::Number(3.0)));
    assert!(values.contains(&StyleValue::String("3".to_owned())));
}

#[test]
fn test_array_index_path() {
    assert_eq!(
        eval_number(json!(["get", "items", 1]), json!({"items": [10, 20, 30]})),
        StyleValue::Number(20.0)
    );
}

#[test]
fn test_index_past_end_uses_default() {
    assert_eq!(
        eval_number(
            json!(["get", "items", 9, {"default": -1}]),
            json!({"items": [10]})
        ),
        StyleValue::Number(-1.0)
    );
}

#[test]
fn test_size_property_normalizes_scalar() {
    let mut ctx = ParsingContext::new();
    let evaluator = build_expression(&json!(["get", "size"]), ValueType::Size, &mut ctx).unwrap();

    let mut eval_ctx = EvaluationContext::new();
    eval_ctx.set_properties(process_accessor_values(&json!({"size": 8}), ctx.properties()));

    assert_eq!(evaluator.evaluate(&eval_ctx), StyleValue::Size([8.0, 8.0]));
}

#[test]
fn test_has_sees_presence_of_any_primitive() {
    let mut ctx = ParsingContext::new();
    let evaluator = build_expression(&json!(["has", "flag"]), ValueType::Boolean, &mut ctx).unwrap();

    for raw in [json!({"flag": 0}), json!({"flag": ""}), json!({"flag": null})] {
        let mut eval_ctx = EvaluationContext::new();
        eval_ctx.set_properties(process_accessor_values(&raw, ctx.properties()));
        assert_eq!(evaluator.evaluate(&eval_ctx), StyleValue::Boolean(true));
    }

    let mut eval_ctx = EvaluationContext::new();
    eval_ctx.set_properties(process_accessor_values(&json!({}), ctx.properties()));
    assert_eq!(evaluator.evaluate(&eval_ctx), StyleValue::Boolean(false));
}

#[test]
fn test_default_is_coerced_to_registered_type() {
    let mut ctx = ParsingContext::new();
    parse(
        &json!(["get", "label", {"default": 10}]),
        ValueType::String,
        &mut ctx,
    )
    .unwrap();

    let processed = process_accessor_values(&json!({}), ctx.properties());

    let key = ctx.properties().keys().next().unwrap();
    assert_eq!(processed[key].value, StyleValue::String("10".to_owned()));
}

#[test]
fn test_variables_and_properties_do_not_mix() {
    let mut ctx = ParsingContext::new();
    let evaluator = build_expression(
        &json!(["concat", ["get", "name"], ": ", ["var", "name"]]),
        ValueType::String,
        &mut ctx,
    )
    .unwrap();

    let mut eval_ctx = EvaluationContext::new();
    eval_ctx.set_properties(process_accessor_values(
        &json!({"name": "feature"}),
        ctx.properties(),
    ));
    eval_ctx.set_variables(process_accessor_values(
        &json!({"name": "style"}),
        ctx.variables(),
    ));

    assert_eq!(
        evaluator.evaluate(&eval_ctx),
        StyleValue::String("feature: style".to_owned())
    );
}

fn eval_number(encoded: serde_json::Value, raw: serde_json::Value) -> StyleValue {
    let mut ctx = ParsingContext::new();
    let evaluator = build_expression(&encoded, ValueType::Number, &mut ctx).unwrap();

    let mut eval_ctx = EvaluationContext::new();
    eval_ctx.set_properties(process_accessor_values(&raw, ctx.properties()));

    evaluator.evaluate(&eval_ctx)
}
