//! End-to-end scenarios exercising the testable properties named alongside this crate's design:
//! Fast/Exhaustive boolean equivalence, Template re-compilation stability, enum/const
//! equivalence, the empty-`required`no-op, unknown-keyword neutrality, annotation scoping, and
//! the if/then/else and contains scenarios.
use schema_engine::{CompilationOptions, EvaluationOptions, Mode, NeverCancelled, Validator};
use schema_frame::Dialect;
use serde_json::{json, Value};
use test_case::test_case;

async fn compile(schema: Value) -> Validator {
    Validator::compile(schema, &CompilationOptions::new())
        .await
        .expect("schema should compile")
}

#[test_case(json!({"type": "string", "minLength": 3}), json!("hi"))]
#[test_case(json!({"type": "object", "required": ["a"]}), json!({}))]
#[test_case(json!({"allOf": [{"minimum": 0}, {"maximum": 10}]}), json!(-1))]
#[tokio::test]
async fn fast_and_exhaustive_agree_on_the_verdict(schema: Value, instance: Value) {
    let validator = compile(schema).await;

    let fast = validator.is_valid(&instance);

    let mut exhaustive_holds = true;
    let options = EvaluationOptions::new().mode(Mode::Exhaustive);
    validator
        .evaluate(&instance, &options, &NeverCancelled, &mut |result, _, _, _, _, _| {
            exhaustive_holds &= result;
        })
        .unwrap();

    assert_eq!(fast, exhaustive_holds);
}

#[tokio::test]
async fn recompiling_the_same_schema_yields_a_structurally_equal_template() {
    let schema = json!({
        "type": "object",
        "properties": {"name": {"type": "string"}},
        "required": ["name"],
    });

    let a = compile(schema.clone()).await;
    let b = compile(schema).await;

    assert_eq!(a.template(), b.template());
}

#[tokio::test]
async fn enum_of_one_value_is_equivalent_to_const() {
    let enum_validator = compile(json!({"enum": ["red"]})).await;
    let const_validator = compile(json!({"const": "red"})).await;

    for instance in [json!("red"), json!("blue"), json!(1)] {
        assert_eq!(enum_validator.is_valid(&instance), const_validator.is_valid(&instance));
    }
}

#[tokio::test]
async fn empty_required_compiles_to_a_no_op() {
    let validator = compile(json!({"required": []})).await;
    assert!(validator.template().is_empty());
    assert!(validator.is_valid(&json!({})));
    assert!(validator.is_valid(&json!("not even an object")));
}

#[tokio::test]
async fn unknown_keywords_never_change_the_verdict() {
    let plain = compile(json!({"type": "string"})).await;
    let decorated = compile(json!({"type": "string", "x-internal-note": "draft"})).await;

    for instance in [json!("ok"), json!(5), json!(null)] {
        assert_eq!(plain.is_valid(&instance), decorated.is_valid(&instance));
    }
    assert_eq!(decorated.unmatched_keywords(), &["x-internal-note".to_string()]);
}

#[tokio::test]
async fn additional_properties_does_not_flag_a_key_its_sibling_properties_already_addressed() {
    // "a" is addressed by `properties` (so its private annotation is recorded) even though its
    // own `type` assertion fails; `additionalProperties` must still treat "a" as covered and
    // reject only the genuinely additional "b".
    let schema = json!({"properties": {"a": {"type": "string"}}, "additionalProperties": false});
    let validator = compile(schema).await;

    let mut rejected_by_additional_properties = Vec::new();
    let options = EvaluationOptions::new().mode(Mode::Exhaustive);
    validator
        .evaluate(
            &json!({"a": 5, "b": 1}),
            &options,
            &NeverCancelled,
            &mut |result, step, schema_pointer, instance_location, _, _| {
                if !result && schema_pointer.to_string() == "/additionalProperties" {
                    rejected_by_additional_properties.push(instance_location.to_string());
                }
            },
        )
        .unwrap();

    assert!(!rejected_by_additional_properties.is_empty());
    assert!(rejected_by_additional_properties.iter().all(|location| location == "/b"));
}

#[test_case(json!(-5), true)]
#[test_case(json!(-100), false)]
#[test_case(json!(0.5), false)]
#[tokio::test]
async fn if_then_else_selects_the_matching_branch(instance: Value, expected: bool) {
    let schema = json!({"if": {"maximum": 0}, "then": {"minimum": -10}, "else": {"minimum": 1}});
    let validator = compile(schema).await;
    assert_eq!(validator.is_valid(&instance), expected);
}

#[test_case(json!([1, "a", 2]), true)]
#[test_case(json!([1, "a", "b"]), false)]
#[tokio::test]
async fn contains_with_min_contains_counts_matching_items(instance: Value, expected: bool) {
    let schema = json!({"contains": {"type": "number"}, "minContains": 2});
    let validator = compile(schema).await;
    assert_eq!(validator.is_valid(&instance), expected);
}

#[test_case("", 0, true)]
#[test_case("a", 0, false)]
#[test_case("abc", 3, true)]
#[test_case("abcd", 3, false)]
#[test_case("caf\u{e9}", 4, true)]
#[tokio::test]
async fn max_length_counts_unicode_codepoints_not_bytes(s: &str, n: u64, expected: bool) {
    let validator = compile(json!({"maxLength": n})).await;
    assert_eq!(validator.is_valid(&json!(s)), expected);
}

#[tokio::test]
async fn a_schema_with_a_ref_cycle_compiles_and_bounds_recursion() {
    let schema = json!({
        "type": "object",
        "properties": {"next": {"$ref": "#"}},
    });
    let validator = compile(schema).await;

    let mut instance = json!({});
    for _ in 0..50 {
        instance = json!({"next": instance});
    }
    assert!(validator.is_valid(&instance));
    assert!(!validator.is_valid(&json!({"next": {"next": 5}})));
}

#[tokio::test]
async fn reject_unknown_types_opts_into_strict_type_checking() {
    let lenient = Validator::compile(json!({"type": "strang"}), &CompilationOptions::new()).await;
    assert!(lenient.is_ok());

    let strict_options = CompilationOptions::new().reject_unknown_types(true);
    let strict = Validator::compile(json!({"type": "strang"}), &strict_options).await;
    assert!(strict.is_err());
}

#[tokio::test]
async fn non_positive_multiple_of_is_rejected_at_compile_time() {
    let result = Validator::compile(json!({"multipleOf": 0}), &CompilationOptions::new()).await;
    assert!(result.is_err());
    let result = Validator::compile(json!({"multipleOf": -2}), &CompilationOptions::new()).await;
    assert!(result.is_err());
}

#[test_case(json!({"a": 1}), true)]
#[test_case(json!({"a": 1, "b": 2}), true)]
#[test_case(json!({"b": 2}), false)]
#[test_case(json!({}), true)]
#[tokio::test]
async fn dependent_required_only_applies_once_its_key_is_present(instance: Value, expected: bool) {
    let schema = json!({"dependentRequired": {"b": ["a"]}});
    let validator = compile(schema).await;
    assert_eq!(validator.is_valid(&instance), expected);
}

#[test_case(json!({"credit_card": 1, "billing_address": "x"}), true)]
#[test_case(json!({"credit_card": 1}), false)]
#[test_case(json!({}), true)]
#[tokio::test]
async fn dependent_schemas_applies_a_subschema_only_when_its_key_is_present(instance: Value, expected: bool) {
    let schema = json!({"dependentSchemas": {"credit_card": {"required": ["billing_address"]}}});
    let validator = compile(schema).await;
    assert_eq!(validator.is_valid(&instance), expected);
}

#[tokio::test]
async fn draft4_exclusive_minimum_is_a_boolean_sibling_of_minimum() {
    let schema = json!({"$schema": "http://json-schema.org/draft-04/schema#", "minimum": 0, "exclusiveMinimum": true});
    let validator = Validator::compile(schema, &CompilationOptions::new().default_dialect(Some(Dialect::Draft4)))
        .await
        .unwrap();
    assert!(!validator.is_valid(&json!(0)));
    assert!(validator.is_valid(&json!(1)));
}
