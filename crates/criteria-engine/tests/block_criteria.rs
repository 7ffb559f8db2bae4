//! Block criteria compiled against the built-in block table.

use criteria_engine::{Criteria, CriteriaError, EntityType, ShapeViolation, compile};
use model::{Amount, Expression, Value};
use serde_json::{Value as JsonValue, json};
use std::str::FromStr;

fn compile_block(criteria: JsonValue) -> Result<Expression, CriteriaError> {
    let criteria = Criteria::from_json(criteria)?;
    compile(&criteria, EntityType::Block.rules())
}

fn wire(criteria: JsonValue) -> JsonValue {
    let expr = compile_block(criteria).expect("criteria should compile");
    serde_json::to_value(expr).unwrap()
}

fn amount(digits: &str) -> Value {
    Value::Amount(Amount::from_str(digits).unwrap())
}

#[test]
fn test_unknown_key_compiles_to_void() {
    assert_eq!(wire(json!({ "unknown": "123" })), json!({ "op": "void" }));
    assert_eq!(wire(json!({})), json!({ "op": "void" }));
}

#[test]
fn test_exact_fields_compile_to_equal() {
    for field in [
        "id",
        "previousBlock",
        "payloadHash",
        "generatorPublicKey",
        "blockSignature",
    ] {
        assert_eq!(
            wire(json!({ field: "123" })),
            json!({ "property": field, "op": "equal", "value": "123" })
        );
    }

    assert_eq!(
        wire(json!({ "version": 1 })),
        json!({ "property": "version", "op": "equal", "value": 1 })
    );
}

#[test]
fn test_integer_range_fields() {
    for (field, a, b) in [
        ("timestamp", 3600, 7200),
        ("height", 100, 200),
        ("numberOfTransactions", 10, 20),
        ("payloadLength", 1000, 2000),
    ] {
        assert_eq!(
            wire(json!({ field: a })),
            json!({ "property": field, "op": "equal", "value": a })
        );
        assert_eq!(
            wire(json!({ field: { "from": a, "to": b } })),
            json!({ "property": field, "op": "between", "from": a, "to": b })
        );
        assert_eq!(
            wire(json!({ field: { "from": a } })),
            json!({ "property": field, "op": "greaterThanEqual", "value": a })
        );
        assert_eq!(
            wire(json!({ field: { "to": a } })),
            json!({ "property": field, "op": "lessThanEqual", "value": a })
        );
    }
}

#[test]
fn test_amount_range_fields() {
    for (field, a, b) in [
        ("totalAmount", "10000", "20000"),
        ("totalFee", "100", "200"),
        ("reward", "1000", "2000"),
    ] {
        assert_eq!(
            compile_block(json!({ field: a })).unwrap(),
            Expression::Equal {
                property: field.to_string(),
                value: amount(a),
            }
        );
        assert_eq!(
            compile_block(json!({ field: { "from": a, "to": b } })).unwrap(),
            Expression::Between {
                property: field.to_string(),
                from: amount(a),
                to: amount(b),
            }
        );
        assert_eq!(
            compile_block(json!({ field: { "from": a } })).unwrap(),
            Expression::GreaterThanEqual {
                property: field.to_string(),
                value: amount(a),
            }
        );
        assert_eq!(
            compile_block(json!({ field: { "to": a } })).unwrap(),
            Expression::LessThanEqual {
                property: field.to_string(),
                value: amount(a),
            }
        );
    }
}

#[test]
fn test_amounts_serialize_as_digit_strings() {
    assert_eq!(
        wire(json!({ "totalAmount": { "from": 10000, "to": "99999999999999999999999" } })),
        json!({
            "property": "totalAmount",
            "op": "between",
            "from": "10000",
            "to": "99999999999999999999999"
        })
    );
}

#[test]
fn test_amount_equality_ignores_leading_zeros() {
    assert_eq!(
        compile_block(json!({ "totalAmount": "10000" })).unwrap(),
        compile_block(json!({ "totalAmount": "010000" })).unwrap()
    );
}

#[test]
fn test_two_fields_join_with_and_in_table_order() {
    let expected = json!({
        "op": "and",
        "expressions": [
            { "property": "height", "op": "greaterThanEqual", "value": 100 },
            { "property": "generatorPublicKey", "op": "equal", "value": "123" }
        ]
    });

    assert_eq!(
        wire(json!({ "height": { "from": 100 }, "generatorPublicKey": "123" })),
        expected
    );
    assert_eq!(
        wire(json!({ "generatorPublicKey": "123", "height": { "from": 100 } })),
        expected
    );
}

#[test]
fn test_unknown_keys_beside_known_ones_are_ignored() {
    assert_eq!(
        wire(json!({ "height": 5, "heigth": 6, "foo": { "from": 1 } })),
        json!({ "property": "height", "op": "equal", "value": 5 })
    );
}

#[test]
fn test_list_joins_with_or() {
    assert_eq!(
        wire(json!([
            { "height": { "from": 100 }, "generatorPublicKey": "123" },
            { "height": { "from": 300 }, "generatorPublicKey": "456" }
        ])),
        json!({
            "op": "or",
            "expressions": [
                {
                    "op": "and",
                    "expressions": [
                        { "property": "height", "op": "greaterThanEqual", "value": 100 },
                        { "property": "generatorPublicKey", "op": "equal", "value": "123" }
                    ]
                },
                {
                    "op": "and",
                    "expressions": [
                        { "property": "height", "op": "greaterThanEqual", "value": 300 },
                        { "property": "generatorPublicKey", "op": "equal", "value": "456" }
                    ]
                }
            ]
        })
    );
}

#[test]
fn test_single_element_list_is_unwrapped() {
    assert_eq!(
        wire(json!([{ "height": 1 }])),
        json!({ "property": "height", "op": "equal", "value": 1 })
    );
}

#[test]
fn test_or_keeps_one_member_per_object() {
    let result = wire(json!([{ "height": 1 }, { "unknown": 2 }, { "id": "x" }]));
    assert_eq!(
        result,
        json!({
            "op": "or",
            "expressions": [
                { "property": "height", "op": "equal", "value": 1 },
                { "op": "void" },
                { "property": "id", "op": "equal", "value": "x" }
            ]
        })
    );
}

#[test]
fn test_range_on_hash_field_is_malformed() {
    let err = compile_block(json!({ "payloadHash": { "from": "a", "to": "b" } })).unwrap_err();
    assert_eq!(
        err,
        CriteriaError::MalformedCriteriaShape {
            field: "payloadHash".to_string(),
            violation: ShapeViolation::RangeOnExactField,
        }
    );
}

#[test]
fn test_range_on_exact_integer_field_is_malformed() {
    assert!(matches!(
        compile_block(json!({ "version": { "from": 1 } })),
        Err(CriteriaError::MalformedCriteriaShape { ref field, .. }) if field == "version"
    ));
}

#[test]
fn test_value_outside_domain_is_malformed() {
    for criteria in [
        json!({ "height": "tall" }),
        json!({ "height": 1.5 }),
        json!({ "totalFee": "1e3" }),
        json!({ "id": 123 }),
        json!({ "id": true }),
    ] {
        assert!(
            matches!(
                compile_block(criteria.clone()),
                Err(CriteriaError::MalformedCriteriaShape {
                    violation: ShapeViolation::OutOfDomain { .. },
                    ..
                })
            ),
            "accepted {criteria}"
        );
    }
}

#[test]
fn test_alternative_values_for_one_field() {
    assert_eq!(
        wire(json!({ "generatorPublicKey": ["a", "b"], "height": { "from": 10 } })),
        json!({
            "op": "and",
            "expressions": [
                { "property": "height", "op": "greaterThanEqual", "value": 10 },
                {
                    "op": "or",
                    "expressions": [
                        { "property": "generatorPublicKey", "op": "equal", "value": "a" },
                        { "property": "generatorPublicKey", "op": "equal", "value": "b" }
                    ]
                }
            ]
        })
    );
}

#[test]
fn test_non_object_root_is_rejected() {
    assert!(matches!(
        compile_block(json!(42)),
        Err(CriteriaError::InvalidCriteriaRoot(_))
    ));
}
