use crate::{
    error::{CriteriaError, Result, ShapeViolation},
    rules::FieldRule,
};
use model::Expression;
use serde_json::{Map, Value as JsonValue};

const RANGE_FROM: &str = "from";
const RANGE_TO: &str = "to";

/// Compiles the criteria given for one field into at most one expression.
///
/// | raw value            | result                      |
/// |----------------------|-----------------------------|
/// | `null`               | none                        |
/// | scalar `v`           | `equal v`                   |
/// | `{from, to}`         | `between from and to`       |
/// | `{from}`             | `greaterThanEqual from`     |
/// | `{to}`               | `lessThanEqual to`          |
/// | `{}`                 | none                        |
/// | `[a, b, ..]`         | `or` of each compiled item  |
///
/// Range shapes are only accepted by range-capable fields.
pub fn compile_field(rule: &FieldRule, raw: &JsonValue) -> Result<Option<Expression>> {
    match raw {
        JsonValue::Array(items) => compile_alternatives(rule, items),
        single => compile_single(rule, single),
    }
}

fn compile_alternatives(rule: &FieldRule, items: &[JsonValue]) -> Result<Option<Expression>> {
    let mut alternatives = Vec::with_capacity(items.len());

    for item in items {
        if item.is_array() {
            return Err(CriteriaError::malformed(
                &rule.name,
                ShapeViolation::NestedAlternatives,
            ));
        }
        if let Some(expr) = compile_single(rule, item)? {
            alternatives.push(expr);
        }
    }

    if alternatives.is_empty() {
        return Ok(None);
    }
    Ok(Some(Expression::or(alternatives)))
}

fn compile_single(rule: &FieldRule, raw: &JsonValue) -> Result<Option<Expression>> {
    match raw {
        JsonValue::Null => Ok(None),
        JsonValue::Object(range) => compile_range(rule, range),
        scalar => Ok(Some(Expression::Equal {
            property: rule.name.clone(),
            value: rule.domain.coerce(&rule.name, scalar)?,
        })),
    }
}

fn compile_range(rule: &FieldRule, range: &Map<String, JsonValue>) -> Result<Option<Expression>> {
    if !rule.accepts_range() {
        return Err(CriteriaError::malformed(
            &rule.name,
            ShapeViolation::RangeOnExactField,
        ));
    }

    if let Some(key) = range.keys().find(|k| *k != RANGE_FROM && *k != RANGE_TO) {
        return Err(CriteriaError::malformed(
            &rule.name,
            ShapeViolation::UnexpectedRangeKey(key.clone()),
        ));
    }

    let bound = |key: &str| {
        range
            .get(key)
            .filter(|v| !v.is_null())
            .map(|v| rule.domain.coerce(&rule.name, v))
            .transpose()
    };

    let property = rule.name.clone();
    let expr = match (bound(RANGE_FROM)?, bound(RANGE_TO)?) {
        (Some(from), Some(to)) => Some(Expression::Between { property, from, to }),
        (Some(value), None) => Some(Expression::GreaterThanEqual { property, value }),
        (None, Some(value)) => Some(Expression::LessThanEqual { property, value }),
        (None, None) => None,
    };

    Ok(expr)
}
