use crate::error::{CriteriaError, Result, ShapeViolation};
use model::{Amount, Expression, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::{collections::HashSet, fmt, str::FromStr};

pub mod entity;

pub use entity::EntityType;

/// Type a field's criteria values are coerced into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueDomain {
    Text,
    Integer,
    Amount,
}

impl fmt::Display for ValueDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueDomain::Text => write!(f, "text"),
            ValueDomain::Integer => write!(f, "integer"),
            ValueDomain::Amount => write!(f, "amount"),
        }
    }
}

impl ValueDomain {
    /// Coerces a raw criteria value into this domain.
    ///
    /// Strings are accepted for integers and amounts since query strings carry
    /// nothing else. Numbers are never routed through `f64`.
    pub fn coerce(&self, field: &str, raw: &JsonValue) -> Result<Value> {
        let out_of_domain = || self.violation(field, raw.to_string());

        match (self, raw) {
            (ValueDomain::Text, JsonValue::String(s)) => Ok(Value::String(s.clone())),
            (ValueDomain::Integer, JsonValue::Number(n)) => {
                n.as_i64().map(Value::Int).ok_or_else(out_of_domain)
            }
            (ValueDomain::Integer, JsonValue::String(s)) => {
                s.parse::<i64>().map(Value::Int).map_err(|_| out_of_domain())
            }
            (ValueDomain::Amount, JsonValue::Number(n)) => n
                .as_i64()
                .map(Amount::from)
                .or_else(|| n.as_u64().map(Amount::from))
                .map(Value::Amount)
                .ok_or_else(out_of_domain),
            (ValueDomain::Amount, JsonValue::String(s)) => Amount::from_str(s)
                .map(Value::Amount)
                .map_err(|_| out_of_domain()),
            _ => Err(out_of_domain()),
        }
    }

    /// Restores the domain type of a value read back from the wire shape,
    /// where amounts arrive as plain strings.
    pub fn retype(&self, field: &str, value: Value) -> Result<Value> {
        match (self, value) {
            (ValueDomain::Text, v @ Value::String(_)) => Ok(v),
            (ValueDomain::Integer, v @ Value::Int(_)) => Ok(v),
            (ValueDomain::Amount, v @ Value::Amount(_)) => Ok(v),
            (ValueDomain::Amount, Value::Int(i)) => Ok(Value::Amount(Amount::from(i))),
            (ValueDomain::Amount, Value::String(s)) => Amount::from_str(&s)
                .map(Value::Amount)
                .map_err(|_| self.violation(field, format!("{s:?}"))),
            (_, other) => Err(self.violation(field, other.to_string())),
        }
    }

    fn violation(&self, field: &str, found: String) -> CriteriaError {
        CriteriaError::malformed(
            field,
            ShapeViolation::OutOfDomain {
                expected: *self,
                found,
            },
        )
    }
}

/// Criteria shapes a field accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldShape {
    /// Bare values only (identifiers, hashes, keys, signatures).
    Exact,
    /// Bare values or `{from, to}` ranges.
    Range,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    pub name: String,
    pub domain: ValueDomain,
    pub shape: FieldShape,
}

impl FieldRule {
    pub fn exact(name: &str, domain: ValueDomain) -> Self {
        Self {
            name: name.to_string(),
            domain,
            shape: FieldShape::Exact,
        }
    }

    pub fn range(name: &str, domain: ValueDomain) -> Self {
        Self {
            name: name.to_string(),
            domain,
            shape: FieldShape::Range,
        }
    }

    pub fn accepts_range(&self) -> bool {
        self.shape == FieldShape::Range
    }
}

#[derive(Deserialize)]
struct RawFieldRules {
    entity: String,
    fields: Vec<FieldRule>,
}

impl TryFrom<RawFieldRules> for FieldRules {
    type Error = CriteriaError;

    fn try_from(raw: RawFieldRules) -> Result<Self> {
        FieldRules::new(raw.entity, raw.fields)
    }
}

/// Filterable fields of one entity type, in declaration order.
///
/// Declaration order fixes the member order of compiled `And` expressions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawFieldRules")]
pub struct FieldRules {
    entity: String,
    fields: Vec<FieldRule>,
}

impl FieldRules {
    pub fn new(entity: impl Into<String>, fields: Vec<FieldRule>) -> Result<Self> {
        let entity = entity.into();
        let mut seen = HashSet::new();

        for field in &fields {
            if field.name.is_empty() {
                return Err(CriteriaError::InvalidRuleTable(format!(
                    "empty field name in '{entity}'"
                )));
            }
            if !seen.insert(field.name.as_str()) {
                return Err(CriteriaError::InvalidRuleTable(format!(
                    "duplicate field '{}' in '{entity}'",
                    field.name
                )));
            }
        }

        Ok(Self { entity, fields })
    }

    pub fn entity(&self) -> &str {
        &self.entity
    }

    pub fn fields(&self) -> &[FieldRule] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Re-types the comparison values of an expression deserialized from its
    /// wire shape. Properties the table does not know keep their values.
    pub fn retype(&self, expression: Expression) -> Result<Expression> {
        let value_for = |property: &str, value: Value| match self.get(property) {
            Some(rule) => rule.domain.retype(property, value),
            None => Ok(value),
        };

        Ok(match expression {
            Expression::Void => Expression::Void,
            Expression::Equal { property, value } => Expression::Equal {
                value: value_for(&property, value)?,
                property,
            },
            Expression::GreaterThanEqual { property, value } => Expression::GreaterThanEqual {
                value: value_for(&property, value)?,
                property,
            },
            Expression::LessThanEqual { property, value } => Expression::LessThanEqual {
                value: value_for(&property, value)?,
                property,
            },
            Expression::Between { property, from, to } => Expression::Between {
                from: value_for(&property, from)?,
                to: value_for(&property, to)?,
                property,
            },
            Expression::And { expressions } => Expression::And {
                expressions: self.retype_all(expressions)?,
            },
            Expression::Or { expressions } => Expression::Or {
                expressions: self.retype_all(expressions)?,
            },
        })
    }

    fn retype_all(&self, expressions: Vec<Expression>) -> Result<Vec<Expression>> {
        expressions.into_iter().map(|e| self.retype(e)).collect()
    }
}
