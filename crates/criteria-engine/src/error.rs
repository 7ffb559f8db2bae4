use crate::rules::ValueDomain;
use thiserror::Error;

/// Why a recognized field's criteria could not be compiled.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeViolation {
    #[error("field only accepts exact values, got a range")]
    RangeOnExactField,

    #[error("unexpected key '{0}' in range, expected 'from' and/or 'to'")]
    UnexpectedRangeKey(String),

    #[error("alternatives cannot be nested")]
    NestedAlternatives,

    #[error("expected {expected}, got {found}")]
    OutOfDomain { expected: ValueDomain, found: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CriteriaError {
    #[error("Malformed criteria for field '{field}': {violation}")]
    MalformedCriteriaShape {
        field: String,
        violation: ShapeViolation,
    },

    #[error("Criteria must be an object or an array of objects, got {0}")]
    InvalidCriteriaRoot(String),

    #[error("Invalid value '{value}' for query parameter '{name}': {reason}")]
    InvalidQueryParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Invalid rule table: {0}")]
    InvalidRuleTable(String),

    #[error("Unknown entity type: {0}")]
    UnknownEntity(String),
}

impl CriteriaError {
    pub(crate) fn malformed(field: &str, violation: ShapeViolation) -> Self {
        CriteriaError::MalformedCriteriaShape {
            field: field.to_string(),
            violation,
        }
    }

    pub(crate) fn query_param(name: &str, value: &str, reason: impl Into<String>) -> Self {
        CriteriaError::InvalidQueryParameter {
            name: name.to_string(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CriteriaError>;
