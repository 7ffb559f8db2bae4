use crate::core::value::Value;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Compiled filter tree handed to a query executor.
///
/// Wire shape: `{"op":"void"}`, `{"op":"equal","property":..,"value":..}`,
/// `{"op":"between","property":..,"from":..,"to":..}`,
/// `{"op":"and","expressions":[..]}`.
///
/// `Void` is the identity of `And`: executors read it as "no constraint".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Expression {
    Void,
    Equal {
        property: String,
        value: Value,
    },
    GreaterThanEqual {
        property: String,
        value: Value,
    },
    LessThanEqual {
        property: String,
        value: Value,
    },
    /// Inclusive on both bounds.
    Between {
        property: String,
        from: Value,
        to: Value,
    },
    And {
        expressions: Vec<Expression>,
    },
    Or {
        expressions: Vec<Expression>,
    },
}

impl Expression {
    /// Joins with AND, collapsing an empty list to `Void` and a single member to itself.
    pub fn and(mut expressions: Vec<Expression>) -> Expression {
        match expressions.len() {
            0 => Expression::Void,
            1 => expressions.remove(0),
            _ => Expression::And { expressions },
        }
    }

    /// Joins with OR, collapsing an empty list to `Void` and a single member to itself.
    pub fn or(mut expressions: Vec<Expression>) -> Expression {
        match expressions.len() {
            0 => Expression::Void,
            1 => expressions.remove(0),
            _ => Expression::Or { expressions },
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Expression::Void)
    }

    pub fn is_comparison(&self) -> bool {
        self.property().is_some()
    }

    /// Property name of a comparison, `None` for `Void` and combinators.
    pub fn property(&self) -> Option<&str> {
        match self {
            Expression::Equal { property, .. }
            | Expression::GreaterThanEqual { property, .. }
            | Expression::LessThanEqual { property, .. }
            | Expression::Between { property, .. } => Some(property),
            Expression::Void | Expression::And { .. } | Expression::Or { .. } => None,
        }
    }

    fn fmt_member(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::And { .. } | Expression::Or { .. } => write!(f, "({self})"),
            _ => write!(f, "{self}"),
        }
    }

    fn fmt_joined(f: &mut fmt::Formatter<'_>, expressions: &[Expression], sep: &str) -> fmt::Result {
        for (i, expr) in expressions.iter().enumerate() {
            if i > 0 {
                write!(f, " {sep} ")?;
            }
            expr.fmt_member(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Void => write!(f, "void"),
            Expression::Equal { property, value } => write!(f, "{property} = {value}"),
            Expression::GreaterThanEqual { property, value } => {
                write!(f, "{property} >= {value}")
            }
            Expression::LessThanEqual { property, value } => write!(f, "{property} <= {value}"),
            Expression::Between { property, from, to } => {
                write!(f, "{property} BETWEEN {from} AND {to}")
            }
            Expression::And { expressions } => Self::fmt_joined(f, expressions, "AND"),
            Expression::Or { expressions } => Self::fmt_joined(f, expressions, "OR"),
        }
    }
}
