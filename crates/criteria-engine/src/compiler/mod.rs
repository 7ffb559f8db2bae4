use crate::{
    error::{CriteriaError, Result},
    rules::{EntityType, FieldRules},
};
use model::Expression;
use serde::Deserialize;
use serde_json::{Map, Value as JsonValue};
use tracing::{debug, trace};

pub mod scalar;

pub use scalar::compile_field;

/// One criteria object, or a list of alternative criteria objects.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Criteria {
    /// Every recognized field must match.
    All(Map<String, JsonValue>),
    /// At least one of the objects must match.
    Any(Vec<Map<String, JsonValue>>),
}

impl Criteria {
    pub fn from_json(value: JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => Ok(Criteria::All(map)),
            JsonValue::Array(items) => items
                .into_iter()
                .map(|item| match item {
                    JsonValue::Object(map) => Ok(map),
                    other => Err(CriteriaError::InvalidCriteriaRoot(format!(
                        "array element {other}"
                    ))),
                })
                .collect::<Result<Vec<_>>>()
                .map(Criteria::Any),
            other => Err(CriteriaError::InvalidCriteriaRoot(other.to_string())),
        }
    }
}

impl From<Map<String, JsonValue>> for Criteria {
    fn from(map: Map<String, JsonValue>) -> Self {
        Criteria::All(map)
    }
}

impl From<Vec<Map<String, JsonValue>>> for Criteria {
    fn from(list: Vec<Map<String, JsonValue>>) -> Self {
        Criteria::Any(list)
    }
}

/// Stateless compiler bound to one rule table.
#[derive(Debug, Clone, Copy)]
pub struct CriteriaCompiler<'r> {
    rules: &'r FieldRules,
}

impl<'r> CriteriaCompiler<'r> {
    pub fn new(rules: &'r FieldRules) -> Self {
        Self { rules }
    }

    pub fn for_entity(entity: EntityType) -> CriteriaCompiler<'static> {
        CriteriaCompiler::new(entity.rules())
    }

    pub fn rules(&self) -> &'r FieldRules {
        self.rules
    }

    pub fn compile(&self, criteria: &Criteria) -> Result<Expression> {
        let expr = match criteria {
            Criteria::All(object) => self.compile_all(object)?,
            Criteria::Any(objects) => self.compile_any(objects)?,
        };

        trace!(entity = self.rules.entity(), %expr, "compiled criteria");
        Ok(expr)
    }

    /// Joins the comparisons of every recognized field with AND, in table order.
    ///
    /// Keys the table does not declare are ignored, so an object holding only
    /// unknown keys compiles to `Void`.
    pub fn compile_all(&self, object: &Map<String, JsonValue>) -> Result<Expression> {
        for key in object.keys().filter(|k| !self.rules.contains(k)) {
            debug!(entity = self.rules.entity(), key = %key, "ignoring unknown criteria key");
        }

        let mut comparisons = Vec::new();
        for rule in self.rules.fields() {
            let Some(raw) = object.get(&rule.name) else {
                continue;
            };
            if let Some(expr) = compile_field(rule, raw)? {
                comparisons.push(expr);
            }
        }

        Ok(Expression::and(comparisons))
    }

    /// Compiles each object with [`Self::compile_all`] and joins the results with OR,
    /// keeping input order.
    pub fn compile_any(&self, objects: &[Map<String, JsonValue>]) -> Result<Expression> {
        let alternatives = objects
            .iter()
            .map(|object| self.compile_all(object))
            .collect::<Result<Vec<_>>>()?;

        Ok(Expression::or(alternatives))
    }
}

/// Compiles criteria against a rule table.
pub fn compile(criteria: &Criteria, rules: &FieldRules) -> Result<Expression> {
    CriteriaCompiler::new(rules).compile(criteria)
}
