//! Compiles loosely typed filter criteria into [`model::Expression`] trees.
//!
//! Criteria arrive either as JSON objects from programmatic callers or as flat
//! HTTP query parameters, which [`query::normalize_query`] folds back into a
//! nested criteria object. Each entity type owns a [`rules::FieldRules`] table
//! that decides which keys are filterable and how their values are typed.

pub mod compiler;
pub mod error;
pub mod query;
pub mod rules;

pub use compiler::{Criteria, CriteriaCompiler, compile};
pub use error::{CriteriaError, Result, ShapeViolation};
pub use query::{NormalizedQuery, QueryNormalizer, QueryParams, QueryValue, normalize_query};
pub use rules::{EntityType, FieldRule, FieldRules, FieldShape, ValueDomain};
