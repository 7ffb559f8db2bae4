use crate::{
    compiler::CriteriaCompiler,
    error::{CriteriaError, Result},
    rules::FieldRules,
};
use model::{Expression, OrderBy, OrderDirection, Ordering, Pagination};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};
use std::num::NonZeroU64;
use tracing::debug;

mod params;
mod path;

pub use params::{QueryParams, QueryValue};

pub const PAGE: &str = "page";
pub const LIMIT: &str = "limit";
pub const OFFSET: &str = "offset";
pub const ORDER_BY: &str = "orderBy";
/// Transport-only flag choosing transformed or raw output; never a filter.
pub const TRANSFORM: &str = "transform";

/// Result of splitting flat query parameters into listing envelope and criteria.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedQuery {
    pub pagination: Pagination,
    pub ordering: Ordering,
    pub criteria: Map<String, JsonValue>,
}

impl NormalizedQuery {
    /// Compiles the nested criteria object against `rules`.
    pub fn compile(&self, rules: &FieldRules) -> Result<Expression> {
        CriteriaCompiler::new(rules).compile_all(&self.criteria)
    }
}

/// Splits flat query parameters into pagination, ordering and a nested criteria object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryNormalizer {
    default_limit: NonZeroU64,
    excluded: Vec<String>,
}

impl Default for QueryNormalizer {
    fn default() -> Self {
        Self {
            default_limit: NonZeroU64::new(Pagination::DEFAULT_LIMIT).unwrap_or(NonZeroU64::MIN),
            excluded: [PAGE, LIMIT, OFFSET, ORDER_BY, TRANSFORM]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl QueryNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_default_limit(mut self, limit: NonZeroU64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Marks another transport-only key that must never reach the criteria.
    pub fn exclude(mut self, key: impl Into<String>) -> Self {
        self.excluded.push(key.into());
        self
    }

    pub fn default_limit(&self) -> u64 {
        self.default_limit.get()
    }

    pub fn normalize(&self, params: &QueryParams) -> Result<NormalizedQuery> {
        Ok(NormalizedQuery {
            pagination: self.pagination(params)?,
            ordering: ordering(params)?,
            criteria: self.criteria(params),
        })
    }

    /// `offset` wins whenever it is given; otherwise it is derived from `page`.
    fn pagination(&self, params: &QueryParams) -> Result<Pagination> {
        let limit = match unsigned(params, LIMIT)? {
            Some(0) => return Err(CriteriaError::query_param(LIMIT, "0", "must be at least 1")),
            Some(limit) => limit,
            None => self.default_limit.get(),
        };

        let offset = match unsigned(params, OFFSET)? {
            Some(offset) => offset,
            None => match unsigned(params, PAGE)? {
                Some(0) => return Err(CriteriaError::query_param(PAGE, "0", "must be at least 1")),
                Some(page) => (page - 1).checked_mul(limit).ok_or_else(|| {
                    CriteriaError::query_param(PAGE, &page.to_string(), "offset out of range")
                })?,
                None => 0,
            },
        };

        Ok(Pagination::new(offset, limit))
    }

    fn criteria(&self, params: &QueryParams) -> Map<String, JsonValue> {
        let mut criteria = Map::new();

        for (key, value) in params.iter() {
            if self.excluded.iter().any(|excluded| excluded == key) {
                continue;
            }
            if !path::assign(&mut criteria, key, value.to_json()) {
                debug!(key, "skipping query parameter without a usable path");
            }
        }

        criteria
    }
}

/// Normalizes with the default limit and reserved keys.
pub fn normalize_query(params: &QueryParams) -> Result<NormalizedQuery> {
    QueryNormalizer::default().normalize(params)
}

/// Reads a single unsigned parameter. An empty value counts as absent.
fn unsigned(params: &QueryParams, name: &str) -> Result<Option<u64>> {
    match params.get(name) {
        None => Ok(None),
        Some(QueryValue::Single(raw)) if raw.is_empty() => Ok(None),
        Some(QueryValue::Single(raw)) => raw
            .parse::<u64>()
            .map(Some)
            .map_err(|_| CriteriaError::query_param(name, raw, "expected an unsigned integer")),
        Some(QueryValue::Multi(values)) => Err(CriteriaError::query_param(
            name,
            &values.join(","),
            "given more than once",
        )),
    }
}

/// Parses `orderBy=height:desc,timestamp`. Repeated `orderBy` parameters are read in order.
fn ordering(params: &QueryParams) -> Result<Ordering> {
    let Some(value) = params.get(ORDER_BY) else {
        return Ok(Ordering::default());
    };

    let mut keys = Vec::new();
    for entry in value.values().iter().flat_map(|v| v.split(',')) {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (property, direction) = match entry.split_once(':') {
            Some((property, direction)) => {
                let direction = direction
                    .trim()
                    .parse::<OrderDirection>()
                    .map_err(|reason| CriteriaError::query_param(ORDER_BY, entry, reason))?;
                (property.trim(), direction)
            }
            None => (entry, OrderDirection::default()),
        };

        if property.is_empty() {
            return Err(CriteriaError::query_param(
                ORDER_BY,
                entry,
                "missing property name",
            ));
        }
        keys.push(OrderBy::new(property, direction));
    }

    Ok(Ordering::from(keys))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, &str)]) -> QueryParams {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_page_derives_offset() {
        let query = normalize_query(&params(&[("page", "3"), ("limit", "20")])).unwrap();
        assert_eq!(query.pagination, Pagination::new(40, 20));
    }

    #[test]
    fn test_defaults() {
        let query = normalize_query(&QueryParams::new()).unwrap();
        assert_eq!(query.pagination, Pagination::new(0, 100));
        assert!(query.ordering.is_empty());
        assert!(query.criteria.is_empty());

        let query = normalize_query(&params(&[("offset", "5")])).unwrap();
        assert_eq!(query.pagination, Pagination::new(5, 100));
    }

    #[test]
    fn test_explicit_offset_beats_page() {
        let query = normalize_query(&params(&[("page", "4"), ("offset", "0"), ("limit", "10")]))
            .unwrap();
        assert_eq!(query.pagination, Pagination::new(0, 10));

        // page is not even parsed once offset is present
        let query = normalize_query(&params(&[("page", "x"), ("offset", "7")])).unwrap();
        assert_eq!(query.pagination, Pagination::new(7, 100));
    }

    #[test]
    fn test_page_without_limit_uses_default_limit() {
        let query = normalize_query(&params(&[("page", "2")])).unwrap();
        assert_eq!(query.pagination, Pagination::new(100, 100));

        let query = QueryNormalizer::new()
            .with_default_limit(NonZeroU64::new(25).unwrap())
            .normalize(&params(&[("page", "2")]))
            .unwrap();
        assert_eq!(query.pagination, Pagination::new(25, 25));
    }

    #[test]
    fn test_invalid_pagination() {
        for pairs in [
            vec![("limit", "0")],
            vec![("page", "0")],
            vec![("offset", "-1")],
            vec![("limit", "ten")],
            vec![("page", "18446744073709551615"), ("limit", "2")],
            vec![("limit", "1"), ("limit", "2")],
        ] {
            let result = normalize_query(&params(&pairs));
            assert!(
                matches!(result, Err(CriteriaError::InvalidQueryParameter { .. })),
                "accepted {pairs:?}"
            );
        }
    }

    #[test]
    fn test_empty_pagination_values_are_absent() {
        let query = normalize_query(&params(&[("limit", ""), ("page", "")])).unwrap();
        assert_eq!(query.pagination, Pagination::default());
    }

    #[test]
    fn test_ordering() {
        let query = normalize_query(&params(&[("orderBy", "height:desc, timestamp,,id:ASC")]))
            .unwrap();
        assert_eq!(
            query.ordering,
            Ordering::from(vec![
                OrderBy::new("height", OrderDirection::Desc),
                OrderBy::new("timestamp", OrderDirection::Asc),
                OrderBy::new("id", OrderDirection::Asc),
            ])
        );

        let repeated = normalize_query(&params(&[("orderBy", "height:desc"), ("orderBy", "id")]))
            .unwrap();
        assert_eq!(repeated.ordering.len(), 2);

        assert!(normalize_query(&params(&[("orderBy", "height:sideways")])).is_err());
        assert!(normalize_query(&params(&[("orderBy", ":desc")])).is_err());
    }

    #[test]
    fn test_reserved_keys_never_reach_criteria() {
        let query = normalize_query(&params(&[
            ("page", "1"),
            ("limit", "10"),
            ("offset", "0"),
            ("orderBy", "height"),
            ("transform", "false"),
            ("height.from", "100"),
            ("asset.foo", "bar"),
        ]))
        .unwrap();

        assert_eq!(
            JsonValue::Object(query.criteria),
            json!({ "height": { "from": "100" }, "asset": { "foo": "bar" } })
        );
    }

    #[test]
    fn test_extra_excluded_keys() {
        let normalizer = QueryNormalizer::new().exclude("callback");
        let query = normalizer
            .normalize(&params(&[("callback", "x"), ("id", "1")]))
            .unwrap();
        assert_eq!(JsonValue::Object(query.criteria), json!({ "id": "1" }));
    }

    #[test]
    fn test_repeated_criteria_keys_become_arrays() {
        let query = normalize_query(&params(&[("id", "a"), ("id", "b")])).unwrap();
        assert_eq!(JsonValue::Object(query.criteria), json!({ "id": ["a", "b"] }));
    }
}
