use serde_json::Value as JsonValue;
use std::{collections::BTreeMap, slice};

/// Raw value of one query parameter. Repeated keys carry every value in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryValue {
    Single(String),
    Multi(Vec<String>),
}

impl QueryValue {
    pub fn values(&self) -> &[String] {
        match self {
            QueryValue::Single(v) => slice::from_ref(v),
            QueryValue::Multi(v) => v,
        }
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            QueryValue::Single(v) => JsonValue::String(v.clone()),
            QueryValue::Multi(v) => {
                JsonValue::Array(v.iter().cloned().map(JsonValue::String).collect())
            }
        }
    }

    fn push(&mut self, value: String) {
        match self {
            QueryValue::Single(first) => {
                let first = std::mem::take(first);
                *self = QueryValue::Multi(vec![first, value]);
            }
            QueryValue::Multi(values) => values.push(value),
        }
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::Single(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::Single(value)
    }
}

impl From<Vec<String>> for QueryValue {
    fn from(values: Vec<String>) -> Self {
        QueryValue::Multi(values)
    }
}

/// Flat query-string parameters as handed over by a transport layer, in arrival order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    entries: Vec<(String, QueryValue)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key`, replacing any earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<QueryValue>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Adds one occurrence of `key`; a repeated key turns into [`QueryValue::Multi`].
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => existing.push(value),
            None => self.entries.push((key, QueryValue::Single(value))),
        }
    }

    pub fn get(&self, key: &str) -> Option<&QueryValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &QueryValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryParams {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = QueryParams::new();
        for (key, value) in iter {
            params.append(key, value);
        }
        params
    }
}

impl From<BTreeMap<String, QueryValue>> for QueryParams {
    fn from(map: BTreeMap<String, QueryValue>) -> Self {
        Self {
            entries: map.into_iter().collect(),
        }
    }
}
