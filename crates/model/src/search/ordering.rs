use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

impl FromStr for OrderDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(OrderDirection::Asc),
            "desc" => Ok(OrderDirection::Desc),
            _ => Err(format!("Unknown order direction: {s}")),
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderDirection::Asc => write!(f, "asc"),
            OrderDirection::Desc => write!(f, "desc"),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OrderBy {
    pub property: String,
    pub direction: OrderDirection,
}

impl OrderBy {
    pub fn new(property: impl Into<String>, direction: OrderDirection) -> Self {
        Self {
            property: property.into(),
            direction,
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.property, self.direction)
    }
}

/// Explicit sort keys, most significant first. Empty means the executor picks its own default.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
#[serde(transparent)]
pub struct Ordering(pub Vec<OrderBy>);

impl Ordering {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, OrderBy> {
        self.0.iter()
    }
}

impl From<Vec<OrderBy>> for Ordering {
    fn from(keys: Vec<OrderBy>) -> Self {
        Ordering(keys)
    }
}

impl<'a> IntoIterator for &'a Ordering {
    type Item = &'a OrderBy;
    type IntoIter = std::slice::Iter<'a, OrderBy>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
