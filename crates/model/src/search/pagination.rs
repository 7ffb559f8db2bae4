use serde::{Deserialize, Serialize};

/// Window of a listing: skip `offset` rows, then return at most `limit`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Pagination {
    pub const DEFAULT_LIMIT: u64 = 100;

    pub fn new(offset: u64, limit: u64) -> Self {
        Self { offset, limit }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(0, Self::DEFAULT_LIMIT)
    }
}
