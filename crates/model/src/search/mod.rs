pub mod ordering;
pub mod pagination;

pub use ordering::{OrderBy, OrderDirection, Ordering};
pub use pagination::Pagination;
