pub mod core;
pub mod filter;
pub mod search;

pub use crate::core::{amount::Amount, value::Value};
pub use filter::expr::Expression;
pub use search::{OrderBy, OrderDirection, Ordering, Pagination};
