pub mod amount;
pub mod value;
