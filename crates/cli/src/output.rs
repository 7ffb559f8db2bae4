use crate::error::CliError;
use criteria_engine::NormalizedQuery;
use model::Expression;
use serde::Serialize;

/// Everything `normalize` produces for one request.
#[derive(Serialize)]
pub struct NormalizeReport<'a> {
    #[serde(flatten)]
    pub query: &'a NormalizedQuery,
    pub expression: &'a Expression,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(value).map_err(CliError::JsonSerialize)?;
    println!("{json}");
    Ok(())
}

pub fn print_text(expr: &Expression) {
    println!("{expr}");
}
