use crate::error::CliError;
use clap::Subcommand;
use criteria_engine::Criteria;
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};

#[derive(Subcommand)]
pub enum Commands {
    /// Compile a criteria object, or a list of them, into an expression
    Compile {
        #[arg(
            long,
            conflicts_with = "criteria_file",
            help = "Criteria as inline JSON"
        )]
        criteria: Option<String>,

        #[arg(long, help = "Path to a JSON file holding the criteria")]
        criteria_file: Option<PathBuf>,

        #[arg(long, help = "Print the expression as infix text instead of JSON")]
        text: bool,
    },
    /// Split flat query parameters into pagination, ordering and criteria, then compile them
    Normalize {
        #[arg(
            long = "param",
            value_parser = parse_param,
            help = "Query parameter as key=value; repeat for several"
        )]
        params: Vec<(String, String)>,
    },
    /// Print the selected rule table
    Rules,
}

/// Parses `height.from=100` into its key and value. The value may be empty.
pub fn parse_param(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("missing key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}

pub fn read_criteria(inline: Option<String>, file: Option<&Path>) -> Result<Criteria, CliError> {
    let source = match (inline, file) {
        (Some(json), _) => json,
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err(CliError::MissingCriteria),
    };

    let value: JsonValue = serde_json::from_str(&source).map_err(CliError::CriteriaParse)?;
    Ok(Criteria::from_json(value)?)
}
