use criteria_engine::CriteriaError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read the input file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse the criteria as JSON: {0}")]
    CriteriaParse(serde_json::Error),

    #[error("Failed to load the rule table from {path}: {source}")]
    RulesLoad {
        path: String,
        source: serde_json::Error,
    },

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(serde_json::Error),

    #[error("No criteria given, pass --criteria or --criteria-file")]
    MissingCriteria,

    #[error(transparent)]
    Criteria(#[from] CriteriaError),
}
