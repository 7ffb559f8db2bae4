use crate::{commands::Commands, error::CliError};
use clap::Parser;
use criteria_engine::{CriteriaCompiler, EntityType, FieldRules, QueryNormalizer, QueryParams};
use std::{
    num::NonZeroU64,
    path::{Path, PathBuf},
};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

const ENV_RULES: &str = "LEDGER_FILTER_RULES";
const ENV_DEFAULT_LIMIT: &str = "LEDGER_FILTER_DEFAULT_LIMIT";

#[derive(Parser)]
#[command(
    name = "ledger-filter",
    version,
    about = "Compile ledger listing criteria into filter expressions"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Built-in rule table: block, transaction or wallet
    #[arg(long, global = true, default_value = "block")]
    entity: EntityType,

    /// JSON rule table file; takes precedence over --entity
    #[arg(long, global = true, env = ENV_RULES)]
    rules: Option<PathBuf>,

    /// Page size used when a query carries no limit
    #[arg(long, global = true, env = ENV_DEFAULT_LIMIT)]
    default_limit: Option<NonZeroU64>,
}

fn main() -> Result<(), CliError> {
    // Logs go to stderr so stdout stays machine-readable
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let rules = load_rules(cli.entity, cli.rules.as_deref())?;

    match cli.command {
        Commands::Compile {
            criteria,
            criteria_file,
            text,
        } => {
            let criteria = commands::read_criteria(criteria, criteria_file.as_deref())?;
            let expr = CriteriaCompiler::new(&rules).compile(&criteria)?;

            if text {
                output::print_text(&expr);
            } else {
                output::print_json(&expr)?;
            }
        }
        Commands::Normalize { params } => {
            let normalizer = normalizer(cli.default_limit);
            let params: QueryParams = params.into_iter().collect();
            debug!(count = params.len(), "normalizing query parameters");

            let query = normalizer.normalize(&params)?;
            let expression = query.compile(&rules)?;
            output::print_json(&output::NormalizeReport {
                query: &query,
                expression: &expression,
            })?;
        }
        Commands::Rules => output::print_json(&rules)?,
    }

    Ok(())
}

fn load_rules(entity: EntityType, path: Option<&Path>) -> Result<FieldRules, CliError> {
    let Some(path) = path else {
        return Ok(entity.rules().clone());
    };

    let source = std::fs::read_to_string(path)?;
    let rules: FieldRules = serde_json::from_str(&source).map_err(|source| CliError::RulesLoad {
        path: path.display().to_string(),
        source,
    })?;

    info!(
        entity = rules.entity(),
        fields = rules.fields().len(),
        "Loaded rule table from {}",
        path.display()
    );
    Ok(rules)
}

fn normalizer(default_limit: Option<NonZeroU64>) -> QueryNormalizer {
    match default_limit {
        Some(limit) => QueryNormalizer::new().with_default_limit(limit),
        None => QueryNormalizer::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "ledger-filter",
            "normalize",
            "--param",
            "page=2",
            "--param",
            "height.from=10",
            "--entity",
            "wallet",
            "--default-limit",
            "25",
        ])
        .unwrap();

        assert_eq!(cli.entity, EntityType::Wallet);
        assert_eq!(cli.default_limit, NonZeroU64::new(25));
        let Commands::Normalize { params } = cli.command else {
            panic!("expected the normalize command");
        };
        assert_eq!(
            params,
            [
                ("page".to_string(), "2".to_string()),
                ("height.from".to_string(), "10".to_string())
            ]
        );
    }

    #[test]
    fn test_entity_is_validated() {
        assert!(Cli::try_parse_from(["ledger-filter", "rules", "--entity", "round"]).is_err());
        assert!(Cli::try_parse_from(["ledger-filter", "rules", "--default-limit", "0"]).is_err());
    }

    #[test]
    fn test_compile_sources_conflict() {
        let result = Cli::try_parse_from([
            "ledger-filter",
            "compile",
            "--criteria",
            "{}",
            "--criteria-file",
            "c.json",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_load_builtin_rules() {
        let rules = load_rules(EntityType::Transaction, None).unwrap();
        assert_eq!(rules.entity(), "transaction");
    }

    #[test]
    fn test_normalizer_default_limit() {
        assert_eq!(normalizer(None).default_limit(), 100);
        assert_eq!(normalizer(NonZeroU64::new(7)).default_limit(), 7);
    }
}
