//! Validate command - check a query and point at invalid tokens

use crate::{
    QuerybarError,
    config::QuerybarConfig,
    output,
    query::parse_and_validate,
};
use colored::Colorize;

type Result<T> = std::result::Result<T, QuerybarError>;

/// Execute the validate command
///
/// Returns whether the query is valid.
pub fn execute(config: &QuerybarConfig, query: &str, json: bool, quiet: bool) -> Result<bool> {
    let parsed = parse_and_validate(query, &config.configuration());
    let valid = parsed.is_valid();

    if json {
        println!("{}", output::json(&parsed)?);
    } else if valid {
        if !quiet {
            println!("{} {}", "valid:".green().bold(), output::highlight(&parsed));
        }
    } else {
        for line in output::diagnostics(&parsed) {
            println!("{line}");
        }
    }

    Ok(valid)
}
