//! Parse command - list the tokens of a query

use crate::{
    QuerybarError,
    config::QuerybarConfig,
    output,
    query::parse_and_validate,
};

type Result<T> = std::result::Result<T, QuerybarError>;

/// Execute the parse command
pub fn execute(config: &QuerybarConfig, query: &str, json: bool, quiet: bool) -> Result<()> {
    let parsed = parse_and_validate(query, &config.configuration());

    if json {
        println!("{}", output::json(&parsed)?);
        return Ok(());
    }

    if parsed.is_empty() {
        if !quiet {
            println!("Empty query.");
        }
        return Ok(());
    }

    if !quiet {
        println!("Tokens in {}:", output::highlight(&parsed));
    }
    for line in output::token_lines(&parsed, quiet) {
        println!("{line}");
    }
    Ok(())
}
