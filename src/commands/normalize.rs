//! Normalize command - print the canonical form of a query

use crate::{
    QuerybarError,
    config::QuerybarConfig,
    output,
    query::parse_and_validate,
};

type Result<T> = std::result::Result<T, QuerybarError>;

/// Execute the normalize command
pub fn execute(config: &QuerybarConfig, query: &str, json: bool) -> Result<()> {
    let parsed = parse_and_validate(query, &config.configuration());

    if json {
        let report = output::QueryReport::new(&parsed);
        println!("{}", serde_json::to_string_pretty(&serde_json::json!({
            "query": report.query,
            "normalized": report.normalized,
            "valid": report.valid,
        }))?);
    } else {
        println!("{}", parsed.normalized());
    }
    Ok(())
}
