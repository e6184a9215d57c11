//! Toggle command - add or remove a `key:value` filter

use crate::{
    QuerybarError,
    builder::{Action, QueryBuilderState},
    config::QuerybarConfig,
    output,
    query::is_filter_key,
};

type Result<T> = std::result::Result<T, QuerybarError>;

/// Execute the toggle command
pub fn execute(
    config: &QuerybarConfig,
    query: &str,
    key: &str,
    value: &str,
    json: bool,
) -> Result<()> {
    if key.is_empty() {
        return Err(QuerybarError::InvalidInput("Filter key cannot be empty".into()));
    }
    if !is_filter_key(key) {
        return Err(QuerybarError::InvalidInput(format!(
            "'{key}' is not a valid filter key"
        )));
    }

    let configuration = config.configuration();
    let state = QueryBuilderState::new(query, &configuration).reduce(
        Action::ToggleFilter {
            key: key.to_string(),
            value: value.to_string(),
        },
        &configuration,
    );

    if json {
        println!("{}", output::json(state.parsed_query())?);
    } else {
        println!("{}", state.raw_query());
    }
    Ok(())
}
