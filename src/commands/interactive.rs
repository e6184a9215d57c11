//! Interactive command - edit a query in a live search session
//!
//! Each line typed replaces the query and submits it. Lines starting with `:`
//! drive the session directly:
//!
//! - `:toggle KEY VALUE` add or remove a filter
//! - `:delete N` delete the token at index N (its whole filter clause)
//! - `:value N VALUE` replace the value of the filter at token N
//! - `:suggest KEY [PARTIAL]` tag-value suggestions
//! - `:tokens` list the tokens of the current query
//! - `:recent` recent searches of the session's type
//! - `:clear` reset to the empty query
//! - `:quit` blur and exit

use crate::{
    QuerybarError,
    builder::{Action, CallbackSearchState, SearchHandler, SearchQueryBuilder},
    config::QuerybarConfig,
    lookup::CachedTagValues,
    output,
    recent::{RecentSearchManager, SavedSearchType},
};
use colored::Colorize;
use dialoguer::{Input, theme::ColorfulTheme};

type Result<T> = std::result::Result<T, QuerybarError>;

/// Prints each dispatched search
struct PrintHandler {
    quiet: bool,
}

impl SearchHandler for PrintHandler {
    fn on_search(&mut self, query: &str, state: CallbackSearchState<'_>) {
        if self.quiet {
            println!("{query}");
        } else if state.query_is_valid {
            println!("{} {query}", "search:".green().bold());
        } else {
            println!("{} {query} {}", "search:".yellow().bold(), "(invalid)".red());
        }
    }
}

/// A `:`-prefixed session command
#[derive(Debug, Clone, PartialEq, Eq)]
enum SessionCommand {
    Toggle { key: String, value: String },
    Delete(usize),
    Value { index: usize, value: String },
    Suggest { key: String, partial: String },
    Tokens,
    Recent,
    Clear,
    Help,
    Quit,
}

fn parse_index(arg: Option<&str>) -> std::result::Result<usize, String> {
    arg.ok_or_else(|| "missing token index".to_string())?
        .parse()
        .map_err(|_| "token index must be a number".to_string())
}

fn parse_command(line: &str) -> std::result::Result<SessionCommand, String> {
    let mut parts = line.trim_start_matches(':').splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();
    let mut args = rest.splitn(2, char::is_whitespace);

    match name {
        "t" | "toggle" => {
            let key = args.next().filter(|key| !key.is_empty());
            let value = args.next().map(str::trim);
            match (key, value) {
                (Some(key), Some(value)) => Ok(SessionCommand::Toggle {
                    key: key.to_string(),
                    value: value.to_string(),
                }),
                _ => Err("usage: :toggle KEY VALUE".to_string()),
            }
        }
        "d" | "delete" => Ok(SessionCommand::Delete(parse_index(args.next())?)),
        "v" | "value" => {
            let index = parse_index(args.next())?;
            let value = args.next().map(str::trim).unwrap_or_default().to_string();
            Ok(SessionCommand::Value { index, value })
        }
        "s" | "suggest" => match args.next().filter(|key| !key.is_empty()) {
            Some(key) => Ok(SessionCommand::Suggest {
                key: key.to_string(),
                partial: args.next().map(str::trim).unwrap_or_default().to_string(),
            }),
            None => Err("usage: :suggest KEY [PARTIAL]".to_string()),
        },
        "tokens" => Ok(SessionCommand::Tokens),
        "recent" => Ok(SessionCommand::Recent),
        "c" | "clear" => Ok(SessionCommand::Clear),
        "h" | "help" | "?" => Ok(SessionCommand::Help),
        "q" | "quit" => Ok(SessionCommand::Quit),
        other => Err(format!("unknown command ':{other}', try :help")),
    }
}

fn print_help() {
    println!("  Type a query and press enter to search. Commands:");
    println!("    :toggle KEY VALUE     add or remove a filter");
    println!("    :delete N             delete token N");
    println!("    :value N VALUE        replace the value of the filter at token N");
    println!("    :suggest KEY [TEXT]   suggest values for KEY");
    println!("    :tokens               list tokens");
    println!("    :recent               list recent searches");
    println!("    :clear                clear the query");
    println!("    :quit                 leave the session");
}

fn show_state(session: &SearchQueryBuilder) {
    let parsed = session.state().parsed_query();
    if parsed.is_empty() {
        return;
    }
    println!("  {}", output::highlight(parsed));
    for line in output::diagnostics(parsed).into_iter().skip(1) {
        println!("{line}");
    }
}

/// Execute the interactive command
pub fn execute(
    config: &QuerybarConfig,
    initial: Option<&str>,
    search_type: SavedSearchType,
    record_recent: bool,
    quiet: bool,
) -> Result<()> {
    let recent: Option<RecentSearchManager> = if record_recent {
        Some(config.recent_manager()?)
    } else {
        None
    };

    let mut builder = SearchQueryBuilder::builder()
        .configuration(config.configuration())
        .initial_query(initial.unwrap_or_default())
        .handler(PrintHandler { quiet });
    if let Some(manager) = recent.clone() {
        builder = builder.recent_searches(manager, search_type);
    }
    let mut session = builder.build()?;

    let suggestions = CachedTagValues::new(config.tag_value_source());
    let theme = ColorfulTheme::default();

    if !quiet {
        println!("Editing {search_type} search. Type :help for commands.");
    }

    loop {
        if !quiet {
            show_state(&session);
        }

        let line: String = Input::with_theme(&theme)
            .with_prompt("query")
            .with_initial_text(session.state().raw_query())
            .allow_empty(true)
            .interact_text()?;

        if !line.trim_start().starts_with(':') {
            session.update_query(line);
            session.submit();
            continue;
        }

        let command = match parse_command(line.trim()) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{}", message.red());
                continue;
            }
        };

        match command {
            SessionCommand::Toggle { key, value } => session.toggle_filter(key, value),
            SessionCommand::Delete(index) => {
                session.dispatch(Action::DeleteToken(index));
            }
            SessionCommand::Value { index, value } => {
                session.dispatch(Action::UpdateFilterValue { index, value });
            }
            SessionCommand::Suggest { key, partial } => {
                let (ticket, values) = session.lookup_tag_values(&suggestions, &key, &partial);
                match session.accept_lookup(&ticket, values) {
                    Some(values) if values.is_empty() => println!("  no suggestions for {key}"),
                    Some(values) => {
                        for value in values {
                            println!("  {key}:{value}");
                        }
                    }
                    None => {}
                }
            }
            SessionCommand::Tokens => {
                for line in output::token_lines(session.state().parsed_query(), quiet) {
                    println!("{line}");
                }
            }
            SessionCommand::Recent => match &recent {
                Some(manager) => {
                    for search in manager.list(Some(search_type))? {
                        println!("{}", output::recent_line(&search, quiet));
                    }
                }
                None => println!("  recent searches are off"),
            },
            SessionCommand::Clear => {
                session.clear();
            }
            SessionCommand::Help => print_help(),
            SessionCommand::Quit => {
                session.blur();
                break;
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toggle() {
        assert_eq!(
            parse_command(":toggle assigned me"),
            Ok(SessionCommand::Toggle {
                key: "assigned".into(),
                value: "me".into()
            })
        );
        assert!(parse_command(":toggle assigned").is_err());
    }

    #[test]
    fn test_parse_value_keeps_spaces() {
        assert_eq!(
            parse_command(":value 2 New York"),
            Ok(SessionCommand::Value {
                index: 2,
                value: "New York".into()
            })
        );
    }

    #[test]
    fn test_parse_delete_requires_number() {
        assert_eq!(parse_command(":d 4"), Ok(SessionCommand::Delete(4)));
        assert!(parse_command(":delete x").is_err());
        assert!(parse_command(":delete").is_err());
    }

    #[test]
    fn test_parse_suggest_partial_optional() {
        assert_eq!(
            parse_command(":suggest is"),
            Ok(SessionCommand::Suggest {
                key: "is".into(),
                partial: String::new()
            })
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(parse_command(":q"), Ok(SessionCommand::Quit));
        assert!(parse_command(":frobnicate").is_err());
    }
}
