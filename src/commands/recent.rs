//! Recent command - list, remove or clear recent searches

use crate::{
    QuerybarError,
    cli::RecentCommands,
    config::QuerybarConfig,
    output,
};

type Result<T> = std::result::Result<T, QuerybarError>;

/// Execute a recent-search subcommand
pub fn execute(config: &QuerybarConfig, command: &RecentCommands, json: bool, quiet: bool) -> Result<()> {
    let manager = config.recent_manager()?;

    match command {
        RecentCommands::List { search_type } => {
            let searches = manager.list(*search_type)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&searches)?);
            } else if searches.is_empty() {
                if !quiet {
                    println!("No recent searches.");
                }
            } else {
                if !quiet {
                    println!("Recent searches:");
                }
                for search in &searches {
                    println!("{}", output::recent_line(search, quiet));
                }
            }
        }
        RecentCommands::Remove { search_type, query } => {
            let removed = manager.remove(*search_type, query)?;
            if !quiet {
                println!("Removed {} search: {}", removed.search_type, removed.query);
            }
        }
        RecentCommands::Clear { search_type } => {
            let removed = manager.clear(*search_type)?;
            if !quiet {
                println!("Cleared {removed} recent search(es)");
            }
        }
    }
    Ok(())
}
