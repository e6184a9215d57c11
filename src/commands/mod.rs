//! Command implementations
//!
//! Each command is a module with an execute function that takes parsed CLI args
//! and the loaded configuration.

pub mod completions;
pub mod config;
pub mod interactive;
pub mod normalize;
pub mod parse;
pub mod recent;
pub mod toggle;
pub mod validate;

// Re-export execute functions for convenience
pub use completions::execute as completions;
pub use config::execute as config;
pub use interactive::execute as interactive;
pub use normalize::execute as normalize;
pub use parse::execute as parse;
pub use recent::execute as recent;
pub use toggle::execute as toggle;
pub use validate::execute as validate;
