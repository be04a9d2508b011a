//! Presentation layer for marionette
//!
//! The interactive surfaces: clap CLI definition, rustyline REPL, colored
//! console formatting, and the progress reporter implementing the
//! supervision progress port.

pub mod cli;
pub mod output;
pub mod progress;
pub mod repl;

pub use cli::commands::Cli;
pub use output::console::ConsoleFormatter;
pub use progress::reporter::ConsoleProgress;
pub use repl::SupervisorRepl;
