//! CLI command definitions

use clap::Parser;
use std::path::PathBuf;

/// CLI arguments for marionette
#[derive(Parser, Debug)]
#[command(name = "marionette")]
#[command(version, about = "LLM orchestration layer that supervises CLI coding agents")]
#[command(long_about = r#"
Marionette sits between you and a CLI coding agent, watching both sides of
the conversation with two tiers of Gemini models:

- Flash catches debug loops and sycophantic replies in real time
- Pro reviews prompt quality, tracks drift from your original goal, and
  plans pivots when the agent is stuck

Configuration files are loaded from (in priority order):
1. MARIONETTE_* environment variables
2. --config <path>         Explicit config file
3. ./marionette.toml       Project-level config
4. ~/.config/marionette/config.toml   Global config

The Gemini API key is read from GEMINI_API_KEY.

Example:
  marionette --simulate                 # demo session with the built-in agent
  marionette --agent aider              # supervise a real agent
  marionette "add retry logic to the fetcher"   # one supervised exchange
"#)]
pub struct Cli {
    /// A single prompt to run through one supervised exchange
    /// (omit for interactive mode)
    pub prompt: Option<String>,

    /// Agent command to supervise (overrides the [agent] config section)
    #[arg(long, value_name = "COMMAND")]
    pub agent: Option<String>,

    /// Use the built-in simulated agent
    #[arg(long)]
    pub simulate: bool,

    /// Disable the prompt quality gate for this session
    #[arg(long)]
    pub no_prompt_gate: bool,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_one_shot_prompt() {
        let cli = Cli::parse_from(["marionette", "fix the tests"]);
        assert_eq!(cli.prompt.as_deref(), Some("fix the tests"));
        assert!(!cli.simulate);
    }

    #[test]
    fn parses_flags() {
        let cli = Cli::parse_from([
            "marionette",
            "--simulate",
            "--no-prompt-gate",
            "-vv",
            "--agent",
            "aider",
        ]);
        assert!(cli.simulate);
        assert!(cli.no_prompt_gate);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.agent.as_deref(), Some("aider"));
        assert!(cli.prompt.is_none());
    }
}
