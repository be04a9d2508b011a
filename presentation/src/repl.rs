//! REPL for supervised coding sessions.
//!
//! Every line goes through the supervisor's prompt gate before it reaches
//! the agent, and every agent reply comes back through the monitor suite.

use crate::output::console::ConsoleFormatter;
use colored::Colorize;
use marionette_application::{CodingAgent, PromptDecision, Supervisor};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::sync::Arc;

/// Interactive supervised session
pub struct SupervisorRepl {
    supervisor: Arc<Supervisor>,
    agent: Box<dyn CodingAgent>,
    quiet: bool,
}

impl SupervisorRepl {
    pub fn new(supervisor: Arc<Supervisor>, agent: Box<dyn CodingAgent>) -> Self {
        Self {
            supervisor,
            agent,
            quiet: false,
        }
    }

    pub fn with_quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    /// Run the interactive loop until `/exit` or EOF
    pub async fn run(mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        let history_path = dirs::data_dir().map(|p| p.join("marionette").join("history.txt"));
        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            match rl.readline("\nyou> ") {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }

                    let _ = rl.add_history_entry(line);

                    if line.starts_with('/') {
                        if self.handle_command(line).await {
                            break;
                        }
                        continue;
                    }

                    self.run_exchange(&mut rl, line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Use /exit to quit properly");
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    eprintln!("{} {}", "Input error:".red(), e);
                    break;
                }
            }
        }

        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        self.finish().await;
        Ok(())
    }

    fn print_welcome(&self) {
        if self.quiet {
            return;
        }
        println!("Marionette is now watching your coding session");
        println!("Commands:");
        println!("  /status  - Show session status");
        println!("  /stats   - Show detection statistics");
        println!("  /kill    - Kill the agent process");
        println!("  /exit    - Exit marionette");
        println!("{}", "=".repeat(60));
    }

    /// Handle a slash command. Returns true when the REPL should exit.
    async fn handle_command(&mut self, command: &str) -> bool {
        match command.to_lowercase().as_str() {
            "/status" => {
                println!("{}", ConsoleFormatter::status(&self.supervisor.status()));
                false
            }
            "/stats" => {
                println!("{}", ConsoleFormatter::stats(&self.supervisor.status()));
                false
            }
            "/kill" => {
                if self.agent.is_running() {
                    match self.agent.kill().await {
                        Ok(()) => println!("{}", "Agent process killed".red()),
                        Err(e) => eprintln!("{} {}", "Failed to kill agent:".red(), e),
                    }
                } else {
                    println!("No agent process running");
                }
                false
            }
            "/exit" => {
                println!("Shutting down marionette...");
                true
            }
            other => {
                println!("Unknown command: {}", other);
                false
            }
        }
    }

    /// One supervised exchange: screen the prompt, send it, review the reply
    async fn run_exchange(&mut self, rl: &mut DefaultEditor, line: &str) {
        match self.supervisor.screen_user_input(line).await {
            PromptDecision::Rejected {
                feedback,
                suggestions,
            } => {
                println!("{}", ConsoleFormatter::rejection(&feedback, &suggestions));
                match rl.readline("Would you like to rephrase? (y/n): ") {
                    Ok(answer) if answer.trim().eq_ignore_ascii_case("y") => return,
                    Ok(_) => {} // send the prompt as-is
                    Err(_) => return,
                }
            }
            PromptDecision::Approved => {}
        }

        if !self.agent.is_running() {
            println!(
                "{}",
                "No agent running; prompt recorded for supervision only".yellow()
            );
            return;
        }

        let reply = match self.agent.send(line).await {
            Ok(reply) => reply,
            Err(e) => {
                eprintln!("{} {}", "Agent error:".red(), e);
                return;
            }
        };

        println!("\nagent> {}", reply.text);

        let intervention = self
            .supervisor
            .review_agent_output(&reply.text, reply.is_error)
            .await;

        let rendered = ConsoleFormatter::intervention(&intervention);
        if !rendered.is_empty() {
            println!("{}", rendered);
        }

        if intervention.kill_agent {
            if let Err(e) = self.agent.kill().await {
                eprintln!("{} {}", "Failed to kill agent:".red(), e);
            }
        }
    }

    async fn finish(&mut self) {
        if self.agent.is_running() {
            let _ = self.agent.kill().await;
        }
        match self.supervisor.shutdown().await {
            Ok(Some(path)) => println!("Session saved to: {}", path.display()),
            Ok(None) => {}
            Err(e) => eprintln!("{} {}", "Failed to archive session:".red(), e),
        }
    }
}
