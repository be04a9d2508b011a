//! CLI entrypoint for marionette
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use anyhow::{Result, bail};
use clap::Parser;
use marionette_application::{CodingAgent, PromptDecision, Supervisor};
use marionette_infrastructure::{
    ConfigLoader, FileConfig, FsSessionArchive, GeminiGateway, JsonlConversationLogger,
    SimulatedAgent, SubprocessAgent,
};
use marionette_presentation::{Cli, ConsoleFormatter, ConsoleProgress, SupervisorRepl};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.show_config {
        ConfigLoader::print_config_sources();
        return Ok(());
    }

    // Load configuration before logging so the file layer knows the log dir
    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref())?
    };

    let issues = config.validate();
    for issue in &issues {
        eprintln!("config: {}: {}", issue.field, issue.message);
    }
    if issues.iter().any(|i| i.is_error()) {
        bail!("Configuration is invalid, aborting");
    }

    let log_dir = PathBuf::from(&config.logging.log_dir);
    std::fs::create_dir_all(&log_dir).ok();

    // Initialize logging based on verbosity level; operation logs also go
    // to a file in the log directory
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    let file_appender = tracing_appender::rolling::never(&log_dir, "marionette.log");
    let (file_writer, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .init();

    info!("Starting marionette");

    let mut params = config.to_params();
    if cli.no_prompt_gate {
        params.force_prompt_quality = false;
    }

    // === Dependency Injection ===
    let api_key = ConfigLoader::api_key()?;
    let gateway = Arc::new(GeminiGateway::new(api_key)?);

    let supervisor = Supervisor::new(gateway, config.model_pair(), params)?;
    let session_id = supervisor.session_id().to_string();

    let mut supervisor = supervisor
        .with_progress(Arc::new(ConsoleProgress::new().quiet(cli.quiet)));

    if config.logging.save_session_logs {
        let transcript = log_dir.join(format!("marionette_{}.jsonl", session_id));
        if let Some(logger) = JsonlConversationLogger::new(&transcript) {
            supervisor = supervisor.with_conversation_logger(Arc::new(logger));
        }
        supervisor = supervisor.with_session_archive(Arc::new(FsSessionArchive::new(&log_dir)));
    }

    let supervisor = Arc::new(supervisor);
    let agent = build_agent(&cli, &config).await?;

    if !cli.quiet {
        println!("{}", ConsoleFormatter::banner());
        println!("Session ID: {}", session_id);
    }

    supervisor.start();

    match cli.prompt {
        Some(prompt) => run_one_shot(&supervisor, agent, &prompt).await,
        None => {
            SupervisorRepl::new(Arc::clone(&supervisor), agent)
                .with_quiet(cli.quiet)
                .run()
                .await?;
            Ok(())
        }
    }
}

/// Pick the agent adapter: explicit flag, then config, then the simulator
async fn build_agent(cli: &Cli, config: &FileConfig) -> Result<Box<dyn CodingAgent>> {
    if cli.simulate || config.agent.simulate {
        info!("using the simulated agent");
        return Ok(Box::new(SimulatedAgent::new()));
    }

    let command = cli.agent.clone().or_else(|| config.agent.command.clone());
    match command {
        Some(command) => {
            let agent = SubprocessAgent::spawn(&command, &config.agent.args).await?;
            Ok(Box::new(agent))
        }
        None => {
            eprintln!("No agent configured (--agent or [agent] in config); using the simulator");
            Ok(Box::new(SimulatedAgent::new()))
        }
    }
}

/// One supervised exchange: screen, send, review, shut down
async fn run_one_shot(
    supervisor: &Arc<Supervisor>,
    mut agent: Box<dyn CodingAgent>,
    prompt: &str,
) -> Result<()> {
    if let PromptDecision::Rejected {
        feedback,
        suggestions,
    } = supervisor.screen_user_input(prompt).await
    {
        println!("{}", ConsoleFormatter::rejection(&feedback, &suggestions));
        supervisor.shutdown().await?;
        bail!("Prompt rejected by the quality gate");
    }

    let reply = agent.send(prompt).await?;
    println!("agent> {}", reply.text);

    let intervention = supervisor
        .review_agent_output(&reply.text, reply.is_error)
        .await;
    let rendered = ConsoleFormatter::intervention(&intervention);
    if !rendered.is_empty() {
        println!("{}", rendered);
    }
    if intervention.kill_agent {
        agent.kill().await?;
    }

    if let Some(path) = supervisor.shutdown().await? {
        println!("Session saved to: {}", path.display());
    }
    Ok(())
}
