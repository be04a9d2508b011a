//! Port for the supervised coding agent process.
//!
//! Marionette sits between the user and a CLI coding agent. This port is the
//! agent side of that seam: send a prompt, receive a reply, kill the process
//! when a debug loop is confirmed. Adapters: a subprocess agent speaking a
//! line protocol over stdio, and a simulated agent for demos.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the supervised agent
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent command not found: {0}")]
    CommandNotFound(String),

    #[error("Failed to spawn agent: {0}")]
    Spawn(String),

    #[error("Agent is not running")]
    NotRunning,

    #[error("Agent I/O error: {0}")]
    Io(String),
}

/// One reply from the agent
#[derive(Debug, Clone)]
pub struct AgentReply {
    pub text: String,
    /// The adapter judged this reply to be a failure report
    pub is_error: bool,
}

/// An attached coding agent
#[async_trait]
pub trait CodingAgent: Send {
    /// Send a prompt and wait for the agent's reply
    async fn send(&mut self, prompt: &str) -> Result<AgentReply, AgentError>;

    /// Terminate the agent process
    async fn kill(&mut self) -> Result<(), AgentError>;

    fn is_running(&self) -> bool;
}
