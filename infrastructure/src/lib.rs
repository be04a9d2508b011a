//! Infrastructure layer for marionette
//!
//! Adapters for the application ports: the Gemini HTTP gateway, the layered
//! TOML/env configuration, the JSONL transcript logger, the filesystem
//! session archive, and the coding-agent process adapters.

pub mod agent;
pub mod config;
pub mod gemini;
pub mod logging;
pub mod session;

pub use agent::{simulated::SimulatedAgent, subprocess::SubprocessAgent};
pub use config::{file_config::FileConfig, loader::{ConfigError, ConfigLoader}};
pub use gemini::gateway::GeminiGateway;
pub use logging::jsonl_logger::JsonlConversationLogger;
pub use session::store::FsSessionArchive;
