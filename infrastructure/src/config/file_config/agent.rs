//! `[agent]` section: the supervised coding agent process

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileAgentConfig {
    /// Agent executable, e.g. "claude" or "aider"
    pub command: Option<String>,
    /// Arguments passed to the agent
    pub args: Vec<String>,
    /// Use the built-in simulated agent instead of a real process
    pub simulate: bool,
}
