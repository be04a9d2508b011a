//! `[intervention]` section: response toggles

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileInterventionConfig {
    /// Kill the agent when a debug loop is confirmed
    pub auto_kill_loops: bool,
    /// Gate user prompts on a quality review
    pub force_prompt_quality: bool,
    /// Ground pivot analyses in web search
    pub enable_grounding: bool,
}

impl Default for FileInterventionConfig {
    fn default() -> Self {
        Self {
            auto_kill_loops: true,
            force_prompt_quality: true,
            enable_grounding: true,
        }
    }
}
