//! Raw TOML configuration data types
//!
//! These structs represent the exact structure of the config file. Every
//! section defaults, so an empty file (or none at all) is valid.

mod agent;
mod intervention;
mod logging;
mod models;
mod monitors;

pub use agent::FileAgentConfig;
pub use intervention::FileInterventionConfig;
pub use logging::FileLoggingConfig;
pub use models::FileModelsConfig;
pub use monitors::FileMonitorsConfig;

use marionette_application::SupervisionParams;
use marionette_domain::{ConfigIssue, ModelPair};
use serde::{Deserialize, Serialize};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    /// Flash/Pro model selection
    pub models: FileModelsConfig,
    /// Monitor thresholds
    pub monitors: FileMonitorsConfig,
    /// Intervention toggles
    pub intervention: FileInterventionConfig,
    /// Transcript and archive locations
    pub logging: FileLoggingConfig,
    /// Supervised agent process
    pub agent: FileAgentConfig,
}

impl FileConfig {
    /// Validate the entire configuration, returning all detected issues
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        issues.extend(self.models.validate());
        issues.extend(self.monitors.validate());
        issues
    }

    /// Convert the monitor and intervention sections into supervision params
    pub fn to_params(&self) -> SupervisionParams {
        SupervisionParams {
            debug_loop_window: self.monitors.debug_loop_window,
            context_drift_threshold: self.monitors.context_drift_threshold,
            sycophancy_threshold: self.monitors.sycophancy_threshold,
            auto_kill_loops: self.intervention.auto_kill_loops,
            force_prompt_quality: self.intervention.force_prompt_quality,
            enable_grounding: self.intervention.enable_grounding,
            ..SupervisionParams::default()
        }
    }

    /// Parse the model section into the supervision pair
    pub fn model_pair(&self) -> ModelPair {
        self.models.to_pair()
    }
}
