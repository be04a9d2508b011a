//! `[monitors]` section: detection thresholds

use marionette_domain::ConfigIssue;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileMonitorsConfig {
    /// Errors in the debug-loop detection window (minimum 2)
    pub debug_loop_window: usize,
    /// Drift distance that raises a report (0..=1)
    pub context_drift_threshold: f32,
    /// Agreement phrases that trigger the sycophancy heuristic
    pub sycophancy_threshold: usize,
}

impl Default for FileMonitorsConfig {
    fn default() -> Self {
        Self {
            debug_loop_window: 5,
            context_drift_threshold: 0.7,
            sycophancy_threshold: 3,
        }
    }
}

impl FileMonitorsConfig {
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();
        if self.debug_loop_window < 2 {
            issues.push(ConfigIssue::error(
                "monitors.debug_loop_window",
                "must be at least 2",
            ));
        }
        if !(0.0..=1.0).contains(&self.context_drift_threshold) {
            issues.push(ConfigIssue::error(
                "monitors.context_drift_threshold",
                "must be between 0 and 1",
            ));
        }
        issues
    }
}
