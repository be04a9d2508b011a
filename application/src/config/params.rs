//! Supervision parameters: thresholds and toggles for the monitor suite.
//!
//! These are application-layer knobs, not domain policy. The infrastructure
//! config loader produces a [`SupervisionParams`] from the TOML/env sources.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Invalid supervision parameters
#[derive(Error, Debug)]
pub enum ParamsError {
    #[error("debug_loop_window must be at least 2 (got {0})")]
    WindowTooSmall(usize),

    #[error("context_drift_threshold must be between 0 and 1 (got {0})")]
    ThresholdOutOfRange(f32),
}

/// Tunable parameters for a supervision session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupervisionParams {
    /// How many recent errors form the debug-loop detection window
    pub debug_loop_window: usize,
    /// Drift distance above which a drift report is raised (0..=1)
    pub context_drift_threshold: f32,
    /// Agreement-phrase count that triggers the sycophancy heuristic
    pub sycophancy_threshold: usize,
    /// Kill the agent when a debug loop is confirmed
    pub auto_kill_loops: bool,
    /// Gate user prompts on a quality review before they reach the agent
    pub force_prompt_quality: bool,
    /// Allow the deep model to ground pivot analyses in web search
    pub enable_grounding: bool,
    /// Interval between background drift checks
    pub drift_check_interval: Duration,
    /// How many of the earliest prompts feed goal learning
    pub goal_learning_prompts: usize,
}

impl Default for SupervisionParams {
    fn default() -> Self {
        Self {
            debug_loop_window: 5,
            context_drift_threshold: 0.7,
            sycophancy_threshold: 3,
            auto_kill_loops: true,
            force_prompt_quality: true,
            enable_grounding: true,
            drift_check_interval: Duration::from_secs(10),
            goal_learning_prompts: 5,
        }
    }
}

impl SupervisionParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        if self.debug_loop_window < 2 {
            return Err(ParamsError::WindowTooSmall(self.debug_loop_window));
        }
        if !(0.0..=1.0).contains(&self.context_drift_threshold) {
            return Err(ParamsError::ThresholdOutOfRange(
                self.context_drift_threshold,
            ));
        }
        Ok(())
    }

    // ==================== Builder Methods ====================

    pub fn with_debug_loop_window(mut self, window: usize) -> Self {
        self.debug_loop_window = window;
        self
    }

    pub fn with_drift_threshold(mut self, threshold: f32) -> Self {
        self.context_drift_threshold = threshold;
        self
    }

    pub fn with_auto_kill_loops(mut self, enabled: bool) -> Self {
        self.auto_kill_loops = enabled;
        self
    }

    pub fn with_prompt_quality(mut self, enabled: bool) -> Self {
        self.force_prompt_quality = enabled;
        self
    }

    pub fn with_grounding(mut self, enabled: bool) -> Self {
        self.enable_grounding = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SupervisionParams::default().validate().is_ok());
    }

    #[test]
    fn rejects_tiny_window() {
        let params = SupervisionParams::default().with_debug_loop_window(1);
        assert!(matches!(
            params.validate(),
            Err(ParamsError::WindowTooSmall(1))
        ));
    }

    #[test]
    fn rejects_out_of_range_threshold() {
        let params = SupervisionParams::default().with_drift_threshold(1.5);
        assert!(matches!(
            params.validate(),
            Err(ParamsError::ThresholdOutOfRange(_))
        ));
    }
}
