//! Context drift detection against the user's original goal.
//!
//! The deep model first distills a goal profile from the user's earliest
//! prompts, then periodically judges how far the agent's recent output has
//! strayed from it. A report is raised only when the judged distance exceeds
//! the configured threshold.

use crate::ports::llm_gateway::{GenerateRequest, LlmGateway, generate_json};
use marionette_domain::{DriftReport, DriftVerdict, GoalProfile, Model, truncate_str};
use serde::Serialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, warn};

/// How many recent agent outputs are compared against the goal
pub const DRIFT_WINDOW: usize = 20;

/// Bytes of each output shown to the model
const ACTION_CLIP: usize = 200;

#[derive(Debug, Clone, Serialize)]
pub struct DriftStats {
    pub drift_events: usize,
    pub has_learned_goal: bool,
}

/// Detects when the agent strays from the user's original goal
pub struct ContextDriftMonitor {
    gateway: Arc<dyn LlmGateway>,
    model: Model,
    threshold: f32,
    initial_goal: Mutex<Option<GoalProfile>>,
    drift_events: AtomicUsize,
}

impl ContextDriftMonitor {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: Model, threshold: f32) -> Self {
        Self {
            gateway,
            model,
            threshold,
            initial_goal: Mutex::new(None),
            drift_events: AtomicUsize::new(0),
        }
    }

    /// Extract the user's core goal from their earliest prompts.
    ///
    /// Called repeatedly while the session is young; each call replaces the
    /// profile with one distilled from the fuller prompt list.
    pub async fn learn_goal(&self, early_prompts: &[String]) {
        if early_prompts.is_empty() {
            return;
        }

        let listing = early_prompts
            .iter()
            .enumerate()
            .map(|(i, p)| format!("{}. {}", i + 1, p))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Analyze these initial user prompts to extract their core goal:\n\n\
             {listing}\n\n\
             What is the user trying to build/achieve? Be concise but capture the essence.\n\n\
             Respond with JSON:\n\
             {{\n\
                 \"goal\": \"concise description of the core goal\",\n\
                 \"key_requirements\": [\"req1\", \"req2\"],\n\
                 \"technical_stack\": \"identified technologies if any\"\n\
             }}"
        );

        match generate_json::<GoalProfile>(
            self.gateway.as_ref(),
            &self.model,
            GenerateRequest::new(prompt),
        )
        .await
        {
            Ok(profile) => {
                debug!(goal = %profile.goal, "learned session goal");
                *self.initial_goal.lock().unwrap() = Some(profile);
            }
            Err(e) => warn!(error = %e, "goal learning failed"),
        }
    }

    pub fn has_learned_goal(&self) -> bool {
        self.initial_goal.lock().unwrap().is_some()
    }

    /// Judge the recent agent outputs against the learned goal.
    ///
    /// Returns `None` when no goal has been learned yet, there is nothing to
    /// compare, or the judged distance stays within the threshold.
    pub async fn check(&self, recent_outputs: &[String]) -> Option<DriftReport> {
        let goal = self.initial_goal.lock().unwrap().clone()?;
        if recent_outputs.is_empty() {
            return None;
        }

        let window_start = recent_outputs.len().saturating_sub(DRIFT_WINDOW);
        let listing = recent_outputs[window_start..]
            .iter()
            .map(|a| format!("- {}", truncate_str(a, ACTION_CLIP)))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Compare the initial goal with recent agent actions:\n\n\
             INITIAL GOAL:\n\
             {}\n\
             Key requirements: {}\n\n\
             RECENT ACTIONS (last {}):\n\
             {listing}\n\n\
             Has the agent drifted from the core goal? Consider:\n\
             - Are recent actions aligned with the goal?\n\
             - Is the agent solving the right problem?\n\
             - Has scope crept significantly?\n\n\
             Respond with JSON:\n\
             {{\n\
                 \"drifted\": true/false,\n\
                 \"distance\": 0.0-1.0,\n\
                 \"current_trajectory\": \"what agent seems to be working on now\",\n\
                 \"recommendation\": \"how to get back on track if drifted\"\n\
             }}",
            goal.goal,
            goal.key_requirements.join(", "),
            DRIFT_WINDOW,
        );

        let verdict = match generate_json::<DriftVerdict>(
            self.gateway.as_ref(),
            &self.model,
            GenerateRequest::new(prompt),
        )
        .await
        {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "drift check failed");
                return None;
            }
        };

        if verdict.distance > self.threshold {
            self.drift_events.fetch_add(1, Ordering::Relaxed);
            Some(DriftReport {
                initial_goal: goal.goal,
                current_trajectory: verdict
                    .current_trajectory
                    .unwrap_or_else(|| "unknown".to_string()),
                distance: verdict.distance,
                recommendation: verdict
                    .recommendation
                    .unwrap_or_else(|| "Refocus on the original goal".to_string()),
            })
        } else {
            None
        }
    }

    pub fn stats(&self) -> DriftStats {
        DriftStats {
            drift_events: self.drift_events.load(Ordering::Relaxed),
            has_learned_goal: self.has_learned_goal(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockGateway;

    fn outputs(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("refactoring module {i}")).collect()
    }

    #[tokio::test]
    async fn no_goal_means_no_drift() {
        let monitor = ContextDriftMonitor::new(
            Arc::new(MockGateway::failing()),
            Model::default_pro(),
            0.7,
        );
        assert!(monitor.check(&outputs(5)).await.is_none());
        assert!(!monitor.stats().has_learned_goal);
    }

    #[tokio::test]
    async fn drift_reported_above_threshold() {
        let monitor = ContextDriftMonitor::new(
            Arc::new(MockGateway::canned()),
            Model::default_pro(),
            0.7,
        );
        monitor
            .learn_goal(&["build a REST API for invoices".to_string()])
            .await;
        assert!(monitor.has_learned_goal());

        // MockGateway judges distance 0.9 for drift checks
        let report = monitor.check(&outputs(3)).await.expect("drift expected");
        assert_eq!(report.initial_goal, "build a REST API for invoices");
        assert!(report.distance > 0.7);
        assert_eq!(monitor.stats().drift_events, 1);
    }

    #[tokio::test]
    async fn drift_within_threshold_is_quiet() {
        let monitor = ContextDriftMonitor::new(
            Arc::new(MockGateway::canned()),
            Model::default_pro(),
            0.95, // above the mock's 0.9 distance
        );
        monitor
            .learn_goal(&["build a REST API for invoices".to_string()])
            .await;
        assert!(monitor.check(&outputs(3)).await.is_none());
        assert_eq!(monitor.stats().drift_events, 0);
    }

    #[tokio::test]
    async fn empty_window_is_quiet() {
        let monitor = ContextDriftMonitor::new(
            Arc::new(MockGateway::canned()),
            Model::default_pro(),
            0.7,
        );
        monitor.learn_goal(&["ship the tool".to_string()]).await;
        assert!(monitor.check(&[]).await.is_none());
    }
}
