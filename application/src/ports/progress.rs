//! Supervision progress port.
//!
//! [`SupervisorProgress`] is an output port the presentation layer implements
//! to surface supervision activity in real time: warnings, drift reports,
//! and the spinner around long deep-model analyses.
//!
//! All methods have default no-op implementations, so implementers only
//! need to override the callbacks they care about.

use marionette_domain::DriftReport;

/// Progress notifier for supervision activity
pub trait SupervisorProgress: Send + Sync {
    /// The background watch detected context drift
    fn on_drift(&self, _report: &DriftReport) {}

    /// The supervisor decided the agent must be killed
    fn on_agent_kill(&self) {}

    /// A potentially slow model analysis began
    fn on_analysis_started(&self, _label: &str) {}

    /// The analysis finished (success or not)
    fn on_analysis_finished(&self) {}
}

/// No-op implementation for tests and quiet mode
pub struct NoProgress;

impl SupervisorProgress for NoProgress {}
