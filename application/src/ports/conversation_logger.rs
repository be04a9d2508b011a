//! Port for structured transcript logging.
//!
//! Supervision emits a stream of conversation events (user inputs, agent
//! outputs, rejections, interventions, drift reports). `tracing` carries the
//! human-readable diagnostics; this port captures the machine-readable
//! transcript, one record per event (JSONL in the default adapter).

use serde_json::Value;

/// Well-known event type identifiers
pub mod event {
    pub const SESSION_STARTED: &str = "session_started";
    pub const USER_INPUT: &str = "user_input";
    pub const AGENT_OUTPUT: &str = "agent_output";
    pub const PROMPT_REJECTED: &str = "prompt_rejected";
    pub const INTERVENTION: &str = "intervention";
    pub const DRIFT_REPORT: &str = "drift_report";
    pub const SESSION_SAVED: &str = "session_saved";
}

/// A structured transcript event
pub struct ConversationEvent {
    /// Event type identifier, one of the [`event`] constants
    pub event_type: &'static str,
    /// JSON payload with event-specific data
    pub payload: Value,
}

impl ConversationEvent {
    pub fn new(event_type: &'static str, payload: Value) -> Self {
        Self {
            event_type,
            payload,
        }
    }
}

/// Port for recording transcript events.
///
/// `log` is intentionally synchronous and non-fallible: a logging failure
/// must never disturb supervision, so adapters swallow their own errors.
pub trait ConversationLogger: Send + Sync {
    fn log(&self, event: ConversationEvent);
}

/// No-op implementation for tests and when transcript logging is disabled
pub struct NoConversationLogger;

impl ConversationLogger for NoConversationLogger {
    fn log(&self, _event: ConversationEvent) {}
}
