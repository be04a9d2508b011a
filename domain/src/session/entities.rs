//! Transcript and session archive entities

use crate::supervision::verdicts::Intervention;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a transcript entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Speaker {
    User,
    Agent,
}

/// One utterance in the supervised conversation (Entity)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub speaker: Speaker,
    pub content: String,
    /// Set when an agent reply looks like a failure
    pub is_error: bool,
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            content: content.into(),
            is_error: false,
            timestamp: Utc::now(),
        }
    }

    pub fn agent(content: impl Into<String>, is_error: bool) -> Self {
        Self {
            speaker: Speaker::Agent,
            content: content.into(),
            is_error,
            timestamp: Utc::now(),
        }
    }
}

/// One agent error, tracked for debug-loop detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorRecord {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One logged exchange together with whatever intervention it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interaction {
    pub timestamp: DateTime<Utc>,
    pub user_input: Option<TranscriptEntry>,
    pub agent_output: Option<TranscriptEntry>,
    pub intervention: Intervention,
}

/// Full session archive written at shutdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionRecord {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
    pub total_interactions: usize,
    pub total_interventions: usize,
    pub interactions: Vec<Interaction>,
    /// The subset of interactions that carried warnings or a kill
    pub interventions: Vec<Interaction>,
}

impl SessionRecord {
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.session_id.clone(),
            started_at: self.started_at,
            interactions: self.total_interactions,
            interventions: self.total_interventions,
        }
    }
}

/// Compact session statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub started_at: DateTime<Utc>,
    pub interactions: usize,
    pub interventions: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_constructors_set_speaker() {
        let u = TranscriptEntry::user("add a login page");
        assert_eq!(u.speaker, Speaker::User);
        assert!(!u.is_error);

        let a = TranscriptEntry::agent("Error: file not found", true);
        assert_eq!(a.speaker, Speaker::Agent);
        assert!(a.is_error);
    }

    #[test]
    fn record_summary_mirrors_totals() {
        let now = Utc::now();
        let record = SessionRecord {
            session_id: "ab12cd34".to_string(),
            started_at: now,
            ended_at: now,
            total_interactions: 7,
            total_interventions: 2,
            interactions: Vec::new(),
            interventions: Vec::new(),
        };
        let summary = record.summary();
        assert_eq!(summary.session_id, "ab12cd34");
        assert_eq!(summary.interactions, 7);
        assert_eq!(summary.interventions, 2);
    }
}
