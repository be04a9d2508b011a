//! Verdict value objects returned by the supervision models
//!
//! Each struct mirrors the JSON contract embedded in the corresponding
//! monitor prompt. Fields the model may omit default to "nothing detected",
//! so a sparse reply never fails deserialization.

use serde::{Deserialize, Serialize};

/// Debug-loop detection result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopVerdict {
    pub in_loop: bool,
    pub pattern: Option<String>,
    pub confidence: u8,
}

impl LoopVerdict {
    /// Verdict for "no loop", used when history is too short or a check fails
    pub fn clear() -> Self {
        Self::default()
    }

    /// Verdict for the exact-repetition short circuit, no model consulted
    pub fn identical(window: usize) -> Self {
        Self {
            in_loop: true,
            pattern: Some(format!("Identical errors repeated {} times", window)),
            confidence: 100,
        }
    }
}

/// The user's core goal, extracted from their earliest prompts
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GoalProfile {
    pub goal: String,
    pub key_requirements: Vec<String>,
    pub technical_stack: Option<String>,
}

/// Raw drift judgment from the deep model
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DriftVerdict {
    pub drifted: bool,
    pub distance: f32,
    pub current_trajectory: Option<String>,
    pub recommendation: Option<String>,
}

/// Drift finding joined with the goal it was measured against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    pub initial_goal: String,
    pub current_trajectory: String,
    pub distance: f32,
    pub recommendation: String,
}

/// Sycophancy judgment from the fast model (wire shape)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SycophancyVerdict {
    pub sycophantic: bool,
    pub reason: Option<String>,
    pub confidence: u8,
}

/// A confirmed sycophancy detection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SycophancyFinding {
    pub reason: String,
    pub confidence: u8,
}

/// Scores for prompt specificity and completeness required for approval
pub const PROMPT_SCORE_FLOOR: u8 = 6;
/// Maximum tolerated ambiguity score
pub const PROMPT_AMBIGUITY_CEILING: u8 = 5;

/// Prompt quality review
///
/// `approved` is always recomputed locally from the scores; the model's own
/// claim is ignored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptReview {
    pub specificity: u8,
    pub completeness: u8,
    pub ambiguity: u8,
    pub approved: bool,
    pub feedback: Option<String>,
    pub suggestions: Vec<String>,
}

impl PromptReview {
    /// Recompute approval from the score thresholds
    pub fn finalize(mut self) -> Self {
        self.approved = self.specificity >= PROMPT_SCORE_FLOOR
            && self.completeness >= PROMPT_SCORE_FLOOR
            && self.ambiguity <= PROMPT_AMBIGUITY_CEILING;
        self
    }
}

/// Deep analysis of a stuck agent with a proposed pivot
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PivotAnalysis {
    pub root_cause: Option<String>,
    pub failed_approaches: Vec<String>,
    pub pivot_strategy: Option<String>,
    pub specific_actions: Vec<String>,
    pub confidence: u8,
}

impl PivotAnalysis {
    /// Render the analysis as the intervention report shown to the user
    pub fn render(&self, sequence_no: usize) -> String {
        let mut out = String::new();
        out.push_str(&format!("MARIONETTE INTERVENTION #{}\n\n", sequence_no));
        out.push_str(&format!(
            "ROOT CAUSE: {}\n\n",
            self.root_cause.as_deref().unwrap_or("Unknown")
        ));

        if !self.failed_approaches.is_empty() {
            out.push_str("FAILED APPROACHES:\n");
            for approach in &self.failed_approaches {
                out.push_str(&format!("  x {}\n", approach));
            }
            out.push('\n');
        }

        out.push_str(&format!(
            "PIVOT STRATEGY: {}\n",
            self.pivot_strategy
                .as_deref()
                .unwrap_or("Try a different approach")
        ));

        if !self.specific_actions.is_empty() {
            out.push_str("\nRECOMMENDED ACTIONS:\n");
            for (i, action) in self.specific_actions.iter().enumerate() {
                out.push_str(&format!("  {}. {}\n", i + 1, action));
            }
        }

        out.push_str(&format!("\nConfidence: {}%\n", self.confidence));
        out
    }
}

/// An alternative approach proposed by the intervention engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Alternative {
    pub name: String,
    pub description: String,
    pub tradeoffs: String,
}

/// Wrapper for the alternatives reply
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AlternativeList {
    pub alternatives: Vec<Alternative>,
}

/// The outcome of reviewing one agent output
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Intervention {
    /// The agent should be killed (confirmed debug loop + auto-kill enabled)
    pub kill_agent: bool,
    pub warnings: Vec<String>,
    pub suggestions: Vec<String>,
}

impl Intervention {
    /// An intervention worth surfacing and archiving separately
    pub fn is_noteworthy(&self) -> bool {
        self.kill_agent || !self.warnings.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_loop_verdict_deserializes() {
        let v: LoopVerdict = serde_json::from_str("{\"in_loop\": true}").unwrap();
        assert!(v.in_loop);
        assert_eq!(v.confidence, 0);
        assert!(v.pattern.is_none());
    }

    #[test]
    fn prompt_review_approval_is_recomputed() {
        let review = PromptReview {
            specificity: 8,
            completeness: 7,
            ambiguity: 3,
            approved: false, // model's own claim, ignored
            ..Default::default()
        }
        .finalize();
        assert!(review.approved);

        let vague = PromptReview {
            specificity: 3,
            completeness: 4,
            ambiguity: 8,
            approved: true,
            ..Default::default()
        }
        .finalize();
        assert!(!vague.approved);
    }

    #[test]
    fn prompt_review_boundary_scores() {
        let boundary = PromptReview {
            specificity: 6,
            completeness: 6,
            ambiguity: 5,
            ..Default::default()
        }
        .finalize();
        assert!(boundary.approved);

        let just_under = PromptReview {
            specificity: 6,
            completeness: 5,
            ambiguity: 5,
            ..Default::default()
        }
        .finalize();
        assert!(!just_under.approved);
    }

    #[test]
    fn pivot_render_includes_all_sections() {
        let analysis = PivotAnalysis {
            root_cause: Some("wrong file path assumption".to_string()),
            failed_approaches: vec!["retrying the same path".to_string()],
            pivot_strategy: Some("search for the file first".to_string()),
            specific_actions: vec!["run find".to_string(), "update the path".to_string()],
            confidence: 85,
        };
        let report = analysis.render(3);
        assert!(report.contains("MARIONETTE INTERVENTION #3"));
        assert!(report.contains("ROOT CAUSE: wrong file path assumption"));
        assert!(report.contains("x retrying the same path"));
        assert!(report.contains("1. run find"));
        assert!(report.contains("Confidence: 85%"));
    }

    #[test]
    fn pivot_render_defaults_when_sparse() {
        let report = PivotAnalysis::default().render(1);
        assert!(report.contains("ROOT CAUSE: Unknown"));
        assert!(report.contains("PIVOT STRATEGY: Try a different approach"));
    }

    #[test]
    fn noteworthy_interventions() {
        assert!(!Intervention::default().is_noteworthy());
        let warned = Intervention {
            warnings: vec!["w".to_string()],
            ..Default::default()
        };
        assert!(warned.is_noteworthy());
        let kill = Intervention {
            kill_agent: true,
            ..Default::default()
        };
        assert!(kill.is_noteworthy());
    }
}
