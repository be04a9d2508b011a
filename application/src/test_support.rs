//! Shared test doubles for the application layer.
//!
//! [`MockGateway`] mirrors the supervision prompt contracts: it routes on
//! distinctive prompt substrings and returns canned verdict JSON, so monitor
//! and supervisor tests run without any network.

use crate::ports::llm_gateway::{GatewayError, GenerateRequest, LlmGateway};
use async_trait::async_trait;
use marionette_domain::Model;

enum Mode {
    /// First matching (substring, reply) wins; unmatched prompts get "{}"
    Routed(Vec<(&'static str, &'static str)>),
    /// Every call returns this reply
    Single(String),
    /// Every call fails
    Failing,
}

pub struct MockGateway {
    mode: Mode,
}

impl MockGateway {
    /// Canned verdicts for every monitor prompt
    pub fn canned() -> Self {
        Self {
            mode: Mode::Routed(vec![
                (
                    "You are analyzing a coding agent stuck",
                    r#"{"root_cause": "wrong module path assumption", "failed_approaches": ["retrying the same import"], "pivot_strategy": "inspect the filesystem first", "specific_actions": ["list the directory", "fix the path"], "confidence": 85}"#,
                ),
                (
                    "Analyze these recent errors",
                    r#"{"in_loop": true, "pattern": "Repetitive error", "confidence": 85}"#,
                ),
                (
                    "sycophantic behavior",
                    r#"{"sycophantic": true, "reason": "Excessive agreement", "confidence": 90}"#,
                ),
                (
                    "Rate this coding prompt",
                    r#"{"specificity": 3, "completeness": 4, "ambiguity": 8, "feedback": "Too vague", "suggestions": ["Be more specific"]}"#,
                ),
                (
                    "extract their core goal",
                    r#"{"goal": "build a REST API for invoices", "key_requirements": ["auth", "persistence"], "technical_stack": "rust"}"#,
                ),
                (
                    "Compare the initial goal",
                    r#"{"drifted": true, "distance": 0.9, "current_trajectory": "styling the landing page", "recommendation": "Return to the API endpoints"}"#,
                ),
            ]),
        }
    }

    pub fn single(reply: impl Into<String>) -> Self {
        Self {
            mode: Mode::Single(reply.into()),
        }
    }

    pub fn failing() -> Self {
        Self {
            mode: Mode::Failing,
        }
    }
}

#[async_trait]
impl LlmGateway for MockGateway {
    async fn generate(
        &self,
        _model: &Model,
        request: GenerateRequest,
    ) -> Result<String, GatewayError> {
        match &self.mode {
            Mode::Routed(routes) => {
                for (needle, reply) in routes {
                    if request.prompt.contains(needle) {
                        return Ok((*reply).to_string());
                    }
                }
                Ok("{}".to_string())
            }
            Mode::Single(reply) => Ok(reply.clone()),
            Mode::Failing => Err(GatewayError::Other("mock gateway failure".to_string())),
        }
    }
}
