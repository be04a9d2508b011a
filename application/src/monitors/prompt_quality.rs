//! Prompt quality review.
//!
//! The deep model scores a prompt for specificity, completeness, and
//! ambiguity; approval is recomputed locally from the score thresholds in
//! [`PromptReview::finalize`].

use crate::ports::llm_gateway::{GatewayError, GenerateRequest, LlmGateway, generate_json};
use marionette_domain::{Model, PromptReview};
use std::sync::Arc;

/// Reviews user prompts before they reach the agent
pub struct PromptQualityAnalyzer {
    gateway: Arc<dyn LlmGateway>,
    model: Model,
}

impl PromptQualityAnalyzer {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: Model) -> Self {
        Self { gateway, model }
    }

    pub async fn review(&self, user_prompt: &str) -> Result<PromptReview, GatewayError> {
        let prompt = format!(
            "Rate this coding prompt for quality:\n\n\
             \"{user_prompt}\"\n\n\
             Evaluate:\n\
             1. Specificity (0-10): Are requirements clear and specific?\n\
             2. Completeness (0-10): Is all necessary context provided?\n\
             3. Ambiguity (0-10): How much is left to interpretation? (lower is better)\n\n\
             A good prompt scores 6+ on specificity and completeness, and below 5 on ambiguity.\n\n\
             Respond with JSON:\n\
             {{\n\
                 \"specificity\": 0-10,\n\
                 \"completeness\": 0-10,\n\
                 \"ambiguity\": 0-10,\n\
                 \"feedback\": \"constructive feedback if weak\",\n\
                 \"suggestions\": [\"specific improvement 1\", \"improvement 2\"]\n\
             }}"
        );

        let review: PromptReview = generate_json(
            self.gateway.as_ref(),
            &self.model,
            GenerateRequest::new(prompt),
        )
        .await?;

        Ok(review.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockGateway;

    #[tokio::test]
    async fn vague_prompt_is_rejected() {
        let analyzer =
            PromptQualityAnalyzer::new(Arc::new(MockGateway::canned()), Model::default_pro());

        // MockGateway rates prompts 3/4/8, below both floors
        let review = analyzer.review("make it work").await.unwrap();
        assert!(!review.approved);
        assert_eq!(review.feedback.as_deref(), Some("Too vague"));
        assert_eq!(review.suggestions, vec!["Be more specific".to_string()]);
    }

    #[tokio::test]
    async fn gateway_failure_propagates() {
        let analyzer =
            PromptQualityAnalyzer::new(Arc::new(MockGateway::failing()), Model::default_pro());
        assert!(analyzer.review("anything").await.is_err());
    }
}
