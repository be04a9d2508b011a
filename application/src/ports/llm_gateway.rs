//! LLM Gateway port
//!
//! Defines how the application layer talks to the hosted generative model.
//! The Gemini HTTP adapter lives in the infrastructure layer.

use async_trait::async_trait;
use marionette_domain::{Model, parse_json_reply};
use serde::de::DeserializeOwned;
use thiserror::Error;

/// Errors that can occur during gateway operations
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("No candidate in model response")]
    MissingCandidate,

    #[error("Model reply was not the expected JSON shape")]
    InvalidReply { raw: String },

    #[error("Request timed out")]
    Timeout,

    #[error("Gateway error: {0}")]
    Other(String),
}

/// Default sampling temperature for free-form generation
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
/// Lower temperature used for structured JSON output
pub const JSON_TEMPERATURE: f32 = 0.3;

/// A single generation request
///
/// The gateway is stateless: each request carries its own prompt, optional
/// system instruction, temperature, and grounding flag.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    pub temperature: f32,
    /// Ask the model to ground its answer in web search results
    pub grounding: bool,
}

impl GenerateRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            temperature: DEFAULT_TEMPERATURE,
            grounding: false,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_grounding(mut self, grounding: bool) -> Self {
        self.grounding = grounding;
        self
    }
}

/// Gateway for model communication
#[async_trait]
pub trait LlmGateway: Send + Sync {
    /// Generate a text response from the given model
    async fn generate(
        &self,
        model: &Model,
        request: GenerateRequest,
    ) -> Result<String, GatewayError>;

    /// Count tokens in a text.
    ///
    /// The default implementation uses the rough 4-bytes-per-token estimate;
    /// adapters with a real tokenizer endpoint should override it.
    async fn count_tokens(&self, _model: &Model, text: &str) -> Result<usize, GatewayError> {
        Ok(text.len() / 4)
    }
}

/// Generate a structured JSON reply and parse it into `T`.
///
/// Appends the JSON-only suffix to the prompt and lowers the temperature,
/// matching how the monitors expect their verdict contracts to be honored.
/// A reply that fails to parse surfaces as [`GatewayError::InvalidReply`]
/// carrying the raw text for logging.
pub async fn generate_json<T: DeserializeOwned>(
    gateway: &dyn LlmGateway,
    model: &Model,
    request: GenerateRequest,
) -> Result<T, GatewayError> {
    let request = GenerateRequest {
        prompt: format!(
            "{}\n\nRespond ONLY with valid JSON. No markdown, no explanation.",
            request.prompt
        ),
        temperature: JSON_TEMPERATURE,
        ..request
    };

    let reply = gateway.generate(model, request).await?;

    parse_json_reply(&reply).map_err(|e| GatewayError::InvalidReply { raw: e.raw })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockGateway;
    use marionette_domain::LoopVerdict;

    #[test]
    fn request_builder_defaults() {
        let req = GenerateRequest::new("hello");
        assert_eq!(req.temperature, DEFAULT_TEMPERATURE);
        assert!(req.system_instruction.is_none());
        assert!(!req.grounding);
    }

    #[tokio::test]
    async fn generate_json_parses_fenced_reply() {
        let gateway = MockGateway::single("```json\n{\"in_loop\": true, \"confidence\": 80}\n```");
        let verdict: LoopVerdict = generate_json(
            &gateway,
            &Model::default_flash(),
            GenerateRequest::new("anything"),
        )
        .await
        .unwrap();
        assert!(verdict.in_loop);
        assert_eq!(verdict.confidence, 80);
    }

    #[tokio::test]
    async fn generate_json_surfaces_unparseable_reply() {
        let gateway = MockGateway::single("the agent seems stuck");
        let err = generate_json::<LoopVerdict>(
            &gateway,
            &Model::default_flash(),
            GenerateRequest::new("anything"),
        )
        .await
        .unwrap_err();
        match err {
            GatewayError::InvalidReply { raw } => assert_eq!(raw, "the agent seems stuck"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
