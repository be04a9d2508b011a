//! Gemini LLM Gateway implementation.
//!
//! Stateless HTTP adapter over the `generateContent` endpoint. The API key
//! travels in the `x-goog-api-key` header; grounding is expressed as the
//! Google Search retrieval tool on the request.

use crate::gemini::types::{
    ApiErrorEnvelope, Content, CountTokensRequest, CountTokensResponse, GenerateContentRequest,
    GenerateContentResponse, GenerationConfig, GoogleSearchRetrieval, SystemInstruction, Tool,
};
use async_trait::async_trait;
use marionette_application::ports::llm_gateway::{GatewayError, GenerateRequest, LlmGateway};
use marionette_domain::{Model, truncate_str};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Gateway for the Gemini REST API
pub struct GeminiGateway {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiGateway {
    pub fn new(api_key: impl Into<String>) -> Result<Self, GatewayError> {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create a gateway against a custom endpoint (for testing)
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| GatewayError::Other(e.to_string()))?;

        Ok(Self {
            http,
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn build_request(request: &GenerateRequest) -> GenerateContentRequest {
        let tools = if request.grounding {
            vec![Tool {
                google_search_retrieval: GoogleSearchRetrieval::default(),
            }]
        } else {
            Vec::new()
        };

        GenerateContentRequest {
            contents: vec![Content::user(&request.prompt)],
            system_instruction: request
                .system_instruction
                .as_deref()
                .map(SystemInstruction::new),
            generation_config: Some(GenerationConfig {
                temperature: request.temperature,
                candidate_count: 1,
            }),
            tools,
        }
    }

    async fn post<B: serde::Serialize>(
        &self,
        url: &str,
        body: &B,
    ) -> Result<reqwest::Response, GatewayError> {
        let response = self
            .http
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GatewayError::Timeout
                } else {
                    GatewayError::Http(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| truncate_str(&body, 500).to_string());
            return Err(GatewayError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl LlmGateway for GeminiGateway {
    async fn generate(
        &self,
        model: &Model,
        request: GenerateRequest,
    ) -> Result<String, GatewayError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);
        let body = Self::build_request(&request);

        debug!(model = %model, grounding = request.grounding, "generateContent request");

        let response = self.post(&url, &body).await?;
        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Http(e.to_string()))?;

        parsed
            .first_candidate_text()
            .ok_or(GatewayError::MissingCandidate)
    }

    async fn count_tokens(&self, model: &Model, text: &str) -> Result<usize, GatewayError> {
        let url = format!("{}/models/{}:countTokens", self.base_url, model);
        let body = CountTokensRequest {
            contents: vec![Content::user(text)],
        };

        match self.post(&url, &body).await {
            Ok(response) => {
                let parsed: CountTokensResponse = response
                    .json()
                    .await
                    .map_err(|e| GatewayError::Http(e.to_string()))?;
                Ok(parsed.total_tokens)
            }
            Err(e) => {
                // Fall back to the rough estimate rather than failing the caller
                warn!(error = %e, "countTokens failed, estimating");
                Ok(text.len() / 4)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grounding_flag_adds_search_tool() {
        let request = GenerateRequest::new("q").with_grounding(true);
        let body = GeminiGateway::build_request(&request);
        assert_eq!(body.tools.len(), 1);

        let plain = GeminiGateway::build_request(&GenerateRequest::new("q"));
        assert!(plain.tools.is_empty());
    }

    #[test]
    fn system_instruction_carried_when_set() {
        let request = GenerateRequest::new("q").with_system_instruction("be terse");
        let body = GeminiGateway::build_request(&request);
        assert!(body.system_instruction.is_some());
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let gateway = GeminiGateway::with_base_url("key", "http://localhost:9999/").unwrap();
        assert_eq!(gateway.base_url, "http://localhost:9999");
    }
}
