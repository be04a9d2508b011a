//! Intervention engine: guides the agent out of stuck states.
//!
//! Uses the deep model (with optional search grounding) to analyze a
//! confirmed debug loop and propose a pivot, generate alternative
//! approaches, or produce a critical-thinking follow-up prompt.

use crate::ports::llm_gateway::{GatewayError, GenerateRequest, LlmGateway, generate_json};
use marionette_domain::supervision::verdicts::AlternativeList;
use marionette_domain::{
    Alternative, ErrorRecord, Model, PivotAnalysis, TranscriptEntry, truncate_str,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::warn;

/// Transcript entries included in the pivot context
const CONTEXT_ENTRIES: usize = 10;
/// Errors included in the pivot context
const CONTEXT_ERRORS: usize = 5;
/// Bytes of each clipped message
const CLIP: usize = 300;

const PIVOT_SYSTEM_INSTRUCTION: &str = "You are a senior debugging expert analyzing why coding agents get stuck.\n\
You excel at identifying root causes and suggesting pivots that break patterns.\n\
Always think: \"What haven't they tried yet?\"\n\
When using grounding, search for: \"how to solve [specific error]\" or \"alternative approaches to [problem]\".";

/// Produces pivot analyses and alternative approaches for stuck agents
pub struct InterventionEngine {
    gateway: Arc<dyn LlmGateway>,
    model: Model,
    enable_grounding: bool,
    interventions_made: AtomicUsize,
}

impl InterventionEngine {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: Model, enable_grounding: bool) -> Self {
        Self {
            gateway,
            model,
            enable_grounding,
            interventions_made: AtomicUsize::new(0),
        }
    }

    /// Deep analysis of a stuck state, rendered as the intervention report.
    ///
    /// Never fails: when the model reply is unusable, a fallback report
    /// telling the agent to abandon the failing approach is returned instead.
    pub async fn analyze_and_pivot(
        &self,
        transcript: &[TranscriptEntry],
        errors: &[ErrorRecord],
    ) -> String {
        let sequence_no = self.interventions_made.fetch_add(1, Ordering::Relaxed) + 1;

        let context_start = transcript.len().saturating_sub(CONTEXT_ENTRIES);
        let recent_context = transcript[context_start..]
            .iter()
            .map(|entry| {
                format!(
                    "[{}] {}",
                    entry.timestamp.to_rfc3339(),
                    truncate_str(&entry.content, CLIP)
                )
            })
            .collect::<Vec<_>>()
            .join("\n");

        let error_start = errors.len().saturating_sub(CONTEXT_ERRORS);
        let error_context = errors[error_start..]
            .iter()
            .enumerate()
            .map(|(i, err)| format!("Error {}: {}", i + 1, truncate_str(&err.message, CLIP)))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "You are analyzing a coding agent stuck in a debug loop.\n\n\
             RECENT SESSION CONTEXT:\n\
             {recent_context}\n\n\
             ERROR SEQUENCE (repeating pattern):\n\
             {error_context}\n\n\
             Tasks:\n\
             1. Identify the root cause of the loop\n\
             2. Determine what the agent has tried that failed\n\
             3. Suggest a completely different approach (not just tweaks)\n\
             4. If needed, search for similar solved problems\n\n\
             Provide:\n\
             {{\n\
                 \"root_cause\": \"why the agent is stuck\",\n\
                 \"failed_approaches\": [\"what has been tried\"],\n\
                 \"pivot_strategy\": \"fundamentally different approach to try\",\n\
                 \"specific_actions\": [\"step 1\", \"step 2\"],\n\
                 \"confidence\": 0-100\n\
             }}"
        );

        let request = GenerateRequest::new(prompt)
            .with_system_instruction(PIVOT_SYSTEM_INSTRUCTION)
            .with_grounding(self.enable_grounding);

        match generate_json::<PivotAnalysis>(self.gateway.as_ref(), &self.model, request).await {
            Ok(analysis) => analysis.render(sequence_no),
            Err(e) => {
                warn!(error = %e, "pivot analysis failed, using fallback report");
                format!(
                    "MARIONETTE INTERVENTION #{}\n\n\
                     Pivot analysis unavailable ({}).\n\
                     Stop repeating the failing approach and try a fundamentally different one.\n",
                    sequence_no, e
                )
            }
        }
    }

    /// Generate alternative approaches to a problem
    pub async fn suggest_alternatives(
        &self,
        problem: &str,
        current_approach: &str,
    ) -> Result<Vec<Alternative>, GatewayError> {
        let prompt = format!(
            "Given this problem and current approach:\n\n\
             PROBLEM: {problem}\n\n\
             CURRENT APPROACH: {current_approach}\n\n\
             Generate 3 completely different approaches. Think outside the box.\n\n\
             Respond with JSON:\n\
             {{\n\
                 \"alternatives\": [\n\
                     {{\"name\": \"approach name\", \"description\": \"how it works\", \"tradeoffs\": \"pros/cons\"}}\n\
                 ]\n\
             }}"
        );

        let request = GenerateRequest::new(prompt).with_grounding(self.enable_grounding);
        let list: AlternativeList =
            generate_json(self.gateway.as_ref(), &self.model, request).await?;
        Ok(list.alternatives)
    }

    /// Produce a follow-up prompt that forces the agent to self-criticize
    pub async fn force_critical_thinking(
        &self,
        agent_response: &str,
    ) -> Result<String, GatewayError> {
        let prompt = format!(
            "The agent gave this response:\n\n\
             \"{}\"\n\n\
             Generate a follow-up prompt that forces the agent to:\n\
             1. List 3 potential problems with their approach\n\
             2. Consider what could go wrong\n\
             3. Suggest one alternative\n\n\
             Respond with just the prompt text (no JSON).",
            truncate_str(agent_response, 500)
        );

        self.gateway
            .generate(
                &self.model,
                GenerateRequest::new(prompt).with_temperature(0.8),
            )
            .await
    }

    pub fn interventions_made(&self) -> usize {
        self.interventions_made.load(Ordering::Relaxed)
    }
}
