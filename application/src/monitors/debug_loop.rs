//! Debug-loop detection over the agent's recent errors.
//!
//! Exact repetition (shared 200-char prefix across the window) short-circuits
//! without a model call; anything subtler goes to the fast model for a
//! semantic judgment.

use crate::monitors::CONFIDENCE_FLOOR;
use crate::ports::llm_gateway::{GenerateRequest, LlmGateway, generate_json};
use marionette_domain::{ErrorRecord, LoopVerdict, Model, errors_identical, truncate_str};
use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, warn};

/// Bytes of each error shown to the model
const ERROR_CLIP: usize = 300;

#[derive(Debug, Clone, Serialize)]
pub struct DebugLoopStats {
    pub total_detections: usize,
}

/// Detects when the agent is stuck in a repetitive error pattern
pub struct DebugLoopMonitor {
    gateway: Arc<dyn LlmGateway>,
    model: Model,
    window: usize,
    detections: AtomicUsize,
}

impl DebugLoopMonitor {
    pub fn new(gateway: Arc<dyn LlmGateway>, model: Model, window: usize) -> Self {
        Self {
            gateway,
            model,
            window,
            detections: AtomicUsize::new(0),
        }
    }

    /// Check whether the recent errors form a loop.
    ///
    /// Histories shorter than the window are never loops.
    pub async fn check(&self, errors: &[ErrorRecord]) -> LoopVerdict {
        if errors.len() < self.window {
            return LoopVerdict::clear();
        }

        let recent = &errors[errors.len() - self.window..];

        if errors_identical(recent) {
            self.detections.fetch_add(1, Ordering::Relaxed);
            return LoopVerdict::identical(self.window);
        }

        let listing = recent
            .iter()
            .enumerate()
            .map(|(i, e)| format!("{}. {}", i + 1, truncate_str(&e.message, ERROR_CLIP)))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "Analyze these recent errors for repetitive patterns:\n\n\
             {listing}\n\n\
             Are these errors indicating the agent is stuck in a debug loop?\n\
             Consider:\n\
             - Similar error messages\n\
             - Same failed approach repeated\n\
             - No progress between attempts\n\n\
             Respond with JSON:\n\
             {{\n\
                 \"in_loop\": true/false,\n\
                 \"pattern\": \"description of the loop pattern if detected\",\n\
                 \"confidence\": 0-100\n\
             }}"
        );

        match generate_json::<LoopVerdict>(
            self.gateway.as_ref(),
            &self.model,
            GenerateRequest::new(prompt),
        )
        .await
        {
            Ok(verdict) if verdict.in_loop && verdict.confidence > CONFIDENCE_FLOOR => {
                self.detections.fetch_add(1, Ordering::Relaxed);
                LoopVerdict {
                    in_loop: true,
                    pattern: verdict
                        .pattern
                        .or_else(|| Some("Repetitive error pattern".to_string())),
                    confidence: verdict.confidence,
                }
            }
            Ok(verdict) => {
                debug!(
                    in_loop = verdict.in_loop,
                    confidence = verdict.confidence,
                    "loop verdict below confidence floor"
                );
                LoopVerdict::clear()
            }
            Err(e) => {
                warn!(error = %e, "debug loop check failed, assuming no loop");
                LoopVerdict::clear()
            }
        }
    }

    pub fn stats(&self) -> DebugLoopStats {
        DebugLoopStats {
            total_detections: self.detections.load(Ordering::Relaxed),
        }
    }
}
