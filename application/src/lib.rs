//! Application layer for marionette
//!
//! Use cases and ports for supervising a CLI coding agent. The central type
//! is [`Supervisor`], which composes the four monitors and the intervention
//! engine over an [`LlmGateway`] port. Adapters for the ports live in the
//! infrastructure layer.

pub mod config;
pub mod interventions;
pub mod monitors;
pub mod ports;
pub mod supervisor;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::params::{ParamsError, SupervisionParams};
pub use interventions::InterventionEngine;
pub use monitors::{
    context_drift::ContextDriftMonitor, debug_loop::DebugLoopMonitor,
    prompt_quality::PromptQualityAnalyzer, sycophancy::SycophancyDetector,
};
pub use ports::{
    coding_agent::{AgentError, AgentReply, CodingAgent},
    conversation_logger::{ConversationEvent, ConversationLogger, NoConversationLogger},
    llm_gateway::{GatewayError, GenerateRequest, LlmGateway, generate_json},
    progress::{NoProgress, SupervisorProgress},
    session_archive::{ArchiveError, NoSessionArchive, SessionArchive},
};
pub use supervisor::{MonitorStatus, PromptDecision, Supervisor, SupervisorStatus};
