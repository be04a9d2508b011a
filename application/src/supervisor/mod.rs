//! The supervision use case.
//!
//! [`Supervisor`] is the orchestrating object of a session: it owns the
//! bounded conversation histories, routes user prompts through the quality
//! gate, reviews agent output with the monitor suite, runs the background
//! drift watch, and archives the session at shutdown.

use crate::config::params::{ParamsError, SupervisionParams};
use crate::interventions::InterventionEngine;
use crate::monitors::context_drift::{ContextDriftMonitor, DriftStats};
use crate::monitors::debug_loop::{DebugLoopMonitor, DebugLoopStats};
use crate::monitors::prompt_quality::PromptQualityAnalyzer;
use crate::monitors::sycophancy::{SycophancyDetector, SycophancyStats};
use crate::ports::conversation_logger::{
    ConversationEvent, ConversationLogger, NoConversationLogger, event,
};
use crate::ports::llm_gateway::LlmGateway;
use crate::ports::progress::{NoProgress, SupervisorProgress};
use crate::ports::session_archive::{ArchiveError, NoSessionArchive, SessionArchive};
use chrono::{DateTime, Utc};
use marionette_domain::{
    ErrorRecord, Interaction, Intervention, ModelPair, SessionRecord, TranscriptEntry,
};
use serde::Serialize;
use serde_json::json;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// History bounds, oldest entries evicted first
const MAX_USER_INPUTS: usize = 100;
const MAX_AGENT_OUTPUTS: usize = 100;
const MAX_ERRORS: usize = 50;

/// Outcome of screening one user prompt
#[derive(Debug, Clone)]
pub enum PromptDecision {
    Approved,
    Rejected {
        feedback: String,
        suggestions: Vec<String>,
    },
}

impl PromptDecision {
    pub fn is_approved(&self) -> bool {
        matches!(self, PromptDecision::Approved)
    }
}

/// Per-monitor detection counters
#[derive(Debug, Clone, Serialize)]
pub struct MonitorStatus {
    pub debug_loops: DebugLoopStats,
    pub context_drift: DriftStats,
    pub sycophancy: SycophancyStats,
    pub interventions_made: usize,
}

/// Snapshot of the running session
#[derive(Debug, Clone, Serialize)]
pub struct SupervisorStatus {
    pub session_id: String,
    pub user_inputs: usize,
    pub agent_outputs: usize,
    pub errors_tracked: usize,
    pub monitors: MonitorStatus,
}

/// In-memory session state behind one lock.
///
/// Guard discipline: never held across an await. Callers snapshot what a
/// model check needs, drop the guard, then await.
struct SessionLog {
    user_inputs: VecDeque<TranscriptEntry>,
    agent_outputs: VecDeque<TranscriptEntry>,
    errors: VecDeque<ErrorRecord>,
    interactions: Vec<Interaction>,
    interventions: Vec<Interaction>,
}

impl SessionLog {
    fn new() -> Self {
        Self {
            user_inputs: VecDeque::new(),
            agent_outputs: VecDeque::new(),
            errors: VecDeque::new(),
            interactions: Vec::new(),
            interventions: Vec::new(),
        }
    }

    fn push_user(&mut self, entry: TranscriptEntry) {
        if self.user_inputs.len() == MAX_USER_INPUTS {
            self.user_inputs.pop_front();
        }
        self.user_inputs.push_back(entry);
    }

    fn push_agent(&mut self, entry: TranscriptEntry) {
        if self.agent_outputs.len() == MAX_AGENT_OUTPUTS {
            self.agent_outputs.pop_front();
        }
        self.agent_outputs.push_back(entry);
    }

    fn push_error(&mut self, record: ErrorRecord) {
        if self.errors.len() == MAX_ERRORS {
            self.errors.pop_front();
        }
        self.errors.push_back(record);
    }
}

/// Orchestrator that watches the user and the coding agent
pub struct Supervisor {
    params: SupervisionParams,
    debug_loop: DebugLoopMonitor,
    drift: ContextDriftMonitor,
    sycophancy: SycophancyDetector,
    prompt_quality: PromptQualityAnalyzer,
    engine: InterventionEngine,
    logger: Arc<dyn ConversationLogger>,
    archive: Arc<dyn SessionArchive>,
    progress: Arc<dyn SupervisorProgress>,
    session_id: String,
    started_at: DateTime<Utc>,
    state: Mutex<SessionLog>,
    watch: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    saved: Mutex<Option<Option<PathBuf>>>,
}

impl Supervisor {
    /// Wire the monitor suite over the gateway.
    ///
    /// Flash drives the reflex monitors (debug loops, sycophancy); Pro
    /// drives goal analysis, drift, prompt review, and pivots.
    pub fn new(
        gateway: Arc<dyn LlmGateway>,
        models: ModelPair,
        params: SupervisionParams,
    ) -> Result<Self, ParamsError> {
        params.validate()?;

        let session_id = short_session_id();

        Ok(Self {
            debug_loop: DebugLoopMonitor::new(
                Arc::clone(&gateway),
                models.flash.clone(),
                params.debug_loop_window,
            ),
            drift: ContextDriftMonitor::new(
                Arc::clone(&gateway),
                models.pro.clone(),
                params.context_drift_threshold,
            ),
            sycophancy: SycophancyDetector::new(
                Arc::clone(&gateway),
                models.flash.clone(),
                params.sycophancy_threshold,
            ),
            prompt_quality: PromptQualityAnalyzer::new(Arc::clone(&gateway), models.pro.clone()),
            engine: InterventionEngine::new(gateway, models.pro, params.enable_grounding),
            logger: Arc::new(NoConversationLogger),
            archive: Arc::new(NoSessionArchive),
            progress: Arc::new(NoProgress),
            params,
            session_id,
            started_at: Utc::now(),
            state: Mutex::new(SessionLog::new()),
            watch: Mutex::new(None),
            cancel: CancellationToken::new(),
            saved: Mutex::new(None),
        })
    }

    pub fn with_conversation_logger(mut self, logger: Arc<dyn ConversationLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_session_archive(mut self, archive: Arc<dyn SessionArchive>) -> Self {
        self.archive = archive;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn SupervisorProgress>) -> Self {
        self.progress = progress;
        self
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Start the session: log the opening event and spawn the drift watch
    pub fn start(self: &Arc<Self>) {
        info!(session_id = %self.session_id, "supervision session started");
        self.logger.log(ConversationEvent::new(
            event::SESSION_STARTED,
            json!({ "session_id": self.session_id }),
        ));

        let supervisor = Arc::clone(self);
        let token = self.cancel.clone();
        let period = self.params.drift_check_interval;
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval fires immediately; the gate below absorbs the first tick
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => supervisor.drift_tick().await,
                }
            }
        });
        *self.watch.lock().unwrap() = Some(handle);
    }

    /// Record a user prompt and run it through the quality gate.
    ///
    /// The prompt is recorded whether or not it is approved; rejected
    /// prompts do not feed goal learning.
    pub async fn screen_user_input(&self, input: &str) -> PromptDecision {
        let early_prompts = {
            let mut log = self.state.lock().unwrap();
            log.push_user(TranscriptEntry::user(input));
            if log.user_inputs.len() <= self.params.goal_learning_prompts {
                log.user_inputs
                    .iter()
                    .map(|e| e.content.clone())
                    .collect::<Vec<_>>()
            } else {
                Vec::new()
            }
        };

        self.logger.log(ConversationEvent::new(
            event::USER_INPUT,
            json!({ "content": input }),
        ));

        if self.params.force_prompt_quality {
            self.progress.on_analysis_started("reviewing prompt quality");
            let review = self.prompt_quality.review(input).await;
            self.progress.on_analysis_finished();

            match review {
                Ok(review) if !review.approved => {
                    let feedback = review
                        .feedback
                        .unwrap_or_else(|| "Prompt needs more detail".to_string());
                    self.logger.log(ConversationEvent::new(
                        event::PROMPT_REJECTED,
                        json!({ "feedback": &feedback, "suggestions": &review.suggestions }),
                    ));
                    return PromptDecision::Rejected {
                        feedback,
                        suggestions: review.suggestions,
                    };
                }
                Ok(_) => {}
                Err(e) => {
                    // Fail open: an unreachable reviewer must not block the user
                    warn!(error = %e, "prompt quality check failed, letting prompt through");
                }
            }
        }

        if !early_prompts.is_empty() {
            self.drift.learn_goal(&early_prompts).await;
        }

        PromptDecision::Approved
    }

    /// Record an agent output and run the monitor suite over it
    pub async fn review_agent_output(&self, output: &str, is_error: bool) -> Intervention {
        let entry = TranscriptEntry::agent(output, is_error);
        {
            let mut log = self.state.lock().unwrap();
            log.push_agent(entry.clone());
            if is_error {
                log.push_error(ErrorRecord::new(output));
            }
        }

        self.logger.log(ConversationEvent::new(
            event::AGENT_OUTPUT,
            json!({ "content": output, "is_error": is_error }),
        ));

        let mut intervention = Intervention::default();

        if let Some(finding) = self.sycophancy.check(output).await {
            intervention
                .warnings
                .push(format!("Sycophancy detected: {}", finding.reason));
            intervention
                .suggestions
                .push("Forcing agent to consider alternatives".to_string());
        }

        if is_error {
            let errors: Vec<ErrorRecord> = {
                let log = self.state.lock().unwrap();
                log.errors.iter().cloned().collect()
            };

            let verdict = self.debug_loop.check(&errors).await;
            if verdict.in_loop {
                intervention.warnings.push(format!(
                    "Debug loop detected: {}",
                    verdict.pattern.as_deref().unwrap_or("repeating errors")
                ));

                if self.params.auto_kill_loops {
                    intervention.kill_agent = true;

                    let transcript: Vec<TranscriptEntry> = {
                        let log = self.state.lock().unwrap();
                        log.user_inputs
                            .iter()
                            .chain(log.agent_outputs.iter())
                            .cloned()
                            .collect()
                    };

                    self.progress.on_analysis_started("analyzing stuck state");
                    let pivot = self.engine.analyze_and_pivot(&transcript, &errors).await;
                    self.progress.on_analysis_finished();

                    intervention.suggestions.push(pivot);
                    self.progress.on_agent_kill();
                }
            }
        }

        {
            let mut log = self.state.lock().unwrap();
            let interaction = Interaction {
                timestamp: Utc::now(),
                user_input: log.user_inputs.back().cloned(),
                agent_output: Some(entry),
                intervention: intervention.clone(),
            };
            log.interactions.push(interaction.clone());
            if intervention.is_noteworthy() {
                log.interventions.push(interaction);
            }
        }

        if intervention.is_noteworthy() {
            self.logger.log(ConversationEvent::new(
                event::INTERVENTION,
                json!({
                    "kill_agent": intervention.kill_agent,
                    "warnings": &intervention.warnings,
                    "suggestions": &intervention.suggestions,
                }),
            ));
        }

        intervention
    }

    /// One background drift check.
    ///
    /// Quiet until enough user inputs have accumulated to have learned a
    /// goal worth comparing against.
    pub async fn drift_tick(&self) {
        let recent: Vec<String> = {
            let log = self.state.lock().unwrap();
            if log.user_inputs.len() < self.params.goal_learning_prompts {
                return;
            }
            log.agent_outputs.iter().map(|e| e.content.clone()).collect()
        };

        if let Some(report) = self.drift.check(&recent).await {
            self.progress.on_drift(&report);
            self.logger.log(ConversationEvent::new(
                event::DRIFT_REPORT,
                json!({
                    "initial_goal": report.initial_goal,
                    "current_trajectory": report.current_trajectory,
                    "distance": report.distance,
                    "recommendation": report.recommendation,
                }),
            ));
        }
    }

    pub fn status(&self) -> SupervisorStatus {
        let log = self.state.lock().unwrap();
        SupervisorStatus {
            session_id: self.session_id.clone(),
            user_inputs: log.user_inputs.len(),
            agent_outputs: log.agent_outputs.len(),
            errors_tracked: log.errors.len(),
            monitors: MonitorStatus {
                debug_loops: self.debug_loop.stats(),
                context_drift: self.drift.stats(),
                sycophancy: self.sycophancy.stats(),
                interventions_made: self.engine.interventions_made(),
            },
        }
    }

    /// Stop the drift watch and archive the session.
    ///
    /// Idempotent: a second call returns the already-saved path without
    /// re-archiving.
    pub async fn shutdown(&self) -> Result<Option<PathBuf>, ArchiveError> {
        if let Some(saved) = self.saved.lock().unwrap().clone() {
            return Ok(saved);
        }

        self.cancel.cancel();
        let handle = self.watch.lock().unwrap().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }

        let record = {
            let log = self.state.lock().unwrap();
            SessionRecord {
                session_id: self.session_id.clone(),
                started_at: self.started_at,
                ended_at: Utc::now(),
                total_interactions: log.interactions.len(),
                total_interventions: log.interventions.len(),
                interactions: log.interactions.clone(),
                interventions: log.interventions.clone(),
            }
        };

        let path = self.archive.save(&record).await?;
        *self.saved.lock().unwrap() = Some(path.clone());

        if let Some(ref p) = path {
            self.logger.log(ConversationEvent::new(
                event::SESSION_SAVED,
                json!({ "path": p.display().to_string() }),
            ));
            info!(path = %p.display(), "session archived");
        }

        Ok(path)
    }
}

/// First 8 hex chars of a fresh UUID, the session's display id
fn short_session_id() -> String {
    let mut id = uuid::Uuid::new_v4().simple().to_string();
    id.truncate(8);
    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockGateway;

    fn supervisor(gateway: MockGateway, params: SupervisionParams) -> Arc<Supervisor> {
        Arc::new(Supervisor::new(Arc::new(gateway), ModelPair::default(), params).unwrap())
    }

    fn quiet_params() -> SupervisionParams {
        SupervisionParams::default()
            .with_prompt_quality(false)
            .with_debug_loop_window(3)
    }

    #[test]
    fn invalid_params_rejected_at_construction() {
        let result = Supervisor::new(
            Arc::new(MockGateway::canned()),
            ModelPair::default(),
            SupervisionParams::default().with_debug_loop_window(1),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn prompt_approved_when_gate_disabled() {
        let supervisor = supervisor(MockGateway::failing(), quiet_params());
        let decision = supervisor.screen_user_input("do the thing").await;
        assert!(decision.is_approved());
        assert_eq!(supervisor.status().user_inputs, 1);
    }

    #[tokio::test]
    async fn vague_prompt_rejected_by_gate() {
        let supervisor = supervisor(
            MockGateway::canned(),
            SupervisionParams::default().with_debug_loop_window(3),
        );
        let decision = supervisor.screen_user_input("make it work").await;
        match decision {
            PromptDecision::Rejected {
                feedback,
                suggestions,
            } => {
                assert_eq!(feedback, "Too vague");
                assert_eq!(suggestions, vec!["Be more specific".to_string()]);
            }
            PromptDecision::Approved => panic!("expected rejection"),
        }
        // The rejected prompt is still part of the history
        assert_eq!(supervisor.status().user_inputs, 1);
    }

    #[tokio::test]
    async fn gate_fails_open_when_gateway_is_down() {
        let supervisor = supervisor(
            MockGateway::failing(),
            SupervisionParams::default().with_debug_loop_window(3),
        );
        let decision = supervisor.screen_user_input("refactor the parser").await;
        assert!(decision.is_approved());
    }

    #[tokio::test]
    async fn sycophantic_output_warned() {
        let supervisor = supervisor(MockGateway::failing(), quiet_params());
        let output = "You're absolutely right! Great idea, that's a fantastic plan. Perfect.";

        let intervention = supervisor.review_agent_output(output, false).await;
        assert!(intervention.is_noteworthy());
        assert!(intervention.warnings[0].contains("Sycophancy detected"));
        assert!(!intervention.kill_agent);
    }

    #[tokio::test]
    async fn repeated_errors_kill_agent_with_pivot() {
        let supervisor = supervisor(MockGateway::canned(), quiet_params());
        supervisor.screen_user_input("fix the import").await;

        let mut last = Intervention::default();
        for _ in 0..3 {
            last = supervisor
                .review_agent_output("Error: cannot resolve module ./utils", true)
                .await;
        }

        assert!(last.kill_agent);
        assert!(last.warnings.iter().any(|w| w.contains("Debug loop")));
        assert!(
            last.suggestions
                .iter()
                .any(|s| s.contains("MARIONETTE INTERVENTION"))
        );

        let status = supervisor.status();
        assert_eq!(status.errors_tracked, 3);
        assert_eq!(status.monitors.debug_loops.total_detections, 1);
        assert_eq!(status.monitors.interventions_made, 1);
    }

    #[tokio::test]
    async fn loop_without_auto_kill_only_warns() {
        let supervisor = supervisor(
            MockGateway::canned(),
            quiet_params().with_auto_kill_loops(false),
        );
        let mut last = Intervention::default();
        for _ in 0..3 {
            last = supervisor
                .review_agent_output("Error: same thing", true)
                .await;
        }
        assert!(!last.kill_agent);
        assert!(last.warnings.iter().any(|w| w.contains("Debug loop")));
        assert!(last.suggestions.is_empty());
    }

    #[tokio::test]
    async fn histories_are_bounded() {
        let supervisor = supervisor(MockGateway::failing(), quiet_params());
        for i in 0..120 {
            supervisor.screen_user_input(&format!("prompt {i}")).await;
            supervisor
                .review_agent_output(&format!("done {i}"), false)
                .await;
        }
        let status = supervisor.status();
        assert_eq!(status.user_inputs, 100);
        assert_eq!(status.agent_outputs, 100);
    }

    #[tokio::test]
    async fn drift_tick_quiet_before_enough_inputs() {
        let supervisor = supervisor(MockGateway::canned(), quiet_params());
        supervisor.screen_user_input("one prompt").await;
        // Under the goal-learning gate: must not consult the model at all
        supervisor.drift_tick().await;
        assert_eq!(supervisor.status().monitors.context_drift.drift_events, 0);
    }

    #[tokio::test]
    async fn shutdown_is_idempotent() {
        let supervisor = supervisor(MockGateway::failing(), quiet_params());
        supervisor.start();
        let first = supervisor.shutdown().await.unwrap();
        let second = supervisor.shutdown().await.unwrap();
        assert_eq!(first, None);
        assert_eq!(second, None);
    }

    #[test]
    fn session_ids_are_short() {
        let supervisor = supervisor(MockGateway::failing(), quiet_params());
        assert_eq!(supervisor.session_id().len(), 8);
    }
}
