//! Simulated coding agent for demos and tests.
//!
//! Reproduces canned behaviors that exercise each monitor: prompts
//! mentioning "error" produce a failing reply, flattery-bait prompts produce
//! a sycophantic reply, everything else gets a plain acknowledgement.

use async_trait::async_trait;
use marionette_application::ports::coding_agent::{AgentError, AgentReply, CodingAgent};

pub struct SimulatedAgent {
    running: bool,
}

impl SimulatedAgent {
    pub fn new() -> Self {
        Self { running: true }
    }
}

impl Default for SimulatedAgent {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CodingAgent for SimulatedAgent {
    async fn send(&mut self, prompt: &str) -> Result<AgentReply, AgentError> {
        if !self.running {
            return Err(AgentError::NotRunning);
        }

        let lower = prompt.to_lowercase();
        let reply = if lower.contains("error") {
            AgentReply {
                text: "Error: File not found. Retrying with different path...".to_string(),
                is_error: true,
            }
        } else if lower.contains("great") || lower.contains("perfect") {
            AgentReply {
                text: "You're absolutely right! That's a perfect approach. I'll implement \
                       exactly that."
                    .to_string(),
                is_error: false,
            }
        } else {
            AgentReply {
                text: format!("I understand you want to: {prompt}. Let me implement that for you."),
                is_error: false,
            }
        };

        Ok(reply)
    }

    async fn kill(&mut self) -> Result<(), AgentError> {
        self.running = false;
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn error_prompts_fail() {
        let mut agent = SimulatedAgent::new();
        let reply = agent.send("trigger an error please").await.unwrap();
        assert!(reply.is_error);
        assert!(reply.text.starts_with("Error:"));
    }

    #[tokio::test]
    async fn flattery_bait_is_sycophantic() {
        let mut agent = SimulatedAgent::new();
        let reply = agent.send("this plan is perfect, right?").await.unwrap();
        assert!(!reply.is_error);
        assert!(reply.text.contains("absolutely right"));
    }

    #[tokio::test]
    async fn plain_prompts_are_acknowledged() {
        let mut agent = SimulatedAgent::new();
        let reply = agent.send("add a login page").await.unwrap();
        assert!(reply.text.contains("add a login page"));
    }

    #[tokio::test]
    async fn killed_agent_rejects_prompts() {
        let mut agent = SimulatedAgent::new();
        agent.kill().await.unwrap();
        assert!(!agent.is_running());
        assert!(agent.send("hello").await.is_err());
    }
}
