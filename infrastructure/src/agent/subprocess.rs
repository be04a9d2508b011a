//! Subprocess adapter for a real CLI coding agent.
//!
//! Speaks a line protocol over stdio: one prompt line in, reply lines out,
//! terminated by a blank line (or EOF). A reply whose first line starts with
//! "error:" is flagged as a failure for the supervision monitors.

use async_trait::async_trait;
use marionette_application::ports::coding_agent::{AgentError, AgentReply, CodingAgent};
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

pub struct SubprocessAgent {
    command: String,
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    running: bool,
}

impl SubprocessAgent {
    /// Resolve the agent binary on PATH and spawn it with piped stdio.
    ///
    /// On Linux the child is parented with `PR_SET_PDEATHSIG(SIGTERM)` so it
    /// cannot outlive a crashed supervisor.
    pub async fn spawn(command: &str, args: &[String]) -> Result<Self, AgentError> {
        let program = which::which(command)
            .map_err(|_| AgentError::CommandNotFound(command.to_string()))?;

        let mut cmd = Command::new(program);
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null());

        #[cfg(target_os = "linux")]
        unsafe {
            cmd.pre_exec(|| {
                // SAFETY: prctl with PR_SET_PDEATHSIG is async-signal-safe
                unsafe { libc::prctl(libc::PR_SET_PDEATHSIG, libc::SIGTERM) };
                Ok(())
            });
        }

        let mut child = cmd
            .spawn()
            .map_err(|e| AgentError::Spawn(e.to_string()))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            AgentError::Spawn("agent stdin not captured".to_string())
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            AgentError::Spawn("agent stdout not captured".to_string())
        })?;

        info!(command, pid = child.id(), "coding agent spawned");

        Ok(Self {
            command: command.to_string(),
            child,
            stdin,
            stdout: BufReader::new(stdout),
            running: true,
        })
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn child_id(&self) -> Option<u32> {
        self.child.id()
    }
}

#[async_trait]
impl CodingAgent for SubprocessAgent {
    async fn send(&mut self, prompt: &str) -> Result<AgentReply, AgentError> {
        if !self.running {
            return Err(AgentError::NotRunning);
        }

        self.stdin
            .write_all(prompt.as_bytes())
            .await
            .map_err(|e| AgentError::Io(e.to_string()))?;
        self.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| AgentError::Io(e.to_string()))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| AgentError::Io(e.to_string()))?;

        let mut lines = Vec::new();
        loop {
            let mut line = String::new();
            let read = self
                .stdout
                .read_line(&mut line)
                .await
                .map_err(|e| AgentError::Io(e.to_string()))?;

            if read == 0 {
                // EOF: the agent exited
                self.running = false;
                if lines.is_empty() {
                    return Err(AgentError::NotRunning);
                }
                break;
            }

            let line = line.trim_end_matches(['\r', '\n']);
            if line.is_empty() {
                break;
            }
            lines.push(line.to_string());
        }

        let is_error = lines
            .first()
            .map(|l| l.to_lowercase().starts_with("error:"))
            .unwrap_or(false);

        debug!(lines = lines.len(), is_error, "agent reply received");

        Ok(AgentReply {
            text: lines.join("\n"),
            is_error,
        })
    }

    async fn kill(&mut self) -> Result<(), AgentError> {
        if !self.running {
            return Ok(());
        }
        self.running = false;
        self.child
            .start_kill()
            .map_err(|e| AgentError::Io(e.to_string()))?;
        let _ = self.child.wait().await;
        info!(command = %self.command, "coding agent killed");
        Ok(())
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A shell loop that echoes each prompt back, blank-line terminated
    const ECHO_AGENT: &str = "while read line; do echo \"$line\"; echo; done";

    async fn echo_agent() -> SubprocessAgent {
        SubprocessAgent::spawn("sh", &["-c".to_string(), ECHO_AGENT.to_string()])
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn unknown_command_is_reported() {
        let result = SubprocessAgent::spawn("definitely-not-a-real-agent-binary", &[]).await;
        assert!(matches!(result, Err(AgentError::CommandNotFound(_))));
    }

    #[tokio::test]
    async fn round_trips_a_prompt() {
        let mut agent = echo_agent().await;
        let reply = agent.send("implement the parser").await.unwrap();
        assert_eq!(reply.text, "implement the parser");
        assert!(!reply.is_error);
        agent.kill().await.unwrap();
    }

    #[tokio::test]
    async fn error_prefix_is_flagged() {
        let mut agent = echo_agent().await;
        let reply = agent.send("Error: compilation failed").await.unwrap();
        assert!(reply.is_error);
        agent.kill().await.unwrap();
    }

    #[tokio::test]
    async fn kill_stops_the_agent() {
        let mut agent = echo_agent().await;
        assert!(agent.is_running());
        agent.kill().await.unwrap();
        assert!(!agent.is_running());
        assert!(matches!(
            agent.send("anything").await,
            Err(AgentError::NotRunning)
        ));
    }
}
