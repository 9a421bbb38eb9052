//! Isolated extraction worker: a child process speaking line-delimited JSON.
//!
//! One session is launched per request and reused for every plan step. The
//! child is spawned with `kill_on_drop`, so dropping a session (including a
//! cancelled request future) never leaks a process. The inference key is
//! stripped from the child's environment.

use std::future::Future;
use std::process::Stdio;
use std::time::Duration;

use dealscout_core::{AppConfig, INFERENCE_API_KEY_VAR};
use dealscout_scraper::{ToolCall, ToolResponse};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

use crate::error::AgentError;

/// How long a closing worker gets to exit on its own before it is killed.
const EXIT_GRACE: Duration = Duration::from_secs(2);

/// A live connection to one worker.
pub trait WorkerSession: Send {
    fn call_tool(
        &mut self,
        call: &ToolCall,
    ) -> impl Future<Output = Result<ToolResponse, AgentError>> + Send;

    /// Shuts the worker down. Must be safe to call after a failed call.
    fn close(self) -> impl Future<Output = ()> + Send;
}

/// Starts worker sessions.
pub trait WorkerLauncher: Send + Sync {
    type Session: WorkerSession;

    fn launch(&self) -> impl Future<Output = Result<Self::Session, AgentError>> + Send;
}

/// Launches the worker as a child process.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    program: String,
    args: Vec<String>,
    call_timeout: Duration,
}

impl ProcessLauncher {
    #[must_use]
    pub fn new(program: impl Into<String>, args: Vec<String>, call_timeout: Duration) -> Self {
        Self {
            program: program.into(),
            args,
            call_timeout,
        }
    }

    /// `<worker_program> worker`, bounded by the configured call timeout.
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            config.worker_program.clone(),
            vec!["worker".to_owned()],
            Duration::from_secs(config.worker_timeout_secs),
        )
    }
}

fn io_error(context: &str) -> impl FnOnce(std::io::Error) -> AgentError + '_ {
    move |source| AgentError::WorkerIo {
        context: context.to_owned(),
        source,
    }
}

impl WorkerLauncher for ProcessLauncher {
    type Session = ProcessSession;

    async fn launch(&self) -> Result<ProcessSession, AgentError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .env_remove(INFERENCE_API_KEY_VAR)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(io_error("spawn"))?;

        let stdin = child.stdin.take().ok_or_else(|| {
            io_error("spawn")(std::io::Error::other("worker stdin was not captured"))
        })?;
        let stdout = child.stdout.take().ok_or_else(|| {
            io_error("spawn")(std::io::Error::other("worker stdout was not captured"))
        })?;

        tracing::debug!(program = %self.program, pid = child.id(), "worker launched");
        Ok(ProcessSession {
            child,
            stdin: Some(stdin),
            stdout: BufReader::new(stdout).lines(),
            call_timeout: self.call_timeout,
        })
    }
}

pub struct ProcessSession {
    child: Child,
    stdin: Option<ChildStdin>,
    stdout: Lines<BufReader<ChildStdout>>,
    call_timeout: Duration,
}

impl WorkerSession for ProcessSession {
    async fn call_tool(&mut self, call: &ToolCall) -> Result<ToolResponse, AgentError> {
        let mut line = serde_json::to_vec(call).map_err(|source| AgentError::Decode {
            context: format!("encoding {} call", call.tool),
            source,
        })?;
        line.push(b'\n');

        let stdin = self.stdin.as_mut().ok_or_else(|| AgentError::WorkerClosed {
            tool: call.tool.clone(),
        })?;
        stdin.write_all(&line).await.map_err(io_error("write"))?;
        stdin.flush().await.map_err(io_error("write"))?;

        let reply = tokio::time::timeout(self.call_timeout, self.stdout.next_line())
            .await
            .map_err(|_| AgentError::WorkerTimeout {
                tool: call.tool.clone(),
                timeout: self.call_timeout,
            })?
            .map_err(io_error("read"))?
            .ok_or_else(|| AgentError::WorkerClosed {
                tool: call.tool.clone(),
            })?;

        serde_json::from_str(&reply).map_err(|source| AgentError::Decode {
            context: format!("{} response", call.tool),
            source,
        })
    }

    async fn close(mut self) {
        // EOF on stdin ends the worker's read loop.
        drop(self.stdin.take());
        match tokio::time::timeout(EXIT_GRACE, self.child.wait()).await {
            Ok(Ok(status)) => tracing::debug!(%status, "worker exited"),
            Ok(Err(e)) => tracing::warn!(error = %e, "failed waiting for worker"),
            Err(_) => {
                if let Err(e) = self.child.kill().await {
                    tracing::warn!(error = %e, "failed to kill worker");
                } else {
                    tracing::debug!("worker killed after exit grace period");
                }
            }
        }
    }
}
