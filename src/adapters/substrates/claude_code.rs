//! Claude Code CLI substrate implementation.
//!
//! Spawns the claude CLI in print mode with `stream-json` output and turns
//! each stdout line into an [`AgentEvent`].

use async_trait::async_trait;
use futures::StreamExt;
use serde_json::Value;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::models::{AgentConfig, AgentEvent, AgentRequest, ResultSubtype, TokenUsage};
use crate::domain::ports::{AgentEventStream, AgentSubstrate};

/// Claude Code CLI substrate configuration.
#[derive(Debug, Clone)]
pub struct ClaudeCodeConfig {
    /// Path to claude CLI binary
    pub binary_path: String,
    /// Additional CLI flags, inserted before the prompt
    pub extra_flags: Vec<String>,
}

impl Default for ClaudeCodeConfig {
    fn default() -> Self {
        Self {
            binary_path: "claude".to_string(),
            extra_flags: vec![],
        }
    }
}

impl From<&AgentConfig> for ClaudeCodeConfig {
    fn from(agent: &AgentConfig) -> Self {
        Self {
            binary_path: agent.binary_path.clone(),
            extra_flags: agent.extra_flags.clone(),
        }
    }
}

/// Claude Code CLI substrate.
pub struct ClaudeCodeSubstrate {
    config: ClaudeCodeConfig,
}

impl ClaudeCodeSubstrate {
    /// Substrate running the CLI described by `config`.
    pub fn new(config: ClaudeCodeConfig) -> Self {
        Self { config }
    }

    /// Build CLI arguments for a request.
    fn build_args(&self, request: &AgentRequest) -> Vec<String> {
        let mut args = vec![
            "--print".to_string(),
            "--output-format".to_string(),
            "stream-json".to_string(),
            // stream-json requires verbose in print mode
            "--verbose".to_string(),
            "--max-turns".to_string(),
            request.max_turns.to_string(),
        ];

        if !request.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(request.allowed_tools.join(","));
        }

        if let Some(ref token) = request.resume_token {
            args.push("--resume".to_string());
            args.push(token.clone());
        }

        if let Some(ref model) = request.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }

        args.extend(self.config.extra_flags.iter().cloned());

        args.push("-p".to_string());
        args.push(request.instruction.clone());

        args
    }
}

/// Parse one line of `stream-json` output.
///
/// Returns `None` for blank lines, non-JSON noise and event types that carry
/// nothing the session policy needs (user turns, tool results).
pub fn parse_stream_line(line: &str) -> Option<AgentEvent> {
    let trimmed = line.trim();
    if !trimmed.starts_with('{') {
        return None;
    }
    let json: Value = serde_json::from_str(trimmed).ok()?;
    let session_id = json
        .get("session_id")
        .and_then(Value::as_str)
        .map(str::to_string);

    match json.get("type").and_then(Value::as_str)? {
        "system" => {
            let subtype = json.get("subtype").and_then(Value::as_str);
            (subtype == Some("init")).then_some(AgentEvent::SystemInit { session_id })
        }
        "assistant" => {
            let usage = json
                .get("message")
                .and_then(|m| m.get("usage"))
                .map(parse_usage)
                .unwrap_or_default();
            Some(AgentEvent::AssistantStep { usage, session_id })
        }
        "result" => {
            let subtype = json
                .get("subtype")
                .and_then(Value::as_str)
                .map(ResultSubtype::parse)
                .unwrap_or(ResultSubtype::Success);
            let total_cost_usd = json
                .get("total_cost_usd")
                .or_else(|| json.get("cost_usd"))
                .and_then(Value::as_f64)
                .unwrap_or(0.0);
            let usage = json.get("usage").map(parse_usage).unwrap_or_default();
            Some(AgentEvent::Result {
                subtype,
                total_cost_usd,
                usage,
                session_id,
            })
        }
        _ => None,
    }
}

fn parse_usage(usage: &Value) -> TokenUsage {
    let field = |name: &str| usage.get(name).and_then(Value::as_u64);
    TokenUsage {
        input_tokens: field("input_tokens").unwrap_or(0),
        output_tokens: field("output_tokens").unwrap_or(0),
        cache_creation_input_tokens: field("cache_creation_input_tokens"),
        cache_read_input_tokens: field("cache_read_input_tokens"),
    }
}

#[async_trait]
impl AgentSubstrate for ClaudeCodeSubstrate {
    fn name(&self) -> &'static str {
        "claude_code"
    }

    async fn invoke(&self, request: AgentRequest) -> DomainResult<AgentEventStream> {
        let args = self.build_args(&request);

        let mut cmd = Command::new(&self.config.binary_path);
        cmd.args(&args)
            .current_dir(&request.working_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            DomainError::AgentFailed(format!(
                "failed to spawn {}: {e}",
                self.config.binary_path
            ))
        })?;
        debug!(pid = ?child.id(), resume = request.resume_token.is_some(), "claude started");

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| DomainError::AgentFailed("failed to capture stdout".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| DomainError::AgentFailed("failed to capture stderr".to_string()))?;

        // Drain stderr concurrently so a chatty process cannot block on a full pipe.
        let stderr_task = tokio::spawn(async move {
            let mut buf = String::new();
            let _ = stderr.read_to_string(&mut buf).await;
            buf
        });

        let (tx, rx) = mpsc::channel::<DomainResult<AgentEvent>>(100);

        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            let mut saw_result = false;

            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        let Some(event) = parse_stream_line(&line) else {
                            continue;
                        };
                        saw_result |= matches!(event, AgentEvent::Result { .. });
                        if tx.send(Ok(event)).await.is_err() {
                            // Receiver dropped; kill_on_drop reaps the child.
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        let _ = tx
                            .send(Err(DomainError::AgentFailed(format!(
                                "failed to read agent output: {e}"
                            ))))
                            .await;
                        return;
                    }
                }
            }

            let stderr_text = stderr_task.await.unwrap_or_default();
            match child.wait().await {
                Ok(status) if status.success() => {}
                Ok(status) if saw_result => {
                    warn!(code = ?status.code(), "claude exited non-zero after reporting a result");
                }
                Ok(status) => {
                    let message = if stderr_text.trim().is_empty() {
                        format!("claude exited with code {:?}", status.code())
                    } else {
                        stderr_text.trim().to_string()
                    };
                    let _ = tx.send(Err(DomainError::AgentFailed(message))).await;
                }
                Err(e) => {
                    let _ = tx
                        .send(Err(DomainError::AgentFailed(format!(
                            "failed to wait for claude: {e}"
                        ))))
                        .await;
                }
            }
        });

        let events = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });
        Ok(events.boxed())
    }
}
