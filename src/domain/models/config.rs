//! Configuration model with serde defaults for every section.

use serde::{Deserialize, Serialize};

use super::substrate::DEFAULT_ALLOWED_TOOLS;

/// Main configuration structure for playforge
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Directory holding one working directory per game
    #[serde(default = "default_games_dir")]
    pub games_dir: String,

    /// Session reuse thresholds
    #[serde(default)]
    pub session_policy: SessionPolicyConfig,

    /// Coding agent configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Post-edit type check configuration
    #[serde(default)]
    pub verifier: VerifierConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_games_dir() -> String {
    "games".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            games_dir: default_games_dir(),
            session_policy: SessionPolicyConfig::default(),
            agent: AgentConfig::default(),
            verifier: VerifierConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Thresholds that force a fresh agent session.
///
/// Any one of them being crossed discards the resumable session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SessionPolicyConfig {
    /// Minutes after which the upstream context cache is assumed expired
    #[serde(default = "default_max_idle_minutes")]
    pub max_idle_minutes: i64,

    /// Improvements allowed inside one session before restarting
    #[serde(default = "default_max_session_improvements")]
    pub max_session_improvements: u64,

    /// Ceiling on reusable context, in tokens
    #[serde(default = "default_max_context_tokens")]
    pub max_context_tokens: u64,

    /// Cost in USD of a single step above which the session is restarted
    #[serde(default = "default_max_improvement_cost_usd")]
    pub max_improvement_cost_usd: f64,
}

const fn default_max_idle_minutes() -> i64 {
    5
}

const fn default_max_session_improvements() -> u64 {
    5
}

const fn default_max_context_tokens() -> u64 {
    30_000
}

const fn default_max_improvement_cost_usd() -> f64 {
    0.20
}

impl Default for SessionPolicyConfig {
    fn default() -> Self {
        Self {
            max_idle_minutes: default_max_idle_minutes(),
            max_session_improvements: default_max_session_improvements(),
            max_context_tokens: default_max_context_tokens(),
            max_improvement_cost_usd: default_max_improvement_cost_usd(),
        }
    }
}

/// Coding agent (Claude Code CLI) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct AgentConfig {
    /// Path to the claude CLI executable
    #[serde(default = "default_binary_path")]
    pub binary_path: String,

    /// Model override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Maximum agent iterations per improvement
    #[serde(default = "default_max_turns")]
    pub max_turns: u32,

    /// Tool allowlist passed to the agent
    #[serde(default = "default_allowed_tools")]
    pub allowed_tools: Vec<String>,

    /// Paths inside a game directory the agent must not modify
    #[serde(default = "default_readonly_paths")]
    pub readonly_paths: Vec<String>,

    /// Additional CLI flags
    #[serde(default)]
    pub extra_flags: Vec<String>,
}

fn default_binary_path() -> String {
    "claude".to_string()
}

const fn default_max_turns() -> u32 {
    25
}

fn default_allowed_tools() -> Vec<String> {
    DEFAULT_ALLOWED_TOOLS.iter().map(|t| (*t).to_string()).collect()
}

fn default_readonly_paths() -> Vec<String> {
    vec!["reference".to_string()]
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            binary_path: default_binary_path(),
            model: None,
            max_turns: default_max_turns(),
            allowed_tools: default_allowed_tools(),
            readonly_paths: default_readonly_paths(),
            extra_flags: vec![],
        }
    }
}

/// Post-edit type check configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct VerifierConfig {
    /// Run the type check after each improvement
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Program to execute
    #[serde(default = "default_verifier_program")]
    pub program: String,

    /// Arguments placed before the file list
    #[serde(default = "default_verifier_args")]
    pub args: Vec<String>,

    /// Source files the agent edits, relative to the game directory
    #[serde(default = "default_verifier_files")]
    pub files: Vec<String>,
}

const fn default_true() -> bool {
    true
}

fn default_verifier_program() -> String {
    "npx".to_string()
}

fn default_verifier_args() -> Vec<String> {
    [
        "tsc",
        "--noEmit",
        "--strict",
        "--skipLibCheck",
        "--target",
        "ES2020",
        "--module",
        "ESNext",
        "--moduleResolution",
        "node",
        "--esModuleInterop",
    ]
    .iter()
    .map(|a| (*a).to_string())
    .collect()
}

fn default_verifier_files() -> Vec<String> {
    vec!["server.ts".to_string(), "client.ts".to_string()]
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            program: default_verifier_program(),
            args: default_verifier_args(),
            files: default_verifier_files(),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per line
    Json,
    /// Compact human-readable lines
    Pretty,
}

/// Log file rotation policy
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RotationPolicy {
    /// New file every day
    #[default]
    Daily,
    /// New file every hour
    Hourly,
    /// Single file
    Never,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Console log format
    #[serde(default = "default_log_format")]
    pub format: LogFormat,

    /// Directory for rolling JSON log files; console only when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<String>,

    /// File rotation policy
    #[serde(default)]
    pub rotation: RotationPolicy,
}

fn default_log_level() -> String {
    "info".to_string()
}

const fn default_log_format() -> LogFormat {
    LogFormat::Pretty
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: RotationPolicy::default(),
        }
    }
}
