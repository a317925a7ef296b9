//! Layered configuration loading and validation.

use anyhow::{Context, Result};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use std::path::Path;
use thiserror::Error;

use crate::domain::models::config::Config;

/// Project directory holding configuration files
pub const CONFIG_DIR: &str = ".playforge";

/// Longest idle window accepted, about a hundred years
pub const MAX_IDLE_MINUTES: i64 = 100 * 365 * 24 * 60;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `games_dir` is blank
    #[error("games_dir cannot be empty")]
    EmptyGamesDir,

    /// Idle window is negative or too large
    #[error("Invalid max_idle_minutes: {0}. Must be between 0 and {max}", max = MAX_IDLE_MINUTES)]
    InvalidIdleMinutes(i64),

    /// Session improvement threshold is zero
    #[error("Invalid max_session_improvements: {0}. Must be at least 1")]
    InvalidSessionImprovements(u64),

    /// Context threshold is zero
    #[error("Invalid max_context_tokens: {0}. Must be at least 1")]
    InvalidContextTokens(u64),

    /// Cost threshold is negative or not finite
    #[error("Invalid max_improvement_cost_usd: {0}. Must be a non-negative number")]
    InvalidCostLimit(f64),

    /// Agent turn limit is zero
    #[error("Invalid max_turns: {0}. Must be at least 1")]
    InvalidMaxTurns(u32),

    /// Agent binary path is blank
    #[error("Agent binary_path cannot be empty")]
    EmptyBinaryPath,

    /// Verification is enabled without a program
    #[error("Verifier program cannot be empty when verification is enabled")]
    EmptyVerifierProgram,

    /// Log level is not recognised
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    /// Any other invalid setting
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .playforge/config.yaml (project config, created by init)
    /// 3. .playforge/local.yaml (project local overrides, optional)
    /// 4. Environment variables (PLAYFORGE_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        Self::load_from_dir(".")
    }

    /// Same as [`ConfigLoader::load`] with an explicit project root.
    pub fn load_from_dir(root: impl AsRef<Path>) -> Result<Config> {
        let dir = root.as_ref().join(CONFIG_DIR);
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(dir.join("config.yaml")))
            .merge(Yaml::file(dir.join("local.yaml")))
            .merge(Env::prefixed("PLAYFORGE_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.games_dir.trim().is_empty() {
            return Err(ConfigError::EmptyGamesDir);
        }

        let policy = &config.session_policy;
        if !(0..=MAX_IDLE_MINUTES).contains(&policy.max_idle_minutes) {
            return Err(ConfigError::InvalidIdleMinutes(policy.max_idle_minutes));
        }
        if policy.max_session_improvements == 0 {
            return Err(ConfigError::InvalidSessionImprovements(
                policy.max_session_improvements,
            ));
        }
        if policy.max_context_tokens == 0 {
            return Err(ConfigError::InvalidContextTokens(policy.max_context_tokens));
        }
        if !policy.max_improvement_cost_usd.is_finite() || policy.max_improvement_cost_usd < 0.0 {
            return Err(ConfigError::InvalidCostLimit(policy.max_improvement_cost_usd));
        }

        if config.agent.max_turns == 0 {
            return Err(ConfigError::InvalidMaxTurns(config.agent.max_turns));
        }
        if config.agent.binary_path.trim().is_empty() {
            return Err(ConfigError::EmptyBinaryPath);
        }
        if config.agent.allowed_tools.iter().any(|t| t.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "agent.allowed_tools cannot contain empty names".to_string(),
            ));
        }
        if let Some(path) = config
            .agent
            .readonly_paths
            .iter()
            .find(|p| Path::new(p).is_absolute() || p.split('/').any(|c| c == ".."))
        {
            return Err(ConfigError::ValidationFailed(format!(
                "agent.readonly_paths entry '{path}' must be relative to the game directory"
            )));
        }

        if config.verifier.enabled && config.verifier.program.trim().is_empty() {
            return Err(ConfigError::EmptyVerifierProgram);
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::config::{LogFormat, SessionPolicyConfig};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.games_dir, "games");
        assert_eq!(config.session_policy.max_idle_minutes, 5);
        assert_eq!(config.session_policy.max_session_improvements, 5);
        assert_eq!(config.session_policy.max_context_tokens, 30_000);
        assert!((config.session_policy.max_improvement_cost_usd - 0.20).abs() < f64::EPSILON);
        assert_eq!(config.agent.max_turns, 25);
        assert_eq!(config.logging.level, "info");
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
games_dir: /srv/games
session_policy:
  max_idle_minutes: 10
  max_improvement_cost_usd: 0.5
agent:
  model: sonnet
  max_turns: 40
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.games_dir, "/srv/games");
        assert_eq!(config.session_policy.max_idle_minutes, 10);
        assert_eq!(config.session_policy.max_session_improvements, 5);
        assert!((config.session_policy.max_improvement_cost_usd - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.agent.model.as_deref(), Some("sonnet"));
        assert_eq!(config.agent.max_turns, 40);
        assert_eq!(config.agent.binary_path, "claude");
        assert_eq!(config.logging.format, LogFormat::Json);

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_negative_idle() {
        let config = Config {
            session_policy: SessionPolicyConfig {
                max_idle_minutes: -1,
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidIdleMinutes(-1))
        ));
    }

    #[test]
    fn test_validate_idle_upper_bound() {
        let mut config = Config::default();
        config.session_policy.max_idle_minutes = MAX_IDLE_MINUTES;
        assert!(ConfigLoader::validate(&config).is_ok());

        config.session_policy.max_idle_minutes = i64::MAX;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidIdleMinutes(i64::MAX))
        ));
    }

    #[test]
    fn test_env_never_expire_idle_is_rejected() {
        let root = tempfile::tempdir().unwrap();
        temp_env::with_var(
            "PLAYFORGE_SESSION_POLICY__MAX_IDLE_MINUTES",
            Some("9223372036854775807"),
            || {
                let err = ConfigLoader::load_from_dir(root.path()).unwrap_err();
                assert!(err.to_string().contains("max_idle_minutes"), "{err}");
            },
        );
    }

    #[test]
    fn test_validate_zero_session_improvements() {
        let mut config = Config::default();
        config.session_policy.max_session_improvements = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidSessionImprovements(0))
        ));
    }

    #[test]
    fn test_validate_bad_cost_limit() {
        let mut config = Config::default();
        config.session_policy.max_improvement_cost_usd = f64::NAN;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidCostLimit(_))
        ));
    }

    #[test]
    fn test_validate_zero_max_turns() {
        let mut config = Config::default();
        config.agent.max_turns = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidMaxTurns(0))
        ));
    }

    #[test]
    fn test_validate_readonly_paths_stay_inside_game() {
        let mut config = Config::default();
        config.agent.readonly_paths = vec!["../shared".into()];
        let err = ConfigLoader::validate(&config).unwrap_err();
        assert!(err.to_string().contains("../shared"));
    }

    #[test]
    fn test_validate_verifier_program_only_when_enabled() {
        let mut config = Config::default();
        config.verifier.program = String::new();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyVerifierProgram)
        ));

        config.verifier.enabled = false;
        assert!(ConfigLoader::validate(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "verbose".into();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogLevel(level)) if level == "verbose"
        ));
    }

    #[test]
    fn test_load_from_dir_merges_files_and_env() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.yaml"),
            "games_dir: base-games\nsession_policy:\n  max_idle_minutes: 7\n  max_context_tokens: 1000\n",
        )
        .unwrap();
        std::fs::write(dir.join("local.yaml"), "session_policy:\n  max_idle_minutes: 9\n").unwrap();

        temp_env::with_vars(
            [
                ("PLAYFORGE_SESSION_POLICY__MAX_CONTEXT_TOKENS", Some("2000")),
                ("PLAYFORGE_LOGGING__LEVEL", Some("debug")),
            ],
            || {
                let config = ConfigLoader::load_from_dir(root.path()).unwrap();
                assert_eq!(config.games_dir, "base-games");
                assert_eq!(config.session_policy.max_idle_minutes, 9, "local.yaml wins");
                assert_eq!(config.session_policy.max_context_tokens, 2000, "env wins");
                assert_eq!(config.logging.level, "debug");
            },
        );
    }

    #[test]
    fn test_load_from_dir_without_files_uses_defaults() {
        let root = tempfile::tempdir().unwrap();
        temp_env::with_vars_unset(["PLAYFORGE_GAMES_DIR", "PLAYFORGE_LOGGING__LEVEL"], || {
            let config = ConfigLoader::load_from_dir(root.path()).unwrap();
            assert_eq!(config.games_dir, "games");
        });
    }

    #[test]
    fn test_load_from_dir_rejects_invalid_values() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join(CONFIG_DIR);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), "agent:\n  max_turns: 0\n").unwrap();

        temp_env::with_vars_unset(["PLAYFORGE_AGENT__MAX_TURNS"], || {
            let err = ConfigLoader::load_from_dir(root.path()).unwrap_err();
            assert!(err.to_string().contains("max_turns"));
        });
    }
}
