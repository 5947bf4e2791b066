use std::env;
use std::str::FromStr;

use strum::{Display, EnumString};
use thiserror::Error;

/// Pipeline execution endpoint used when `AIRIA_RECIPE_AGENT_ENDPOINT` is not set
pub const DEFAULT_AIRIA_ENDPOINT: &str =
    "https://api.airia.ai/v2/PipelineExecution/15c2b6ab-5201-4c72-beef-33ec20c9603d";

pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_AIRIA_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_TRANSPORT_RETRIES: u32 = 2;

/// Which agent backend answers recipe attempts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AgentMode {
    /// Hosted chef + inspector pipeline
    Airia,
    /// Local deterministic chef + inspector
    Simulated,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} must be a valid number, got '{value}'")]
    InvalidNumber { var: &'static str, value: String },

    #[error("AGENT_MODE must be 'airia' or 'simulated', got '{0}'")]
    InvalidAgentMode(String),

    #[error("AIRIA_RECIPE_AGENT_ENDPOINT is not a valid http(s) URL: {0}")]
    InvalidEndpoint(String),

    #[error("RECIPE_MAX_ATTEMPTS must be at least 1")]
    ZeroAttempts,

    #[error("AIRIA_TIMEOUT_SECS must be at least 1")]
    ZeroTimeout,
}

#[derive(Debug, Clone)]
pub struct AiriaConfig {
    pub endpoint: String,
    pub api_key: String,
    pub user_id: String,
    pub timeout_secs: u64,
    pub transport_retries: u32,
}

impl Default for AiriaConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_AIRIA_ENDPOINT.to_string(),
            api_key: String::new(),
            user_id: String::new(),
            timeout_secs: DEFAULT_AIRIA_TIMEOUT_SECS,
            transport_retries: DEFAULT_TRANSPORT_RETRIES,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub bind_address: String,
    pub database_url: String,
    pub agent_mode: AgentMode,
    pub max_attempts: u32,
    pub airia: AiriaConfig,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let api_key = get("AIRIA_API_KEY").unwrap_or_default();
        let agent_mode = match get("AGENT_MODE") {
            Some(mode) => AgentMode::from_str(&mode).map_err(|_| ConfigError::InvalidAgentMode(mode))?,
            None if api_key.is_empty() => AgentMode::Simulated,
            None => AgentMode::Airia,
        };

        let endpoint = get("AIRIA_RECIPE_AGENT_ENDPOINT").unwrap_or_else(|| DEFAULT_AIRIA_ENDPOINT.to_string());
        match url::Url::parse(&endpoint) {
            Ok(u) if u.scheme() == "http" || u.scheme() == "https" => {}
            _ => return Err(ConfigError::InvalidEndpoint(endpoint)),
        }

        let max_attempts = parse_or("RECIPE_MAX_ATTEMPTS", get("RECIPE_MAX_ATTEMPTS"), DEFAULT_MAX_ATTEMPTS)?;
        if max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        let timeout_secs = parse_or("AIRIA_TIMEOUT_SECS", get("AIRIA_TIMEOUT_SECS"), DEFAULT_AIRIA_TIMEOUT_SECS)?;
        if timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            port: parse_or("PORT", get("PORT"), 8080)?,
            bind_address: get("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0".to_string()),
            database_url: get("DATABASE_URL").unwrap_or_else(|| "./.db/safeplate.db".to_string()),
            agent_mode,
            max_attempts,
            airia: AiriaConfig {
                endpoint,
                api_key,
                user_id: get("AIRIA_USER_ID").unwrap_or_default(),
                timeout_secs,
                transport_retries: parse_or(
                    "AIRIA_TRANSPORT_RETRIES",
                    get("AIRIA_TRANSPORT_RETRIES"),
                    DEFAULT_TRANSPORT_RETRIES,
                )?,
            },
        })
    }
}

fn parse_or<T: FromStr>(var: &'static str, value: Option<String>, default: T) -> Result<T, ConfigError> {
    match value {
        Some(v) => v.parse().map_err(|_| ConfigError::InvalidNumber { var, value: v }),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults_without_api_key_use_simulated_agent() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.database_url, "./.db/safeplate.db");
        assert_eq!(config.agent_mode, AgentMode::Simulated);
        assert_eq!(config.max_attempts, DEFAULT_MAX_ATTEMPTS);
        assert_eq!(config.airia.endpoint, DEFAULT_AIRIA_ENDPOINT);
        assert_eq!(config.airia.timeout_secs, 60);
    }

    #[test]
    fn test_api_key_switches_default_mode_to_airia() {
        let config = config_from(&[("AIRIA_API_KEY", "ak-test")]).unwrap();
        assert_eq!(config.agent_mode, AgentMode::Airia);
        assert_eq!(config.airia.api_key, "ak-test");
    }

    #[test]
    fn test_explicit_mode_wins() {
        let config = config_from(&[("AIRIA_API_KEY", "ak-test"), ("AGENT_MODE", "Simulated")]).unwrap();
        assert_eq!(config.agent_mode, AgentMode::Simulated);

        let config = config_from(&[("AGENT_MODE", "airia")]).unwrap();
        assert_eq!(config.agent_mode, AgentMode::Airia);
        assert!(config.airia.api_key.is_empty());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(config_from(&[("PORT", "eighty")]), Err(ConfigError::InvalidNumber { var: "PORT", .. })));
        assert!(matches!(config_from(&[("AGENT_MODE", "robot")]), Err(ConfigError::InvalidAgentMode(_))));
        assert!(matches!(
            config_from(&[("AIRIA_RECIPE_AGENT_ENDPOINT", "ftp://example.com")]),
            Err(ConfigError::InvalidEndpoint(_))
        ));
        assert!(matches!(config_from(&[("RECIPE_MAX_ATTEMPTS", "0")]), Err(ConfigError::ZeroAttempts)));
        assert!(matches!(config_from(&[("AIRIA_TIMEOUT_SECS", "0")]), Err(ConfigError::ZeroTimeout)));
        assert_eq!(config_from(&[("AIRIA_TIMEOUT_SECS", "15")]).unwrap().airia.timeout_secs, 15);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "  "), ("RECIPE_MAX_ATTEMPTS", "5")]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.max_attempts, 5);
    }
}
