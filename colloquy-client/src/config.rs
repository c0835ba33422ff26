//! Configuration for the service client.

use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Base URL of the orchestration service, e.g. `https://api.example.com`.
    pub api_base_url: String,
    /// Agent (model) name sent with chat completions.
    pub agent: String,
    pub auth: AuthConfig,
    pub request_timeout_ms: u64,
    #[serde(default)]
    pub poll: PollSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthConfig {
    pub api_key: Option<String>,
    pub jwt: Option<String>,
}

/// Poll cadence in milliseconds. Short while the agent owes a reply, long
/// once it has answered.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PollSettings {
    pub awaiting_agent_ms: u64,
    pub idle_ms: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            awaiting_agent_ms: 1_000,
            idle_ms: 5_000,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ClientConfig {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if self.agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "agent",
                reason: "must not be empty".to_string(),
            });
        }
        if self.auth.api_key.is_none() && self.auth.jwt.is_none() {
            return Err(ConfigError::InvalidValue {
                field: "auth",
                reason: "api_key or jwt must be provided".to_string(),
            });
        }
        if self.request_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "request_timeout_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.poll.awaiting_agent_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "poll.awaiting_agent_ms",
                reason: "must be > 0".to_string(),
            });
        }
        if self.poll.idle_ms < self.poll.awaiting_agent_ms {
            return Err(ConfigError::InvalidValue {
                field: "poll.idle_ms",
                reason: "must be >= poll.awaiting_agent_ms".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ClientConfig {
        ClientConfig {
            api_base_url: "http://localhost:7437".to_string(),
            agent: "default".to_string(),
            auth: AuthConfig {
                api_key: None,
                jwt: Some("token".to_string()),
            },
            request_timeout_ms: 5_000,
            poll: PollSettings::default(),
        }
    }

    #[test]
    fn valid_config_passes() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn config_requires_auth() {
        let mut config = base_config();
        config.auth = AuthConfig {
            api_key: None,
            jwt: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_rejects_idle_shorter_than_awaiting() {
        let mut config = base_config();
        config.poll = PollSettings {
            awaiting_agent_ms: 5_000,
            idle_ms: 1_000,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_parses_from_toml() {
        let parsed: ClientConfig = toml::from_str(
            r#"
            api_base_url = "http://localhost:7437"
            agent = "default"
            request_timeout_ms = 5000

            [auth]
            jwt = "token"

            [poll]
            awaiting_agent_ms = 1000
            idle_ms = 5000
            "#,
        )
        .unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.poll.idle_ms, 5_000);
    }
}
