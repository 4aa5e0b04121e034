//! Configuration for the mission-agent chat client.
//!
//! Configuration resolves in three layers, later layers overriding earlier
//! ones:
//!
//! 1. Built-in defaults (model deployment, record names, docs directory)
//! 2. An optional TOML settings file (`mission-agent.toml` in the working
//!    directory, or a path passed to [`AgentChatConfig::from_file`])
//! 3. Process environment variables (`MISSION_AGENT_*`)
//!
//! The endpoint and API key have no defaults: the endpoint is validated at
//! load time, while a missing API key only fails when the client is built, so
//! offline paths (tests, `--help`) never need credentials.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use crate::error::AgentError;
use crate::Result;

/// Environment variable names recognized by [`AgentChatConfig::load`].
pub const ENV_ENDPOINT: &str = "MISSION_AGENT_ENDPOINT";
pub const ENV_API_KEY: &str = "MISSION_AGENT_API_KEY";
pub const ENV_MODEL: &str = "MISSION_AGENT_MODEL";
pub const ENV_WEBSEARCH_CONNECTION: &str = "MISSION_AGENT_WEBSEARCH_CONNECTION";
pub const ENV_DOCS_DIR: &str = "MISSION_AGENT_DOCS_DIR";
pub const ENV_API_VERSION: &str = "MISSION_AGENT_API_VERSION";

/// Default settings file looked up in the working directory.
pub const DEFAULT_SETTINGS_FILE: &str = "mission-agent.toml";

/// Configuration for one chat client instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentChatConfig {
    /// Base URL of the hosted agents project endpoint
    #[serde(default)]
    pub endpoint: String,
    /// API key or bearer token for the service
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// API version sent as a query parameter on every request
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Model deployment the agent is created with
    #[serde(default = "default_model")]
    pub model_deployment: String,
    /// Name of the server-side agent record (lookup-or-create key)
    #[serde(default = "default_agent_name")]
    pub agent_name: String,
    /// Name of the vector store backing document search
    #[serde(default = "default_vector_store_name")]
    pub vector_store_name: String,
    /// Named service connection for web-search grounding; None disables the tool
    #[serde(default)]
    pub web_search_connection: Option<String>,
    /// Local folder scanned (non-recursively) for documents to index
    #[serde(default = "default_docs_dir")]
    pub docs_dir: PathBuf,
    /// Request timeout in seconds for non-streaming calls
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_version() -> String {
    "2025-05-01".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_agent_name() -> String {
    "mars-mission-agent".to_string()
}

fn default_vector_store_name() -> String {
    "mars-mission-docs".to_string()
}

fn default_docs_dir() -> PathBuf {
    PathBuf::from("data/mars_docs")
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for AgentChatConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: None,
            api_version: default_api_version(),
            model_deployment: default_model(),
            agent_name: default_agent_name(),
            vector_store_name: default_vector_store_name(),
            web_search_connection: None,
            docs_dir: default_docs_dir(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl AgentChatConfig {
    /// Load configuration: defaults, then `mission-agent.toml` if present,
    /// then environment overrides. Validates before returning.
    pub fn load() -> Result<Self> {
        let mut config = if Path::new(DEFAULT_SETTINGS_FILE).exists() {
            Self::from_file(DEFAULT_SETTINGS_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML settings file (no env overrides).
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            AgentError::configuration(format!(
                "failed to read settings file {}: {}",
                path.display(),
                e
            ))
        })?;
        toml::from_str(&content).map_err(|e| {
            AgentError::configuration(format!(
                "failed to parse settings file {}: {}",
                path.display(),
                e
            ))
        })
    }

    /// Apply `MISSION_AGENT_*` environment variables over the current values.
    pub fn apply_env_overrides(&mut self) {
        if let Some(endpoint) = env_string(ENV_ENDPOINT) {
            self.endpoint = endpoint;
        }
        if let Some(key) = env_string(ENV_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(model) = env_string(ENV_MODEL) {
            self.model_deployment = model;
        }
        if let Some(connection) = env_string(ENV_WEBSEARCH_CONNECTION) {
            self.web_search_connection = Some(connection);
        }
        if let Some(dir) = env_string(ENV_DOCS_DIR) {
            self.docs_dir = PathBuf::from(dir);
        }
        if let Some(version) = env_string(ENV_API_VERSION) {
            self.api_version = version;
        }
    }

    /// Validate that the parts needed before any request are coherent.
    pub fn validate(&self) -> Result<()> {
        if self.endpoint.trim().is_empty() {
            return Err(AgentError::configuration(format!(
                "no service endpoint configured (set {} or `endpoint` in {})",
                ENV_ENDPOINT, DEFAULT_SETTINGS_FILE
            )));
        }
        url::Url::parse(&self.endpoint).map_err(|e| {
            AgentError::configuration(format!("invalid endpoint URL '{}': {}", self.endpoint, e))
        })?;
        if self.model_deployment.trim().is_empty() {
            return Err(AgentError::configuration("model deployment name is empty"));
        }
        if self.agent_name.trim().is_empty() {
            return Err(AgentError::configuration("agent name is empty"));
        }
        Ok(())
    }

    /// Request timeout as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn env_string(name: &str) -> Option<String> {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => Some(value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = AgentChatConfig::default();
        assert_eq!(config.model_deployment, "gpt-4o");
        assert_eq!(config.agent_name, "mars-mission-agent");
        assert_eq!(config.vector_store_name, "mars-mission-docs");
        assert_eq!(config.docs_dir, PathBuf::from("data/mars_docs"));
        assert!(config.web_search_connection.is_none());
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout(), Duration::from_secs(120));
    }

    #[test]
    fn test_validate_requires_endpoint() {
        let config = AgentChatConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.is_user_error());
        assert!(err.to_string().contains(ENV_ENDPOINT));
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let config = AgentChatConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_https_endpoint() {
        let config = AgentChatConfig {
            endpoint: "https://example.services.ai.azure.com/api/projects/demo".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
endpoint = "https://example.test/project"
model_deployment = "gpt-4o-mini"
web_search_connection = "bing-grounding"
docs_dir = "docs/mars"
"#
        )
        .unwrap();

        let config = AgentChatConfig::from_file(file.path()).unwrap();
        assert_eq!(config.endpoint, "https://example.test/project");
        assert_eq!(config.model_deployment, "gpt-4o-mini");
        assert_eq!(
            config.web_search_connection.as_deref(),
            Some("bing-grounding")
        );
        assert_eq!(config.docs_dir, PathBuf::from("docs/mars"));
        // Untouched fields keep their defaults
        assert_eq!(config.agent_name, "mars-mission-agent");
    }

    #[test]
    fn test_from_file_missing() {
        let err = AgentChatConfig::from_file("/nonexistent/mission-agent.toml").unwrap_err();
        assert!(matches!(err, AgentError::ConfigurationError { .. }));
    }

    #[test]
    fn test_env_overrides() {
        // Unique variable names keep this test independent of the process env.
        env::set_var(ENV_MODEL, "gpt-4.1");
        env::set_var(ENV_DOCS_DIR, "/tmp/mars-docs");
        env::set_var(ENV_WEBSEARCH_CONNECTION, "");

        let mut config = AgentChatConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.model_deployment, "gpt-4.1");
        assert_eq!(config.docs_dir, PathBuf::from("/tmp/mars-docs"));
        // Empty values are ignored rather than clearing the field
        assert!(config.web_search_connection.is_none());

        env::remove_var(ENV_MODEL);
        env::remove_var(ENV_DOCS_DIR);
        env::remove_var(ENV_WEBSEARCH_CONNECTION);
    }
}
