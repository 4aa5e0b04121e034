//! Error handling for the mission-agent crate.
//!
//! Every fallible operation in this crate returns [`AgentError`]. Variants are
//! grouped by where the failure originates:
//!
//! - **Configuration** - missing or malformed settings before any request is made
//! - **Auth / Service / ResourceNotFound** - responses from the agents platform
//! - **Network / Stream** - transport failures before or during a streamed run
//! - **Tool** - local function-tool dispatch problems
//!
//! There is no retry machinery here: failures from the service propagate to
//! the caller, and the two deliberate degrade paths (an unresolvable
//! web-search connection, an absent documents folder) are handled where they
//! occur, not here.

use thiserror::Error;

/// Main error type for the mission-agent crate.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Configuration errors (endpoint, credentials, settings file)
    #[error("Configuration error: {message}")]
    ConfigurationError { message: String },

    /// The service rejected our credentials
    #[error("Authentication error: {message}")]
    AuthError { message: String },

    /// The service returned a non-success status
    #[error("Service error ({status}): {message}")]
    ServiceError { status: u16, message: String },

    /// A named record (agent, thread, vector store, connection) does not exist
    #[error("Resource not found: {message}")]
    ResourceNotFound { message: String },

    /// Transport-level failures talking to the service
    #[error("Network error: {message}")]
    NetworkError { message: String },

    /// The run event stream broke or reported a failed run
    #[error("Stream error: {message}")]
    StreamError { message: String },

    /// Local function-tool dispatch failures
    #[error("Tool error: {message}")]
    ToolError { message: String },

    /// JSON encode/decode failures
    #[error("Serialization error: {message}")]
    SerializationError { message: String },

    /// Local filesystem failures (document folder scan, settings file)
    #[error("IO error: {message}")]
    IoError { message: String },
}

impl AgentError {
    pub fn configuration(message: impl Into<String>) -> Self {
        AgentError::ConfigurationError {
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        AgentError::AuthError {
            message: message.into(),
        }
    }

    pub fn service(status: u16, message: impl Into<String>) -> Self {
        AgentError::ServiceError {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AgentError::ResourceNotFound {
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        AgentError::NetworkError {
            message: message.into(),
        }
    }

    pub fn stream(message: impl Into<String>) -> Self {
        AgentError::StreamError {
            message: message.into(),
        }
    }

    pub fn tool(message: impl Into<String>) -> Self {
        AgentError::ToolError {
            message: message.into(),
        }
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        AgentError::SerializationError {
            message: message.into(),
        }
    }

    pub fn io(message: impl Into<String>) -> Self {
        AgentError::IoError {
            message: message.into(),
        }
    }

    /// True when the failure is a credentials/permissions problem.
    pub fn is_auth_error(&self) -> bool {
        matches!(self, AgentError::AuthError { .. })
            || matches!(self, AgentError::ServiceError { status, .. } if *status == 401 || *status == 403)
    }

    /// True when the failure is caused by local input rather than the service.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AgentError::ConfigurationError { .. } | AgentError::ToolError { .. }
        )
    }
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        AgentError::NetworkError {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for AgentError {
    fn from(err: serde_json::Error) -> Self {
        AgentError::SerializationError {
            message: err.to_string(),
        }
    }
}

impl From<std::io::Error> for AgentError {
    fn from(err: std::io::Error) -> Self {
        AgentError::IoError {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AgentError::service(503, "service unavailable");
        assert_eq!(err.to_string(), "Service error (503): service unavailable");

        let err = AgentError::configuration("missing endpoint");
        assert_eq!(err.to_string(), "Configuration error: missing endpoint");
    }

    #[test]
    fn test_auth_classification() {
        assert!(AgentError::auth("bad token").is_auth_error());
        assert!(AgentError::service(401, "unauthorized").is_auth_error());
        assert!(AgentError::service(403, "forbidden").is_auth_error());
        assert!(!AgentError::service(500, "boom").is_auth_error());
        assert!(!AgentError::network("refused").is_auth_error());
    }

    #[test]
    fn test_user_error_classification() {
        assert!(AgentError::configuration("no key").is_user_error());
        assert!(AgentError::tool("bad args").is_user_error());
        assert!(!AgentError::stream("cut off").is_user_error());
    }

    #[test]
    fn test_from_serde_json() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err: AgentError = parse_err.into();
        assert!(matches!(err, AgentError::SerializationError { .. }));
    }
}
