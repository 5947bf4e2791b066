use thiserror::Error;

use crate::http_retry::is_retryable_status;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error("AIRIA_API_KEY not set in environment.")]
    MissingApiKey,

    #[error("Agent request failed: {0}")]
    Transport(String),

    #[error("Agent returned error status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode agent JSON response: {0}")]
    Decode(String),

    #[error("Failed to create agent client: {0}")]
    Client(String),
}

impl AgentError {
    /// Whether the same request may succeed if sent again shortly
    pub fn is_transient(&self) -> bool {
        match self {
            AgentError::Transport(_) => true,
            AgentError::Status { status, .. } => is_retryable_status(*status),
            AgentError::MissingApiKey | AgentError::Decode(_) | AgentError::Client(_) => false,
        }
    }
}
