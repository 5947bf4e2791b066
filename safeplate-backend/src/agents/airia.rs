//! Airia pipeline client
//!
//! Each attempt is one POST to the pipeline execution endpoint. The hosted
//! pipeline runs the chef and the inspector and answers with the recipe and
//! its safety verdict.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

use super::parse::parse_agent_output;
use super::prompt::build_strict_prompt;
use super::{AgentAttempt, AgentError, RecipeAgent, RecipeCriteria};
use crate::config::AiriaConfig;
use crate::http_retry::{is_reqwest_error_retryable, Backoff, MAX_BACKOFF_MS, MIN_BACKOFF_MS};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineExecutionRequest {
    pub user_id: String,
    pub user_input: String,
    pub async_output: bool,
}

#[derive(Clone)]
pub struct AiriaClient {
    client: Client,
    config: AiriaConfig,
    backoff_min_ms: u64,
    backoff_max_ms: u64,
}

/// Use the configured user id if it is a GUID, otherwise a fresh one
pub fn ensure_guid_or_generate(candidate: &str) -> String {
    let candidate = candidate.trim();
    if candidate.is_empty() {
        return Uuid::new_v4().to_string();
    }
    match Uuid::parse_str(candidate) {
        Ok(u) => u.to_string(),
        Err(_) => {
            log::warn!("[AIRIA] AIRIA_USER_ID is not a valid GUID; generating a new UUID for this request");
            Uuid::new_v4().to_string()
        }
    }
}

impl AiriaClient {
    pub fn new(config: AiriaConfig) -> Result<Self, AgentError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Client(e.to_string()))?;

        Ok(Self {
            client,
            config,
            backoff_min_ms: MIN_BACKOFF_MS,
            backoff_max_ms: MAX_BACKOFF_MS,
        })
    }

    /// Override the transport retry delays
    #[cfg(test)]
    pub fn with_backoff(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.backoff_min_ms = min_ms;
        self.backoff_max_ms = max_ms;
        self
    }

    pub fn build_request(&self, criteria: &RecipeCriteria, previous_error: Option<&str>) -> PipelineExecutionRequest {
        PipelineExecutionRequest {
            user_id: ensure_guid_or_generate(&self.config.user_id),
            user_input: build_strict_prompt(criteria, previous_error),
            async_output: false,
        }
    }

    /// Send the request, retrying transient failures with backoff
    pub async fn execute(&self, request: &PipelineExecutionRequest) -> Result<Value, AgentError> {
        if self.config.api_key.is_empty() {
            return Err(AgentError::MissingApiKey);
        }

        let mut backoff = Backoff::with_delays(
            self.config.transport_retries,
            self.backoff_min_ms,
            self.backoff_max_ms,
        );

        loop {
            match self.send_once(request).await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => match backoff.next_delay(&self.config.endpoint) {
                    Some(delay) => {
                        log::warn!("[AIRIA] Transient failure, retrying in {:?}: {}", delay, e);
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }
    }

    async fn send_once(&self, request: &PipelineExecutionRequest) -> Result<Value, AgentError> {
        log::info!("[AIRIA] Sending pipeline request to {}", self.config.endpoint);
        log::debug!(
            "[AIRIA] Full request:\n{}",
            serde_json::to_string_pretty(request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&self.config.endpoint)
            .header("X-API-KEY", &self.config.api_key)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if is_reqwest_error_retryable(&e) {
                    AgentError::Transport(e.to_string())
                } else {
                    AgentError::Client(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AgentError::Transport(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(AgentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        log::debug!("[AIRIA] Raw response:\n{}", body);

        serde_json::from_str(&body).map_err(|e| AgentError::Decode(format!("{} - body: {}", e, body)))
    }
}

#[async_trait]
impl RecipeAgent for AiriaClient {
    fn name(&self) -> &'static str {
        "airia"
    }

    async fn attempt(
        &self,
        criteria: &RecipeCriteria,
        attempt_number: u32,
        previous_error: Option<&str>,
    ) -> Result<AgentAttempt, AgentError> {
        let request = self.build_request(criteria, previous_error);
        let reply = self.execute(&request).await?;
        let attempt = parse_agent_output(&reply);

        log::info!(
            "[AIRIA] Attempt {} -> '{}' (safe: {})",
            attempt_number,
            attempt.recipe_name,
            attempt.is_safe
        );
        Ok(attempt)
    }
}
