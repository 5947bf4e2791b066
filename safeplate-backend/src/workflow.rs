//! Safe recipe workflow - the bounded chef/inspector retry loop
//!
//! pending -> attempt -> safe | unsafe
//!   safe   -> accept the attempt, done
//!   unsafe -> retry with the inspector notes, until the attempt limit
//!
//! Every attempt is persisted before the next one starts, so a failure part
//! way through still leaves the earlier attempts on record.

use rusqlite::Result as SqliteResult;
use serde::Serialize;

use crate::agents::{AgentError, RecipeAgent, RecipeCriteria};
use crate::db::Database;
use crate::models::{GeneratedRecipe, RecipeRequest};

/// Fed back to the chef when the inspector rejected an attempt without notes
const GENERIC_REJECTION: &str = "The previous recipe was rejected by the safety inspector.";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WorkflowStatus {
    Accepted { final_attempt: GeneratedRecipe },
    Exhausted { max_attempts: u32 },
    AgentUnavailable { message: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowOutcome {
    pub request: RecipeRequest,
    /// All attempts in attempt order
    pub attempts: Vec<GeneratedRecipe>,
    pub status: WorkflowStatus,
}

impl WorkflowOutcome {
    pub fn final_recipe(&self) -> Option<&GeneratedRecipe> {
        match &self.status {
            WorkflowStatus::Accepted { final_attempt } => Some(final_attempt),
            _ => None,
        }
    }

    /// Message shown to the user when no safe recipe was produced
    pub fn failure_message(&self) -> Option<String> {
        match &self.status {
            WorkflowStatus::Accepted { .. } => None,
            WorkflowStatus::Exhausted { max_attempts } => Some(format!(
                "Could not generate a safe recipe after {} attempt{}.",
                max_attempts,
                if *max_attempts == 1 { "" } else { "s" }
            )),
            WorkflowStatus::AgentUnavailable { message } => {
                Some(format!("The recipe service is unavailable: {}", message))
            }
        }
    }
}

pub struct RecipeWorkflow<'a> {
    db: &'a Database,
    agent: &'a dyn RecipeAgent,
    max_attempts: u32,
}

impl<'a> RecipeWorkflow<'a> {
    pub fn new(db: &'a Database, agent: &'a dyn RecipeAgent, max_attempts: u32) -> Self {
        Self {
            db,
            agent,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Run attempts for a stored request until one is safe or the limit is reached.
    ///
    /// Agent failures end the run with `AgentUnavailable`; only database errors are returned as `Err`.
    pub async fn run(&self, request: RecipeRequest) -> SqliteResult<WorkflowOutcome> {
        let criteria = RecipeCriteria::from(&request);
        let mut attempts: Vec<GeneratedRecipe> = Vec::new();
        let mut previous_error: Option<String> = None;

        for attempt_number in 1..=self.max_attempts {
            let attempt = match self
                .agent
                .attempt(&criteria, attempt_number, previous_error.as_deref())
                .await
            {
                Ok(attempt) => attempt,
                Err(e) => {
                    log::error!(
                        "[WORKFLOW] Request {} attempt {} via {} failed: {}",
                        request.id,
                        attempt_number,
                        self.agent.name(),
                        e
                    );
                    return Ok(WorkflowOutcome {
                        request,
                        attempts,
                        status: WorkflowStatus::AgentUnavailable {
                            message: user_message(&e),
                        },
                    });
                }
            };

            let mut recorded = self.db.record_attempt(request.id, &attempt)?;
            log::info!(
                "[WORKFLOW] Request {} attempt {}: '{}' ({})",
                request.id,
                recorded.attempt_number,
                recorded.recipe_name,
                recorded.verdict()
            );

            if recorded.is_safe {
                if !self.db.accept_attempt(recorded.id)? {
                    // Another attempt was already accepted for this request; keep that one
                    log::warn!("[WORKFLOW] Request {} already has an accepted attempt", request.id);
                    attempts.push(recorded);
                    let attempts = self.db.list_attempts(request.id)?;
                    let final_attempt = self.db.get_accepted_attempt(request.id)?;
                    return Ok(match final_attempt {
                        Some(final_attempt) => WorkflowOutcome {
                            request,
                            attempts,
                            status: WorkflowStatus::Accepted { final_attempt },
                        },
                        None => WorkflowOutcome {
                            request,
                            attempts,
                            status: WorkflowStatus::Exhausted {
                                max_attempts: self.max_attempts,
                            },
                        },
                    });
                }
                recorded.accepted = true;
                attempts.push(recorded.clone());
                return Ok(WorkflowOutcome {
                    request,
                    attempts,
                    status: WorkflowStatus::Accepted {
                        final_attempt: recorded,
                    },
                });
            }

            previous_error = Some(if attempt.safety_notes.trim().is_empty() {
                GENERIC_REJECTION.to_string()
            } else {
                attempt.safety_notes.clone()
            });
            attempts.push(recorded);
        }

        log::warn!(
            "[WORKFLOW] Request {} exhausted {} attempts without a safe recipe",
            request.id,
            self.max_attempts
        );
        Ok(WorkflowOutcome {
            request,
            attempts,
            status: WorkflowStatus::Exhausted {
                max_attempts: self.max_attempts,
            },
        })
    }
}

fn user_message(error: &AgentError) -> String {
    match error {
        // Status bodies can be large HTML pages; keep the page readable
        AgentError::Status { status, .. } => format!("the agent service returned status {}", status),
        other => other.to_string(),
    }
}
