//! Recipe agents - the chef + inspector pair that produces attempts
//!
//! A `RecipeAgent` answers one attempt at a time: a recipe and the safety
//! verdict on it. The hosted Airia pipeline does both in one round trip; the
//! simulated agent runs a local chef and inspector for offline use.

pub mod airia;
pub mod error;
pub mod parse;
pub mod prompt;
pub mod simulated;

pub use airia::AiriaClient;
pub use error::AgentError;
pub use simulated::SimulatedAgent;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::{AgentMode, Config};
use crate::models::{split_list, RecipeRequest};

/// The criteria an agent works from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeCriteria {
    pub cuisine: String,
    pub allergies: String,
    pub ingredients: String,
}

impl RecipeCriteria {
    /// Allergies as lowercase entries
    pub fn allergy_list(&self) -> Vec<String> {
        split_list(&self.allergies).into_iter().map(|a| a.to_lowercase()).collect()
    }

    pub fn ingredient_list(&self) -> Vec<String> {
        split_list(&self.ingredients)
    }
}

impl From<&RecipeRequest> for RecipeCriteria {
    fn from(request: &RecipeRequest) -> Self {
        Self {
            cuisine: request.cuisine.clone(),
            allergies: request.allergies.clone(),
            ingredients: request.ingredients.clone(),
        }
    }
}

/// One chef recipe plus the inspector's verdict
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentAttempt {
    pub recipe_name: String,
    pub recipe_text: String,
    pub is_safe: bool,
    pub safety_notes: String,
}

impl AgentAttempt {
    pub fn new(recipe_name: &str, recipe_text: &str, is_safe: bool, safety_notes: &str) -> Self {
        Self {
            recipe_name: recipe_name.to_string(),
            recipe_text: recipe_text.to_string(),
            is_safe,
            safety_notes: safety_notes.to_string(),
        }
    }
}

#[async_trait]
pub trait RecipeAgent: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Produce attempt number `attempt_number` (1-based). `previous_error` carries the
    /// inspector notes of the last unsafe attempt so the chef can correct itself.
    async fn attempt(
        &self,
        criteria: &RecipeCriteria,
        attempt_number: u32,
        previous_error: Option<&str>,
    ) -> Result<AgentAttempt, AgentError>;
}

/// Build the agent selected by configuration
pub fn create_agent(config: &Config) -> Result<Arc<dyn RecipeAgent>, AgentError> {
    match config.agent_mode {
        AgentMode::Airia => {
            if config.airia.api_key.is_empty() {
                log::warn!("[AGENTS] AGENT_MODE=airia but AIRIA_API_KEY is not set; requests will fail");
            }
            Ok(Arc::new(AiriaClient::new(config.airia.clone())?))
        }
        AgentMode::Simulated => Ok(Arc::new(SimulatedAgent::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criteria_lists() {
        let criteria = RecipeCriteria {
            cuisine: "Italian".to_string(),
            allergies: "  NUTS  ,  Dairy  ,".to_string(),
            ingredients: "chicken, tomatoes, basil".to_string(),
        };
        assert_eq!(criteria.allergy_list(), vec!["nuts", "dairy"]);
        assert_eq!(criteria.ingredient_list(), vec!["chicken", "tomatoes", "basil"]);
        assert!(RecipeCriteria::default().allergy_list().is_empty());
    }
}
