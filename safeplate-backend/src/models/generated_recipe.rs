use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One chef attempt and the inspector's verdict on it
///
/// Rows are append-only; `accepted` flips to true at most once per request,
/// on the safe attempt that ended the workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedRecipe {
    pub id: i64,
    pub request_id: i64,
    /// 1-based position within the request's attempts
    pub attempt_number: u32,
    pub recipe_name: String,
    pub recipe_text: String,
    pub is_safe: bool,
    pub safety_notes: String,
    pub accepted: bool,
    pub created_at: DateTime<Utc>,
}

impl GeneratedRecipe {
    pub fn verdict(&self) -> &'static str {
        if self.is_safe { "Safe" } else { "Unsafe" }
    }
}

impl fmt::Display for GeneratedRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.recipe_name, self.verdict())
    }
}
