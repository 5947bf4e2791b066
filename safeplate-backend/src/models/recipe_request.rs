use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Criteria a user submitted through the recipe form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeRequest {
    pub id: i64,
    /// Combined cuisine selection, comma-separated; blank means any cuisine
    pub cuisine: String,
    /// Comma-separated list of allergies
    pub allergies: String,
    /// Comma-separated list of ingredients
    pub ingredients: String,
    pub created_at: DateTime<Utc>,
}

impl fmt::Display for RecipeRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cuisine.trim().is_empty() {
            write!(f, "Recipe Request for any cuisine")
        } else {
            write!(f, "Recipe Request for {}", self.cuisine)
        }
    }
}

/// Row for the history page: a request plus how its workflow ended
#[derive(Debug, Clone, Serialize)]
pub struct RequestSummary {
    pub request: RecipeRequest,
    pub attempt_count: u32,
    pub accepted_recipe_name: Option<String>,
}

/// Split a comma-separated field into trimmed, non-empty entries
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(cuisine: &str, allergies: &str, ingredients: &str) -> RecipeRequest {
        RecipeRequest {
            id: 1,
            cuisine: cuisine.to_string(),
            allergies: allergies.to_string(),
            ingredients: ingredients.to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_display_names_cuisine() {
        assert_eq!(request("Mexican", "shellfish", "beef, peppers").to_string(), "Recipe Request for Mexican");
    }

    #[test]
    fn test_display_blank_cuisine() {
        assert_eq!(request("", "", "").to_string(), "Recipe Request for any cuisine");
        assert_eq!(request("   ", "", "").to_string(), "Recipe Request for any cuisine");
    }

    #[test]
    fn test_split_list_trims_entries() {
        assert_eq!(split_list("  nuts  ,  dairy  ,"), vec!["nuts", "dairy"]);
        assert!(split_list(" , ").is_empty());
    }
}
