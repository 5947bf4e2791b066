//! Prompt sent to the chef agent

use super::RecipeCriteria;

/// Build the strict JSON-only instruction for the chef agent.
///
/// `previous_error` is included when an earlier attempt was rejected so the
/// chef can avoid repeating it.
pub fn build_strict_prompt(criteria: &RecipeCriteria, previous_error: Option<&str>) -> String {
    let mut instruction = format!(
        "INSTRUCTION: You are ONLY a recipe-generation model. \
         DO NOT introduce yourself or output any explanations or greetings. \
         OUTPUT ONLY a single JSON object with keys: recipe_name, recipe_text.\n\n\
         User inputs:\n\
         cuisine: {}\n\
         allergies: {}\n\
         ingredients: {}\n",
        criteria.cuisine, criteria.allergies, criteria.ingredients
    );

    if let Some(err) = previous_error.map(str::trim).filter(|e| !e.is_empty()) {
        instruction.push_str(&format!("previous_error: {}\n", err));
    }

    instruction.push_str(
        "Return one valid JSON object ONLY, exactly like this structure:\n\
         { \"recipe_name\": \"Title\", \"recipe_text\": \"Ingredients and instructions with \\n line breaks.\" }",
    );
    instruction
}

#[cfg(test)]
mod tests {
    use super::*;

    fn criteria() -> RecipeCriteria {
        RecipeCriteria {
            cuisine: "Italian".to_string(),
            allergies: "nuts".to_string(),
            ingredients: "chicken, tomatoes".to_string(),
        }
    }

    #[test]
    fn test_prompt_lists_inputs() {
        let prompt = build_strict_prompt(&criteria(), None);
        assert!(prompt.starts_with("INSTRUCTION:"));
        assert!(prompt.contains("cuisine: Italian\n"));
        assert!(prompt.contains("allergies: nuts\n"));
        assert!(prompt.contains("ingredients: chicken, tomatoes\n"));
        assert!(!prompt.contains("previous_error"));
        assert!(prompt.ends_with("line breaks.\" }"));
    }

    #[test]
    fn test_prompt_carries_previous_error() {
        let prompt = build_strict_prompt(&criteria(), Some("UNSAFE: contains pine nuts"));
        assert!(prompt.contains("previous_error: UNSAFE: contains pine nuts\n"));

        let blank = build_strict_prompt(&criteria(), Some("   "));
        assert!(!blank.contains("previous_error"));
    }
}
