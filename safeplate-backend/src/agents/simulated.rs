//! Local stand-in for the hosted chef + inspector pipeline
//!
//! The chef deliberately produces an unsafe pesto on the first try when a
//! nut allergy is listed, so the inspector and the retry path are exercised
//! without any network access.

use async_trait::async_trait;

use super::{AgentAttempt, AgentError, RecipeAgent, RecipeCriteria};

/// Ingredient keywords that conflict with each known allergy.
/// Every allergy is also matched on its own name.
const ALLERGEN_KEYWORDS: &[(&str, &[&str])] = &[
    (
        "nuts",
        &["pine nuts", "walnut", "almond", "cashew", "pecan", "hazelnut", "pistachio", "macadamia"],
    ),
    ("peanuts", &["peanut"]),
    ("dairy", &["milk", "cheese", "butter", "cream", "yogurt", "parmesan"]),
    ("eggs", &["egg", "mayonnaise"]),
    ("soy", &["soy", "tofu", "edamame", "miso"]),
    ("wheat", &["wheat", "flour", "bread", "couscous"]),
    ("shellfish", &["shrimp", "prawn", "crab", "lobster", "scallop", "mussel", "clam"]),
    ("fish", &["salmon", "tuna", "cod", "anchov", "fish sauce"]),
    ("sesame", &["sesame", "tahini"]),
    ("garlic", &["garlic"]),
    ("onion", &["onion", "shallot"]),
];

pub const DEFAULT_INGREDIENTS: &str = "seasonal vegetables";

#[derive(Debug, Default, Clone)]
pub struct SimulatedAgent;

impl SimulatedAgent {
    pub fn new() -> Self {
        Self
    }
}

fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Chef role: produce a recipe for the criteria
pub fn simulate_chef(criteria: &RecipeCriteria, attempt_number: u32) -> AgentAttempt {
    let allergies = criteria.allergy_list();

    // First attempt ignores a nut allergy on purpose; plain substring match, so "coconuts" counts
    if attempt_number == 1 && allergies.iter().any(|a| a.contains("nuts")) {
        return AgentAttempt::new(
            "Pesto Pasta",
            "Ingredients: pasta, fresh basil, pine nuts, olive oil, salt.\n\
             1. Blend basil, pine nuts and olive oil into a pesto.\n\
             2. Toss the pesto with freshly cooked pasta and serve.",
            false,
            "",
        );
    }

    let cuisine = title_case(criteria.cuisine.trim());
    let recipe_name = if cuisine.is_empty() {
        "Safe Delight".to_string()
    } else {
        format!("Safe {} Delight", cuisine)
    };

    let ingredients = criteria.ingredient_list();
    let ingredients = if ingredients.is_empty() {
        DEFAULT_INGREDIENTS.to_string()
    } else {
        ingredients.join(", ")
    };

    let recipe_text = format!(
        "Ingredients: {}, olive oil, salt, pepper.\n\
         1. Prepare {} and season with salt and pepper.\n\
         2. Cook everything in olive oil over medium heat until tender.\n\
         3. Plate and serve warm.",
        ingredients, ingredients
    );

    AgentAttempt::new(&recipe_name, &recipe_text, false, "")
}

/// Inspector role: check a recipe against the listed allergies
pub fn simulate_inspector(recipe_name: &str, recipe_text: &str, allergies: &str) -> (bool, String) {
    let allergies = RecipeCriteria {
        allergies: allergies.to_string(),
        ..Default::default()
    }
    .allergy_list();
    if allergies.is_empty() {
        return (true, "No allergy restrictions specified. Recipe is safe.".to_string());
    }

    let haystack = format!("{}\n{}", recipe_name, recipe_text).to_lowercase();

    for allergy in &allergies {
        // "tree nuts" and "coconuts" pick up the nut keywords too
        let mut keywords: Vec<&str> = ALLERGEN_KEYWORDS
            .iter()
            .filter(|(name, _)| allergy.contains(*name))
            .flat_map(|(_, words)| words.iter().copied())
            .collect();
        keywords.push(allergy.as_str());

        if let Some(hit) = keywords.iter().find(|k| haystack.contains(*k)) {
            return (
                false,
                format!("UNSAFE: recipe contains '{}', which conflicts with the '{}' allergy.", hit, allergy),
            );
        }
    }

    (
        true,
        format!("Recipe is safe for the listed allergies: {}.", allergies.join(", ")),
    )
}

#[async_trait]
impl RecipeAgent for SimulatedAgent {
    fn name(&self) -> &'static str {
        "simulated"
    }

    async fn attempt(
        &self,
        criteria: &RecipeCriteria,
        attempt_number: u32,
        previous_error: Option<&str>,
    ) -> Result<AgentAttempt, AgentError> {
        if let Some(err) = previous_error {
            log::debug!("[SIMULATED] Attempt {} after rejection: {}", attempt_number, err);
        }

        let mut attempt = simulate_chef(criteria, attempt_number);
        let (is_safe, notes) = simulate_inspector(&attempt.recipe_name, &attempt.recipe_text, &criteria.allergies);
        attempt.is_safe = is_safe;
        attempt.safety_notes = notes;
        Ok(attempt)
    }
}
