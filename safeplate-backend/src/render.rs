//! HTML pages rendered with minijinja
//!
//! Templates are compiled into the binary; `.html` templates auto-escape.

use chrono::{DateTime, Utc};
use minijinja::{context, Environment};
use serde::Serialize;

use crate::forms::{FormErrors, RecipeRequestForm, ALLERGY_CHOICES, CUISINE_CHOICES};
use crate::models::{GeneratedRecipe, RecipeRequest, RequestSummary};
use crate::workflow::WorkflowOutcome;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("_attempts.html", include_str!("../templates/_attempts.html")),
    ("recipe_page.html", include_str!("../templates/recipe_page.html")),
    ("request_detail.html", include_str!("../templates/request_detail.html")),
    ("history.html", include_str!("../templates/history.html")),
    ("error.html", include_str!("../templates/error.html")),
];

#[derive(Debug, Serialize)]
struct ChoiceView {
    value: &'static str,
    label: &'static str,
    checked: bool,
}

#[derive(Debug, Serialize)]
struct ResultView<'a> {
    request_id: i64,
    request_label: String,
    final_recipe: Option<&'a GeneratedRecipe>,
    failure_message: Option<String>,
}

fn choices(options: &[(&'static str, &'static str)], selected: &[String]) -> Vec<ChoiceView> {
    options
        .iter()
        .map(|&(value, label)| ChoiceView {
            value,
            label,
            checked: selected.iter().any(|s| s.as_str() == value),
        })
        .collect()
}

/// `{{ value|datetime }}` - RFC 3339 timestamp to a short UTC string
fn datetime_filter(value: String) -> String {
    DateTime::parse_from_rfc3339(&value)
        .map(|dt| dt.with_timezone(&Utc).format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or(value)
}

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(*name, *source)?;
        }
        env.add_filter("datetime", datetime_filter);
        Ok(Self { env })
    }

    /// The form page, optionally with a workflow result below it
    pub fn recipe_page(
        &self,
        form: &RecipeRequestForm,
        errors: &FormErrors,
        outcome: Option<&WorkflowOutcome>,
    ) -> Result<String, minijinja::Error> {
        let result = outcome.map(|o| ResultView {
            request_id: o.request.id,
            request_label: o.request.to_string(),
            final_recipe: o.final_recipe(),
            failure_message: o.failure_message(),
        });
        let attempts: &[GeneratedRecipe] = outcome.map(|o| o.attempts.as_slice()).unwrap_or(&[]);

        self.env.get_template("recipe_page.html")?.render(context! {
            form => form,
            errors => errors,
            cuisine_choices => choices(CUISINE_CHOICES, &form.cuisine_choices),
            allergy_choices => choices(ALLERGY_CHOICES, &form.allergy_choices),
            result => result,
            attempts => attempts,
        })
    }

    pub fn request_detail(
        &self,
        request: &RecipeRequest,
        attempts: &[GeneratedRecipe],
    ) -> Result<String, minijinja::Error> {
        let final_recipe = attempts.iter().find(|a| a.accepted);
        self.env.get_template("request_detail.html")?.render(context! {
            request => request,
            request_label => request.to_string(),
            final_recipe => final_recipe,
            attempts => attempts,
        })
    }

    pub fn history(&self, summaries: &[RequestSummary]) -> Result<String, minijinja::Error> {
        self.env
            .get_template("history.html")?
            .render(context! { summaries => summaries })
    }

    pub fn error_page(&self, title: &str, message: &str) -> Result<String, minijinja::Error> {
        self.env
            .get_template("error.html")?
            .render(context! { title => title, message => message })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::WorkflowStatus;

    fn request() -> RecipeRequest {
        RecipeRequest {
            id: 7,
            cuisine: "Italian".to_string(),
            allergies: "nuts".to_string(),
            ingredients: "pasta".to_string(),
            created_at: Utc::now(),
        }
    }

    fn attempt(number: u32, name: &str, is_safe: bool, accepted: bool) -> GeneratedRecipe {
        GeneratedRecipe {
            id: number as i64,
            request_id: 7,
            attempt_number: number,
            recipe_name: name.to_string(),
            recipe_text: "Step one.\nStep two.".to_string(),
            is_safe,
            safety_notes: if is_safe { "ok".to_string() } else { "UNSAFE: pine nuts".to_string() },
            accepted,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_form_page() {
        let templates = Templates::new().unwrap();
        let html = templates
            .recipe_page(&RecipeRequestForm::default(), &FormErrors::default(), None)
            .unwrap();

        assert!(html.contains("name=\"cuisine_choices\" value=\"italian\""));
        assert!(html.contains("Shellfish"));
        assert!(html.contains("Available Ingredients"));
        assert!(!html.contains("class=\"result\""));
        assert!(!html.contains("class=\"errors\""));
    }

    #[test]
    fn test_form_keeps_input_and_shows_errors() {
        let templates = Templates::new().unwrap();
        let form = RecipeRequestForm::from_pairs([("cuisine_choices", "thai"), ("cuisine_other", "<b>Fusion</b>")]);
        let mut errors = FormErrors::default();
        errors.add("__all__", "Please select or enter a maximum of 2 cuisines in total.");

        let html = templates.recipe_page(&form, &errors, None).unwrap();
        assert!(html.contains("value=\"thai\" checked"));
        assert!(!html.contains("value=\"italian\" checked"));
        assert!(html.contains("maximum of 2 cuisines in total"));
        // Escaped, not injected
        assert!(html.contains("&lt;b&gt;Fusion"));
        assert!(!html.contains("<b>Fusion"));
    }

    #[test]
    fn test_rejected_form_keeps_free_text_aliases() {
        let templates = Templates::new().unwrap();
        let form = RecipeRequestForm::from_pairs([
            ("cuisine_choices", "italian"),
            ("cuisine_choices", "thai"),
            ("cuisine", "Ethiopian"),
            ("allergies", "kiwi, \"mango\""),
        ]);
        let errors = form.validate().unwrap_err();

        let html = templates.recipe_page(&form, &errors, None).unwrap();
        assert!(html.contains("name=\"cuisine\" value=\"Ethiopian\""));
        assert!(html.contains("name=\"allergies\" value=\"kiwi, &quot;mango&quot;\""));

        let blank = templates
            .recipe_page(&RecipeRequestForm::default(), &FormErrors::default(), None)
            .unwrap();
        assert!(!blank.contains("name=\"cuisine\""));
        assert!(!blank.contains("name=\"allergies\""));
    }

    #[test]
    fn test_result_lists_attempts_in_order() {
        let templates = Templates::new().unwrap();
        let safe = attempt(2, "Safe Italian Delight", true, true);
        let outcome = WorkflowOutcome {
            request: request(),
            attempts: vec![attempt(1, "Pesto Pasta", false, false), safe.clone()],
            status: WorkflowStatus::Accepted { final_attempt: safe },
        };

        let html = templates
            .recipe_page(&RecipeRequestForm::default(), &FormErrors::default(), Some(&outcome))
            .unwrap();

        let first = html.find("#1 Pesto Pasta").unwrap();
        let second = html.find("#2 Safe Italian Delight").unwrap();
        assert!(first < second);
        assert!(html.contains("Attempts (2)"));
        assert!(html.contains("Inspector: UNSAFE: pine nuts"));
        assert!(html.contains("/requests/7"));
        assert!(!html.contains("class=\"failure\""));
    }

    #[test]
    fn test_failure_message_rendered() {
        let templates = Templates::new().unwrap();
        let outcome = WorkflowOutcome {
            request: request(),
            attempts: vec![attempt(1, "Pesto Pasta", false, false)],
            status: WorkflowStatus::Exhausted { max_attempts: 1 },
        };

        let html = templates
            .recipe_page(&RecipeRequestForm::default(), &FormErrors::default(), Some(&outcome))
            .unwrap();
        assert!(html.contains("Could not generate a safe recipe after 1 attempt."));
    }

    #[test]
    fn test_datetime_filter() {
        assert_eq!(datetime_filter("2026-10-19T08:30:00+00:00".to_string()), "2026-10-19 08:30 UTC");
        assert_eq!(datetime_filter("yesterday".to_string()), "yesterday");
    }
}
