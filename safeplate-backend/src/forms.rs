//! Recipe request form - field collection and validation
//!
//! Cuisines and allergies come from checkbox groups plus free text. The
//! cleaned form joins them into the comma-separated strings stored on a
//! `RecipeRequest`. Every field may be blank; blank means "no filter".

use serde::Serialize;
use std::collections::BTreeMap;

pub const CUISINE_CHOICES: &[(&str, &str)] = &[
    ("italian", "Italian"),
    ("mexican", "Mexican"),
    ("chinese", "Chinese"),
    ("japanese", "Japanese"),
    ("indian", "Indian"),
    ("thai", "Thai"),
    ("french", "French"),
    ("american", "American"),
    ("mediterranean", "Mediterranean"),
    ("korean", "Korean"),
];

pub const ALLERGY_CHOICES: &[(&str, &str)] = &[
    ("nuts", "Nuts"),
    ("peanuts", "Peanuts"),
    ("dairy", "Dairy"),
    ("eggs", "Eggs"),
    ("soy", "Soy"),
    ("wheat", "Wheat/Gluten"),
    ("shellfish", "Shellfish"),
    ("fish", "Fish"),
    ("sesame", "Sesame"),
    ("garlic", "Garlic"),
    ("onion", "Onion"),
];

pub const MAX_CUISINES: usize = 2;
pub const CUISINE_OTHER_MAX_CHARS: usize = 200;
pub const ALLERGY_OTHER_MAX_CHARS: usize = 500;
/// Column limit for the combined cuisine string
pub const CUISINE_MAX_CHARS: usize = 100;

/// Key used for errors that belong to the form as a whole
pub const NON_FIELD_ERRORS: &str = "__all__";

/// Raw submitted values, kept so an invalid form can be re-rendered as typed
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecipeRequestForm {
    pub cuisine_choices: Vec<String>,
    pub cuisine_other: String,
    /// Free-text cuisine, accepted alongside `cuisine_other`
    pub cuisine: String,
    pub allergy_choices: Vec<String>,
    pub allergy_other: String,
    /// Free-text allergies, accepted alongside `allergy_other`
    pub allergies: String,
    pub ingredients: String,
}

/// Validated values ready to store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanedRequest {
    pub cuisine: String,
    pub allergies: String,
    pub ingredients: String,
}

/// Error messages per field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FormErrors(pub BTreeMap<String, Vec<String>>);

impl FormErrors {
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0.entry(field.to_string()).or_default().push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn is_choice(choices: &[(&str, &str)], value: &str) -> bool {
    choices.iter().any(|(key, _)| *key == value)
}

fn check_length(errors: &mut FormErrors, field: &str, value: &str, max: usize) {
    let len = value.chars().count();
    if len > max {
        errors.add(
            field,
            format!("Ensure this value has at most {} characters (it has {}).", max, len),
        );
    }
}

impl RecipeRequestForm {
    /// Collect fields from urlencoded pairs. Checkbox groups repeat their key; unknown keys are ignored.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::default();
        for (key, value) in pairs {
            let value = value.into();
            match key.as_ref() {
                "cuisine_choices" => form.cuisine_choices.push(value),
                "cuisine_other" => form.cuisine_other = value,
                "cuisine" => form.cuisine = value,
                "allergy_choices" => form.allergy_choices.push(value),
                "allergy_other" => form.allergy_other = value,
                "allergies" => form.allergies = value,
                "ingredients" => form.ingredients = value,
                _ => {}
            }
        }
        form
    }

    pub fn validate(&self) -> Result<CleanedRequest, FormErrors> {
        let mut errors = FormErrors::default();

        for value in &self.cuisine_choices {
            if !is_choice(CUISINE_CHOICES, value) {
                errors.add(
                    "cuisine_choices",
                    format!("Select a valid choice. {} is not one of the available choices.", value),
                );
            }
        }
        if self.cuisine_choices.len() > MAX_CUISINES {
            errors.add("cuisine_choices", "Please select a maximum of 2 cuisines.");
        }

        for value in &self.allergy_choices {
            if !is_choice(ALLERGY_CHOICES, value) {
                errors.add(
                    "allergy_choices",
                    format!("Select a valid choice. {} is not one of the available choices.", value),
                );
            }
        }

        let cuisine_other = self.cuisine_other.trim();
        let allergy_other = self.allergy_other.trim();
        check_length(&mut errors, "cuisine_other", cuisine_other, CUISINE_OTHER_MAX_CHARS);
        check_length(&mut errors, "allergy_other", allergy_other, ALLERGY_OTHER_MAX_CHARS);

        if !errors.is_empty() {
            return Err(errors);
        }

        let mut cuisines: Vec<&str> = self.cuisine_choices.iter().map(String::as_str).collect();
        for extra in [cuisine_other, self.cuisine.trim()] {
            if !extra.is_empty() {
                cuisines.push(extra);
            }
        }
        if cuisines.len() > MAX_CUISINES {
            errors.add(NON_FIELD_ERRORS, "Please select or enter a maximum of 2 cuisines in total.");
            return Err(errors);
        }

        let cuisine = cuisines.join(", ");
        check_length(&mut errors, "cuisine", &cuisine, CUISINE_MAX_CHARS);
        if !errors.is_empty() {
            return Err(errors);
        }

        let mut allergies: Vec<&str> = self.allergy_choices.iter().map(String::as_str).collect();
        for extra in [allergy_other, self.allergies.trim()] {
            if !extra.is_empty() {
                allergies.push(extra);
            }
        }

        Ok(CleanedRequest {
            cuisine,
            allergies: allergies.join(", "),
            ingredients: self.ingredients.trim().to_string(),
        })
    }
}
