//! Normalizes agent replies into an `AgentAttempt`
//!
//! The pipeline answers in a few shapes: `{"result": "<json string>"}`,
//! `{"result": {...}}`, `{"output": "chatter {json} chatter"}` or the recipe
//! object itself. Anything unusable becomes an unsafe attempt whose notes
//! say why, so the workflow retries instead of failing.

use serde_json::{Map, Value};

use super::AgentAttempt;

pub const DEFAULT_RECIPE_NAME: &str = "Untitled Recipe";
pub const DEFAULT_RECIPE_TEXT: &str = "No recipe text provided.";

/// How much of an unparseable agent string is quoted back in the notes
const SNIPPET_CHARS: usize = 200;

/// String verdicts read as safe, compared case-insensitively
const SAFE_WORDS: &[&str] = &["true", "1", "yes", "safe"];

fn rejected(notes: String) -> AgentAttempt {
    AgentAttempt {
        recipe_name: DEFAULT_RECIPE_NAME.to_string(),
        recipe_text: DEFAULT_RECIPE_TEXT.to_string(),
        is_safe: false,
        safety_notes: notes,
    }
}

fn snippet(s: &str) -> String {
    s.chars().take(SNIPPET_CHARS).collect()
}

/// Parse the JSON object embedded in free text: everything from the first `{` to the last `}`.
pub fn extract_json_object(text: &str) -> Option<Result<Value, serde_json::Error>> {
    let s = text.trim();
    let first = s.find('{')?;
    let last = s.rfind('}')?;
    if last <= first {
        return None;
    }
    Some(serde_json::from_str(&s[first..=last]))
}

pub fn parse_agent_output(agent_result: &Value) -> AgentAttempt {
    let Some(obj) = agent_result.as_object() else {
        return rejected(format!("Invalid agent output: {}", agent_result));
    };

    let output = if let Some(result) = obj.get("result") {
        match result {
            Value::String(s) => match serde_json::from_str::<Value>(s) {
                Ok(v) => v,
                Err(e) => match extract_json_object(s) {
                    Some(Ok(v)) => v,
                    _ => return rejected(format!("Failed to parse JSON from result string: {}", e)),
                },
            },
            other => other.clone(),
        }
    } else {
        match obj.get("output") {
            Some(Value::String(s)) => match extract_json_object(s) {
                Some(Ok(v)) => v,
                Some(Err(_)) => {
                    return rejected(format!("Failed to parse JSON from agent string: {}", snippet(s.trim())));
                }
                None => {
                    return rejected(format!("No JSON object found in agent output: {}", snippet(s.trim())));
                }
            },
            Some(other) => other.clone(),
            None => agent_result.clone(),
        }
    };

    match output.as_object() {
        Some(fields) => attempt_from_fields(fields),
        None => rejected(format!("Agent output is not a JSON object: {}", snippet(&output.to_string()))),
    }
}

/// Only an explicit affirmative verdict counts as safe
fn safety_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => SAFE_WORDS.iter().any(|w| s.trim().eq_ignore_ascii_case(w)),
        _ => false,
    }
}

fn attempt_from_fields(fields: &Map<String, Value>) -> AgentAttempt {
    let text_field = |keys: &[&str]| {
        keys.iter()
            .filter_map(|k| fields.get(*k).and_then(Value::as_str))
            .map(str::trim)
            .find(|s| !s.is_empty())
            .map(str::to_string)
    };

    let is_safe = match fields.get("is_safe") {
        Some(Value::Null) | None => true,
        Some(flag) => safety_flag(flag),
    };

    AgentAttempt {
        recipe_name: text_field(&["recipe_name", "title"]).unwrap_or_else(|| DEFAULT_RECIPE_NAME.to_string()),
        recipe_text: text_field(&["recipe_text", "text"]).unwrap_or_else(|| DEFAULT_RECIPE_TEXT.to_string()),
        is_safe,
        safety_notes: text_field(&["safety_notes"]).unwrap_or_default(),
    }
}
