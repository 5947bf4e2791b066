//! Airia pipeline probe
//!
//! Sends one recipe prompt to the Airia pipeline and prints the raw reply,
//! without booting the web app. Useful for checking credentials and the
//! shape of the pipeline output.
//!
//! Usage:
//!   AIRIA_API_KEY="your-api-key" \
//!   PROBE_CUISINE="Italian" PROBE_ALLERGIES="nuts" PROBE_INGREDIENTS="chicken, basil" \
//!   cargo run --bin airia_probe

use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::env;
use std::time::Duration;

/// The service's own prompt, so the reply shape matches what the workflow parses
#[path = "../agents/prompt.rs"]
mod prompt;

/// Mirrors the service's criteria type for `prompt::build_strict_prompt`
#[derive(Debug, Clone, Default)]
pub struct RecipeCriteria {
    pub cuisine: String,
    pub allergies: String,
    pub ingredients: String,
}

const DEFAULT_ENDPOINT: &str = "https://api.airia.ai/v2/PipelineExecution/15c2b6ab-5201-4c72-beef-33ec20c9603d";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PipelineExecutionRequest {
    user_id: String,
    user_input: String,
    async_output: bool,
}

fn env_or(name: &str, default: &str) -> String {
    env::var(name).ok().filter(|v| !v.trim().is_empty()).unwrap_or_else(|| default.to_string())
}

/// First few characters of the key, safe for any UTF-8 input
fn key_hint(api_key: &str) -> String {
    api_key.chars().take(4).collect()
}

fn user_id() -> String {
    match env::var("AIRIA_USER_ID").ok().and_then(|v| uuid::Uuid::parse_str(v.trim()).ok()) {
        Some(id) => id.to_string(),
        None => uuid::Uuid::new_v4().to_string(),
    }
}

async fn run_probe(client: &Client, endpoint: &str, api_key: &str, prompt: String) -> Result<Value, String> {
    let request = PipelineExecutionRequest {
        user_id: user_id(),
        user_input: prompt,
        async_output: false,
    };

    println!("\n📋 Request body:");
    println!("{}", serde_json::to_string_pretty(&request).unwrap_or_default());

    let response = client
        .post(endpoint)
        .header("X-API-KEY", api_key)
        .json(&request)
        .send()
        .await
        .map_err(|e| format!("Request failed: {}", e))?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| format!("Failed to read response: {}", e))?;

    println!("\n📥 Response (status: {}):", status);
    if !status.is_success() {
        return Err(format!("API error {}: {}", status, body));
    }

    serde_json::from_str(&body).map_err(|e| format!("Response is not JSON: {} - body: {}", e, body))
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    env_logger::init();

    println!("🍽️  Airia Pipeline Probe");
    println!("========================\n");

    let api_key = env::var("AIRIA_API_KEY").unwrap_or_else(|_| {
        eprintln!("❌ AIRIA_API_KEY not set!");
        std::process::exit(1);
    });
    let endpoint = env_or("AIRIA_RECIPE_AGENT_ENDPOINT", DEFAULT_ENDPOINT);
    let cuisine = env_or("PROBE_CUISINE", "Italian");
    let allergies = env_or("PROBE_ALLERGIES", "nuts");
    let ingredients = env_or("PROBE_INGREDIENTS", "chicken, tomatoes, basil");

    println!("📝 Configuration:");
    println!("   Endpoint:    {}", endpoint);
    println!("   Key:         {}...", key_hint(&api_key));
    println!("   Cuisine:     {}", cuisine);
    println!("   Allergies:   {}", allergies);
    println!("   Ingredients: {}", ingredients);

    let client = match Client::builder().timeout(Duration::from_secs(120)).build() {
        Ok(client) => client,
        Err(e) => {
            eprintln!("❌ Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let criteria = RecipeCriteria {
        cuisine,
        allergies,
        ingredients,
    };
    let prompt = prompt::build_strict_prompt(&criteria, None);

    match run_probe(&client, &endpoint, &api_key, prompt).await {
        Ok(value) => {
            println!("{}", serde_json::to_string_pretty(&value).unwrap_or_default());
            println!("\n✅ Pipeline answered");
        }
        Err(e) => {
            println!("\n❌ {}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_hint_handles_multibyte_keys() {
        assert_eq!(key_hint("ak-1234567"), "ak-1");
        assert_eq!(key_hint("ключ-секрет"), "ключ");
        assert_eq!(key_hint("ab"), "ab");
    }

    #[test]
    fn test_sends_service_prompt() {
        let criteria = RecipeCriteria {
            cuisine: "Italian".to_string(),
            allergies: "nuts".to_string(),
            ingredients: "basil".to_string(),
        };
        let prompt = prompt::build_strict_prompt(&criteria, None);
        assert!(prompt.starts_with("INSTRUCTION:"));
        assert!(prompt.contains("allergies: nuts\n"));
    }
}
