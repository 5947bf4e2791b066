pub mod health;
pub mod history;
pub mod recipes;

use actix_web::{http::header::ContentType, HttpResponse};

use crate::AppState;

/// Turn a rendered page into a response; template failures become a 500
pub(crate) fn html_response(
    status: actix_web::http::StatusCode,
    page: Result<String, minijinja::Error>,
) -> HttpResponse {
    match page {
        Ok(body) => HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(body),
        Err(e) => {
            log::error!("Failed to render page: {:#}", e);
            HttpResponse::InternalServerError()
                .content_type(ContentType::plaintext())
                .body("Internal server error")
        }
    }
}

/// Error page for a failed database call
pub(crate) fn database_error(state: &AppState, context: &str, e: rusqlite::Error) -> HttpResponse {
    log::error!("{}: {}", context, e);
    html_response(
        actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        state
            .templates
            .error_page("Something went wrong", "The recipe database is unavailable. Please try again."),
    )
}

#[cfg(test)]
pub(crate) mod test_support {
    use actix_web::web;
    use std::sync::Arc;

    use crate::agents::{RecipeAgent, SimulatedAgent};
    use crate::config::{AgentMode, AiriaConfig, Config};
    use crate::db::Database;
    use crate::render::Templates;
    use crate::AppState;

    pub fn config(max_attempts: u32) -> Config {
        Config {
            port: 0,
            bind_address: "127.0.0.1".to_string(),
            database_url: ":memory:".to_string(),
            agent_mode: AgentMode::Simulated,
            max_attempts,
            airia: AiriaConfig::default(),
        }
    }

    pub fn state_with(agent: Arc<dyn RecipeAgent>, max_attempts: u32) -> web::Data<AppState> {
        web::Data::new(AppState {
            db: Arc::new(Database::new(":memory:").unwrap()),
            config: config(max_attempts),
            agent,
            templates: Arc::new(Templates::new().unwrap()),
        })
    }

    pub fn state() -> web::Data<AppState> {
        state_with(Arc::new(SimulatedAgent::new()), 3)
    }
}
