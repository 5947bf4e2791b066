use actix_web::{middleware::Logger, App, HttpServer};
use dotenv::dotenv;
use std::sync::Arc;

mod agents;
mod config;
mod controllers;
mod db;
mod forms;
mod http_retry;
mod models;
mod render;
mod workflow;

use agents::RecipeAgent;
use config::Config;
use db::Database;
use render::Templates;

pub struct AppState {
    pub db: Arc<Database>,
    pub config: Config,
    pub agent: Arc<dyn RecipeAgent>,
    pub templates: Arc<Templates>,
}

fn startup_error(context: &str, e: impl std::fmt::Display) -> std::io::Error {
    std::io::Error::new(std::io::ErrorKind::Other, format!("{}: {}", context, e))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init();

    let config = Config::from_env().map_err(|e| startup_error("Invalid configuration", e))?;

    log::info!("Initializing database at {}", config.database_url);
    let db = Arc::new(
        Database::new(&config.database_url).map_err(|e| startup_error("Failed to initialize database", e))?,
    );

    let agent = agents::create_agent(&config).map_err(|e| startup_error("Failed to create recipe agent", e))?;
    log::info!(
        "Using {} agent, up to {} attempts per request",
        agent.name(),
        config.max_attempts
    );

    let templates = Arc::new(Templates::new().map_err(|e| startup_error("Failed to load templates", e))?);

    let bind_address = config.bind_address.clone();
    let port = config.port;
    log::info!("Starting SafePlate server on {}:{}", bind_address, port);

    HttpServer::new(move || {
        App::new()
            .app_data(actix_web::web::Data::new(AppState {
                db: Arc::clone(&db),
                config: config.clone(),
                agent: Arc::clone(&agent),
                templates: Arc::clone(&templates),
            }))
            .wrap(Logger::default())
            .configure(controllers::health::config)
            .configure(controllers::recipes::config)
            .configure(controllers::history::config)
    })
    .bind((bind_address.as_str(), port))?
    .run()
    .await
}
