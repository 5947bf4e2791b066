use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse};

use crate::controllers::{database_error, html_response};
use crate::forms::{FormErrors, RecipeRequestForm};
use crate::workflow::RecipeWorkflow;
use crate::AppState;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/")
            .route(web::get().to(show_form))
            .route(web::post().to(generate_safe_recipe)),
    );
}

async fn show_form(state: web::Data<AppState>) -> HttpResponse {
    html_response(
        StatusCode::OK,
        state
            .templates
            .recipe_page(&RecipeRequestForm::default(), &FormErrors::default(), None),
    )
}

/// Validate the form, store the request, run the chef/inspector loop and show every attempt
async fn generate_safe_recipe(
    state: web::Data<AppState>,
    body: web::Form<Vec<(String, String)>>,
) -> HttpResponse {
    let form = RecipeRequestForm::from_pairs(body.into_inner());

    let cleaned = match form.validate() {
        Ok(cleaned) => cleaned,
        Err(errors) => {
            log::info!("Recipe form rejected: {:?}", errors.0.keys().collect::<Vec<_>>());
            return html_response(StatusCode::OK, state.templates.recipe_page(&form, &errors, None));
        }
    };

    let request = match state
        .db
        .create_recipe_request(&cleaned.cuisine, &cleaned.allergies, &cleaned.ingredients)
    {
        Ok(request) => request,
        Err(e) => return database_error(&state, "Failed to store recipe request", e),
    };
    log::info!("Stored {} (id {})", request, request.id);

    let workflow = RecipeWorkflow::new(&state.db, state.agent.as_ref(), state.config.max_attempts);
    let outcome = match workflow.run(request).await {
        Ok(outcome) => outcome,
        Err(e) => return database_error(&state, "Failed to record recipe attempts", e),
    };

    html_response(
        StatusCode::OK,
        state
            .templates
            .recipe_page(&form, &FormErrors::default(), Some(&outcome)),
    )
}
