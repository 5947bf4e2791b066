use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;

use crate::controllers::{database_error, html_response};
use crate::models::{GeneratedRecipe, RecipeRequest};
use crate::AppState;

/// Rows shown on the history page
pub const HISTORY_LIMIT: u32 = 20;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/history", web::get().to(history))
        .route("/requests/{id}", web::get().to(request_detail))
        .service(
            web::resource("/api/requests/{id}")
                .route(web::get().to(request_json))
                .route(web::delete().to(delete_request)),
        );
}

#[derive(Serialize)]
struct RequestWithAttempts {
    request: RecipeRequest,
    final_recipe: Option<GeneratedRecipe>,
    attempts: Vec<GeneratedRecipe>,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

async fn history(state: web::Data<AppState>) -> HttpResponse {
    match state.db.list_recent_requests(HISTORY_LIMIT) {
        Ok(summaries) => html_response(StatusCode::OK, state.templates.history(&summaries)),
        Err(e) => database_error(&state, "Failed to list recipe requests", e),
    }
}

async fn request_detail(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    let request = match state.db.get_recipe_request(id) {
        Ok(Some(request)) => request,
        Ok(None) => {
            return html_response(
                StatusCode::NOT_FOUND,
                state
                    .templates
                    .error_page("Not found", &format!("Recipe request {} does not exist.", id)),
            );
        }
        Err(e) => return database_error(&state, "Failed to load recipe request", e),
    };

    match state.db.list_attempts(id) {
        Ok(attempts) => html_response(StatusCode::OK, state.templates.request_detail(&request, &attempts)),
        Err(e) => database_error(&state, "Failed to load recipe attempts", e),
    }
}

async fn request_json(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    let loaded = state.db.get_recipe_request(id).and_then(|request| match request {
        Some(request) => state.db.list_attempts(id).map(|attempts| Some((request, attempts))),
        None => Ok(None),
    });

    match loaded {
        Ok(Some((request, attempts))) => {
            let final_recipe = attempts.iter().find(|a| a.accepted).cloned();
            HttpResponse::Ok().json(RequestWithAttempts {
                request,
                final_recipe,
                attempts,
            })
        }
        Ok(None) => HttpResponse::NotFound().json(ErrorResponse {
            error: format!("Recipe request {} not found", id),
        }),
        Err(e) => {
            log::error!("Failed to load recipe request {}: {}", id, e);
            HttpResponse::InternalServerError().json(ErrorResponse {
                error: "Database error".to_string(),
            })
        }
    }
}

/// Remove a request; its attempts go with it
async fn delete_request(state: web::Data<AppState>, path: web::Path<i64>) -> impl Responder {
    let id = path.into_inner();
    match state.db.delete_recipe_request(id) {
        Ok(true) => {
            log::info!("Deleted recipe request {}", id);
            HttpResponse::Ok().json(DeleteResponse {
                success: true,
                error: None,
            })
        }
        Ok(false) => HttpResponse::NotFound().json(DeleteResponse {
            success: false,
            error: Some(format!("Recipe request {} not found", id)),
        }),
        Err(e) => {
            log::error!("Failed to delete recipe request {}: {}", id, e);
            HttpResponse::InternalServerError().json(DeleteResponse {
                success: false,
                error: Some("Failed to delete recipe request".to_string()),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::AgentAttempt;
    use crate::controllers::test_support;
    use actix_web::{test, App};
    use serde_json::Value;

    fn seed(state: &web::Data<AppState>) -> i64 {
        let request = state.db.create_recipe_request("Italian", "nuts", "pasta").unwrap();
        state
            .db
            .record_attempt(request.id, &AgentAttempt::new("Pesto Pasta", "pine nuts", false, "UNSAFE: pine nuts"))
            .unwrap();
        let safe = state
            .db
            .record_attempt(request.id, &AgentAttempt::new("Tomato Pasta", "tomatoes", true, "Looks fine"))
            .unwrap();
        assert!(state.db.accept_attempt(safe.id).unwrap());
        request.id
    }

    async fn get(state: web::Data<AppState>, uri: &str) -> (StatusCode, String) {
        let app = test::init_service(App::new().app_data(state).configure(config)).await;
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = resp.status();
        let body = test::read_body(resp).await;
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[actix_web::test]
    async fn test_history_lists_requests() {
        let state = test_support::state();
        let (_, empty) = get(state.clone(), "/history").await;
        assert!(empty.contains("No requests yet."));

        let id = seed(&state);
        state.db.create_recipe_request("", "", "").unwrap();

        let (status, body) = get(state, "/history").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(&format!("/requests/{}", id)));
        assert!(body.contains("Tomato Pasta"));
        assert!(body.contains("Any"));
    }

    #[actix_web::test]
    async fn test_request_detail_page() {
        let state = test_support::state();
        let id = seed(&state);

        let (status, body) = get(state, &format!("/requests/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Recipe Request for Italian"));
        assert!(body.contains("Final recipe: <strong>Tomato Pasta</strong>"));
        assert!(body.find("#1 Pesto Pasta").unwrap() < body.find("#2 Tomato Pasta").unwrap());
    }

    #[actix_web::test]
    async fn test_request_detail_missing() {
        let (status, body) = get(test_support::state(), "/requests/404").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Recipe request 404 does not exist."));

        let (status, _) = get(test_support::state(), "/requests/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn test_request_json() {
        let state = test_support::state();
        let id = seed(&state);

        let (status, body) = get(state, &format!("/api/requests/{}", id)).await;
        assert_eq!(status, StatusCode::OK);

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["request"]["cuisine"], "Italian");
        assert_eq!(json["attempts"].as_array().unwrap().len(), 2);
        assert_eq!(json["attempts"][0]["is_safe"], false);
        assert_eq!(json["final_recipe"]["recipe_name"], "Tomato Pasta");
    }

    #[actix_web::test]
    async fn test_request_json_missing() {
        let (status, body) = get(test_support::state(), "/api/requests/9").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let json: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "Recipe request 9 not found");
    }

    #[actix_web::test]
    async fn test_delete_request_removes_attempts() {
        let state = test_support::state();
        let id = seed(&state);
        let app = test::init_service(App::new().app_data(state.clone()).configure(config)).await;

        let uri = format!("/api/requests/{}", id);
        let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["success"], true);

        assert_eq!(state.db.count_recipe_requests().unwrap(), 0);
        assert_eq!(state.db.count_generated_recipes().unwrap(), 0);

        let resp = test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let json: Value = test::read_body_json(resp).await;
        assert_eq!(json["success"], false);
    }
}
