use actix_web::{get, web, HttpResponse, Responder};
use serde_json::json;

use crate::error::AppError;
use crate::state::AppState;

#[get("/")]
pub async fn index() -> impl Responder {
    HttpResponse::Ok().json(json!({
        "message": "Welcome to the Task List API"
    }))
}

/// Health check endpoint
///
/// 200 when the storage backend answers, 500 otherwise.
#[get("/health")]
pub async fn health(state: web::Data<AppState>) -> Result<impl Responder, AppError> {
    state.users.ping().await?;
    Ok(HttpResponse::Ok().json(json!({ "Status": "Ok" })))
}
