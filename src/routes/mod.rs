pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;
use std::sync::Arc;

use crate::auth::AuthMiddleware;
use crate::error::AppError;
use crate::state::AppState;

/// Registers shared state and every route.
///
/// `/`, `/health`, `/register` and `/login` are public; everything under
/// `/tasks` goes through [`AuthMiddleware`] first.
pub fn configure(state: web::Data<AppState>) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let tokens = Arc::clone(&state.tokens);

        cfg.app_data(state)
            .app_data(json_config())
            .service(health::index)
            .service(health::health)
            .service(auth::register)
            .service(auth::login)
            .service(
                web::scope("/tasks")
                    .wrap(AuthMiddleware::new(tokens))
                    .service(
                        web::resource(["", "/"])
                            .route(web::get().to(tasks::get_tasks))
                            .route(web::post().to(tasks::create_task)),
                    )
                    .service(tasks::get_task)
                    .service(tasks::update_task)
                    .service(tasks::delete_task),
            );
    }
}

/// Malformed bodies are a 400 with a JSON error, and the content type is not enforced.
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .content_type_required(false)
        .error_handler(|err, _req| AppError::BadRequest(format!("Invalid JSON: {}", err)).into())
}
