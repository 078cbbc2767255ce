#![allow(dead_code)]

use actix_web::{
    body::MessageBody,
    dev::{ServiceFactory, ServiceRequest, ServiceResponse},
    test, web, App, Error,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tasklist::{
    auth::{PasswordHasher, TokenService},
    routes,
    state::AppState,
    store::MemoryStore,
};

pub const SECRET: &[u8] = b"integration-test-secret";

/// Fresh in-memory state. Cost 4 keeps bcrypt fast enough for tests.
pub fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::new(
        Arc::new(MemoryStore::new()),
        TokenService::new(SECRET),
        PasswordHasher::new(4),
    ))
}

pub fn test_app(
    state: web::Data<AppState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = Error,
        InitError = (),
    >,
> {
    App::new().configure(routes::configure(state))
}

pub fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {}", token))
}

/// Registers `email`/`password` and returns a login token for it.
pub async fn register_and_login<S, B>(app: &S, email: &str, password: &str) -> String
where
    S: actix_web::dev::Service<actix_http::Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let credentials = json!({ "email": email, "password": password });

    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(&credentials)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), 201, "registration of {} failed", email);

    let req = test::TestRequest::post()
        .uri("/login")
        .set_json(&credentials)
        .to_request();
    let body: Value = test::call_and_read_body_json(app, req).await;
    body["Token"]
        .as_str()
        .expect("login response carries a token")
        .to_string()
}
