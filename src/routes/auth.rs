use crate::{
    auth::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse},
    error::AppError,
    state::AppState,
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Responds `201 {id, email}`. A taken email is rejected with 409 before
/// any hashing work is done.
#[post("/register")]
pub async fn register(
    state: web::Data<AppState>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let RegisterRequest { email, password } = register_data.into_inner();

    if state.users.find_by_email(&email).await?.is_some() {
        return Err(AppError::Conflict("Email already registered".into()));
    }

    let hasher = state.hasher;
    let password_hash = web::block(move || hasher.hash(&password)).await??;

    let user = state.users.create(&email, &password_hash).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        id: user.id,
        email: user.email,
    }))
}

/// Login user
///
/// Responds `200 {"Token": ...}`. An unknown email is a 400, a wrong
/// password a 401.
#[post("/login")]
pub async fn login(
    state: web::Data<AppState>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    let LoginRequest { email, password } = login_data.into_inner();

    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| AppError::BadRequest("Invalid email or password".into()))?;

    let hasher = state.hasher;
    let password_hash = user.password_hash.clone();
    let valid = web::block(move || hasher.verify(&password, &password_hash)).await?;

    if !valid {
        log::info!("Failed login for user {}", user.id);
        return Err(AppError::Unauthorized("Invalid email or password".into()));
    }

    let token = state.tokens.issue(user.id, &user.email)?;
    log::info!("User {} logged in", user.id);

    Ok(HttpResponse::Ok().json(LoginResponse { token }))
}
