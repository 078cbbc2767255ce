use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::TaskInput,
    state::AppState,
};
use actix_web::{delete, get, put, web, HttpResponse, Responder};

/// Task ids in the path must be positive integers.
fn parse_task_id(raw: &str) -> Result<i64, AppError> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::BadRequest("Invalid Task ID".into())),
    }
}

/// Lists the caller's tasks.
///
/// Always a JSON array, `[]` when the caller has none. Order is unspecified.
pub async fn get_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list(user.id).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a task owned by the caller.
///
/// ## Request Body:
/// - `title`: required, not blank.
/// - `description`: required, not blank.
/// - `completed` (optional): defaults to `false`.
///
/// Any `id`, `user_id` or timestamps in the body are ignored.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: malformed JSON or a blank title/description.
/// - `401 Unauthorized`: no valid bearer token, or its user no longer exists.
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let task = state.tasks.create(&task_data, user.id).await?;
    Ok(HttpResponse::Created().json(task))
}

/// Fetches one of the caller's tasks.
///
/// A task that belongs to someone else is a 404, same as a missing one.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    let task = state.tasks.get_by_id(id, user.id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces title, description and completed on one of the caller's tasks.
///
/// Sending back exactly what is stored returns the task unchanged.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    let task = state.tasks.update(id, user.id, &task_data).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Soft-deletes one of the caller's tasks and returns it.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    let task = state.tasks.delete(id, user.id).await?;
    Ok(HttpResponse::Ok().json(task))
}
