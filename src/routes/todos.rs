use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{TodoInput, TodoPatch, TodoQuery},
    store::TodoStore,
};
use actix_web::{delete, get, patch, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Lists the caller's todos.
///
/// ## Query Parameters:
/// - `completed` (optional): exact match on completion state.
/// - `priority` (optional): exact match, one of "low", "medium", "high".
/// - `category` (optional): exact match on category.
/// - `search` (optional): case-insensitive match against title and description.
/// - `sortBy` (optional): createdAt | dueDate | title | priority | completed.
/// - `sortOrder` (optional): asc | desc. Default: createdAt desc.
///
/// Filters compose conjunctively; omitted filters do not constrain the list.
#[get("")]
pub async fn list_todos(
    pool: web::Data<PgPool>,
    query: web::Query<TodoQuery>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todos = TodoStore::for_owner(&pool, user.0.id).list(&query).await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": todos.len(),
        "data": todos,
    })))
}

/// Creates a todo owned by the caller.
///
/// `title` is required and must be non-blank after trimming; everything else
/// is optional (completed defaults to false, priority to medium). Any
/// client-supplied owner is ignored: ownership always comes from the token.
#[post("")]
pub async fn create_todo(
    pool: web::Data<PgPool>,
    body: web::Json<TodoInput>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let input = body.into_inner().normalized();
    input.validate()?;

    let todo = TodoStore::for_owner(&pool, user.0.id).create(input).await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "message": "Todo created successfully",
        "data": todo,
    })))
}

/// Incomplete todos with a due date within the next three days (inclusive).
#[get("/due-soon")]
pub async fn due_soon(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todos = TodoStore::for_owner(&pool, user.0.id).due_soon().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "count": todos.len(),
        "data": todos,
    })))
}

/// Aggregate statistics for the caller's todos: totals, completion rate, and
/// per-priority / per-category breakdowns.
#[get("/stats/summary")]
pub async fn stats_summary(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let stats = TodoStore::for_owner(&pool, user.0.id).summary().await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": stats,
    })))
}

/// Fetches one todo by id. A todo owned by another user yields the same 404
/// as a missing one.
#[get("/{id}")]
pub async fn get_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todo = TodoStore::for_owner(&pool, user.0.id)
        .get(todo_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "data": todo,
    })))
}

/// Partially updates a todo: only fields present in the body change, and the
/// creation validation rules apply to each replaced field. Sending
/// `"dueDate": null` clears the due date.
#[put("/{id}")]
pub async fn update_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<Uuid>,
    body: web::Json<TodoPatch>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let patch = body.into_inner().normalized();
    patch.validate()?;

    let todo = TodoStore::for_owner(&pool, user.0.id)
        .update(todo_id.into_inner(), patch)
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Todo updated successfully",
        "data": todo,
    })))
}

/// Flips the completion state of a todo.
#[patch("/{id}/toggle")]
pub async fn toggle_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todo = TodoStore::for_owner(&pool, user.0.id)
        .toggle(todo_id.into_inner())
        .await?;

    let message = if todo.completed {
        "Todo marked as completed"
    } else {
        "Todo marked as incomplete"
    };

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": message,
        "data": todo,
    })))
}

/// Deletes a todo and returns its last state.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<Uuid>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let todo = TodoStore::for_owner(&pool, user.0.id)
        .delete(todo_id.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Todo deleted successfully",
        "data": todo,
    })))
}
