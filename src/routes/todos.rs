use crate::{
    auth::AuthSession,
    error::AppError,
    models::{Todo, TodoInput, TodoUpdate},
};
use actix_web::{delete, get, patch, post, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

/// Retrieves the authenticated user's todos, newest first.
///
/// ## Responses:
/// - `200 OK`: Returns a JSON array of `Todo` objects.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `500 Internal Server Error`: For database errors.
#[get("")]
pub async fn get_todos(
    pool: web::Data<PgPool>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let todos = sqlx::query_as::<_, Todo>(
        "SELECT id, text, completed, completed_at, creator, created_at, updated_at
         FROM todos WHERE creator = $1
         ORDER BY created_at DESC",
    )
    .bind(session.user_id)
    .fetch_all(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(todos))
}

/// Creates a new todo owned by the authenticated user.
///
/// ## Request Body:
/// - `text`: The text of the todo item (required, 1-1000 characters).
///
/// ## Responses:
/// - `201 Created`: Returns the newly created `Todo` object as JSON.
/// - `400 Bad Request`: If the text is missing or out of bounds.
/// - `401 Unauthorized`: If the request lacks a valid session token.
#[post("")]
pub async fn create_todo(
    pool: web::Data<PgPool>,
    session: AuthSession,
    todo_data: web::Json<TodoInput>,
) -> Result<impl Responder, AppError> {
    // Validate input
    todo_data.validate()?;

    let todo = Todo::new(todo_data.into_inner(), session.user_id);

    let result = sqlx::query_as::<_, Todo>(
        "INSERT INTO todos (id, text, completed, completed_at, creator, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, text, completed, completed_at, creator, created_at, updated_at",
    )
    .bind(todo.id)
    .bind(&todo.text)
    .bind(todo.completed)
    .bind(todo.completed_at)
    .bind(todo.creator)
    .bind(todo.created_at)
    .bind(todo.updated_at)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Created().json(result))
}

/// Retrieves a specific todo by its ID.
/// A todo that does not exist and a todo owned by someone else both
/// answer 404, so ids cannot be probed across users.
#[get("/{id}")]
pub async fn get_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<Uuid>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let todo_uuid = todo_id.into_inner();

    let todo = sqlx::query_as::<_, Todo>(
        "SELECT id, text, completed, completed_at, creator, created_at, updated_at
         FROM todos WHERE id = $1",
    )
    .bind(todo_uuid)
    .fetch_optional(pool.get_ref())
    .await?;

    match todo {
        Some(todo) => {
            if todo.creator != session.user_id {
                Err(AppError::NotFound("Todo not found".into()))
            } else {
                Ok(HttpResponse::Ok().json(todo))
            }
        }
        None => Err(AppError::NotFound("Todo not found".into())),
    }
}

/// Partially updates a todo.
///
/// Marking it completed stamps `completed_at`; an update that leaves it
/// not-completed clears the stamp. Only the owner can update.
///
/// ## Responses:
/// - `200 OK`: Returns the updated `Todo` object as JSON.
/// - `400 Bad Request`: If the patch payload fails validation.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: If the todo does not exist or is not owned by the caller.
#[patch("/{id}")]
pub async fn update_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<Uuid>,
    todo_data: web::Json<TodoUpdate>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    todo_data.validate()?;
    let todo_uuid = todo_id.into_inner();

    // First, fetch the current row and verify ownership
    let todo = sqlx::query_as::<_, Todo>(
        "SELECT id, text, completed, completed_at, creator, created_at, updated_at
         FROM todos WHERE id = $1",
    )
    .bind(todo_uuid)
    .fetch_optional(pool.get_ref())
    .await?;

    let mut todo = match todo {
        Some(todo) if todo.creator == session.user_id => todo,
        _ => return Err(AppError::NotFound("Todo not found".into())),
    };

    todo.apply_update(todo_data.into_inner());

    let result = sqlx::query_as::<_, Todo>(
        "UPDATE todos
         SET text = $1, completed = $2, completed_at = $3, updated_at = $4
         WHERE id = $5 AND creator = $6
         RETURNING id, text, completed, completed_at, creator, created_at, updated_at",
    )
    .bind(&todo.text)
    .bind(todo.completed)
    .bind(todo.completed_at)
    .bind(todo.updated_at)
    .bind(todo_uuid)
    .bind(session.user_id)
    .fetch_one(pool.get_ref())
    .await?;

    Ok(HttpResponse::Ok().json(result))
}

/// Deletes a todo owned by the authenticated user.
///
/// ## Responses:
/// - `204 No Content`: On successful deletion.
/// - `401 Unauthorized`: If the request lacks a valid session token.
/// - `404 Not Found`: If the todo does not exist or is not owned by the caller.
#[delete("/{id}")]
pub async fn delete_todo(
    pool: web::Data<PgPool>,
    todo_id: web::Path<Uuid>,
    session: AuthSession,
) -> Result<impl Responder, AppError> {
    let todo_uuid = todo_id.into_inner();

    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND creator = $2")
        .bind(todo_uuid)
        .bind(session.user_id)
        .execute(pool.get_ref())
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Todo not found".into()));
    }

    Ok(HttpResponse::NoContent().finish())
}
