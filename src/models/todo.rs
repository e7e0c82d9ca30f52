use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

/// Input structure for creating a todo.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoInput {
    /// The text of the todo item.
    /// Must be between 1 and 1000 characters.
    #[validate(length(min = 1, max = 1000, message = "text must be between 1 and 1000 characters"))]
    pub text: String,
}

/// Partial update payload for a todo. Absent fields keep the stored `text`
/// but reset `completed` (see [`Todo::apply_update`]).
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct TodoUpdate {
    #[validate(length(min = 1, max = 1000, message = "text must be between 1 and 1000 characters"))]
    pub text: Option<String>,
    pub completed: Option<bool>,
}

/// Represents a todo entity as stored in the database and returned by the API.
#[derive(Debug, Serialize, Deserialize, FromRow)]
pub struct Todo {
    /// Unique identifier for the todo (UUID v4).
    pub id: Uuid,
    /// The text of the todo item.
    pub text: String,
    /// Whether the item is done.
    pub completed: bool,
    /// When the item was completed; `None` while it is open.
    pub completed_at: Option<DateTime<Utc>>,
    /// Identifier of the user who owns the todo.
    pub creator: i32,
    /// Timestamp of when the todo was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the last update to the todo.
    pub updated_at: DateTime<Utc>,
}

impl Todo {
    /// Creates a new open `Todo` from `TodoInput` and the creator's user id.
    pub fn new(input: TodoInput, creator: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            text: input.text.trim().to_string(),
            completed: false,
            completed_at: None,
            creator,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a partial update.
    ///
    /// Marking the todo completed stamps `completed_at` with the current time;
    /// any update that leaves it not-completed (including one that omits the
    /// field) clears both.
    pub fn apply_update(&mut self, update: TodoUpdate) {
        if let Some(text) = update.text {
            self.text = text.trim().to_string();
        }

        let completed = update.completed.unwrap_or(false);
        if completed {
            self.completed_at = Some(Utc::now());
        } else {
            self.completed_at = None;
        }
        self.completed = completed;
        self.updated_at = Utc::now();
    }
}
