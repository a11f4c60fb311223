/// Persistence gateways
///
/// Services depend on the [`UserStore`] and [`TaskStore`] traits, never on a
/// concrete database. Two backends implement them:
///
/// - [`postgres`]: `PgUserStore` / `PgTaskStore` over a shared `PgPool`
/// - [`memory`]: `MemoryStore`, an in-process store used by tests
///
/// Writes are whole-record saves with last-write-wins semantics; there is no
/// optimistic concurrency token. Validity windows for OTPs and reset tokens
/// are compared inside the store lookup against the caller-supplied `now`.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::task::{NewTask, Task, TaskDetail};
use crate::models::user::{NewUser, User};
use crate::query::{Filter, Page, TaskQuery};

pub use memory::MemoryStore;
pub use postgres::{PgTaskStore, PgUserStore};

/// Result alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by persistence backends
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Unique constraint violated; carries the field name
    #[error("Duplicate {0}")]
    Duplicate(String),

    /// Record-level invariant violated (e.g. end date before start date)
    #[error("{0}")]
    Invalid(String),

    /// A referenced record is missing, or a record is still referenced
    #[error("Reference violation: {0}")]
    Reference(String),

    /// Record to update does not exist
    #[error("{0} not found")]
    NotFound(String),

    /// Unexpected backend failure
    #[error("Database error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record".to_string()),
            sqlx::Error::Database(db_err) => {
                let constraint = db_err.constraint().unwrap_or_default().to_string();

                // string_data_right_truncation
                if db_err.code().as_deref() == Some("22001") {
                    return StoreError::Invalid("Value too long for field".to_string());
                }

                match db_err.kind() {
                    sqlx::error::ErrorKind::UniqueViolation => {
                        if constraint.contains("email") {
                            StoreError::Duplicate("email".to_string())
                        } else {
                            StoreError::Duplicate(constraint)
                        }
                    }
                    sqlx::error::ErrorKind::CheckViolation => {
                        StoreError::Invalid(check_violation_message(&constraint))
                    }
                    sqlx::error::ErrorKind::ForeignKeyViolation => StoreError::Reference(constraint),
                    _ => StoreError::Backend(db_err.to_string()),
                }
            }
            other => StoreError::Backend(other.to_string()),
        }
    }
}

fn check_violation_message(constraint: &str) -> String {
    match constraint {
        "tasks_schedule_check" => "End date must be after or equal to start date".to_string(),
        "users_password_after_first_login" => {
            "Password cannot be set while first login is pending".to_string()
        }
        other => format!("Constraint violation: {}", other),
    }
}

/// User persistence
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Round-trips the backend
    async fn ping(&self) -> StoreResult<()>;

    /// Inserts a user; `Duplicate("email")` if the email is taken
    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<User>>;

    /// Looks up by normalised email
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// User with this email whose OTP digest matches and `otp_expire > now`
    async fn find_by_otp(
        &self,
        email: &str,
        otp_digest: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>>;

    /// User whose reset digest matches and `reset_password_expire > now`
    async fn find_by_reset_token(
        &self,
        token_digest: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<Option<User>>;

    /// Persists the whole record; `NotFound` if it no longer exists
    async fn save(&self, user: &User) -> StoreResult<()>;

    /// Users ordered newest first
    async fn list(&self, page: Page) -> StoreResult<Vec<User>>;

    async fn count(&self) -> StoreResult<u64>;

    /// Returns `false` if nothing was deleted
    async fn delete(&self, id: Uuid) -> StoreResult<bool>;
}

/// Task persistence
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Inserts a task; `Invalid` on broken invariants, `Reference` on unknown users
    async fn insert(&self, task: NewTask) -> StoreResult<Task>;

    async fn find_by_id(&self, id: Uuid) -> StoreResult<Option<Task>>;

    /// Task with `assignedTo` / `createdBy` resolved
    async fn find_detail(&self, id: Uuid) -> StoreResult<Option<TaskDetail>>;

    /// Persists the whole record; `NotFound` if it no longer exists
    async fn save(&self, task: &Task) -> StoreResult<()>;

    async fn delete(&self, id: Uuid) -> StoreResult<bool>;

    /// Number of tasks matching the filter, ignoring paging
    async fn count(&self, filter: &Filter) -> StoreResult<u64>;

    /// One sorted page of populated tasks
    async fn find(&self, query: &TaskQuery) -> StoreResult<Vec<TaskDetail>>;

    /// Tasks assigned to or created by the user
    async fn count_referencing(&self, user_id: Uuid) -> StoreResult<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_not_found_maps_to_not_found() {
        let err: StoreError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[test]
    fn test_check_violation_messages() {
        assert_eq!(
            check_violation_message("tasks_schedule_check"),
            "End date must be after or equal to start date"
        );
        assert!(check_violation_message("other").contains("other"));
    }
}
