/// Authorization checks
///
/// Two roles exist: admins may do anything, regular users may only read and
/// update the completion state of tasks assigned to them.
///
/// # Example
///
/// ```
/// use taskflow_shared::auth::authorization::{require_admin, require_task_access};
/// use taskflow_shared::auth::middleware::AuthContext;
/// use taskflow_shared::models::user::Role;
/// use uuid::Uuid;
///
/// let me = Uuid::new_v4();
/// let auth = AuthContext { user_id: me, role: Role::User };
///
/// assert!(require_admin(&auth).is_err());
/// assert!(require_task_access(&auth, me).is_ok());
/// assert!(require_task_access(&auth, Uuid::new_v4()).is_err());
/// ```

use uuid::Uuid;

use super::middleware::AuthContext;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, thiserror::Error)]
pub enum AuthzError {
    /// Caller lacks the required role
    #[error("User role {actual} is not authorized to access this route")]
    InsufficientRole { actual: Role },

    /// Task belongs to someone else
    #[error("Not authorized to access this task")]
    NotAssignee,
}

/// Requires the caller to be an admin
pub fn require_admin(auth: &AuthContext) -> Result<(), AuthzError> {
    if auth.role != Role::Admin {
        return Err(AuthzError::InsufficientRole { actual: auth.role });
    }

    Ok(())
}

/// Requires the caller to be an admin or the task's assignee
pub fn require_task_access(auth: &AuthContext, assigned_to: Uuid) -> Result<(), AuthzError> {
    if auth.is_admin() || auth.user_id == assigned_to {
        return Ok(());
    }

    Err(AuthzError::NotAssignee)
}
