/// Domain error taxonomy
///
/// Every service operation returns [`ServiceResult`]. The API layer maps each
/// variant onto an HTTP status; nothing here knows about HTTP.
///
/// Login failures are deliberately coarse: an unknown email and a wrong
/// password both surface as [`ServiceError::InvalidCredentials`], and OTP
/// verification never says whether the user, the code, or the expiry was wrong.

use crate::auth::{authorization::AuthzError, jwt::JwtError, password::PasswordError};
use crate::notify::MailError;
use crate::query::QueryError;
use crate::store::StoreError;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors produced by the identity, user, and task services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing or malformed input
    #[error("{0}")]
    BadRequest(String),

    /// Duplicate email or a record still referenced elsewhere
    #[error("{0}")]
    Conflict(String),

    /// Missing user, task, or assigned-user reference
    #[error("{0}")]
    NotFound(String),

    /// Unknown email or wrong password
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// The account exists but has been deactivated
    #[error("Your account is disabled")]
    AccountDisabled,

    /// The account has not completed first-login password setup
    #[error("Please set up your password first")]
    PasswordNotSet,

    /// OTP did not match, has expired, or the user does not exist
    #[error("Invalid or expired OTP")]
    InvalidOrExpiredOtp,

    /// Reset token did not match or has expired
    #[error("Invalid token")]
    InvalidToken,

    /// Password setup replayed on an account that already has one
    #[error("Password already set")]
    AlreadySet,

    /// Email dispatch failed; transient token fields were cleared
    #[error("Email could not be sent")]
    NotificationFailure(#[source] MailError),

    /// Role or ownership mismatch
    #[error("{0}")]
    Forbidden(String),

    /// Missing or invalid session
    #[error("{0}")]
    Unauthorized(String),

    /// Unexpected persistence or crypto failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => {
                ServiceError::Conflict(format!("A record with this {} already exists", field))
            }
            StoreError::Invalid(msg) => ServiceError::BadRequest(msg),
            StoreError::Reference(_) => ServiceError::Conflict(
                "Record references a missing user or is still referenced".to_string(),
            ),
            StoreError::NotFound(what) => ServiceError::NotFound(format!("{} not found", what)),
            StoreError::Backend(msg) => ServiceError::Internal(msg),
        }
    }
}

impl From<QueryError> for ServiceError {
    fn from(err: QueryError) -> Self {
        ServiceError::BadRequest(err.to_string())
    }
}

impl From<PasswordError> for ServiceError {
    fn from(err: PasswordError) -> Self {
        ServiceError::Internal(format!("Password operation failed: {}", err))
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        ServiceError::Internal(format!("Session token could not be issued: {}", err))
    }
}

impl From<AuthzError> for ServiceError {
    fn from(err: AuthzError) -> Self {
        ServiceError::Forbidden(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_duplicate_becomes_conflict() {
        let err: ServiceError = StoreError::Duplicate("email".to_string()).into();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert!(err.to_string().contains("email"));
    }

    #[test]
    fn test_store_invalid_becomes_bad_request() {
        let err: ServiceError =
            StoreError::Invalid("End date must be after or equal to start date".to_string()).into();
        assert!(matches!(err, ServiceError::BadRequest(_)));
    }

    #[test]
    fn test_login_failures_share_message() {
        assert_eq!(ServiceError::InvalidCredentials.to_string(), "Invalid credentials");
        assert_eq!(ServiceError::InvalidOrExpiredOtp.to_string(), "Invalid or expired OTP");
    }
}
