/// User model
///
/// A user moves through the onboarding states
/// `invited -> otp_pending -> password_set <-> reset_pending`. The state is
/// not stored as a column; it is implied by `is_first_login`, the presence of
/// a password hash, and the transient OTP / reset-token fields.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255),
///     mobile_number VARCHAR(16) NOT NULL,
///     address JSONB,
///     role user_role NOT NULL DEFAULT 'user',
///     is_active BOOLEAN NOT NULL DEFAULT TRUE,
///     is_first_login BOOLEAN NOT NULL DEFAULT TRUE,
///     reset_password_token VARCHAR(64),
///     reset_password_expire TIMESTAMPTZ,
///     otp VARCHAR(64),
///     otp_expire TIMESTAMPTZ,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Secrets (`password_hash`, `otp`, `reset_password_token`) are skipped during
/// serialization so a `User` can never leak them into a response body.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Account role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "user_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access to users and tasks
    Admin,

    /// Access to own tasks only
    #[default]
    User,
}

impl Role {
    /// Gets role as string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Geographic point attached to an address
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct Coordinates {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub lat: f64,

    #[validate(range(min = -180.0, max = 180.0, message = "Longitude must be between -180 and 180"))]
    pub lng: f64,
}

/// Structured location of a user
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
pub struct Address {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 500, message = "Location must be 1 to 500 characters"))]
    pub location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(nested)]
    pub coordinates: Option<Coordinates>,
}

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,

    /// Normalised (trimmed, lower-case) email, unique across users
    pub email: String,

    /// Argon2id PHC hash; `None` until first password setup
    #[serde(skip_serializing, default)]
    pub password_hash: Option<String>,

    /// E.164 mobile number
    pub mobile_number: String,
    pub address: Option<Address>,
    pub role: Role,
    pub is_active: bool,
    pub is_first_login: bool,

    /// SHA-256 digest of the outstanding reset token
    #[serde(skip_serializing, default)]
    pub reset_password_token: Option<String>,
    #[serde(skip_serializing, default)]
    pub reset_password_expire: Option<DateTime<Utc>>,

    /// SHA-256 digest of the outstanding OTP
    #[serde(skip_serializing, default)]
    pub otp: Option<String>,
    #[serde(skip_serializing, default)]
    pub otp_expire: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
}

impl User {
    /// Checks profile field widths
    pub fn validate(&self) -> Result<(), String> {
        validate_profile(&self.first_name, &self.last_name, &self.email, &self.mobile_number)
    }

    /// Whether the user holds the admin role
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Stores an already-hashed password and leaves first-login state
    pub fn set_password_hash(&mut self, hash: String) {
        self.password_hash = Some(hash);
        self.is_first_login = false;
    }

    /// Records an OTP digest with an absolute expiry
    pub fn set_otp(&mut self, digest: String, expires_at: DateTime<Utc>) {
        self.otp = Some(digest);
        self.otp_expire = Some(expires_at);
    }

    pub fn clear_otp(&mut self) {
        self.otp = None;
        self.otp_expire = None;
    }

    /// Records a reset-token digest with an absolute expiry
    pub fn set_reset_token(&mut self, digest: String, expires_at: DateTime<Utc>) {
        self.reset_password_token = Some(digest);
        self.reset_password_expire = Some(expires_at);
    }

    pub fn clear_reset_token(&mut self) {
        self.reset_password_token = None;
        self.reset_password_expire = None;
    }

    /// Whether a stored OTP digest matches and is still valid at `now`
    pub fn otp_matches(&self, digest: &str, now: DateTime<Utc>) -> bool {
        match (&self.otp, self.otp_expire) {
            (Some(stored), Some(expire)) => {
                crate::auth::token::constant_time_compare(stored, digest) && expire > now
            }
            _ => false,
        }
    }

    /// Whether a stored reset digest matches and is still valid at `now`
    pub fn reset_token_matches(&self, digest: &str, now: DateTime<Utc>) -> bool {
        match (&self.reset_password_token, self.reset_password_expire) {
            (Some(stored), Some(expire)) => {
                crate::auth::token::constant_time_compare(stored, digest) && expire > now
            }
            _ => false,
        }
    }
}

/// Input for creating a user record
#[derive(Debug, Clone)]
pub struct NewUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub mobile_number: String,
    pub address: Option<Address>,
    pub role: Role,
    pub is_active: bool,
    pub is_first_login: bool,
}

impl NewUser {
    pub fn validate(&self) -> Result<(), String> {
        validate_profile(&self.first_name, &self.last_name, &self.email, &self.mobile_number)
    }

    /// Invited user: no password, first-login pending
    pub fn invited(
        first_name: String,
        last_name: String,
        email: String,
        mobile_number: String,
        address: Option<Address>,
        role: Role,
    ) -> Self {
        Self {
            first_name,
            last_name,
            email,
            password_hash: None,
            mobile_number,
            address,
            role,
            is_active: true,
            is_first_login: true,
        }
    }

    /// Materialises the record with a fresh id and creation time
    pub fn into_user(self, id: Uuid, created_at: DateTime<Utc>) -> User {
        User {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            password_hash: self.password_hash,
            mobile_number: self.mobile_number,
            address: self.address,
            role: self.role,
            is_active: self.is_active,
            is_first_login: self.is_first_login,
            reset_password_token: None,
            reset_password_expire: None,
            otp: None,
            otp_expire: None,
            created_at,
        }
    }
}

/// Partial profile update applied by an admin
#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub mobile_number: Option<String>,
    pub address: Option<Address>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl UserPatch {
    /// Applies every present field to `user`
    pub fn apply(self, user: &mut User) {
        if let Some(v) = self.first_name {
            user.first_name = v;
        }
        if let Some(v) = self.last_name {
            user.last_name = v;
        }
        if let Some(v) = self.email {
            user.email = v;
        }
        if let Some(v) = self.mobile_number {
            user.mobile_number = v;
        }
        if let Some(v) = self.address {
            user.address = Some(v);
        }
        if let Some(v) = self.role {
            user.role = v;
        }
        if let Some(v) = self.is_active {
            user.is_active = v;
        }
    }
}

/// Projection returned alongside a session token on login
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSummary {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub role: Role,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Public profile returned by `/me` and the user admin endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub mobile_number: String,
    pub address: Option<Address>,
    pub role: Role,
    pub is_active: bool,
    pub is_first_login: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            mobile_number: user.mobile_number.clone(),
            address: user.address.clone(),
            role: user.role,
            is_active: user.is_active,
            is_first_login: user.is_first_login,
            created_at: user.created_at,
        }
    }
}

pub const MAX_PERSON_NAME_LENGTH: usize = 100;
pub const MAX_EMAIL_LENGTH: usize = 255;
pub const MAX_MOBILE_LENGTH: usize = 16;

/// Checks profile fields against the column widths of `users`
pub fn validate_profile(
    first_name: &str,
    last_name: &str,
    email: &str,
    mobile_number: &str,
) -> Result<(), String> {
    let limits = [
        ("First name", first_name, MAX_PERSON_NAME_LENGTH),
        ("Last name", last_name, MAX_PERSON_NAME_LENGTH),
        ("Email", email, MAX_EMAIL_LENGTH),
        ("Mobile number", mobile_number, MAX_MOBILE_LENGTH),
    ];

    for (label, value, max) in limits {
        if value.chars().count() > max {
            return Err(format!("{} cannot be more than {} characters", label, max));
        }
    }

    Ok(())
}

/// Normalises an email for storage and lookup
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
