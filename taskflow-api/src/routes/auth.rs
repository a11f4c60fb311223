/// Authentication and onboarding endpoints
///
/// # Endpoints
///
/// - `POST /api/auth/invite-admin` - Invite an administrator
/// - `POST /api/auth/invite-user` - Invite a user (admin)
/// - `POST /api/auth/verify-otp` - Confirm the emailed OTP
/// - `POST /api/auth/resend-otp` - Re-send an OTP
/// - `POST /api/auth/setup-password` - Set the first password
/// - `POST /api/auth/login` - Login and get a session token
/// - `GET  /api/auth/me` - Current user's profile
/// - `POST /api/auth/forgot-password` - Email a reset link
/// - `PUT  /api/auth/reset-password/:resettoken` - Set a new password from a reset link

use crate::{
    app::AppState,
    error::ApiResult,
    extract::ValidJson,
    response::{self, ApiResponse, Data, Empty},
    validation::{validate_mobile, validate_not_blank},
};
use axum::{
    extract::{Path, State},
    http::{header, HeaderMap},
    Extension,
};
use serde::{Deserialize, Serialize};
use taskflow_shared::{
    auth::middleware::AuthContext,
    auth::authorization::require_admin,
    error::ServiceError,
    models::user::{Address, UserProfile, UserSummary},
    services::{InviteOutcome, UserInvite},
};
use uuid::Uuid;
use validator::Validate;

/// Admin invite request
#[derive(Debug, Deserialize, Validate)]
pub struct InviteAdminRequest {
    #[validate(
        email(message = "Please provide a valid email"),
        length(max = 255, message = "Email cannot be more than 255 characters")
    )]
    pub email: String,
}

/// User invite request
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct InviteUserRequest {
    #[validate(
        email(message = "Please provide a valid email"),
        length(max = 255, message = "Email cannot be more than 255 characters")
    )]
    pub email: String,

    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Cannot be more than 100 characters")
    )]
    pub first_name: String,

    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Cannot be more than 100 characters")
    )]
    pub last_name: String,

    #[validate(custom(function = "validate_mobile"))]
    pub mobile_number: String,

    #[validate(nested)]
    pub address: Address,
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyOtpRequest {
    #[validate(
        email(message = "Please provide a valid email"),
        length(max = 255, message = "Email cannot be more than 255 characters")
    )]
    pub email: String,

    #[validate(custom(function = "validate_not_blank"))]
    pub otp: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct EmailRequest {
    #[validate(
        email(message = "Please provide a valid email"),
        length(max = 255, message = "Email cannot be more than 255 characters")
    )]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SetupPasswordRequest {
    pub user_id: Uuid,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

/// Login request
///
/// Both fields are optional here so a missing one is reported by the
/// identity engine as a bad request rather than a deserialization error.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpResponse {
    pub user_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserSummary,
}

fn invite_response(outcome: InviteOutcome) -> ApiResponse<Data<UserSummary>> {
    let message = if outcome.otp_sent {
        "User invited successfully. OTP sent to email."
    } else {
        "User invited, but the OTP email could not be sent. Use resend-otp to try again."
    };

    response::data(UserSummary::from(&outcome.user)).with_message(message)
}

/// Invite an administrator
///
/// Creates an admin with placeholder profile fields and emails an OTP.
///
/// # Errors
///
/// - `400 Bad Request`: Invalid email
/// - `409 Conflict`: Email already exists
pub async fn invite_admin(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<InviteAdminRequest>,
) -> ApiResult<ApiResponse<Data<UserSummary>>> {
    let outcome = state.services.identity.invite_admin(&req.email).await?;
    Ok(invite_response(outcome))
}

/// Invite a regular user (admin only)
pub async fn invite_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<InviteUserRequest>,
) -> ApiResult<ApiResponse<Data<UserSummary>>> {
    require_admin(&auth).map_err(ServiceError::from)?;

    let outcome = state
        .services
        .identity
        .invite_user(UserInvite {
            email: req.email,
            first_name: req.first_name,
            last_name: req.last_name,
            mobile_number: req.mobile_number,
            address: Some(req.address),
        })
        .await?;

    Ok(invite_response(outcome))
}

/// Verify an OTP
///
/// # Response
///
/// ```json
/// { "success": true, "message": "OTP verified successfully", "userId": "uuid" }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Unknown email, wrong code, or expired code (one message for all)
pub async fn verify_otp(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<VerifyOtpRequest>,
) -> ApiResult<ApiResponse<VerifyOtpResponse>> {
    let user_id = state.services.identity.verify_otp(&req.email, &req.otp).await?;
    Ok(ApiResponse::new(VerifyOtpResponse { user_id }).with_message("OTP verified successfully"))
}

/// Re-send an OTP to a user who has not set a password yet
pub async fn resend_otp(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<EmailRequest>,
) -> ApiResult<ApiResponse<Empty>> {
    state.services.identity.resend_otp(&req.email).await?;
    Ok(response::message("OTP sent to email"))
}

/// Set the first password and get a session token
///
/// # Errors
///
/// - `400 Bad Request`: Password too short, or password already set
/// - `404 Not Found`: Unknown user
pub async fn setup_password(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<SetupPasswordRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    let token = state
        .services
        .identity
        .setup_password(req.user_id, &req.password)
        .await?;

    Ok(ApiResponse::new(TokenResponse { token }).with_message("Password set successfully"))
}

/// Login with email and password
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "token": "eyJ...",
///   "user": { "id": "uuid", "firstName": "Ada", "lastName": "Lovelace", "email": "a@x.com", "role": "user" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Missing email or password
/// - `401 Unauthorized`: Invalid credentials, disabled account, or password not set
pub async fn login(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let outcome = state
        .services
        .identity
        .login(req.email.as_deref(), req.password.as_deref())
        .await?;

    Ok(ApiResponse::new(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}

/// Current user's profile
pub async fn me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<ApiResponse<Data<UserProfile>>> {
    let profile = state.services.identity.me(auth.user_id).await?;
    Ok(response::data(profile))
}

/// Email a password reset link
///
/// The link points at the host the request was addressed to, falling back to
/// `PUBLIC_URL`.
///
/// # Errors
///
/// - `404 Not Found`: No user with that email
/// - `502 Bad Gateway`: The email could not be sent
pub async fn forgot_password(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidJson(req): ValidJson<EmailRequest>,
) -> ApiResult<ApiResponse<Empty>> {
    let base_url = request_base_url(&headers, &state.config.api.public_url);
    state
        .services
        .identity
        .forgot_password(&req.email, &base_url)
        .await?;

    Ok(response::message("Email sent"))
}

/// Set a new password from a reset link
///
/// # Errors
///
/// - `400 Bad Request`: Unknown, used, or expired token
pub async fn reset_password(
    State(state): State<AppState>,
    Path(reset_token): Path<String>,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> ApiResult<ApiResponse<TokenResponse>> {
    let token = state
        .services
        .identity
        .reset_password(&reset_token, &req.password)
        .await?;

    Ok(ApiResponse::new(TokenResponse { token }).with_message("Password reset successfully"))
}

/// `<scheme>://<host>` of the incoming request, or `fallback`
fn request_base_url(headers: &HeaderMap, fallback: &str) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|h| !h.is_empty());

    match host {
        Some(host) => {
            let scheme = headers
                .get("x-forwarded-proto")
                .and_then(|v| v.to_str().ok())
                .unwrap_or("http");
            format!("{}://{}", scheme, host)
        }
        None => fallback.to_string(),
    }
}
