/// User management endpoints
///
/// All routes require authentication; everything except
/// `PUT /api/users/change-password` also requires the admin role.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{IdPath, ValidJson},
    response::{self, ApiResponse, Data, Empty},
    validation::{validate_mobile, validate_not_blank},
};
use axum::{
    extract::{Query, State},
    Extension,
};
use serde::Deserialize;
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::user::{Address, Role, UserPatch, UserProfile},
    query::Page,
    services::{CreateUser, UserPage},
};
use validator::Validate;

/// Raw `page`/`limit` query values; bad values fall back to defaults
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
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

    #[validate(
        email(message = "Please provide a valid email"),
        length(max = 255, message = "Email cannot be more than 255 characters")
    )]
    pub email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub password: String,

    #[validate(custom(function = "validate_mobile"))]
    pub mobile_number: String,

    #[validate(nested)]
    pub address: Option<Address>,

    pub role: Option<Role>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Cannot be more than 100 characters")
    )]
    pub first_name: Option<String>,

    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 100, message = "Cannot be more than 100 characters")
    )]
    pub last_name: Option<String>,

    #[validate(
        email(message = "Please provide a valid email"),
        length(max = 255, message = "Email cannot be more than 255 characters")
    )]
    pub email: Option<String>,

    #[validate(custom(function = "validate_mobile"))]
    pub mobile_number: Option<String>,

    #[validate(nested)]
    pub address: Option<Address>,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
}

impl From<UpdateUserRequest> for UserPatch {
    fn from(req: UpdateUserRequest) -> Self {
        UserPatch {
            first_name: req.first_name.map(|v| v.trim().to_string()),
            last_name: req.last_name.map(|v| v.trim().to_string()),
            email: req.email,
            mobile_number: req.mobile_number,
            address: req.address,
            role: req.role,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Please provide your current password"))]
    pub current_password: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    pub new_password: String,
}

/// List users
///
/// `GET /api/users?page=1&limit=10`, newest first.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<PageParams>,
) -> ApiResult<ApiResponse<UserPage>> {
    let page = Page::from_raw(params.page.as_deref(), params.limit.as_deref());
    let users = state.services.users.list(&auth, page).await?;
    Ok(ApiResponse::new(users))
}

pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Data<UserProfile>>> {
    let user = state.services.users.get(&auth, id).await?;
    Ok(response::data(user))
}

/// Create an active user with a password (admin)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed
/// - `409 Conflict`: Email already exists
pub async fn create_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateUserRequest>,
) -> ApiResult<ApiResponse<Data<UserProfile>>> {
    let user = state
        .services
        .users
        .create(
            &auth,
            CreateUser {
                first_name: req.first_name,
                last_name: req.last_name,
                email: req.email,
                password: req.password,
                mobile_number: req.mobile_number,
                address: req.address,
                role: req.role,
            },
        )
        .await?;

    Ok(response::data(user).created())
}

pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<UpdateUserRequest>,
) -> ApiResult<ApiResponse<Data<UserProfile>>> {
    let user = state.services.users.update(&auth, id, req.into()).await?;
    Ok(response::data(user))
}

/// Delete a user no task refers to
///
/// # Errors
///
/// - `400 Bad Request`: Deleting your own account
/// - `409 Conflict`: Tasks still reference the user
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Empty>> {
    state.services.users.delete(&auth, id).await?;
    Ok(response::message("User deleted"))
}

/// Change the caller's own password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> ApiResult<ApiResponse<Empty>> {
    state
        .services
        .identity
        .change_password(auth.user_id, &req.current_password, &req.new_password)
        .await?;

    Ok(response::message("Password updated"))
}
