/// Task endpoints
///
/// # Endpoints
///
/// - `GET    /api/tasks` - Filtered, sorted, paginated listing
/// - `POST   /api/tasks` - Create a task (admin)
/// - `GET    /api/tasks/:id` - Task with populated users
/// - `PUT    /api/tasks/:id` - Partial update (admin)
/// - `DELETE /api/tasks/:id` - Delete (admin)
/// - `PUT    /api/tasks/:id/completion` - Toggle completion (assignee or admin)
///
/// Dates in request bodies accept `YYYY-MM-DD` or RFC 3339.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{IdPath, ValidJson},
    response::{self, ApiResponse, Data, Empty},
    validation::validate_not_blank,
};
use axum::{
    extract::{Query, State},
    Extension,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use taskflow_shared::{
    auth::middleware::AuthContext,
    models::task::{TaskDetail, TaskPatch},
    services::{CreateTask, TaskPage},
};
use uuid::Uuid;
use validator::Validate;

mod date_input {
    use chrono::{DateTime, Utc};
    use serde::{de, Deserialize, Deserializer};
    use taskflow_shared::query::parse_date;

    fn parse<E: de::Error>(raw: &str) -> Result<DateTime<Utc>, E> {
        parse_date(raw.trim()).ok_or_else(|| E::custom(format!("invalid date: {}", raw)))
    }

    pub fn required<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw)
    }

    pub fn optional<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(raw) => parse(&raw).map(Some),
            None => Ok(None),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateTaskRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Task name cannot be more than 255 characters")
    )]
    pub name: String,

    #[validate(length(max = 1250, message = "Description cannot be more than 1250 characters"))]
    pub description: Option<String>,

    #[serde(deserialize_with = "date_input::required")]
    pub start_date: DateTime<Utc>,

    #[serde(deserialize_with = "date_input::required")]
    pub end_date: DateTime<Utc>,

    pub is_active: Option<bool>,

    pub assigned_to: Uuid,
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTaskRequest {
    #[validate(
        custom(function = "validate_not_blank"),
        length(max = 255, message = "Task name cannot be more than 255 characters")
    )]
    pub name: Option<String>,

    #[validate(length(max = 1250, message = "Description cannot be more than 1250 characters"))]
    pub description: Option<String>,

    #[serde(default, deserialize_with = "date_input::optional")]
    pub start_date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "date_input::optional")]
    pub end_date: Option<DateTime<Utc>>,

    pub assigned_to: Option<Uuid>,

    pub is_active: Option<bool>,
}

impl From<UpdateTaskRequest> for TaskPatch {
    fn from(req: UpdateTaskRequest) -> Self {
        TaskPatch {
            name: req.name.map(|n| n.trim().to_string()),
            description: req.description,
            start_date: req.start_date,
            end_date: req.end_date,
            assigned_to: req.assigned_to,
            is_active: req.is_active,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CompletionRequest {
    pub is_completed: Option<bool>,

    #[serde(default, deserialize_with = "date_input::optional")]
    pub completion_date: Option<DateTime<Utc>>,
}

/// List tasks
///
/// # Query parameters
///
/// - `field=value` or `field[op]=value` filters (op: gt, gte, lt, lte, in)
/// - `sort=-createdAt,name`
/// - `page`, `limit`
///
/// Non-admins only ever see tasks assigned to them.
///
/// # Response
///
/// ```json
/// {
///   "success": true,
///   "count": 5,
///   "total": 11,
///   "pagination": { "next": { "page": 3, "limit": 5 }, "prev": { "page": 1, "limit": 5 } },
///   "data": [ ... ]
/// }
/// ```
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Query(params): Query<Vec<(String, String)>>,
) -> ApiResult<ApiResponse<TaskPage>> {
    let page = state.services.tasks.list(&auth, &params).await?;
    Ok(ApiResponse::new(page))
}

pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Data<TaskDetail>>> {
    let task = state.services.tasks.get(&auth, id).await?;
    Ok(response::data(task))
}

/// Create a task (admin)
///
/// # Errors
///
/// - `400 Bad Request`: Validation failed, or end date before start date
/// - `404 Not Found`: Assigned user does not exist
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ValidJson(req): ValidJson<CreateTaskRequest>,
) -> ApiResult<ApiResponse<Data<TaskDetail>>> {
    let task = state
        .services
        .tasks
        .create(
            &auth,
            CreateTask {
                name: req.name,
                description: req.description,
                start_date: req.start_date,
                end_date: req.end_date,
                is_active: req.is_active,
                assigned_to: req.assigned_to,
            },
        )
        .await?;

    Ok(response::data(task).created())
}

pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<UpdateTaskRequest>,
) -> ApiResult<ApiResponse<Data<TaskDetail>>> {
    let task = state.services.tasks.update(&auth, id, req.into()).await?;
    Ok(response::data(task))
}

pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
) -> ApiResult<ApiResponse<Empty>> {
    state.services.tasks.delete(&auth, id).await?;
    Ok(response::message("Task deleted"))
}

/// Mark a task complete or not complete
///
/// An explicit `completionDate` wins; completing without one stamps the
/// current time; un-completing clears it.
pub async fn set_completion(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    IdPath(id): IdPath,
    ValidJson(req): ValidJson<CompletionRequest>,
) -> ApiResult<ApiResponse<Data<TaskDetail>>> {
    let task = state
        .services
        .tasks
        .set_completion(&auth, id, req.is_completed, req.completion_date)
        .await?;

    Ok(response::data(task))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_accepts_calendar_dates() {
        let req: CreateTaskRequest = serde_json::from_value(json!({
            "name": "Write report",
            "startDate": "2024-01-01",
            "endDate": "2024-01-02T12:00:00Z",
            "assignedTo": Uuid::nil()
        }))
        .unwrap();

        assert_eq!(req.start_date.to_rfc3339(), "2024-01-01T00:00:00+00:00");
        assert!(req.end_date > req.start_date);
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_bad_date() {
        let result: Result<CreateTaskRequest, _> = serde_json::from_value(json!({
            "name": "x",
            "startDate": "yesterday",
            "endDate": "2024-01-02",
            "assignedTo": Uuid::nil()
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_create_request_validation() {
        let req: CreateTaskRequest = serde_json::from_value(json!({
            "name": "  ",
            "description": "x".repeat(1251),
            "startDate": "2024-01-01",
            "endDate": "2024-01-02",
            "assignedTo": Uuid::nil()
        }))
        .unwrap();

        let errors = req.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(errors.field_errors().contains_key("description"));
    }

    #[test]
    fn test_update_request_dates_are_optional() {
        let req: UpdateTaskRequest = serde_json::from_value(json!({ "name": "New" })).unwrap();
        assert!(req.start_date.is_none());
        let patch: TaskPatch = req.into();
        assert_eq!(patch.name.as_deref(), Some("New"));
    }
}
