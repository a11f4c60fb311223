/// Success envelope
///
/// Every successful response is `{ "success": true, ... }` with an optional
/// `message` and the handler's body flattened in beside it:
///
/// ```json
/// { "success": true, "data": { "id": "..." } }
/// { "success": true, "count": 5, "total": 11, "pagination": {}, "data": [] }
/// ```

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(flatten)]
    pub body: T,

    #[serde(skip)]
    status: StatusCode,
}

/// `{ "data": ... }` body
#[derive(Debug, Serialize)]
pub struct Data<T: Serialize> {
    pub data: T,
}

/// Body with no fields beyond the envelope
#[derive(Debug, Serialize)]
pub struct Empty {}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(body: T) -> Self {
        Self {
            success: true,
            message: None,
            body,
            status: StatusCode::OK,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn created(mut self) -> Self {
        self.status = StatusCode::CREATED;
        self
    }
}

/// Wraps `value` as `{ "data": value }`
pub fn data<T: Serialize>(value: T) -> ApiResponse<Data<T>> {
    ApiResponse::new(Data { data: value })
}

/// Envelope carrying only a message
pub fn message(text: impl Into<String>) -> ApiResponse<Empty> {
    ApiResponse::new(Empty {}).with_message(text)
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_envelope() {
        let value = serde_json::to_value(data(json!({"id": 1}))).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"id": 1}}));
    }

    #[test]
    fn test_message_envelope() {
        let value = serde_json::to_value(message("OTP sent")).unwrap();
        assert_eq!(value, json!({"success": true, "message": "OTP sent"}));
    }

    #[test]
    fn test_created_status() {
        let response = data(1).created().into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
