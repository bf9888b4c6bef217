//! The uniform response envelope.
//!
//! Every response body, success or failure, has the shape:
//!
//! ```json
//! { "code": 200, "message": "success", "errors": false, "payload": { ... } }
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reply<T> {
    pub code: u16,
    pub message: String,
    pub errors: bool,
    pub payload: T,
}

impl<T: Serialize> Reply<T> {
    pub fn success(payload: T) -> Self {
        Self {
            code: StatusCode::OK.as_u16(),
            message: "success".to_string(),
            errors: false,
            payload,
        }
    }
}

impl Reply<Value> {
    pub fn failure(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            errors: true,
            payload: Value::Null,
        }
    }
}

impl<T: Serialize> IntoResponse for Reply<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}
