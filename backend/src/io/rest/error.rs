//! HTTP mapping for domain errors.

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use shared::{ErrorResponse, MessageResponse};
use tracing::error;

use crate::domain::error::{BillError, BillResult};

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

pub fn internal_error_response() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: INTERNAL_ERROR_MESSAGE.to_string(),
        }),
    )
        .into_response()
}

impl IntoResponse for BillError {
    fn into_response(self) -> Response {
        match self {
            BillError::Validation(error) => {
                (StatusCode::BAD_REQUEST, Json(ErrorResponse { error })).into_response()
            }
            BillError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(MessageResponse { message })).into_response()
            }
            BillError::Storage(e) => {
                error!("Storage failure: {:#}", e);
                internal_error_response()
            }
        }
    }
}

impl From<JsonRejection> for BillError {
    fn from(rejection: JsonRejection) -> Self {
        BillError::Validation(rejection.body_text())
    }
}

/// Unwrap a JSON body, turning malformed input into a validation error
pub fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> BillResult<T> {
    payload.map(|Json(body)| body).map_err(BillError::from)
}
