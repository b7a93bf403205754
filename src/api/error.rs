//! API error types with structured JSON responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::gate::GateError;
use crate::registration::RegistrationError;
use crate::scheduling::AppointmentError;
use crate::store::StoreError;
use crate::validation::FieldErrors;

/// Structured error response body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    pub code: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<FieldErrors>,
}

/// API-level errors with HTTP status mapping.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Validation failed")]
    Validation(FieldErrors),
    #[error("Invalid request: {0}")]
    BadRequest(String),
    #[error("Invalid or missing access key")]
    Unauthorized,
    #[error("{0}")]
    InvalidPasskey(GateError),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Record store failure: {0}")]
    Store(StoreError),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code, message, fields) = match self {
            ApiError::Validation(errors) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION",
                "Validation failed".to_string(),
                Some(errors),
            ),
            ApiError::BadRequest(detail) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", detail, None)
            }
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "UNAUTHORIZED",
                "Invalid or missing access key".to_string(),
                None,
            ),
            ApiError::InvalidPasskey(err) => (
                StatusCode::UNAUTHORIZED,
                "INVALID_PASSKEY",
                err.to_string(),
                None,
            ),
            ApiError::NotFound(detail) => (StatusCode::NOT_FOUND, "NOT_FOUND", detail, None),
            ApiError::Conflict(detail) => (StatusCode::CONFLICT, "INVALID_TRANSITION", detail, None),
            ApiError::Store(err) => {
                tracing::error!(error = %err, "record store failure");
                (
                    StatusCode::BAD_GATEWAY,
                    "STORE_UNAVAILABLE",
                    "The record store is unreachable".to_string(),
                    None,
                )
            }
            ApiError::Internal(detail) => {
                tracing::error!(detail, "API internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = ErrorBody {
            error: ErrorDetail {
                code,
                message,
                fields,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AppointmentError> for ApiError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::Validation(errors) => ApiError::Validation(errors),
            AppointmentError::NotFound(id) => ApiError::NotFound(format!("Appointment not found: {id}")),
            AppointmentError::InvalidTransition { from, to } => ApiError::Conflict(format!(
                "Invalid status transition: {} -> {}",
                from.as_str(),
                to.as_str(),
            )),
            AppointmentError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<RegistrationError> for ApiError {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::Validation(errors) => ApiError::Validation(errors),
            RegistrationError::NotFound(id) => ApiError::NotFound(format!("Record not found: {id}")),
            RegistrationError::Store(e) => ApiError::Store(e),
        }
    }
}

impl From<GateError> for ApiError {
    fn from(err: GateError) -> Self {
        ApiError::InvalidPasskey(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use crate::models::AppointmentStatus;

    #[tokio::test]
    async fn validation_returns_400_with_field_map() {
        let mut errors = FieldErrors::default();
        errors.push("email", "Invalid email address");

        let response = ApiError::Validation(errors).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "VALIDATION");
        assert_eq!(json["error"]["fields"]["email"], "Invalid email address");
    }

    #[tokio::test]
    async fn unauthorized_returns_401() {
        let response = ApiError::Unauthorized.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn invalid_transition_returns_409() {
        let err: ApiError = AppointmentError::InvalidTransition {
            from: AppointmentStatus::Cancelled,
            to: AppointmentStatus::Scheduled,
        }
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_TRANSITION");
        assert!(json["error"]["message"]
            .as_str()
            .unwrap()
            .contains("cancelled -> scheduled"));
    }

    #[tokio::test]
    async fn store_failure_returns_502_and_hides_detail() {
        let err: ApiError = AppointmentError::Store(StoreError::Unavailable(
            "connection lock poisoned".into(),
        ))
        .into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "STORE_UNAVAILABLE");
        assert_eq!(json["error"]["message"], "The record store is unreachable");
    }

    #[tokio::test]
    async fn not_found_returns_404() {
        let err: ApiError = RegistrationError::NotFound("u1".into()).into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn gate_error_returns_static_message() {
        let err: ApiError = GateError::InvalidPasskey.into();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = to_bytes(response.into_body(), 4096).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "INVALID_PASSKEY");
        assert_eq!(
            json["error"]["message"],
            "Invalid admin passkey, please try again",
        );
    }
}
