//! # API Error Rendering
//!
//! Turns a [`DomainError`] into a structured JSON response. The HTTP status
//! comes from the code's [`StatusCategory`]; the body is:
//!
//! ```json
//! { "error": { "code": "...", "message": "...", "details": {...},
//!              "request_id": "...", "user_id": "..." } }
//! ```
//!
//! Server-side categories never expose the domain message or context to the
//! client. They are logged instead.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use goformx_core::{DomainError, ErrorCode, StatusCategory, UserId};
use goformx_form::ValidationReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Structured JSON error response body.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorDetail {
    /// Wire error code (e.g. "FORM_INVALID", "VALIDATION_ERROR").
    pub code: String,
    pub message: String,
    /// Field-level context, present only for client errors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// A domain error plus the request metadata echoed back to the client.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct ApiError {
    #[source]
    error: DomainError,
    request_id: Option<String>,
    user_id: Option<UserId>,
}

impl ApiError {
    pub fn new(error: DomainError) -> Self {
        Self {
            error,
            request_id: None,
            user_id: None,
        }
    }

    /// A malformed request body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(DomainError::new(ErrorCode::BadRequest, message))
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    pub fn with_user_id(mut self, user_id: UserId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    pub fn domain(&self) -> &DomainError {
        &self.error
    }

    pub fn into_domain(self) -> DomainError {
        self.error
    }

    /// HTTP status and wire code for this error.
    pub fn status_and_code(&self) -> (StatusCode, ErrorCode) {
        let code = self.error.code();
        let status = StatusCode::from_u16(StatusCategory::of(code).http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, code)
    }

    fn public_message(&self, category: StatusCategory) -> String {
        match category {
            StatusCategory::ServerError => "An internal error occurred".to_string(),
            StatusCategory::ServiceUnavailable => "The service is temporarily unavailable".to_string(),
            StatusCategory::GatewayTimeout => "The request timed out".to_string(),
            _ => self.error.message().to_string(),
        }
    }

    fn public_details(&self, category: StatusCategory) -> Option<Value> {
        if category.is_server_side() || self.error.context().is_empty() {
            return None;
        }
        serde_json::to_value(self.error.context()).ok()
    }
}

impl From<DomainError> for ApiError {
    fn from(error: DomainError) -> Self {
        Self::new(error)
    }
}

impl From<ValidationReport> for ApiError {
    fn from(report: ValidationReport) -> Self {
        Self::new(report.into())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let category = StatusCategory::of(code);

        match category {
            StatusCategory::ServerError => tracing::error!(
                code = %code,
                error = %self.error,
                request_id = self.request_id.as_deref(),
                "internal server error"
            ),
            StatusCategory::ServiceUnavailable | StatusCategory::GatewayTimeout => tracing::warn!(
                code = %code,
                error = %self.error,
                request_id = self.request_id.as_deref(),
                "service degraded"
            ),
            _ => tracing::debug!(code = %code, "client error"),
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.as_str().to_string(),
                message: self.public_message(category),
                details: self.public_details(category),
                request_id: self.request_id,
                user_id: self.user_id.map(|u| u.as_uuid().to_string()),
            },
        };

        (status, Json(body)).into_response()
    }
}
