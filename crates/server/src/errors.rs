use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use tracing::error;

use service::{auth::errors::AuthError, authz::AuthzError, errors::ServiceError, sales::SaleError};

/// JSON error response: `{ "error": <title>, "detail": <message?> }`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub error: String,
    pub detail: Option<String>,
    /// Logged for 5xx, never sent to the client.
    source: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<&'a str>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, error: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, error: error.into(), detail, source: None }
    }

    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad request", Some(detail.into()))
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthorized", Some(detail.into()))
    }

    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", Some(detail.into()))
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not found", Some(detail.into()))
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", Some(detail.into()))
    }

    pub fn internal(code: u16, source: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error: "internal error".into(),
            detail: Some(format!("error code {code}")),
            source: Some(source.into()),
        }
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.error, source = self.source.as_deref().unwrap_or(""), "request failed");
        }
        let body = ErrorBody { error: &self.error, detail: self.detail.as_deref() };
        (self.status, Json(body)).into_response()
    }
}

impl From<AuthError> for JsonApiError {
    fn from(e: AuthError) -> Self {
        let code = e.code();
        match e {
            AuthError::Validation(msg) => Self::bad_request(msg),
            AuthError::Conflict => Self::conflict(e.to_string()),
            AuthError::NotFound => Self::not_found(e.to_string()),
            AuthError::Unauthorized | AuthError::InvalidToken => Self::unauthorized(e.to_string()),
            AuthError::Forbidden => Self::forbidden(e.to_string()),
            AuthError::HashError(_) | AuthError::TokenError(_) | AuthError::Repository(_) => Self::internal(code, e.to_string()),
        }
    }
}

impl From<AuthzError> for JsonApiError {
    fn from(e: AuthzError) -> Self {
        match e {
            AuthzError::Storage(_) => Self::internal(e.code(), e.to_string()),
            _ => Self::forbidden(e.to_string()),
        }
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        let code = e.code();
        match e {
            ServiceError::Validation(msg) => Self::bad_request(msg),
            ServiceError::NotFound(msg) => Self::not_found(msg),
            ServiceError::Conflict(msg) => Self::conflict(msg),
            ServiceError::Authz(inner) => inner.into(),
            ServiceError::Db(_) | ServiceError::Internal(_) => Self::internal(code, e.to_string()),
        }
    }
}

impl From<SaleError> for JsonApiError {
    fn from(e: SaleError) -> Self {
        match e {
            SaleError::NotFound => Self::not_found(e.to_string()),
            SaleError::Storage { .. } => Self::internal(e.code(), e.to_string()),
            _ => Self::bad_request(e.to_string()),
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rej: JsonRejection) -> Self { Self::bad_request(rej.body_text()) }
}

impl From<PathRejection> for JsonApiError {
    fn from(rej: PathRejection) -> Self { Self::bad_request(rej.body_text()) }
}

impl From<QueryRejection> for JsonApiError {
    fn from(rej: QueryRejection) -> Self { Self::bad_request(rej.body_text()) }
}
