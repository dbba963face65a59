use axum::extract::rejection::QueryRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use crate::filters::{malformed_query, FieldErrors};

/// Unified error type for hub API responses.
#[derive(Debug)]
pub enum HubError {
    Db(String),
    Validation(FieldErrors),
    Unauthorized,
    Internal(String),
    /// A failure wrapped with the message the endpoint reports to the caller.
    Context {
        message: &'static str,
        source: Box<HubError>,
    },
}

impl HubError {
    /// Attach the endpoint's failure message.  Validation and auth errors keep
    /// their own shape and pass through untouched.
    pub fn context(self, message: &'static str) -> Self {
        match self {
            Self::Validation(_) | Self::Unauthorized | Self::Context { .. } => self,
            other => Self::Context {
                message,
                source: Box::new(other),
            },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Db(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Context { source, .. } => source.status(),
        }
    }
}

impl std::fmt::Display for HubError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(msg) => write!(f, "db_error: {msg}"),
            Self::Validation(errors) => write!(f, "validation_error: {} field(s)", errors.len()),
            Self::Unauthorized => write!(f, "unauthorized"),
            Self::Internal(msg) => write!(f, "internal_error: {msg}"),
            Self::Context { message, source } => write!(f, "{message}: {source}"),
        }
    }
}

impl std::error::Error for HubError {}

impl IntoResponse for HubError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::Validation(errors) => json!({
                "success": false,
                "message": "The given data was invalid.",
                "errors": errors,
            }),
            Self::Unauthorized => json!({
                "success": false,
                "message": "Unauthenticated.",
            }),
            Self::Context { message, source } => {
                tracing::error!("{message}: {source}");
                json!({
                    "success": false,
                    "message": message,
                    "error": source.to_string(),
                })
            }
            other => {
                tracing::error!("unhandled error: {other}");
                json!({
                    "success": false,
                    "message": "Server Error",
                    "error": other.to_string(),
                })
            }
        };
        (status, axum::Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for HubError {
    fn from(e: rusqlite::Error) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<r2d2::Error> for HubError {
    fn from(e: r2d2::Error) -> Self {
        Self::Db(e.to_string())
    }
}

impl From<serde_json::Error> for HubError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<FieldErrors> for HubError {
    fn from(errors: FieldErrors) -> Self {
        Self::Validation(errors)
    }
}

/// Unreadable query strings are reported like any other invalid input.
impl From<QueryRejection> for HubError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(malformed_query(&rejection.body_text()))
    }
}
