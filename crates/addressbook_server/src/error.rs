//! HTTP error taxonomy and wire rendering.
//!
//! Every error body has a top-level `detail` key. Internal failures never
//! carry their message to the client; the error middleware renders them.

use addressbook_core::db::DbError;
use addressbook_core::{ContactId, RepoError, SchemaError, SchemaViolation};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ApiResult<T> = Result<T, ApiError>;

/// Fixed client-facing message for every 5xx response.
pub const INTERNAL_SERVER_ERROR_DETAIL: &str = "Internal Server Error";

/// Failure of one HTTP request.
#[derive(Debug)]
pub enum ApiError {
    ContactNotFound(ContactId),
    RouteNotFound,
    MethodNotAllowed,
    /// Body or path failed schema binding (422).
    Validation(Vec<SchemaViolation>),
    /// Body could not be read as JSON at all (400, 415, 413).
    BadBody {
        status: StatusCode,
        kind: &'static str,
        message: String,
    },
    Internal(String),
}

/// Diagnostic attached to error responses for the middleware to log.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::ContactNotFound(_) | Self::RouteNotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            Self::BadBody { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn detail(&self) -> Value {
        match self {
            Self::ContactNotFound(id) => json!(format!("Contact {id} not found")),
            Self::RouteNotFound => json!("Not Found"),
            Self::MethodNotAllowed => json!("Method Not Allowed"),
            Self::Validation(violations) => {
                Value::Array(violations.iter().map(violation_json).collect())
            }
            Self::BadBody { kind, message, .. } => json!([{
                "loc": ["body"],
                "msg": message,
                "type": kind,
            }]),
            Self::Internal(_) => json!(INTERNAL_SERVER_ERROR_DETAIL),
        }
    }
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ContactNotFound(id) => write!(f, "Contact {id} not found"),
            Self::RouteNotFound => write!(f, "route not found"),
            Self::MethodNotAllowed => write!(f, "method not allowed"),
            Self::Validation(violations) => {
                write!(f, "validation failed: ")?;
                for (index, violation) in violations.iter().enumerate() {
                    if index > 0 {
                        write!(f, "; ")?;
                    }
                    write!(f, "{}: {}", violation.loc.join("."), violation.message)?;
                }
                Ok(())
            }
            Self::BadBody { kind, message, .. } => write!(f, "{kind}: {message}"),
            Self::Internal(message) => write!(f, "internal error: {message}"),
        }
    }
}

impl Error for ApiError {}

impl From<RepoError> for ApiError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::ContactNotFound(id),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl From<SchemaError> for ApiError {
    fn from(value: SchemaError) -> Self {
        Self::Validation(value.into_violations())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let report = ErrorReport {
            message: self.to_string(),
        };
        let mut response = (self.status(), Json(json!({ "detail": self.detail() }))).into_response();
        response.extensions_mut().insert(report);
        response
    }
}

/// The only body ever sent with a 5xx status.
pub fn internal_server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "detail": INTERNAL_SERVER_ERROR_DETAIL })),
    )
        .into_response()
}

fn violation_json(violation: &SchemaViolation) -> Value {
    json!({
        "loc": violation.loc,
        "msg": violation.message,
        "type": violation.kind,
    })
}

/// Failure that aborts the server process.
#[derive(Debug)]
pub enum ServerError {
    Db(DbError),
    Io(std::io::Error),
}

impl Display for ServerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "store error: {err}"),
            Self::Io(err) => write!(f, "io error: {err}"),
        }
    }
}

impl Error for ServerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl From<DbError> for ServerError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<std::io::Error> for ServerError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
