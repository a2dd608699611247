use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use uuid::Uuid;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Date or time string that could not be parsed or is out of range.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("{field}: {message}")]
    Validation { field: String, message: String },

    #[error("referenced event {0} does not exist")]
    ReferentialIntegrity(Uuid),

    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("an event with slug '{0}' already exists")]
    DuplicateSlug(String),

    /// Request body or path that could not be decoded.
    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("missing environment variable {0}")]
    MissingEnv(&'static str),

    #[error("invalid value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },

    #[error(transparent)]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl Error {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn invalid_format(message: impl Into<String>) -> Self {
        Error::InvalidFormat(message.into())
    }

    /// Field named by a validation failure, if any.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Error::InvalidFormat(_) => (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_FORMAT"),
            Error::Validation { .. } => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Error::ReferentialIntegrity(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "REFERENTIAL_INTEGRITY_ERROR")
            }
            Error::DuplicateSlug(_) => (StatusCode::CONFLICT, "DUPLICATE_SLUG"),
            Error::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            Error::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Error::Connection(_) => (StatusCode::SERVICE_UNAVAILABLE, "CONNECTION_ERROR"),
            Error::MissingEnv(_)
            | Error::InvalidConfig { .. }
            | Error::Database(_)
            | Error::Migration(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        }
    }
}

/// Converts validator's schema-level report into a single error naming the
/// first offending field (alphabetical, so the result is stable).
impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let field_errors = errors.field_errors();
        let mut fields: Vec<_> = field_errors.keys().collect();
        fields.sort();

        match fields.first() {
            Some(field) => {
                let message = field_errors[*field]
                    .first()
                    .and_then(|e| e.message.as_ref().map(|m| m.to_string()))
                    .unwrap_or_else(|| "is invalid".to_string());
                Error::validation(field.to_string(), message)
            }
            None => Error::validation("document", "is invalid"),
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for Error {
    fn from(rejection: PathRejection) -> Self {
        Error::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Internal details stay in the logs
        let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("request failed: {:?}", self);
            "Internal server error".to_string()
        } else {
            self.to_string()
        };

        let mut body = json!({
            "success": false,
            "error": message,
            "code": code,
        });
        if let Some(field) = self.field() {
            body["field"] = json!(field);
        }

        (status, Json(body)).into_response()
    }
}
