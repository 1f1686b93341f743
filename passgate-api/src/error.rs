/// Error handling for the API server
///
/// Handlers return `Result<T, ApiError>`; `ApiError` turns into a JSON error
/// body with the matching status code. Core errors map as follows:
///
/// | Core error | Status |
/// |---|---|
/// | `EmptyIdentity` | 422 Unprocessable Entity |
/// | `DuplicateIdentity` | 403 Forbidden |
/// | `UnknownIdentity`, `CredentialMismatch` | 400 Bad Request |
/// | `Store`, `HashingFailure`, `TokenIssuance` | 500 Internal Server Error |
///
/// Unknown identity and wrong password share one message, and the service
/// runs a password verification on both paths, so neither the body nor the
/// response time tells a caller which emails have accounts.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use passgate_shared::auth::jwt::TokenError;
use passgate_shared::service::AuthError;
use serde::{Deserialize, Serialize};

/// Message shared by both login failure kinds
pub const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Field-level request validation failures
    #[error("Validation failed: {} errors", .0.len())]
    ValidationError(Vec<ValidationErrorDetail>),

    /// Logged server-side; clients get a fixed message
    #[error("Internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    pub field: String,
    pub message: String,
}

/// JSON error body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Machine-readable code, e.g. "forbidden"
    pub error: String,

    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::ValidationError(_) => "validation_error",
            ApiError::InternalError(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.code().to_string();

        let body = match self {
            ApiError::BadRequest(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message) => ErrorResponse {
                error,
                message,
                details: None,
            },
            ApiError::ValidationError(details) => ErrorResponse {
                error,
                message: "Request validation failed".to_string(),
                details: Some(details),
            },
            ApiError::InternalError(detail) => {
                tracing::error!(%detail, "Request failed with internal error");
                ErrorResponse {
                    error,
                    message: "An internal error occurred".to_string(),
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Convert core auth errors to API errors
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmptyIdentity => ApiError::ValidationError(vec![ValidationErrorDetail {
                field: "email".to_string(),
                message: "Email is required".to_string(),
            }]),
            AuthError::DuplicateIdentity => ApiError::Forbidden("Email is already in use".to_string()),
            AuthError::UnknownIdentity | AuthError::CredentialMismatch => {
                ApiError::BadRequest(INVALID_CREDENTIALS.to_string())
            }
            AuthError::Store(e) => ApiError::InternalError(format!("User store error: {}", e)),
            AuthError::HashingFailure(e) => {
                ApiError::InternalError(format!("Password operation failed: {}", e))
            }
            AuthError::TokenIssuance(e) => ApiError::InternalError(format!("Token issuance failed: {}", e)),
        }
    }
}

/// Convert bearer-token validation errors to API errors
impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => ApiError::Unauthorized("Token expired".to_string()),
            TokenError::InvalidIssuer => ApiError::Unauthorized("Invalid token issuer".to_string()),
            _ => ApiError::Unauthorized("Invalid token".to_string()),
        }
    }
}

/// Convert request validation failures to a 422 with per-field details
impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut details: Vec<ValidationErrorDetail> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| ValidationErrorDetail {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| "Validation failed".to_string()),
                })
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field));

        ApiError::ValidationError(details)
    }
}
