/// Authentication endpoints
///
/// - `POST /v1/auth/register` - Create an account
/// - `POST /v1/auth/login` - Exchange credentials for a bearer token

use crate::{app::AppState, error::ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use passgate_shared::models::user::{Identity, Profile, PublicUser};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Register request
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Email address (the login identity)
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,

    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: String,

    /// Photo path or URL
    #[validate(length(max = 2048, message = "Photo must be at most 2048 characters"))]
    pub photo: Option<String>,

    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<String>,

    #[validate(length(max = 200, message = "Occupation must be at most 200 characters"))]
    pub occupation: Option<String>,
}

impl RegisterRequest {
    /// Trims surrounding whitespace so validation sees what will be stored
    fn normalized(mut self) -> Self {
        self.email = self.email.trim().to_string();
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self
    }
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub user: PublicUser,
}

/// Login request
///
/// Only presence is checked; a malformed email simply matches no account.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for authenticated routes
    pub token: String,

    pub user: PublicUser,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/register
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "Secret123",
///   "first_name": "Ada",
///   "last_name": "Lovelace",
///   "occupation": "Analyst"
/// }
/// ```
///
/// # Response (201 Created)
///
/// ```json
/// {
///   "user": {
///     "id": "uuid",
///     "email": "ada@example.com",
///     "first_name": "Ada",
///     "last_name": "Lovelace",
///     "photo": "",
///     "location": null,
///     "occupation": "Analyst",
///     "created_at": "2024-06-01T00:00:00Z",
///     "updated_at": "2024-06-01T00:00:00Z"
///   }
/// }
/// ```
///
/// # Errors
///
/// - `403 Forbidden`: Email already in use
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let req = req.normalized();
    req.validate()?;

    let mut profile = Profile::new(req.first_name, req.last_name);
    profile.photo = req.photo.unwrap_or_default();
    profile.location = req.location;
    profile.occupation = req.occupation;

    let user = state
        .auth
        .register(Identity::new(&req.email), &req.password, profile)
        .await?;

    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}

/// Login with email and password
///
/// # Endpoint
///
/// ```text
/// POST /v1/auth/login
/// Content-Type: application/json
///
/// {
///   "email": "ada@example.com",
///   "password": "Secret123"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "token": "eyJ...",
///   "user": { "id": "uuid", "email": "ada@example.com", ... }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: Invalid email or password
/// - `422 Unprocessable Entity`: Missing field
/// - `500 Internal Server Error`: Server error
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<LoginResponse>> {
    req.validate()?;

    let outcome = state
        .auth
        .login(&Identity::new(&req.email), &req.password)
        .await?;

    Ok(Json(LoginResponse {
        token: outcome.token,
        user: outcome.user,
    }))
}
