/// Account endpoints (bearer token required)
///
/// - `GET /v1/account` - Current user's profile
/// - `PATCH /v1/account` - Update profile fields and/or password

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    middleware::auth::AuthenticatedUser,
};
use axum::{extract::State, Extension, Json};
use passgate_shared::models::user::PublicUser;
use passgate_shared::service::{AccountChanges, AuthError};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Update account request
///
/// Absent fields are left unchanged. `location` and `occupation` accept
/// `null` to clear the stored value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateAccountRequest {
    #[validate(length(min = 1, max = 100, message = "First name must be 1-100 characters"))]
    pub first_name: Option<String>,

    #[validate(length(min = 1, max = 100, message = "Last name must be 1-100 characters"))]
    pub last_name: Option<String>,

    #[validate(length(max = 2048, message = "Photo must be at most 2048 characters"))]
    pub photo: Option<String>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 200, message = "Location must be at most 200 characters"))]
    pub location: Option<Option<String>>,

    #[serde(default, deserialize_with = "present")]
    #[validate(length(max = 200, message = "Occupation must be at most 200 characters"))]
    pub occupation: Option<Option<String>>,

    /// New password; the stored hash is recomputed only when this is set
    #[validate(length(min = 1, message = "Password must not be empty"))]
    pub password: Option<String>,
}

impl UpdateAccountRequest {
    /// Trims names so a whitespace-only value fails the length check
    fn normalized(mut self) -> Self {
        self.first_name = self.first_name.map(|name| name.trim().to_string());
        self.last_name = self.last_name.map(|name| name.trim().to_string());
        self
    }
}

/// Maps a present field (including `null`) to `Some`
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Account response
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub user: PublicUser,
}

/// Get the authenticated user's account
///
/// # Errors
///
/// - `401 Unauthorized`: Missing/invalid token, or the account no longer exists
pub async fn get_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ApiResult<Json<AccountResponse>> {
    let user = state
        .auth
        .find_user(caller.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Account not found".to_string()))?;

    Ok(Json(AccountResponse { user }))
}

/// Update the authenticated user's account
///
/// # Endpoint
///
/// ```text
/// PATCH /v1/account
/// Authorization: Bearer eyJ...
/// Content-Type: application/json
///
/// {
///   "occupation": "Engineer",
///   "location": null,
///   "password": "NewSecret456"
/// }
/// ```
///
/// # Errors
///
/// - `401 Unauthorized`: Missing/invalid token, or the account no longer exists
/// - `422 Unprocessable Entity`: Validation failed
/// - `500 Internal Server Error`: Server error
pub async fn update_account(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedUser>,
    Json(req): Json<UpdateAccountRequest>,
) -> ApiResult<Json<AccountResponse>> {
    let req = req.normalized();
    req.validate()?;

    let changes = AccountChanges {
        first_name: req.first_name,
        last_name: req.last_name,
        photo: req.photo,
        location: req.location,
        occupation: req.occupation,
        new_password: req.password,
    };

    let user = state
        .auth
        .update_account(caller.user_id, changes)
        .await
        .map_err(|e| match e {
            // Token outlived its account
            AuthError::UnknownIdentity => ApiError::Unauthorized("Account not found".to_string()),
            other => ApiError::from(other),
        })?;

    Ok(Json(AccountResponse { user }))
}
