/// JWT token issuance and validation
///
/// Tokens are signed with HS256 (HMAC-SHA256) and bound to the user's
/// durable id, never to the email or any other mutable field.
///
/// # Security
///
/// - **Algorithm**: HS256
/// - **Expiration**: Configurable (default 24 hours)
/// - **Validation**: Signature, expiration, not-before and issuer checks
/// - **Secret Management**: The signing secret must be at least 32 bytes;
///   [`JwtIssuer::new`] refuses anything shorter so a misconfigured process
///   fails at startup instead of at the first login
///
/// # Example
///
/// ```
/// use passgate_shared::auth::jwt::{JwtIssuer, TokenIssuer};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let issuer = JwtIssuer::new("your-secret-key-at-least-32-bytes!", chrono::Duration::hours(24))?;
/// let user_id = Uuid::new_v4();
///
/// let token = issuer.issue(user_id)?;
/// let claims = issuer.validate(&token)?;
/// assert_eq!(claims.sub, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "passgate";

/// Minimum accepted signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// No signing secret was provided
    #[error("JWT signing secret is missing")]
    MissingSecret,

    /// Signing secret is too short
    #[error("JWT signing secret must be at least 32 bytes, got {0}")]
    WeakSecret(usize),

    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Token was not issued by this service
    #[error("Invalid issuer: expected passgate")]
    InvalidIssuer,
}

/// Anything that can mint a bearer token for a subject
///
/// The signing material belongs to the implementation; callers only supply
/// the subject.
pub trait TokenIssuer: Send + Sync {
    /// Issues a token bound to `subject_id`
    fn issue(&self, subject_id: Uuid) -> Result<String, TokenError>;
}

/// JWT claims structure
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "passgate")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "passgate"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,
}

impl Claims {
    /// Creates claims for `user_id` expiring after `expires_in`
    pub fn new(user_id: Uuid, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
        }
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// HS256 token issuer holding the process-wide signing secret
#[derive(Clone)]
pub struct JwtIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    expires_in: Duration,
}

impl JwtIssuer {
    /// Builds an issuer from the signing secret
    ///
    /// # Errors
    ///
    /// - `TokenError::MissingSecret` if `secret` is empty
    /// - `TokenError::WeakSecret` if `secret` is shorter than 32 bytes
    pub fn new(secret: &str, expires_in: Duration) -> Result<Self, TokenError> {
        if secret.is_empty() {
            return Err(TokenError::MissingSecret);
        }
        if secret.len() < MIN_SECRET_LEN {
            return Err(TokenError::WeakSecret(secret.len()));
        }

        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            expires_in,
        })
    }

    /// Lifetime given to newly issued tokens
    pub fn expires_in(&self) -> Duration {
        self.expires_in
    }

    /// Signs arbitrary claims
    pub fn sign(&self, claims: &Claims) -> Result<String, TokenError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| TokenError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Validates a token and extracts its claims
    ///
    /// Verifies the signature, `exp`, `nbf` and that `iss` is "passgate".
    pub fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;
        validation.validate_nbf = true;

        let token_data = decode::<Claims>(token, &self.decoding, &validation).map_err(|e| {
            match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                jsonwebtoken::errors::ErrorKind::InvalidIssuer => TokenError::InvalidIssuer,
                _ => TokenError::ValidationError(format!("Token validation failed: {}", e)),
            }
        })?;

        Ok(token_data.claims)
    }
}

impl TokenIssuer for JwtIssuer {
    fn issue(&self, subject_id: Uuid) -> Result<String, TokenError> {
        self.sign(&Claims::new(subject_id, self.expires_in))
    }
}

impl fmt::Debug for JwtIssuer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtIssuer")
            .field("expires_in", &self.expires_in)
            .finish_non_exhaustive()
    }
}
