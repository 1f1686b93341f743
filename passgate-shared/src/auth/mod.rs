/// Authentication primitives
///
/// # Modules
///
/// - [`password`]: Argon2id credential codec (hash + constant-time verify)
/// - [`jwt`]: HS256 token issuance and validation
///
/// # Example
///
/// ```
/// use passgate_shared::auth::jwt::{JwtIssuer, TokenIssuer};
/// use passgate_shared::auth::password::{CredentialCodec, HashParams};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = CredentialCodec::new(HashParams::default())?;
/// let hash = codec.hash("user_password")?;
/// assert!(codec.verify("user_password", &hash));
///
/// let issuer = JwtIssuer::new("a-secret-key-of-at-least-32-bytes!!", chrono::Duration::hours(1))?;
/// let token = issuer.issue(Uuid::new_v4())?;
/// assert!(!token.is_empty());
/// # Ok(())
/// # }
/// ```

pub mod jwt;
pub mod password;
