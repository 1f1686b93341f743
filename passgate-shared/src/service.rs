/// Authentication service
///
/// Orchestrates registration, login and account updates on top of the
/// credential codec, a [`UserStore`] and a [`TokenIssuer`]. The service
/// holds no mutable state of its own; it is cheap to clone and safe to share
/// across request handlers.
///
/// Hashing and verification are CPU-bound and run on Tokio's blocking pool.
///
/// # Login flow
///
/// ```text
/// Received -> Looked Up -> { Not Found: UnknownIdentity }
///          -> Verified  -> { Mismatch:  CredentialMismatch }
///          -> Issued    -> Responded
/// ```
///
/// Failures are returned as [`AuthError`] values and never retried here.
///
/// # Example
///
/// ```
/// use passgate_shared::auth::{jwt::JwtIssuer, password::{CredentialCodec, HashParams}};
/// use passgate_shared::models::user::{Identity, Profile};
/// use passgate_shared::service::AuthService;
/// use passgate_shared::store::memory::MemoryUserStore;
/// use std::sync::Arc;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let service = AuthService::new(
///     Arc::new(MemoryUserStore::new()),
///     Arc::new(JwtIssuer::new("your-secret-key-at-least-32-bytes!", chrono::Duration::hours(24))?),
///     CredentialCodec::new(HashParams::default())?,
/// );
///
/// let user = service
///     .register(Identity::new("a@b.com"), "Secret123", Profile::new("Ada", "Lovelace"))
///     .await?;
///
/// let outcome = service.login(&Identity::new("a@b.com"), "Secret123").await?;
/// assert_eq!(outcome.user.id, user.id);
/// # Ok(())
/// # }
/// ```

use crate::auth::jwt::{TokenError, TokenIssuer};
use crate::auth::password::{CredentialCodec, PasswordError, SecretHash};
use crate::models::user::{Identity, NewUser, Profile, PublicUser, UserChanges};
use crate::store::{StoreError, UserStore};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Error type for authentication operations
///
/// `UnknownIdentity` and `CredentialMismatch` stay distinct here; deciding
/// how much of that distinction reaches an end user is the transport's job.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Registration with a blank identity
    #[error("Identity must not be empty")]
    EmptyIdentity,

    /// Registration for an identity that already has an account
    #[error("Identity is already registered")]
    DuplicateIdentity,

    /// No account exists for the identity (or user ID)
    #[error("No account exists for this identity")]
    UnknownIdentity,

    /// Account exists but the password does not match
    #[error("Password does not match")]
    CredentialMismatch,

    /// User store failure, including a uniqueness violation lost to a race
    #[error("User store error: {0}")]
    Store(#[from] StoreError),

    /// The hashing primitive failed
    #[error("Password hashing failed: {0}")]
    HashingFailure(#[from] PasswordError),

    /// The token issuer failed to sign
    #[error("Token issuance failed: {0}")]
    TokenIssuance(#[from] TokenError),
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// Bearer token bound to the user's ID
    pub token: String,

    pub user: PublicUser,
}

/// Requested changes to an account
///
/// The stored hash is recomputed if and only if `new_password` is `Some`.
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo: Option<String>,

    /// New location (use Some(None) to clear)
    pub location: Option<Option<String>>,

    /// New occupation (use Some(None) to clear)
    pub occupation: Option<Option<String>>,

    /// New plaintext password
    pub new_password: Option<String>,
}

/// Plaintext behind the decoy hash verified on unknown-identity logins
const DECOY_PASSWORD: &str = "passgate-decoy-credential";

#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: Arc<dyn TokenIssuer>,
    codec: CredentialCodec,

    /// Hash with the codec's parameters, built on first use; shared by clones
    decoy_hash: Arc<OnceCell<SecretHash>>,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: Arc<dyn TokenIssuer>, codec: CredentialCodec) -> Self {
        Self {
            store,
            tokens,
            codec,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Registers a new account
    ///
    /// 1. Rejects a blank identity with `EmptyIdentity` and one that already
    ///    exists with `DuplicateIdentity`, before any hashing or write.
    /// 2. Hashes the password.
    /// 3. Inserts the record in one write.
    /// 4. Returns the record without its hash.
    ///
    /// The lookup in step 1 only saves work. If another request registers the
    /// same identity in between, the store rejects the insert and that
    /// surfaces as `AuthError::Store`.
    pub async fn register(
        &self,
        identity: Identity,
        password: &str,
        profile: Profile,
    ) -> Result<PublicUser, AuthError> {
        if identity.is_empty() {
            return Err(AuthError::EmptyIdentity);
        }

        if self.store.find_by_identity(&identity).await?.is_some() {
            debug!("Registration rejected: identity already registered");
            return Err(AuthError::DuplicateIdentity);
        }

        let secret_hash = self.hash(password).await?;

        let record = self
            .store
            .insert(NewUser {
                identity,
                secret_hash,
                profile,
            })
            .await
            .map_err(|e| {
                if matches!(e, StoreError::Duplicate) {
                    warn!("Identity registered concurrently; insert rejected by store");
                }
                AuthError::Store(e)
            })?;

        info!(user_id = %record.id, "User registered");
        Ok(record.redact())
    }

    /// Authenticates a user and issues a token
    ///
    /// Pure read + verify + issue; nothing is written. An unknown identity
    /// still pays for one verification against a decoy hash, so both
    /// rejections cost about the same.
    pub async fn login(&self, identity: &Identity, password: &str) -> Result<LoginOutcome, AuthError> {
        let record = match self.store.find_by_identity(identity).await? {
            Some(record) => record,
            None => {
                let decoy = self.decoy_hash().await?;
                self.verify(password, decoy).await?;
                debug!("Login rejected: unknown identity");
                return Err(AuthError::UnknownIdentity);
            }
        };

        if !self.verify(password, &record.secret_hash).await? {
            debug!(user_id = %record.id, "Login rejected: credential mismatch");
            return Err(AuthError::CredentialMismatch);
        }

        let token = self.tokens.issue(record.id)?;

        info!(user_id = %record.id, "User logged in");
        Ok(LoginOutcome {
            token,
            user: record.redact(),
        })
    }

    /// Applies profile and/or password changes to an account
    ///
    /// Profile-only changes leave the stored hash untouched.
    pub async fn update_account(
        &self,
        user_id: Uuid,
        changes: AccountChanges,
    ) -> Result<PublicUser, AuthError> {
        let secret_hash = match changes.new_password {
            Some(ref password) => Some(self.hash(password).await?),
            None => None,
        };
        let password_changed = secret_hash.is_some();

        let record = self
            .store
            .update(
                user_id,
                UserChanges {
                    first_name: changes.first_name,
                    last_name: changes.last_name,
                    photo: changes.photo,
                    location: changes.location,
                    occupation: changes.occupation,
                    secret_hash,
                },
            )
            .await?
            .ok_or(AuthError::UnknownIdentity)?;

        info!(user_id = %record.id, password_changed, "Account updated");
        Ok(record.redact())
    }

    /// Looks up a user by ID, redacted
    pub async fn find_user(&self, user_id: Uuid) -> Result<Option<PublicUser>, AuthError> {
        Ok(self.store.find_by_id(user_id).await?.map(|r| r.redact()))
    }

    /// Checks that the user store is reachable
    pub async fn check_store(&self) -> Result<(), AuthError> {
        Ok(self.store.health_check().await?)
    }

    async fn decoy_hash(&self) -> Result<&SecretHash, AuthError> {
        self.decoy_hash
            .get_or_try_init(|| self.hash(DECOY_PASSWORD))
            .await
    }

    async fn hash(&self, password: &str) -> Result<SecretHash, AuthError> {
        let codec = self.codec.clone();
        let password = password.to_owned();

        let hashed = tokio::task::spawn_blocking(move || codec.hash(&password))
            .await
            .map_err(|e| PasswordError::HashError(format!("Hashing task failed: {}", e)))??;

        Ok(hashed)
    }

    async fn verify(&self, password: &str, secret_hash: &SecretHash) -> Result<bool, AuthError> {
        let codec = self.codec.clone();
        let password = password.to_owned();
        let secret_hash = secret_hash.clone();

        let matched = tokio::task::spawn_blocking(move || codec.verify(&password, &secret_hash))
            .await
            .map_err(|e| PasswordError::HashError(format!("Verification task failed: {}", e)))?;

        Ok(matched)
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService").finish_non_exhaustive()
    }
}
