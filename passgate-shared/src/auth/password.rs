/// Credential codec using Argon2id
///
/// Turns plaintext passwords into one-way PHC-format hashes and verifies
/// candidate passwords against them.
///
/// # Security
///
/// - **Algorithm**: Argon2id (hybrid of Argon2i and Argon2d)
/// - **Memory**: 64 MB (65536 KB) by default
/// - **Iterations**: 3 passes by default
/// - **Parallelism**: 4 lanes by default
/// - **Salt**: 16 random bytes from the OS RNG, fresh on every call
/// - **Output**: 32-byte hash
///
/// The salt and cost parameters are embedded in the encoded hash, so a hash
/// produced under one work factor keeps verifying after the defaults change.
///
/// # Example
///
/// ```
/// use passgate_shared::auth::password::{CredentialCodec, HashParams};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let codec = CredentialCodec::new(HashParams::default())?;
/// let hash = codec.hash("super_secret_password_123")?;
///
/// assert!(codec.verify("super_secret_password_123", &hash));
/// assert!(!codec.verify("wrong_password", &hash));
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use std::fmt;
use tracing::debug;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Cost parameters rejected by Argon2
    #[error("Invalid hash parameters: {0}")]
    InvalidParams(String),

    /// The hashing primitive failed
    #[error("Failed to hash password: {0}")]
    HashError(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashParams {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashParams {
    fn default() -> Self {
        Self {
            memory_kib: 65536, // 64 MB
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// One-way password hash in PHC string format
///
/// Values come from [`CredentialCodec::hash`] or are rehydrated from storage
/// with [`SecretHash::from_stored`]. The type does not implement `Serialize`
/// and its `Debug` output never shows the hash.
#[derive(Clone, PartialEq, Eq)]
pub struct SecretHash(String);

impl SecretHash {
    /// Wraps a hash previously persisted by a user store
    ///
    /// Only store implementations should call this; everything else obtains
    /// hashes from the codec.
    pub fn from_stored(encoded: String) -> Self {
        Self(encoded)
    }

    /// Returns the encoded PHC string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the wrapper and returns the encoded PHC string
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for SecretHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretHash(<redacted>)")
    }
}

/// Hashes and verifies passwords with a fixed Argon2id configuration
///
/// Cheap to clone; the service clones it into blocking tasks.
#[derive(Clone)]
pub struct CredentialCodec {
    argon2: Argon2<'static>,
}

impl CredentialCodec {
    /// Builds a codec, validating the cost parameters up front
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if Argon2 rejects the parameters
    /// (e.g. memory below 8 KiB per lane, zero iterations).
    pub fn new(params: HashParams) -> Result<Self, PasswordError> {
        let params = Params::new(
            params.memory_kib,
            params.iterations,
            params.parallelism,
            Some(32),
        )
        .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a password with a fresh random salt
    ///
    /// Two calls with the same input produce different encodings, and both
    /// verify against that input.
    ///
    /// Example output:
    /// ```text
    /// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::HashError` if the primitive fails. Callers must
    /// treat this as fatal rather than as a mismatch.
    pub fn hash(&self, password: &str) -> Result<SecretHash, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

        Ok(SecretHash(password_hash.to_string()))
    }

    /// Verifies a password against a stored hash
    ///
    /// Recomputes with the salt and parameters embedded in `hash`; the final
    /// comparison is constant-time. A malformed or foreign hash yields
    /// `false`, never an error.
    pub fn verify(&self, password: &str, hash: &SecretHash) -> bool {
        let parsed_hash = match PasswordHash::new(hash.as_str()) {
            Ok(parsed) => parsed,
            Err(e) => {
                debug!(error = %e, "Stored hash could not be parsed");
                return false;
            }
        };

        match self.argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                debug!(error = %e, "Stored hash could not be verified");
                false
            }
        }
    }
}

impl fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCodec").finish_non_exhaustive()
    }
}
