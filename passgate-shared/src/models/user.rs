/// User credential record and related types
///
/// `UserRecord` is the internal form that carries the password hash. It is
/// not serializable; anything leaving the core goes through [`PublicUser`],
/// which has no hash field at all.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     first_name VARCHAR(100) NOT NULL,
///     last_name VARCHAR(100) NOT NULL,
///     photo TEXT NOT NULL DEFAULT '',
///     location TEXT,
///     occupation TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use crate::auth::password::SecretHash;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Normalized login identity (email)
///
/// Surrounding whitespace is trimmed and the value lowercased, so
/// `" Alice@Example.com"` and `"alice@example.com"` are the same identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Identity(String);

impl Identity {
    /// Normalizes a raw identity
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for Identity {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<&str> for Identity {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<Identity> for String {
    fn from(identity: Identity) -> Self {
        identity.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Display attributes attached to an account
///
/// Carried through the core unexamined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,

    /// Profile picture path or URL (empty when unset)
    #[serde(default)]
    pub photo: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub occupation: Option<String>,
}

impl Profile {
    /// Creates a profile with just a name
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            ..Default::default()
        }
    }
}

/// Stored user credential record
///
/// Never serialized. Convert with [`UserRecord::redact`] before handing it
/// to anything outside the core.
#[derive(Debug, Clone)]
pub struct UserRecord {
    /// Durable user ID; tokens are bound to this
    pub id: Uuid,

    /// Unique login identity
    pub identity: Identity,

    /// Argon2id password hash
    pub secret_hash: SecretHash,

    pub profile: Profile,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// Drops the password hash
    pub fn redact(self) -> PublicUser {
        PublicUser {
            id: self.id,
            email: self.identity,
            profile: self.profile,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

/// User as returned to callers outside the core
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub email: Identity,

    #[serde(flatten)]
    pub profile: Profile,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        record.redact()
    }
}

/// Input for inserting a new user
///
/// The hash must already be computed; stores never see plaintext.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub identity: Identity,
    pub secret_hash: SecretHash,
    pub profile: Profile,
}

/// Input for updating an existing user
///
/// Only `Some` fields are written. `secret_hash: None` leaves the stored hash
/// untouched; the service sets it only when the password itself changes.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo: Option<String>,

    /// New location (use Some(None) to clear)
    pub location: Option<Option<String>>,

    /// New occupation (use Some(None) to clear)
    pub occupation: Option<Option<String>>,

    pub secret_hash: Option<SecretHash>,
}

impl UserChanges {
    /// Writes the changed fields into `record`, bumping `updated_at`
    pub fn apply_to(self, record: &mut UserRecord) {
        if let Some(first_name) = self.first_name {
            record.profile.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            record.profile.last_name = last_name;
        }
        if let Some(photo) = self.photo {
            record.profile.photo = photo;
        }
        if let Some(location) = self.location {
            record.profile.location = location;
        }
        if let Some(occupation) = self.occupation {
            record.profile.occupation = occupation;
        }
        if let Some(secret_hash) = self.secret_hash {
            record.secret_hash = secret_hash;
        }
        record.updated_at = Utc::now();
    }
}
