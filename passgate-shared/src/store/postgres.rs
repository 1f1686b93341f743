/// PostgreSQL user store
///
/// Backed by the `users` table created by the embedded migrations. The
/// `UNIQUE` constraint on `email` is the final word on identity uniqueness;
/// a violation surfaces as `StoreError::Duplicate`.
///
/// # Example
///
/// ```no_run
/// use passgate_shared::db::pool::{create_pool, DatabaseConfig};
/// use passgate_shared::models::user::Identity;
/// use passgate_shared::store::{postgres::PgUserStore, UserStore};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig {
///     url: std::env::var("DATABASE_URL")?,
///     ..Default::default()
/// })
/// .await?;
///
/// let store = PgUserStore::new(pool);
/// let user = store.find_by_identity(&Identity::new("user@example.com")).await?;
/// # Ok(())
/// # }
/// ```

use super::{StoreError, UserStore};
use crate::auth::password::SecretHash;
use crate::db::pool;
use crate::models::user::{Identity, NewUser, Profile, UserChanges, UserRecord};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

const USER_COLUMNS: &str = "id, email, password_hash, first_name, last_name, photo, \
                            location, occupation, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    photo: String,
    location: Option<String>,
    occupation: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id,
            identity: Identity::new(&row.email),
            secret_hash: SecretHash::from_stored(row.password_hash),
            profile: Profile {
                first_name: row.first_name,
                last_name: row.last_name,
                photo: row.photo,
                location: row.location,
                occupation: row.occupation,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// User store over a PostgreSQL pool
#[derive(Debug, Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_identity(&self, identity: &Identity) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(identity.as_str())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(UserRecord::from))
    }

    async fn insert(&self, user: NewUser) -> Result<UserRecord, StoreError> {
        let query = format!(
            "INSERT INTO users (email, password_hash, first_name, last_name, photo, location, occupation) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {USER_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UserRow>(&query)
            .bind(user.identity.as_str())
            .bind(user.secret_hash.as_str())
            .bind(user.profile.first_name)
            .bind(user.profile.last_name)
            .bind(user.profile.photo)
            .bind(user.profile.location)
            .bind(user.profile.occupation)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn update(&self, id: Uuid, changes: UserChanges) -> Result<Option<UserRecord>, StoreError> {
        // Only the columns present in `changes` are written
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        let mut push = |column: &str| {
            bind_count += 1;
            query.push_str(&format!(", {} = ${}", column, bind_count));
        };

        if changes.first_name.is_some() {
            push("first_name");
        }
        if changes.last_name.is_some() {
            push("last_name");
        }
        if changes.photo.is_some() {
            push("photo");
        }
        if changes.location.is_some() {
            push("location");
        }
        if changes.occupation.is_some() {
            push("occupation");
        }
        if changes.secret_hash.is_some() {
            push("password_hash");
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, UserRow>(&query).bind(id);

        if let Some(first_name) = changes.first_name {
            q = q.bind(first_name);
        }
        if let Some(last_name) = changes.last_name {
            q = q.bind(last_name);
        }
        if let Some(photo) = changes.photo {
            q = q.bind(photo);
        }
        if let Some(location) = changes.location {
            q = q.bind(location);
        }
        if let Some(occupation) = changes.occupation {
            q = q.bind(occupation);
        }
        if let Some(secret_hash) = changes.secret_hash {
            q = q.bind(secret_hash.into_inner());
        }

        let row = q.fetch_optional(&self.pool).await?;

        Ok(row.map(UserRecord::from))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        pool::health_check(&self.pool).await?;
        Ok(())
    }
}
