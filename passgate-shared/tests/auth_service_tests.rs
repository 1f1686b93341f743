/// Integration tests for the authentication service
///
/// These run the service against the in-memory store and a real JWT issuer,
/// with cheap Argon2 parameters so the suite stays fast.

use async_trait::async_trait;
use passgate_shared::auth::jwt::JwtIssuer;
use passgate_shared::auth::password::{CredentialCodec, HashParams};
use passgate_shared::models::user::{Identity, NewUser, Profile, UserChanges, UserRecord};
use passgate_shared::service::{AccountChanges, AuthError, AuthService};
use passgate_shared::store::memory::MemoryUserStore;
use passgate_shared::store::{StoreError, UserStore};
use std::sync::Arc;
use uuid::Uuid;

const SECRET: &str = "integration-test-secret-key-32-bytes-min";

fn codec() -> CredentialCodec {
    CredentialCodec::new(HashParams {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .expect("Params should be valid")
}

fn issuer() -> Arc<JwtIssuer> {
    Arc::new(JwtIssuer::new(SECRET, chrono::Duration::hours(1)).expect("Secret should be accepted"))
}

fn service_with(store: Arc<dyn UserStore>) -> AuthService {
    AuthService::new(store, issuer(), codec())
}

fn profile() -> Profile {
    Profile::new("Ada", "Lovelace")
}

#[tokio::test]
async fn test_register_then_login_scenario() {
    let store = MemoryUserStore::new();
    let service = service_with(Arc::new(store.clone()));

    let user = service
        .register(Identity::new("a@b.com"), "Secret123", profile())
        .await
        .expect("Registration should succeed");
    assert_eq!(user.email.as_str(), "a@b.com");
    assert_eq!(user.profile.first_name, "Ada");

    // Stored hash is real and is not the plaintext
    let stored = store
        .find_by_identity(&Identity::new("a@b.com"))
        .await
        .unwrap()
        .expect("Record should be stored");
    assert!(!stored.secret_hash.as_str().is_empty());
    assert_ne!(stored.secret_hash.as_str(), "Secret123");
    assert!(stored.secret_hash.as_str().starts_with("$argon2id$"));

    let outcome = service
        .login(&Identity::new("a@b.com"), "Secret123")
        .await
        .expect("Login should succeed");
    assert!(!outcome.token.is_empty());
    assert_eq!(outcome.user.id, user.id);

    let wrong = service.login(&Identity::new("a@b.com"), "wrong").await;
    assert!(matches!(wrong, Err(AuthError::CredentialMismatch)));
}

#[tokio::test]
async fn test_token_is_bound_to_user_id() {
    let service = service_with(Arc::new(MemoryUserStore::new()));
    let user = service
        .register(Identity::new("token@b.com"), "Secret123", profile())
        .await
        .unwrap();

    let outcome = service.login(&Identity::new("token@b.com"), "Secret123").await.unwrap();
    let claims = issuer().validate(&outcome.token).expect("Token should validate");

    assert_eq!(claims.sub, user.id);
}

#[tokio::test]
async fn test_redacted_results_serialize_without_hash() {
    let service = service_with(Arc::new(MemoryUserStore::new()));
    let registered = service
        .register(Identity::new("r@b.com"), "Secret123", profile())
        .await
        .unwrap();
    let logged_in = service.login(&Identity::new("r@b.com"), "Secret123").await.unwrap();

    for user in [registered, logged_in.user] {
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("argon2"), "Hash leaked: {}", json);
        assert!(!json.contains("password"), "Hash field leaked: {}", json);
    }
}

#[tokio::test]
async fn test_duplicate_registration() {
    let store = MemoryUserStore::new();
    let service = service_with(Arc::new(store.clone()));

    service
        .register(Identity::new("dup@b.com"), "first", profile())
        .await
        .expect("First registration should succeed");

    let second = service
        .register(Identity::new("  DUP@b.com "), "second", profile())
        .await;
    assert!(matches!(second, Err(AuthError::DuplicateIdentity)));
    assert_eq!(store.len().await, 1);

    // The first password still works
    assert!(service.login(&Identity::new("dup@b.com"), "first").await.is_ok());
}

#[tokio::test]
async fn test_register_empty_identity_rejected() {
    let store = MemoryUserStore::new();
    let service = service_with(Arc::new(store.clone()));

    for raw in ["", "   "] {
        let result = service.register(Identity::new(raw), "Secret123", profile()).await;
        assert!(matches!(result, Err(AuthError::EmptyIdentity)));
    }
    assert!(store.is_empty().await);
}

#[tokio::test]
async fn test_login_unknown_identity() {
    let service = service_with(Arc::new(MemoryUserStore::new()));

    let result = service.login(&Identity::new("nobody@example.com"), "x").await;
    assert!(matches!(result, Err(AuthError::UnknownIdentity)));
}

#[tokio::test]
async fn test_login_identity_is_case_insensitive() {
    let service = service_with(Arc::new(MemoryUserStore::new()));
    service
        .register(Identity::new("Case@Example.com"), "Secret123", profile())
        .await
        .unwrap();

    assert!(service
        .login(&Identity::new(" CASE@example.COM "), "Secret123")
        .await
        .is_ok());
}

#[tokio::test]
async fn test_login_does_not_mutate_record() {
    let store = MemoryUserStore::new();
    let service = service_with(Arc::new(store.clone()));
    service
        .register(Identity::new("ro@b.com"), "Secret123", profile())
        .await
        .unwrap();

    let before = store.find_by_identity(&Identity::new("ro@b.com")).await.unwrap().unwrap();
    service.login(&Identity::new("ro@b.com"), "Secret123").await.unwrap();
    let _ = service.login(&Identity::new("ro@b.com"), "nope").await;
    let after = store.find_by_identity(&Identity::new("ro@b.com")).await.unwrap().unwrap();

    assert_eq!(before.secret_hash, after.secret_hash);
    assert_eq!(before.updated_at, after.updated_at);
}

#[tokio::test]
async fn test_profile_update_keeps_hash() {
    let store = MemoryUserStore::new();
    let service = service_with(Arc::new(store.clone()));
    let user = service
        .register(Identity::new("p@b.com"), "Secret123", profile())
        .await
        .unwrap();
    let before = store.find_by_id(user.id).await.unwrap().unwrap().secret_hash;

    let updated = service
        .update_account(
            user.id,
            AccountChanges {
                occupation: Some(Some("Analyst".to_string())),
                ..Default::default()
            },
        )
        .await
        .expect("Update should succeed");
    assert_eq!(updated.profile.occupation.as_deref(), Some("Analyst"));

    let after = store.find_by_id(user.id).await.unwrap().unwrap().secret_hash;
    assert_eq!(before, after);
    assert!(service.login(&Identity::new("p@b.com"), "Secret123").await.is_ok());
}

#[tokio::test]
async fn test_password_update_rehashes() {
    let store = MemoryUserStore::new();
    let service = service_with(Arc::new(store.clone()));
    let user = service
        .register(Identity::new("pw@b.com"), "OldSecret", profile())
        .await
        .unwrap();
    let before = store.find_by_id(user.id).await.unwrap().unwrap().secret_hash;

    service
        .update_account(
            user.id,
            AccountChanges {
                new_password: Some("NewSecret".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let after = store.find_by_id(user.id).await.unwrap().unwrap().secret_hash;
    assert_ne!(before, after);
    assert_ne!(after.as_str(), "NewSecret");

    assert!(service.login(&Identity::new("pw@b.com"), "NewSecret").await.is_ok());
    assert!(matches!(
        service.login(&Identity::new("pw@b.com"), "OldSecret").await,
        Err(AuthError::CredentialMismatch)
    ));
}

#[tokio::test]
async fn test_update_unknown_user() {
    let service = service_with(Arc::new(MemoryUserStore::new()));

    let result = service
        .update_account(Uuid::new_v4(), AccountChanges::default())
        .await;
    assert!(matches!(result, Err(AuthError::UnknownIdentity)));
}

/// Store whose pre-check never sees the competing record, as when another
/// request registers the same identity between lookup and insert.
struct RacingStore;

#[async_trait]
impl UserStore for RacingStore {
    async fn find_by_identity(&self, _identity: &Identity) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }

    async fn insert(&self, _user: NewUser) -> Result<UserRecord, StoreError> {
        Err(StoreError::Duplicate)
    }

    async fn update(&self, _id: Uuid, _changes: UserChanges) -> Result<Option<UserRecord>, StoreError> {
        Ok(None)
    }
}

#[tokio::test]
async fn test_race_lost_at_insert_is_store_error() {
    let service = service_with(Arc::new(RacingStore));

    let result = service
        .register(Identity::new("race@b.com"), "Secret123", profile())
        .await;
    assert!(matches!(result, Err(AuthError::Store(StoreError::Duplicate))));
}

/// Store that fails every call
struct BrokenStore;

#[async_trait]
impl UserStore for BrokenStore {
    async fn find_by_identity(&self, _identity: &Identity) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn find_by_id(&self, _id: Uuid) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn insert(&self, _user: NewUser) -> Result<UserRecord, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn update(&self, _id: Uuid, _changes: UserChanges) -> Result<Option<UserRecord>, StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Err(StoreError::Backend("connection refused".to_string()))
    }
}

#[tokio::test]
async fn test_store_failures_propagate() {
    let service = service_with(Arc::new(BrokenStore));

    assert!(matches!(
        service.register(Identity::new("x@b.com"), "pw", profile()).await,
        Err(AuthError::Store(StoreError::Backend(_)))
    ));
    assert!(matches!(
        service.login(&Identity::new("x@b.com"), "pw").await,
        Err(AuthError::Store(StoreError::Backend(_)))
    ));
    assert!(service.check_store().await.is_err());
}

#[tokio::test]
async fn test_concurrent_registrations_single_winner() {
    let store = MemoryUserStore::new();
    let service = service_with(Arc::new(store.clone()));

    let handles: Vec<_> = (0..6)
        .map(|i| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .register(Identity::new("same@b.com"), &format!("pw-{}", i), Profile::new("A", "B"))
                    .await
            })
        })
        .collect();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AuthError::DuplicateIdentity) | Err(AuthError::Store(StoreError::Duplicate)) => {}
            Err(other) => panic!("Unexpected error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(store.len().await, 1);
}
