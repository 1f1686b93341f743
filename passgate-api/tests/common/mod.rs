/// Common test utilities for API integration tests
///
/// Builds the full router over an in-memory user store, so these tests need
/// no database.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use passgate_api::app::{build_router, AppState};
use passgate_api::config::Config;
use passgate_shared::auth::jwt::JwtIssuer;
use passgate_shared::auth::password::{CredentialCodec, HashParams};
use passgate_shared::service::AuthService;
use passgate_shared::store::memory::MemoryUserStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

pub const JWT_SECRET: &str = "api-test-secret-key-at-least-32-bytes";

/// Test context containing the router and its backing store
pub struct TestContext {
    pub app: Router,
    pub store: MemoryUserStore,
    pub tokens: Arc<JwtIssuer>,
}

impl TestContext {
    pub fn new() -> Self {
        let vars: HashMap<&str, &str> = [
            ("DATABASE_URL", "postgresql://unused/test"),
            ("JWT_SECRET", JWT_SECRET),
            ("JWT_EXPIRATION_HOURS", "1"),
            ("PASSWORD_HASH_MEMORY_KIB", "1024"),
            ("PASSWORD_HASH_ITERATIONS", "1"),
            ("PASSWORD_HASH_PARALLELISM", "1"),
        ]
        .into_iter()
        .collect();
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))
            .expect("Test config should load");
        assert_eq!(
            config.password,
            HashParams {
                memory_kib: 1024,
                iterations: 1,
                parallelism: 1
            }
        );

        let tokens = Arc::new(
            JwtIssuer::new(JWT_SECRET, chrono::Duration::hours(1)).expect("Secret should be accepted"),
        );
        let store = MemoryUserStore::new();
        let auth = AuthService::new(
            Arc::new(store.clone()),
            tokens.clone(),
            CredentialCodec::new(config.password).expect("Params should be valid"),
        );

        let app = build_router(AppState::new(auth, tokens.clone(), config));

        Self { app, store, tokens }
    }

    /// Sends a request and returns the status and parsed JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        bearer: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, json)
    }

    pub async fn register(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/v1/auth/register",
            None,
            Some(serde_json::json!({
                "email": email,
                "password": password,
                "first_name": "Ada",
                "last_name": "Lovelace"
            })),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.send(
            Method::POST,
            "/v1/auth/login",
            None,
            Some(serde_json::json!({ "email": email, "password": password })),
        )
        .await
    }
}
