/// Application state and router builder
///
/// # Example
///
/// ```no_run
/// use passgate_api::{app::{build_router, AppState}, config::Config};
/// use passgate_shared::auth::{jwt::JwtIssuer, password::CredentialCodec};
/// use passgate_shared::service::AuthService;
/// use passgate_shared::store::memory::MemoryUserStore;
/// use std::sync::Arc;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// let tokens = Arc::new(JwtIssuer::new(
///     &config.jwt.secret,
///     chrono::Duration::hours(config.jwt.expiration_hours),
/// )?);
/// let auth = AuthService::new(
///     Arc::new(MemoryUserStore::new()),
///     tokens.clone(),
///     CredentialCodec::new(config.password)?,
/// );
///
/// let app = build_router(AppState::new(auth, tokens, config));
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
/// axum::serve(listener, app).await?;
/// # Ok(())
/// # }
/// ```

use crate::{config::Config, middleware::auth::require_bearer};
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use passgate_shared::{auth::jwt::JwtIssuer, service::AuthService};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

/// Shared application state
///
/// Cloned for each request handler via Axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    /// Registration, login and account updates
    pub auth: AuthService,

    /// Validates bearer tokens on authenticated routes
    pub tokens: Arc<JwtIssuer>,

    /// Application configuration
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(auth: AuthService, tokens: Arc<JwtIssuer>, config: Config) -> Self {
        Self {
            auth,
            tokens,
            config: Arc::new(config),
        }
    }
}

/// Builds the complete Axum router with all routes and middleware
///
/// ```text
/// /
/// ├── GET  /health              # Health check (public)
/// └── /v1/
///     ├── /auth/                # Public
///     │   ├── POST /register
///     │   └── POST /login
///     └── /account              # Bearer token required
///         ├── GET
///         └── PATCH
/// ```
pub fn build_router(state: AppState) -> Router {
    use crate::routes;

    let health_routes = Router::new().route("/health", get(routes::health::health_check));

    let auth_routes = Router::new()
        .route("/register", post(routes::auth::register))
        .route("/login", post(routes::auth::login));

    let account_routes = Router::new()
        .route(
            "/",
            get(routes::account::get_account).patch(routes::account::update_account),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_bearer,
        ));

    let v1_routes = Router::new()
        .nest("/auth", auth_routes)
        .nest("/account", account_routes);

    let cors = cors_layer(&state.config.api.cors_origins);

    Router::new()
        .merge(health_routes)
        .nest("/v1", v1_routes)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors)
        .with_state(state)
}

/// `*` anywhere in the list allows every origin; otherwise only the listed
/// origins may call the API with credentials headers.
fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.iter().any(|o| o == "*") {
        return CorsLayer::permissive();
    }

    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Ignoring unparseable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(allowed)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE])
        .max_age(Duration::from_secs(3600))
}
