pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routes;
pub mod service;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::Router;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use auth::tokens::TokenVerifier;
use config::Config;
use db::store::CommunityStore;
use service::{CreateCommunityPolicy, MembershipService};

/// Shared application state available to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub membership: Arc<MembershipService>,
    pub tokens: Arc<TokenVerifier>,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the service layer and token verifier around a store.
    pub fn new(config: Config, store: Arc<dyn CommunityStore>) -> Self {
        let policy = CreateCommunityPolicy::admin_only(config.admin_role.clone());
        Self {
            membership: Arc::new(MembershipService::new(store, policy)),
            tokens: Arc::new(TokenVerifier::new(&config.jwt_secret)),
            config: Arc::new(config),
        }
    }
}

/// CORS policy for the configured frontend origins. Credentials are allowed,
/// so methods and headers mirror the request instead of using wildcards.
pub fn cors_layer(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
}

/// The full application: routes plus CORS and request tracing.
pub fn app(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        .merge(routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
