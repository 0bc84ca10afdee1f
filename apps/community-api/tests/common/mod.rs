use std::sync::Arc;

use axum::Router;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::Serialize;

use community_api::config::Config;
use community_api::db::MemoryCommunityStore;
use community_api::AppState;

pub const TEST_SECRET: &str = "test-secret-do-not-use-in-production";

pub const ADMIN_ID: i32 = 1;

/// Claims for minting test access tokens (mirrors what the auth service issues).
#[derive(Debug, Serialize)]
pub struct TestClaims {
    pub sub: String,
    pub exp: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://localhost/unused_test".to_string(),
        jwt_secret: TEST_SECRET.to_string(),
        port: 0,
        db_pool_size: 1,
        admin_role: "admin".to_string(),
        cors_allowed_origins: vec!["http://localhost:5173".to_string()],
    }
}

/// Mint a test access token for `user_id`, optionally carrying a role.
pub fn mint_token(user_id: i32, role: Option<&str>) -> String {
    let claims = TestClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() + chrono::Duration::minutes(15)).timestamp(),
        role: role.map(str::to_string),
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("mint test token")
}

/// Mint a token that expired an hour ago.
pub fn mint_expired_token(user_id: i32) -> String {
    let claims = TestClaims {
        sub: user_id.to_string(),
        exp: (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp(),
        role: None,
    };
    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .expect("mint expired token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}

pub fn admin_token() -> String {
    mint_token(ADMIN_ID, Some("admin"))
}

/// Build the full application router wired to an in-memory store seeded with
/// an admin (id 1) and users 2..=4.
pub async fn test_app() -> (Router, Arc<MemoryCommunityStore>, AppState) {
    let store = Arc::new(MemoryCommunityStore::new());
    store
        .insert_user(ADMIN_ID, "Admin", "admin@example.com", None)
        .await;
    store
        .insert_user(2, "Ana", "ana@example.com", Some("https://cdn.example.com/ana.png"))
        .await;
    store.insert_user(3, "Bo", "bo@example.com", None).await;
    store.insert_user(4, "Cy", "cy@example.com", None).await;

    let state = AppState::new(test_config(), store.clone());
    let app = community_api::app(state.clone());
    (app, store, state)
}

/// Create a community as the admin and return its id.
pub async fn create_community(server: &axum_test::TestServer, name: &str) -> i64 {
    let resp = server
        .post("/api/v1/communities")
        .add_header(axum::http::header::AUTHORIZATION, bearer(&admin_token()))
        .json(&serde_json::json!({ "name": name }))
        .await;
    resp.assert_status(axum::http::StatusCode::CREATED);
    resp.json::<serde_json::Value>()["id"]
        .as_i64()
        .expect("community id")
}
