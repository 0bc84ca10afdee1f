//! Bearer token extraction.

use std::collections::BTreeSet;

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::AppState;

/// Authenticated caller extracted from the `Authorization: Bearer <jwt>` header.
///
/// Use as an Axum extractor in any handler that requires authentication:
///
/// ```ignore
/// async fn handler(caller: Caller) -> impl IntoResponse { ... }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub user_id: i32,
    pub roles: BTreeSet<String>,
}

impl Caller {
    pub fn new<I, S>(user_id: i32, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            user_id,
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// True when the caller holds every role in `required`.
    pub fn has_roles<'a, I>(&self, required: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        required.into_iter().all(|role| self.roles.contains(role))
    }
}

/// Rejection returned when the bearer token is missing or invalid.
pub struct AuthError {
    message: &'static str,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.message });
        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Token from a `Bearer` credential. The scheme name is case-insensitive.
fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.trim_start().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AuthError {
                message: "Missing Authorization header",
            })?;

        let token = bearer_token(header).ok_or(AuthError {
            message: "Invalid Authorization header format",
        })?;

        let identity = state.tokens.verify(token).map_err(|err| {
            tracing::debug!(%err, "bearer token rejected");
            AuthError {
                message: "Invalid or expired token",
            }
        })?;

        Ok(Caller {
            user_id: identity.user_id,
            roles: identity.roles,
        })
    }
}
