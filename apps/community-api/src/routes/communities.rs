//! Community endpoints.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequestParts, Path, State};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use utoipa::ToSchema;

use crate::auth::middleware::Caller;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::community::Community;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/communities", get(list_communities).post(create_community))
        .route("/communities/{id}", get(get_community))
}

/// Community id taken from the path.
///
/// An id that is not an integer cannot name any community, so it is rejected
/// as not found rather than as a malformed request.
#[derive(Debug, Clone, Copy)]
pub struct CommunityId(pub i32);

impl<S> FromRequestParts<S> for CommunityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::not_found("Community not found"))?;

        raw.parse()
            .map(CommunityId)
            .map_err(|_| ApiError::not_found("Community not found"))
    }
}

// ---------------------------------------------------------------------------
// GET /api/v1/communities
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/communities",
    tag = "Communities",
    responses(
        (status = 200, description = "All communities", body = [Community]),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
)]
pub async fn list_communities(
    State(state): State<AppState>,
) -> Result<Json<Vec<Community>>, ApiError> {
    let list = state.membership.list_communities().await?;
    Ok(Json(list))
}

// ---------------------------------------------------------------------------
// GET /api/v1/communities/:id
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/communities/{id}",
    tag = "Communities",
    params(("id" = i32, Path, description = "Community ID")),
    responses(
        (status = 200, description = "The community", body = Community),
        (status = 404, description = "Community not found", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
)]
pub async fn get_community(
    State(state): State<AppState>,
    CommunityId(id): CommunityId,
) -> Result<Json<Community>, ApiError> {
    let community = state.membership.get_community(id).await?;
    Ok(Json(community))
}

// ---------------------------------------------------------------------------
// POST /api/v1/communities
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCommunityRequest {
    #[serde(default)]
    pub name: Option<String>,
    pub language: Option<String>,
    pub description: Option<String>,
}

#[utoipa::path(
    post,
    path = "/api/v1/communities",
    tag = "Communities",
    security(("bearer" = [])),
    request_body = CreateCommunityRequest,
    responses(
        (status = 201, description = "Community created", body = Community),
        (status = 400, description = "Missing name", body = ApiErrorBody),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 403, description = "Caller is not an admin", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
)]
pub async fn create_community(
    caller: Caller,
    State(state): State<AppState>,
    body: Result<Json<CreateCommunityRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Community>), ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable create-community body");
        ApiError::bad_request("Request body must be a JSON object")
    })?;

    let community = state
        .membership
        .create_community(
            &caller,
            body.name.as_deref().unwrap_or_default(),
            body.language.as_deref(),
            body.description.as_deref(),
        )
        .await?;

    Ok((StatusCode::CREATED, Json(community)))
}
