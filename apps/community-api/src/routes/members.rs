//! Membership endpoints: join, leave, member list, and the caller's communities.

use axum::extract::State;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde::Serialize;
use utoipa::ToSchema;

use crate::auth::middleware::Caller;
use crate::error::{ApiError, ApiErrorBody};
use crate::models::community::Community;
use crate::models::member::CommunityMember;
use crate::routes::communities::CommunityId;
use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/communities/{id}/join", post(join_community))
        .route("/communities/{id}/leave", delete(leave_community))
        .route("/communities/{id}/members", get(list_members))
        .route("/communities/user/communities", get(list_user_communities))
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    fn new(message: &str) -> Json<Self> {
        Json(Self {
            message: message.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// POST /api/v1/communities/:id/join
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/api/v1/communities/{id}/join",
    tag = "Members",
    security(("bearer" = [])),
    params(("id" = i32, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Joined (or already a member)", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Community not found", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
)]
pub async fn join_community(
    caller: Caller,
    State(state): State<AppState>,
    CommunityId(id): CommunityId,
) -> Result<Json<MessageResponse>, ApiError> {
    state.membership.join_community(&caller, id).await?;
    Ok(MessageResponse::new("Joined community successfully"))
}

// ---------------------------------------------------------------------------
// DELETE /api/v1/communities/:id/leave
// ---------------------------------------------------------------------------

#[utoipa::path(
    delete,
    path = "/api/v1/communities/{id}/leave",
    tag = "Members",
    security(("bearer" = [])),
    params(("id" = i32, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Left the community", body = MessageResponse),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Not a member", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
)]
pub async fn leave_community(
    caller: Caller,
    State(state): State<AppState>,
    CommunityId(id): CommunityId,
) -> Result<Json<MessageResponse>, ApiError> {
    state.membership.leave_community(&caller, id).await?;
    Ok(MessageResponse::new("Left community successfully"))
}

// ---------------------------------------------------------------------------
// GET /api/v1/communities/:id/members
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/communities/{id}/members",
    tag = "Members",
    security(("bearer" = [])),
    params(("id" = i32, Path, description = "Community ID")),
    responses(
        (status = 200, description = "Members, oldest first", body = [CommunityMember]),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 404, description = "Community not found", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
)]
pub async fn list_members(
    _caller: Caller,
    State(state): State<AppState>,
    CommunityId(id): CommunityId,
) -> Result<Json<Vec<CommunityMember>>, ApiError> {
    let members = state.membership.list_members(id).await?;
    Ok(Json(members))
}

// ---------------------------------------------------------------------------
// GET /api/v1/communities/user/communities
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/communities/user/communities",
    tag = "Members",
    security(("bearer" = [])),
    responses(
        (status = 200, description = "Communities the caller belongs to", body = [Community]),
        (status = 401, description = "Unauthorized", body = ApiErrorBody),
        (status = 500, description = "Internal error", body = ApiErrorBody),
    ),
)]
pub async fn list_user_communities(
    caller: Caller,
    State(state): State<AppState>,
) -> Result<Json<Vec<Community>>, ApiError> {
    let list = state.membership.list_user_communities(&caller).await?;
    Ok(Json(list))
}
