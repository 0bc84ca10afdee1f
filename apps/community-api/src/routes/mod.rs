pub mod communities;
pub mod health;
pub mod members;

use axum::Router;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new().merge(health::router()).nest(
        "/api/v1",
        communities::router().merge(members::router()),
    )
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        communities::list_communities,
        communities::get_community,
        communities::create_community,
        members::join_community,
        members::leave_community,
        members::list_members,
        members::list_user_communities,
    ),
    components(
        schemas(
            crate::error::ApiErrorBody,
            crate::models::community::Community,
            crate::models::member::CommunityMember,
            health::HealthResponse,
            communities::CreateCommunityRequest,
            members::MessageResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check"),
        (name = "Communities", description = "Community management"),
        (name = "Members", description = "Community membership"),
    )
)]
pub struct ApiDoc;
