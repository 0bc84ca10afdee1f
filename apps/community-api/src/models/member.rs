use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use utoipa::ToSchema;

use crate::db::schema::user_communities;

/// A user as seen through their membership in one community.
#[derive(Debug, Clone, PartialEq, Queryable, Serialize, ToSchema)]
pub struct CommunityMember {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub profile_picture: Option<String>,
    pub joined_at: DateTime<Utc>,
}

/// Insertable membership row. `joined_at` is left to the column default.
#[derive(Debug, Insertable)]
#[diesel(table_name = user_communities)]
pub struct NewMembership {
    pub user_id: i32,
    pub community_id: i32,
}
