use async_trait::async_trait;

use crate::models::community::{Community, NewCommunity};
use crate::models::member::CommunityMember;

/// Failure reported by a [`CommunityStore`] backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("query failed: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("connection pool: {0}")]
    Pool(#[from] diesel_async::pooled_connection::deadpool::PoolError),
    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// Persistence for communities and the `user_communities` join entity.
///
/// Backed by PostgreSQL in production and an in-memory map in tests.
#[async_trait]
pub trait CommunityStore: Send + Sync {
    /// Create the membership table if it does not exist yet.
    async fn ensure_membership_schema(&self) -> Result<(), StoreError>;

    async fn create_community(&self, new: NewCommunity<'_>) -> Result<Community, StoreError>;

    async fn find_all_communities(&self) -> Result<Vec<Community>, StoreError>;

    async fn find_community_by_id(&self, id: i32) -> Result<Option<Community>, StoreError>;

    /// Insert a membership, doing nothing if the pair already exists.
    ///
    /// Returns the number of rows inserted (0 or 1).
    async fn insert_membership_if_absent(
        &self,
        user_id: i32,
        community_id: i32,
    ) -> Result<usize, StoreError>;

    /// Delete a membership. Returns the number of rows removed.
    async fn delete_membership(&self, user_id: i32, community_id: i32)
        -> Result<usize, StoreError>;

    /// Members of a community, oldest `joined_at` first.
    async fn list_members(&self, community_id: i32) -> Result<Vec<CommunityMember>, StoreError>;

    async fn list_user_communities(&self, user_id: i32) -> Result<Vec<Community>, StoreError>;
}
