//! Community and membership business rules.
//!
//! This is the only layer that knows who may do what. Validation and
//! authorization run before any storage call; storage failures are logged here
//! and surfaced as [`ServiceError::Internal`] without their details.

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::auth::middleware::Caller;
use crate::db::store::{CommunityStore, StoreError};
use crate::models::community::{Community, NewCommunity};
use crate::models::member::CommunityMember;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("An internal error occurred")]
    Internal,
}

/// Roles a caller must hold to create a community.
#[derive(Debug, Clone)]
pub struct CreateCommunityPolicy {
    pub required_roles: Vec<String>,
}

impl CreateCommunityPolicy {
    pub fn admin_only(admin_role: impl Into<String>) -> Self {
        Self {
            required_roles: vec![admin_role.into()],
        }
    }

    fn allows(&self, caller: &Caller) -> bool {
        caller.has_roles(self.required_roles.iter().map(String::as_str))
    }
}

impl Default for CreateCommunityPolicy {
    fn default() -> Self {
        Self::admin_only("admin")
    }
}

pub struct MembershipService {
    store: Arc<dyn CommunityStore>,
    policy: CreateCommunityPolicy,
    schema_ready: OnceCell<()>,
}

fn internal(op: &'static str) -> impl FnOnce(StoreError) -> ServiceError {
    move |err| {
        tracing::error!(?err, op, "storage failure");
        ServiceError::Internal
    }
}

fn community_not_found() -> ServiceError {
    ServiceError::NotFound("Community not found".to_string())
}

impl MembershipService {
    pub fn new(store: Arc<dyn CommunityStore>, policy: CreateCommunityPolicy) -> Self {
        Self {
            store,
            policy,
            schema_ready: OnceCell::new(),
        }
    }

    /// Make sure the membership table exists.
    ///
    /// The DDL runs at most once per process; a failed attempt leaves the cell
    /// empty so the next caller tries again.
    pub async fn ensure_schema(&self) -> Result<(), ServiceError> {
        self.schema_ready
            .get_or_try_init(|| self.store.ensure_membership_schema())
            .await
            .map_err(internal("ensure_membership_schema"))?;
        Ok(())
    }

    pub async fn create_community(
        &self,
        caller: &Caller,
        name: &str,
        language: Option<&str>,
        description: Option<&str>,
    ) -> Result<Community, ServiceError> {
        if !self.policy.allows(caller) {
            tracing::debug!(user_id = caller.user_id, "community creation denied");
            return Err(ServiceError::Forbidden(
                "Only admins can create communities".to_string(),
            ));
        }

        let name = name.trim();
        if name.is_empty() {
            return Err(ServiceError::InvalidInput(
                "Community name is required".to_string(),
            ));
        }

        let community = self
            .store
            .create_community(NewCommunity {
                name,
                language,
                description,
            })
            .await
            .map_err(internal("create_community"))?;

        tracing::info!(
            community_id = community.id,
            user_id = caller.user_id,
            "community created"
        );
        Ok(community)
    }

    pub async fn list_communities(&self) -> Result<Vec<Community>, ServiceError> {
        self.store
            .find_all_communities()
            .await
            .map_err(internal("find_all_communities"))
    }

    pub async fn get_community(&self, id: i32) -> Result<Community, ServiceError> {
        self.store
            .find_community_by_id(id)
            .await
            .map_err(internal("find_community_by_id"))?
            .ok_or_else(community_not_found)
    }

    /// Join a community. Joining one the caller already belongs to succeeds
    /// without changing anything.
    pub async fn join_community(
        &self,
        caller: &Caller,
        community_id: i32,
    ) -> Result<(), ServiceError> {
        self.get_community(community_id).await?;
        self.ensure_schema().await?;

        let inserted = self
            .store
            .insert_membership_if_absent(caller.user_id, community_id)
            .await
            .map_err(internal("insert_membership_if_absent"))?;

        if inserted == 0 {
            tracing::debug!(user_id = caller.user_id, community_id, "already a member");
        } else {
            tracing::info!(user_id = caller.user_id, community_id, "joined community");
        }
        Ok(())
    }

    pub async fn leave_community(
        &self,
        caller: &Caller,
        community_id: i32,
    ) -> Result<(), ServiceError> {
        self.ensure_schema().await?;

        let deleted = self
            .store
            .delete_membership(caller.user_id, community_id)
            .await
            .map_err(internal("delete_membership"))?;

        if deleted == 0 {
            return Err(ServiceError::NotFound(
                "You are not a member of this community".to_string(),
            ));
        }

        tracing::info!(user_id = caller.user_id, community_id, "left community");
        Ok(())
    }

    /// Members of a community, in the order they joined.
    pub async fn list_members(
        &self,
        community_id: i32,
    ) -> Result<Vec<CommunityMember>, ServiceError> {
        self.get_community(community_id).await?;
        self.ensure_schema().await?;

        self.store
            .list_members(community_id)
            .await
            .map_err(internal("list_members"))
    }

    pub async fn list_user_communities(
        &self,
        caller: &Caller,
    ) -> Result<Vec<Community>, ServiceError> {
        self.ensure_schema().await?;

        self.store
            .list_user_communities(caller.user_id)
            .await
            .map_err(internal("list_user_communities"))
    }
}
