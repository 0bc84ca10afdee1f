use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;

use crate::db::store::{CommunityStore, StoreError};
use crate::models::community::{Community, NewCommunity};
use crate::models::member::CommunityMember;

// ---------------------------------------------------------------------------
// In-memory implementation (for tests and local runs without PostgreSQL)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct UserRow {
    name: String,
    email: String,
    profile_picture: Option<String>,
}

#[derive(Debug, Clone)]
struct MembershipRow {
    id: i32,
    user_id: i32,
    community_id: i32,
    joined_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Tables {
    users: BTreeMap<i32, UserRow>,
    communities: BTreeMap<i32, Community>,
    memberships: Vec<MembershipRow>,
    next_community_id: i32,
    next_membership_id: i32,
}

/// [`CommunityStore`] that keeps every table in process memory.
///
/// Mirrors the PostgreSQL constraints: memberships require existing user and
/// community rows, and `(user_id, community_id)` is unique.
#[derive(Default)]
pub struct MemoryCommunityStore {
    tables: Mutex<Tables>,
    schema_calls: AtomicUsize,
}

impl MemoryCommunityStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a row of the externally owned `users` table.
    pub async fn insert_user(
        &self,
        id: i32,
        name: &str,
        email: &str,
        profile_picture: Option<&str>,
    ) {
        self.tables.lock().await.users.insert(
            id,
            UserRow {
                name: name.to_string(),
                email: email.to_string(),
                profile_picture: profile_picture.map(str::to_string),
            },
        );
    }

    /// Number of membership rows for the pair (0 or 1).
    pub async fn membership_count(&self, user_id: i32, community_id: i32) -> usize {
        self.tables
            .lock()
            .await
            .memberships
            .iter()
            .filter(|m| m.user_id == user_id && m.community_id == community_id)
            .count()
    }

    pub async fn community_count(&self) -> usize {
        self.tables.lock().await.communities.len()
    }

    /// How many times the membership DDL has been issued.
    pub fn schema_ensure_calls(&self) -> usize {
        self.schema_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommunityStore for MemoryCommunityStore {
    async fn ensure_membership_schema(&self) -> Result<(), StoreError> {
        self.schema_calls.fetch_add(1, Ordering::SeqCst);
        tracing::info!("user_communities table ready");
        Ok(())
    }

    async fn create_community(&self, new: NewCommunity<'_>) -> Result<Community, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.next_community_id += 1;
        let community = Community {
            id: tables.next_community_id,
            name: new.name.to_string(),
            language: new.language.map(str::to_string),
            description: new.description.map(str::to_string),
        };
        tables.communities.insert(community.id, community.clone());
        Ok(community)
    }

    async fn find_all_communities(&self) -> Result<Vec<Community>, StoreError> {
        Ok(self.tables.lock().await.communities.values().cloned().collect())
    }

    async fn find_community_by_id(&self, id: i32) -> Result<Option<Community>, StoreError> {
        Ok(self.tables.lock().await.communities.get(&id).cloned())
    }

    async fn insert_membership_if_absent(
        &self,
        user_id: i32,
        community_id: i32,
    ) -> Result<usize, StoreError> {
        let mut tables = self.tables.lock().await;

        if !tables.users.contains_key(&user_id) {
            return Err(StoreError::Constraint(format!(
                "user_communities.user_id {user_id} references a missing user"
            )));
        }
        if !tables.communities.contains_key(&community_id) {
            return Err(StoreError::Constraint(format!(
                "user_communities.community_id {community_id} references a missing community"
            )));
        }

        let exists = tables
            .memberships
            .iter()
            .any(|m| m.user_id == user_id && m.community_id == community_id);
        if exists {
            return Ok(0);
        }

        tables.next_membership_id += 1;
        let row = MembershipRow {
            id: tables.next_membership_id,
            user_id,
            community_id,
            joined_at: Utc::now(),
        };
        tables.memberships.push(row);
        Ok(1)
    }

    async fn delete_membership(
        &self,
        user_id: i32,
        community_id: i32,
    ) -> Result<usize, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.memberships.len();
        tables
            .memberships
            .retain(|m| !(m.user_id == user_id && m.community_id == community_id));
        Ok(before - tables.memberships.len())
    }

    async fn list_members(&self, community_id: i32) -> Result<Vec<CommunityMember>, StoreError> {
        let tables = self.tables.lock().await;

        let mut rows: Vec<&MembershipRow> = tables
            .memberships
            .iter()
            .filter(|m| m.community_id == community_id)
            .collect();
        rows.sort_by_key(|m| (m.joined_at, m.id));

        let members = rows
            .into_iter()
            .filter_map(|m| {
                tables.users.get(&m.user_id).map(|u| CommunityMember {
                    id: m.user_id,
                    name: u.name.clone(),
                    email: u.email.clone(),
                    profile_picture: u.profile_picture.clone(),
                    joined_at: m.joined_at,
                })
            })
            .collect();

        Ok(members)
    }

    async fn list_user_communities(&self, user_id: i32) -> Result<Vec<Community>, StoreError> {
        let tables = self.tables.lock().await;

        let list = tables
            .communities
            .values()
            .filter(|c| {
                tables
                    .memberships
                    .iter()
                    .any(|m| m.user_id == user_id && m.community_id == c.id)
            })
            .cloned()
            .collect();

        Ok(list)
    }
}
