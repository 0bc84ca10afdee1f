//! PostgreSQL-backed [`CommunityStore`].

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError, OptionalExtension};

use crate::db::pool::DbPool;
use crate::db::schema::{communities, user_communities, users};
use crate::db::store::{CommunityStore, StoreError};
use crate::models::community::{Community, NewCommunity};
use crate::models::member::{CommunityMember, NewMembership};

const CREATE_MEMBERSHIP_TABLE: &str = "\
CREATE TABLE IF NOT EXISTS user_communities (
    id           SERIAL PRIMARY KEY,
    user_id      INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    community_id INTEGER NOT NULL REFERENCES communities(id) ON DELETE CASCADE,
    joined_at    TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (user_id, community_id)
)";

#[derive(Clone)]
pub struct PgCommunityStore {
    pool: DbPool,
}

impl PgCommunityStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn classify(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            StoreError::Constraint(info.message().to_string())
        }
        other => StoreError::Query(other),
    }
}

#[async_trait]
impl CommunityStore for PgCommunityStore {
    async fn ensure_membership_schema(&self) -> Result<(), StoreError> {
        let result = async {
            let mut conn = self.pool.get().await?;
            diesel_async::RunQueryDsl::execute(diesel::sql_query(CREATE_MEMBERSHIP_TABLE), &mut conn)
                .await?;
            Ok::<_, StoreError>(())
        }
        .await;

        match &result {
            Ok(()) => tracing::info!("user_communities table ready"),
            Err(err) => tracing::error!(?err, "failed to create user_communities table"),
        }
        result
    }

    async fn create_community(&self, new: NewCommunity<'_>) -> Result<Community, StoreError> {
        let mut conn = self.pool.get().await?;

        let community: Community = diesel_async::RunQueryDsl::get_result(
            diesel::insert_into(communities::table)
                .values(&new)
                .returning(Community::as_returning()),
            &mut conn,
        )
        .await?;

        Ok(community)
    }

    async fn find_all_communities(&self) -> Result<Vec<Community>, StoreError> {
        let mut conn = self.pool.get().await?;

        let list: Vec<Community> = diesel_async::RunQueryDsl::load(
            communities::table
                .order(communities::id.asc())
                .select(Community::as_select()),
            &mut conn,
        )
        .await?;

        Ok(list)
    }

    async fn find_community_by_id(&self, id: i32) -> Result<Option<Community>, StoreError> {
        let mut conn = self.pool.get().await?;

        let community = diesel_async::RunQueryDsl::get_result(
            communities::table.find(id).select(Community::as_select()),
            &mut conn,
        )
        .await
        .optional()?;

        Ok(community)
    }

    async fn insert_membership_if_absent(
        &self,
        user_id: i32,
        community_id: i32,
    ) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        diesel_async::RunQueryDsl::execute(
            diesel::insert_into(user_communities::table)
                .values(NewMembership {
                    user_id,
                    community_id,
                })
                .on_conflict((user_communities::user_id, user_communities::community_id))
                .do_nothing(),
            &mut conn,
        )
        .await
        .map_err(classify)
    }

    async fn delete_membership(
        &self,
        user_id: i32,
        community_id: i32,
    ) -> Result<usize, StoreError> {
        let mut conn = self.pool.get().await?;

        let deleted = diesel_async::RunQueryDsl::execute(
            diesel::delete(
                user_communities::table
                    .filter(user_communities::user_id.eq(user_id))
                    .filter(user_communities::community_id.eq(community_id)),
            ),
            &mut conn,
        )
        .await?;

        Ok(deleted)
    }

    async fn list_members(&self, community_id: i32) -> Result<Vec<CommunityMember>, StoreError> {
        let mut conn = self.pool.get().await?;

        let members: Vec<CommunityMember> = diesel_async::RunQueryDsl::load(
            user_communities::table
                .inner_join(users::table)
                .filter(user_communities::community_id.eq(community_id))
                .order((user_communities::joined_at.asc(), user_communities::id.asc()))
                .select((
                    users::id,
                    users::name,
                    users::email,
                    users::profile_picture,
                    user_communities::joined_at,
                )),
            &mut conn,
        )
        .await?;

        Ok(members)
    }

    async fn list_user_communities(&self, user_id: i32) -> Result<Vec<Community>, StoreError> {
        let mut conn = self.pool.get().await?;

        let list: Vec<Community> = diesel_async::RunQueryDsl::load(
            communities::table
                .inner_join(user_communities::table)
                .filter(user_communities::user_id.eq(user_id))
                .order(communities::id.asc())
                .select(Community::as_select()),
            &mut conn,
        )
        .await?;

        Ok(list)
    }
}
