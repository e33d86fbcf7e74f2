use anyhow::Result;
use uuid::Uuid;

use crate::infra::db::Db;

#[derive(Clone)]
pub struct SocialService {
    db: Db,
}

impl SocialService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// One row per follow edge; the composite primary key makes repeat
    /// calls no-ops, and a single insert updates both sides of the
    /// relationship atomically.
    pub async fn follow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO follows (follower_id, followee_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn unfollow(&self, follower_id: Uuid, followee_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "DELETE FROM follows WHERE follower_id = $1 AND followee_id = $2",
        )
        .bind(follower_id)
        .bind(followee_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
