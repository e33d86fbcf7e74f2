use anyhow::Result;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::post::Comment;
use crate::infra::db::Db;

#[derive(Clone)]
pub struct EngagementService {
    db: Db,
}

impl EngagementService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Idempotent: the (user, post) primary key swallows repeats, and one
    /// row serves both the post's likers and the user's likes.
    pub async fn like(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            "INSERT INTO likes (user_id, post_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(user_id)
        .bind(post_id)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn unlike(&self, user_id: Uuid, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND post_id = $2")
            .bind(user_id)
            .bind(post_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn add_comment(
        &self,
        post_id: Uuid,
        commenter_id: Uuid,
        commenter_pseudo: String,
        text: String,
    ) -> Result<Comment> {
        let row = sqlx::query(
            "INSERT INTO comments (post_id, commenter_id, commenter_pseudo, body) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, created_at",
        )
        .bind(post_id)
        .bind(commenter_id)
        .bind(&commenter_pseudo)
        .bind(&text)
        .fetch_one(self.db.pool())
        .await?;

        Ok(Comment {
            id: row.get("id"),
            commenter_id,
            commenter_pseudo,
            text,
            timestamp: row.get("created_at"),
        })
    }

    pub async fn comment_author(
        &self,
        post_id: Uuid,
        comment_id: Uuid,
    ) -> Result<Option<Uuid>> {
        let author = sqlx::query_scalar(
            "SELECT commenter_id FROM comments WHERE id = $1 AND post_id = $2",
        )
        .bind(comment_id)
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(author)
    }

    /// Positional update of one comment's text, targeted by the comment's
    /// own id. False when nothing matched.
    pub async fn edit_comment(&self, post_id: Uuid, comment_id: Uuid, text: String) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE comments SET body = $3 WHERE id = $1 AND post_id = $2",
        )
        .bind(comment_id)
        .bind(post_id)
        .bind(text)
        .execute(self.db.pool())
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_comment(&self, post_id: Uuid, comment_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1 AND post_id = $2")
            .bind(comment_id)
            .bind(post_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
