use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use uuid::Uuid;

use crate::domain::media::MediaAsset;
use crate::domain::post::{Comment, Post};
use crate::infra::db::Db;

const POST_COLUMNS: &str =
    "p.id, p.owner_id, p.message, p.picture, p.video, p.created_at, \
     ARRAY(SELECT l.user_id FROM likes l WHERE l.post_id = p.id ORDER BY l.created_at) AS likers";

#[derive(Clone)]
pub struct PostService {
    db: Db,
}

impl PostService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn create(
        &self,
        owner_id: Uuid,
        message: String,
        picture: MediaAsset,
        video: Option<String>,
    ) -> Result<Post> {
        let row = sqlx::query(
            "INSERT INTO posts (owner_id, message, picture, video) \
             VALUES ($1, $2, $3, $4) \
             RETURNING id, created_at",
        )
        .bind(owner_id)
        .bind(&message)
        .bind(sqlx::types::Json(&picture))
        .bind(&video)
        .fetch_one(self.db.pool())
        .await?;

        Ok(Post {
            id: row.get("id"),
            owner: owner_id,
            message,
            picture,
            video,
            likers: Vec::new(),
            comments: Vec::new(),
            date_of_post: row.get("created_at"),
        })
    }

    pub async fn get(&self, post_id: Uuid) -> Result<Option<Post>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts p WHERE p.id = $1",
            POST_COLUMNS
        ))
        .bind(post_id)
        .fetch_optional(self.db.pool())
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let comments = self.comments_of(post_id).await?;
        Ok(Some(post_from_row(&row, comments)))
    }

    pub async fn exists(&self, post_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM posts WHERE id = $1)")
            .bind(post_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(exists)
    }

    /// Replaces the message only; everything else on the post is immutable
    /// through this path.
    pub async fn update_message(&self, post_id: Uuid, message: String) -> Result<Option<Post>> {
        let row = sqlx::query("UPDATE posts SET message = $2 WHERE id = $1 RETURNING id")
            .bind(post_id)
            .bind(message)
            .fetch_optional(self.db.pool())
            .await?;

        if row.is_none() {
            return Ok(None);
        }

        self.get(post_id).await
    }

    /// Comments cascade with the row. Likes rows are left in place, so a
    /// liker's `likes` list keeps the dead post id.
    pub async fn delete(&self, post_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(post_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn comments_of(&self, post_id: Uuid) -> Result<Vec<Comment>> {
        let rows = sqlx::query(
            "SELECT id, commenter_id, commenter_pseudo, body, created_at \
             FROM comments WHERE post_id = $1 \
             ORDER BY created_at, id",
        )
        .bind(post_id)
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows
            .iter()
            .map(|row| Comment {
                id: row.get("id"),
                commenter_id: row.get("commenter_id"),
                commenter_pseudo: row.get("commenter_pseudo"),
                text: row.get("body"),
                timestamp: row.get("created_at"),
            })
            .collect())
    }
}

fn post_from_row(row: &PgRow, comments: Vec<Comment>) -> Post {
    let picture = row.get::<sqlx::types::Json<MediaAsset>, _>("picture").0;

    Post {
        id: row.get("id"),
        owner: row.get("owner_id"),
        message: row.get("message"),
        picture,
        video: row.get("video"),
        likers: row.get("likers"),
        comments,
        date_of_post: row.get("created_at"),
    }
}
