use anyhow::Result;
use sqlx::postgres::PgRow;
use sqlx::Row;
use time::Date;
use uuid::Uuid;

use crate::domain::media::MediaAsset;
use crate::domain::user::{Account, User};
use crate::infra::db::Db;

// Every read hydrates the follower/following/likes id lists alongside the
// user row, so responses carry the same embedded arrays clients expect.
const USER_COLUMNS: &str =
    "u.id, u.email, u.username, u.avatar, u.birth_date, u.team, u.newsletter, u.bio, \
     u.token, u.hash, u.salt, u.created_at, \
     ARRAY(SELECT f.follower_id FROM follows f WHERE f.followee_id = u.id ORDER BY f.created_at) AS followers, \
     ARRAY(SELECT f.followee_id FROM follows f WHERE f.follower_id = u.id ORDER BY f.created_at) AS following, \
     ARRAY(SELECT l.post_id FROM likes l WHERE l.user_id = u.id ORDER BY l.created_at) AS likes";

#[derive(Clone)]
pub struct UserService {
    db: Db,
}

/// Fields a profile update may touch. `None` means "leave unchanged";
/// callers are responsible for the truthiness filtering that decides
/// which submitted values become `Some`.
#[derive(Debug, Default)]
pub struct ProfileChanges {
    pub username: Option<String>,
    pub newsletter: Option<bool>,
    pub birth_date: Option<Date>,
    pub team: Option<String>,
    pub bio: Option<String>,
}

impl UserService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub async fn list_all(&self) -> Result<Vec<User>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users u ORDER BY u.created_at",
            USER_COLUMNS
        ))
        .fetch_all(self.db.pool())
        .await?;

        Ok(rows.iter().map(user_from_row).collect())
    }

    pub async fn get(&self, user_id: Uuid) -> Result<Option<User>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users u WHERE u.id = $1",
            USER_COLUMNS
        ))
        .bind(user_id)
        .fetch_optional(self.db.pool())
        .await?;

        Ok(row.as_ref().map(user_from_row))
    }

    pub async fn exists(&self, user_id: Uuid) -> Result<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM users WHERE id = $1)")
            .bind(user_id)
            .fetch_one(self.db.pool())
            .await?;
        Ok(exists)
    }

    pub async fn update(&self, user_id: Uuid, changes: ProfileChanges) -> Result<Option<User>> {
        let row = sqlx::query(
            "UPDATE users \
             SET username = COALESCE($2, username), \
                 newsletter = COALESCE($3, newsletter), \
                 birth_date = COALESCE($4, birth_date), \
                 team = COALESCE($5, team), \
                 bio = COALESCE($6, bio) \
             WHERE id = $1 \
             RETURNING id",
        )
        .bind(user_id)
        .bind(changes.username)
        .bind(changes.newsletter)
        .bind(changes.birth_date)
        .bind(changes.team)
        .bind(changes.bio)
        .fetch_optional(self.db.pool())
        .await?;

        if row.is_none() {
            return Ok(None);
        }

        self.get(user_id).await
    }

    /// Removes the account row only. Posts, comments and edge rows keep
    /// referencing the dead id.
    pub async fn delete(&self, user_id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(self.db.pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

pub(crate) fn user_from_row(row: &PgRow) -> User {
    let avatar = row
        .get::<Option<sqlx::types::Json<MediaAsset>>, _>("avatar")
        .map(|json| json.0);

    User {
        id: row.get("id"),
        email: row.get("email"),
        account: Account {
            username: row.get("username"),
            avatar,
        },
        birth_date: row.get("birth_date"),
        team: row.get("team"),
        newsletter: row.get("newsletter"),
        bio: row.get("bio"),
        token: row.get("token"),
        hash: row.get("hash"),
        salt: row.get("salt"),
        followers: row.get("followers"),
        following: row.get("following"),
        likes: row.get("likes"),
        created_at: row.get("created_at"),
    }
}
