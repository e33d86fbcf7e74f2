use anyhow::Result;
use sqlx::Row;
use time::Date;
use uuid::Uuid;

use crate::app::credentials;
use crate::domain::media::MediaAsset;
use crate::domain::user::{Account, AuthProfile};
use crate::infra::db::Db;

/// Identity resolved from a bearer token.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user_id: Uuid,
    pub username: String,
}

#[derive(Clone)]
pub struct AuthService {
    db: Db,
}

pub struct SignupInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub newsletter: Option<bool>,
    pub birth_date: Option<Date>,
    pub team: Option<String>,
    pub bio: Option<String>,
}

impl AuthService {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    /// Persists a new account with a fresh salt, digest and bearer token.
    /// Email uniqueness is enforced by the database; a duplicate surfaces
    /// as a unique-violation error for the caller to map.
    pub async fn signup(&self, input: SignupInput) -> Result<AuthProfile> {
        let salt = credentials::generate_salt();
        let hash = credentials::hash_password(&input.password, &salt);
        let token = credentials::generate_token();
        let email = input.email.to_lowercase();

        let row = sqlx::query(
            "INSERT INTO users (email, username, birth_date, team, newsletter, bio, token, hash, salt) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING id",
        )
        .bind(email)
        .bind(&input.username)
        .bind(input.birth_date)
        .bind(&input.team)
        .bind(input.newsletter)
        .bind(&input.bio)
        .bind(&token)
        .bind(hash)
        .bind(salt)
        .fetch_one(self.db.pool())
        .await?;

        Ok(AuthProfile {
            id: row.get("id"),
            token,
            account: Account {
                username: input.username,
                avatar: None,
            },
            team: input.team,
            birth_date: input.birth_date,
        })
    }

    /// None on unknown email or digest mismatch; the caller cannot tell
    /// the two apart.
    pub async fn login(&self, email: &str, password: &str) -> Result<Option<AuthProfile>> {
        let row = sqlx::query(
            "SELECT id, username, avatar, birth_date, team, token, hash, salt \
             FROM users WHERE email = $1",
        )
        .bind(email.to_lowercase())
        .fetch_optional(self.db.pool())
        .await?;

        let row = match row {
            Some(row) => row,
            None => return Ok(None),
        };

        let hash: String = row.get("hash");
        let salt: String = row.get("salt");
        if !credentials::verify_password(password, &salt, &hash) {
            return Ok(None);
        }

        let avatar = row
            .get::<Option<sqlx::types::Json<MediaAsset>>, _>("avatar")
            .map(|json| json.0);

        Ok(Some(AuthProfile {
            id: row.get("id"),
            token: row.get("token"),
            account: Account {
                username: row.get("username"),
                avatar,
            },
            team: row.get("team"),
            birth_date: row.get("birth_date"),
        }))
    }

    /// Exact-match lookup of a stored bearer token.
    pub async fn authenticate_token(&self, token: &str) -> Result<Option<AuthSession>> {
        let row = sqlx::query("SELECT id, username FROM users WHERE token = $1")
            .bind(token)
            .fetch_optional(self.db.pool())
            .await?;

        Ok(row.map(|row| AuthSession {
            user_id: row.get("id"),
            username: row.get("username"),
        }))
    }
}
