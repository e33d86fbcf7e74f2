use serde::Serialize;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::domain::media::MediaAsset;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub owner: Uuid,
    pub message: String,
    pub picture: MediaAsset,
    pub video: Option<String>,
    pub likers: Vec<Uuid>,
    pub comments: Vec<Comment>,
    #[serde(with = "time::serde::rfc3339")]
    pub date_of_post: OffsetDateTime,
}

/// One entry in a post's comment sequence. The id is assigned at
/// creation and is what edit/delete target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: Uuid,
    pub commenter_id: Uuid,
    pub commenter_pseudo: String,
    pub text: String,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}
