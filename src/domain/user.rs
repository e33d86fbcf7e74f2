use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::domain::media::MediaAsset;

/// Calendar-date (de)serialization as `YYYY-MM-DD`, the wire format
/// clients send for `birthDate`.
pub mod date_format {
    use serde::{Deserialize, Deserializer, Serializer};
    use time::format_description::FormatItem;
    use time::macros::format_description;
    use time::Date;

    const FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

    pub fn serialize<S>(date: &Option<Date>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match date {
            Some(date) => {
                let formatted = date
                    .format(&FORMAT)
                    .map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Date>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<String>::deserialize(deserializer)?;
        match value {
            Some(raw) => Date::parse(&raw, &FORMAT)
                .map(Some)
                .map_err(serde::de::Error::custom),
            None => Ok(None),
        }
    }
}

/// Account block nested inside every user payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub username: String,
    pub avatar: Option<MediaAsset>,
}

/// Full user record. `token`, `hash` and `salt` are write-only: they
/// never appear in a serialized response.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub account: Account,
    #[serde(with = "date_format")]
    pub birth_date: Option<Date>,
    pub team: Option<String>,
    pub newsletter: Option<bool>,
    pub bio: Option<String>,
    #[serde(skip_serializing)]
    pub token: String,
    #[serde(skip_serializing)]
    pub hash: String,
    #[serde(skip_serializing)]
    pub salt: String,
    pub followers: Vec<Uuid>,
    pub following: Vec<Uuid>,
    pub likes: Vec<Uuid>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

/// Projection returned by signup and login: the one place the bearer
/// token is handed out.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthProfile {
    pub id: Uuid,
    pub token: String,
    pub account: Account,
    pub team: Option<String>,
    #[serde(with = "date_format")]
    pub birth_date: Option<Date>,
}

impl From<User> for AuthProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            token: user.token,
            account: user.account,
            team: user.team,
            birth_date: user.birth_date,
        }
    }
}
