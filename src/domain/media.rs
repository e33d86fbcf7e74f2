use serde::{Deserialize, Serialize};

/// Stored-asset descriptor returned by the media collaborator after an
/// upload. Persisted verbatim (jsonb) on the records that reference it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaAsset {
    pub key: String,
    pub url: String,
    pub format: String,
    pub width: u32,
    pub height: u32,
    pub bytes: i64,
}
