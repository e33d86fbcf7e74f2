use anyhow::{anyhow, Result};
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use image::GenericImageView;
use image::ImageFormat;
use uuid::Uuid;

use crate::domain::media::MediaAsset;
use crate::infra::storage::ObjectStorage;

/// Front door to the external media host: takes raw picture bytes, stores
/// them, and hands back the descriptor that gets persisted on the post.
#[derive(Clone)]
pub struct MediaService {
    storage: ObjectStorage,
}

impl MediaService {
    pub fn new(storage: ObjectStorage) -> Self {
        Self { storage }
    }

    pub async fn upload_picture(&self, owner_id: Uuid, data: Bytes) -> Result<MediaAsset> {
        let format = image::guess_format(&data)
            .map_err(|err| anyhow!("unrecognized picture payload: {}", err))?;
        let (ext, content_type) = match format {
            ImageFormat::Jpeg => ("jpg", "image/jpeg"),
            ImageFormat::Png => ("png", "image/png"),
            ImageFormat::WebP => ("webp", "image/webp"),
            other => return Err(anyhow!("unsupported picture format: {:?}", other)),
        };

        let decoded = image::load_from_memory_with_format(&data, format)
            .map_err(|err| anyhow!("failed to decode picture: {}", err))?;
        let (width, height) = decoded.dimensions();

        let key = format!("posts/{}/{}.{}", owner_id, Uuid::new_v4(), ext);
        self.storage
            .client()
            .put_object()
            .bucket(self.storage.bucket())
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(data.clone()))
            .send()
            .await
            .map_err(|err| anyhow!("picture upload failed: {}", err))?;

        let url = self.storage.public_url(&key)?;

        Ok(MediaAsset {
            key,
            url,
            format: ext.to_string(),
            width,
            height,
            bytes: data.len() as i64,
        })
    }
}
