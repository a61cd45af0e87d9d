//! Uploaded files and their download addresses

use chrono::Utc;
use common::config::StorageConfig;
use common::store::{DEFAULTED, Entity, Filter};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::fetch;
use crate::error::{ApiError, ApiResult};
use crate::models::media::{Media, SignedUrl, UploadedFile};
use crate::repositories::{Repo, Repositories};
use crate::storage::ObjectStorage;

#[derive(Clone)]
pub struct MediaService {
    repos: Repositories,
    storage: Arc<dyn ObjectStorage>,
    folder: String,
    presign_seconds: u64,
}

impl MediaService {
    pub fn new(repos: Repositories, storage: Arc<dyn ObjectStorage>, config: &StorageConfig) -> Self {
        Self {
            repos,
            storage,
            folder: config.folder.trim_matches('/').to_string(),
            presign_seconds: config.presign_seconds,
        }
    }

    /// Upload `file` under a fresh key and record it
    pub async fn store(&self, file: UploadedFile) -> ApiResult<Media> {
        if file.bytes.is_empty() {
            return Err(ApiError::bad_request("Uploaded file is empty"));
        }

        let key = format!("{}/{}{}", self.folder, Uuid::new_v4(), file.extension());
        let content_type = if file.content_type.is_empty() {
            "application/octet-stream".to_string()
        } else {
            file.content_type.clone()
        };

        self.storage.upload(&key, &content_type, file.bytes.clone()).await?;

        let url = self.storage.public_url(&key);
        let media = Media {
            id: 0,
            uuid: Uuid::nil(),
            thumbnail_url: url.clone(),
            url,
            object_key: key,
            content_type,
            created_at: Utc::now(),
        };

        let media = self.repos.media.create_with_omit(DEFAULTED, media).await?;
        info!("Stored {} as media {}", file.file_name, media.uuid);
        Ok(media)
    }

    /// Media rows linked through a join table to `owner_id`
    pub(crate) async fn linked<J, F>(
        &self,
        links: &Repo<J>,
        owner_column: &'static str,
        owner_id: i64,
        media_id: F,
    ) -> ApiResult<Vec<Media>>
    where
        J: Entity,
        F: Fn(&J) -> i64,
    {
        let rows = links.find(Filter::new().eq(owner_column, owner_id)).await?;

        let mut media = Vec::with_capacity(rows.len());
        for row in &rows {
            if let Some(item) = self
                .repos
                .media
                .first(Filter::new().eq("id", media_id(row)))
                .await?
            {
                media.push(item);
            }
        }
        Ok(media)
    }

    pub async fn signed_url(&self, uuid: Uuid) -> ApiResult<SignedUrl> {
        let media = fetch(&self.repos.media, uuid, "Media").await?;
        let url = self
            .storage
            .presigned_url(&media.object_key, Duration::from_secs(self.presign_seconds))
            .await?;

        Ok(SignedUrl {
            url,
            expires_in: self.presign_seconds,
        })
    }

    /// Raw bytes of a stored object
    pub async fn content(&self, uuid: Uuid) -> ApiResult<(String, Vec<u8>)> {
        let media = fetch(&self.repos.media, uuid, "Media").await?;
        let bytes = self.storage.download(&media.object_key).await?;
        Ok((media.content_type, bytes))
    }
}
