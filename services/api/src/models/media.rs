//! Media models for the API service

use chrono::{DateTime, Utc};
use common::store::{Entity, SqlValue};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Stored object plus its public addresses
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Media {
    #[serde(skip)]
    pub id: i64,
    pub uuid: Uuid,
    pub url: String,
    pub thumbnail_url: String,
    #[serde(skip)]
    pub object_key: String,
    pub content_type: String,
    pub created_at: DateTime<Utc>,
}

impl Entity for Media {
    const TABLE: &'static str = "media";

    fn id(&self) -> i64 {
        self.id
    }

    fn columns(&self) -> Vec<(&'static str, SqlValue)> {
        vec![
            ("uuid", self.uuid.into()),
            ("url", self.url.clone().into()),
            ("thumbnail_url", self.thumbnail_url.clone().into()),
            ("object_key", self.object_key.clone().into()),
            ("content_type", self.content_type.clone().into()),
            ("created_at", self.created_at.into()),
        ]
    }

    fn assign_id(&mut self, id: i64) {
        self.id = id;
    }

    fn assign_default(&mut self, column: &str, now: DateTime<Utc>) {
        match column {
            "uuid" => self.uuid = Uuid::new_v4(),
            "created_at" => self.created_at = now,
            _ => {}
        }
    }
}

/// A file received in a multipart body
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl UploadedFile {
    /// Lower-cased extension of the original file name, with the dot
    pub fn extension(&self) -> String {
        self.file_name
            .rsplit_once('.')
            .map(|(_, ext)| format!(".{}", ext.to_ascii_lowercase()))
            .unwrap_or_default()
    }
}

/// Time-limited download address
#[derive(Debug, Serialize)]
pub struct SignedUrl {
    pub url: String,
    pub expires_in: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str) -> UploadedFile {
        UploadedFile {
            file_name: name.to_string(),
            content_type: "image/png".to_string(),
            bytes: vec![1, 2, 3],
        }
    }

    #[test]
    fn extension_is_normalized() {
        assert_eq!(file("Photo.PNG").extension(), ".png");
        assert_eq!(file("archive.tar.gz").extension(), ".gz");
        assert_eq!(file("README").extension(), "");
    }
}
