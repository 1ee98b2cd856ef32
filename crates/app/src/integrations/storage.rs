//! Object storage for profile and school images.

use async_trait::async_trait;
use mockall::automock;
use reqwest::{Client, header::CONTENT_TYPE};
use thiserror::Error;

use super::{SecretString, join_url};

/// An object to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Upload or delete failures from the object store.
#[derive(Debug, Error)]
pub enum ObjectStorageError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected response from object storage: {0}")]
    UnexpectedResponse(String),
}

/// Public object storage for profile and school images.
#[automock]
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Store an object and return its public URL.
    async fn upload(&self, object: StoredObject) -> Result<String, ObjectStorageError>;

    async fn delete(&self, key: &str) -> Result<(), ObjectStorageError>;
}

/// Object store endpoint and credentials.
#[derive(Debug, Clone)]
pub struct ObjectStorageConfig {
    /// Base URL objects are `PUT` to and `DELETE`d from.
    pub upload_url: String,

    pub api_key: SecretString,

    /// Base URL objects are publicly served from.
    pub public_base_url: String,
}

/// Object storage reachable over plain HTTP `PUT`/`DELETE`.
#[derive(Debug, Clone)]
pub struct HttpObjectStorage {
    config: ObjectStorageConfig,
    http: Client,
}

impl HttpObjectStorage {
    #[must_use]
    pub fn new(config: ObjectStorageConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }
}

#[async_trait]
impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, object: StoredObject) -> Result<String, ObjectStorageError> {
        let response = self
            .http
            .put(join_url(&self.config.upload_url, &object.key))
            .bearer_auth(self.config.api_key.expose())
            .header(CONTENT_TYPE, object.content_type)
            .body(object.bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ObjectStorageError::UnexpectedResponse(format!(
                "upload failed with status {status}: {text}"
            )));
        }

        Ok(join_url(&self.config.public_base_url, &object.key))
    }

    async fn delete(&self, key: &str) -> Result<(), ObjectStorageError> {
        let response = self
            .http
            .delete(join_url(&self.config.upload_url, key))
            .bearer_auth(self.config.api_key.expose())
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();

            return Err(ObjectStorageError::UnexpectedResponse(format!(
                "delete failed with status {status}: {text}"
            )));
        }

        Ok(())
    }
}
