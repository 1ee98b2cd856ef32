//! Storage Config

use clap::Args;

/// Profile image storage settings.
#[derive(Debug, Args)]
pub struct StorageConfig {
    /// Base URL objects are uploaded to
    #[arg(long, env = "STORAGE_UPLOAD_URL")]
    pub storage_upload_url: String,

    /// Object storage API key
    #[arg(long, env = "STORAGE_API_KEY", hide_env_values = true)]
    pub storage_api_key: String,

    /// Base URL objects are served from; defaults to the upload URL
    #[arg(long, env = "STORAGE_PUBLIC_BASE_URL", default_value = "")]
    pub storage_public_base_url: String,
}

impl StorageConfig {
    #[must_use]
    pub fn public_base_url(&self) -> &str {
        if self.storage_public_base_url.is_empty() {
            &self.storage_upload_url
        } else {
            &self.storage_public_base_url
        }
    }
}
