//! Profile image storage.
//!
//! Uploads are content-addressed: the object name is derived from the bytes,
//! so re-uploading the same image yields the same URL.

use async_trait::async_trait;
use std::path::PathBuf;
use thiserror::Error;

use crate::config::UploadsConfig;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("Only PNG, JPEG, GIF or WebP images are accepted")]
    UnsupportedType(String),

    #[error("Image must be at most {max_bytes} bytes")]
    TooLarge { max_bytes: usize },

    #[error("Image is empty")]
    Empty,

    #[error("Image storage failed: {0}")]
    Io(#[from] std::io::Error),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the image and returns the URL to save on the profile.
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<String, ImageStoreError>;
}

/// Raster formats accepted for profile images. Scriptable formats such as
/// SVG are refused because uploads are served from the API origin.
const ACCEPTED_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

/// Checks an upload against the accepted types and size limit and returns
/// the file extension to store it under.
pub fn check_upload(bytes: &[u8], content_type: &str, max_bytes: usize) -> Result<&'static str, ImageStoreError> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    if !ACCEPTED_TYPES.contains(&essence.as_str()) {
        return Err(ImageStoreError::UnsupportedType(essence));
    }
    if bytes.is_empty() {
        return Err(ImageStoreError::Empty);
    }
    if bytes.len() > max_bytes {
        return Err(ImageStoreError::TooLarge { max_bytes });
    }

    let extension = mime_guess::get_mime_extensions_str(&essence)
        .and_then(|exts| exts.first().copied())
        .unwrap_or("img");
    Ok(extension)
}

/// Writes images to a local directory served under `public_base_url`.
pub struct LocalImageStore {
    dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl LocalImageStore {
    pub fn new(config: &UploadsConfig) -> Self {
        Self {
            dir: PathBuf::from(&config.dir),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            max_bytes: config.max_bytes,
        }
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn store(&self, bytes: &[u8], content_type: &str) -> Result<String, ImageStoreError> {
        let extension = check_upload(bytes, content_type, self.max_bytes)?;
        let name = shared::crypto::content_object_name(bytes, extension);

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(&name);
        if tokio::fs::try_exists(&path).await? {
            tracing::debug!(object = %name, "Image already stored");
        } else {
            tokio::fs::write(&path, bytes).await?;
            tracing::info!(object = %name, size = bytes.len(), "Stored profile image");
        }

        Ok(format!("{}/{}", self.public_base_url, name))
    }
}
