use async_trait::async_trait;
use axum::body::Bytes;
use shared::limits::{MAX_IMAGE_BYTES, is_allowed_image_type};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

pub mod disk;
pub mod inline;

pub use disk::DiskImageHost;
pub use inline::InlineImageHost;

pub type ImageResult<T> = Result<T, ImageError>;

#[derive(Clone, Debug)]
pub enum ImageHostConfig {
    /// Images are embedded in the record as `data:` URLs.
    Inline,
    /// Images are written to `dir` and served under [`disk::URL_PREFIX`].
    Disk { dir: PathBuf },
}

#[derive(Error, Debug)]
pub enum ImageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unsupported image type: {0}")]
    UnsupportedType(String),
    #[error("Image {name} is {size} bytes, the limit is {limit}")]
    TooLarge {
        name: String,
        size: usize,
        limit: usize,
    },
}

/// A file received in a multipart request.
#[derive(Clone, Debug)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

impl ImageUpload {
    pub fn validate(&self) -> ImageResult<()> {
        if !is_allowed_image_type(&self.content_type) {
            return Err(ImageError::UnsupportedType(self.content_type.clone()));
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(ImageError::TooLarge {
                name: self.file_name.clone(),
                size: self.bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }
        Ok(())
    }
}

/// Turns uploads into references and forgets them again.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Stores the image and returns the reference to keep in the record.
    async fn upload(&self, upload: ImageUpload) -> ImageResult<String>;

    /// Removes a previously issued reference. Returns `false` when the
    /// reference was not issued by this host or is already gone.
    async fn delete(&self, reference: &str) -> ImageResult<bool>;
}

pub fn from_config(config: &ImageHostConfig) -> Arc<dyn ImageHost> {
    match config {
        ImageHostConfig::Inline => Arc::new(InlineImageHost),
        ImageHostConfig::Disk { dir } => Arc::new(DiskImageHost::new(dir.clone())),
    }
}

/// Uploads in order. If one fails, the ones already stored are removed
/// before the error is returned.
pub async fn upload_all(
    host: &dyn ImageHost,
    uploads: Vec<ImageUpload>,
) -> ImageResult<Vec<String>> {
    let mut references = Vec::with_capacity(uploads.len());
    for upload in uploads {
        match host.upload(upload).await {
            Ok(reference) => references.push(reference),
            Err(e) => {
                delete_best_effort(host, references).await;
                return Err(e);
            }
        }
    }
    Ok(references)
}

/// Deletes references, logging failures instead of returning them.
pub async fn delete_best_effort<I>(host: &dyn ImageHost, references: I)
where
    I: IntoIterator<Item = String>,
{
    for reference in references {
        match host.delete(&reference).await {
            Ok(true) => tracing::debug!("Deleted image {}", reference),
            Ok(false) => {}
            Err(e) => tracing::warn!("Failed to delete image {}: {:?}", reference, e),
        }
    }
}
