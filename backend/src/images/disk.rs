use crate::images::{ImageHost, ImageResult, ImageUpload};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Path the upload directory is mounted at.
pub const URL_PREFIX: &str = "/uploads";

/// Writes images into a directory that the server exposes under
/// [`URL_PREFIX`].
#[derive(Clone, Debug)]
pub struct DiskImageHost {
    dir: PathBuf,
}

impl DiskImageHost {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File name behind a reference issued by this host.
    fn file_name_of<'a>(&self, reference: &'a str) -> Option<&'a str> {
        let name = reference.strip_prefix(URL_PREFIX)?.strip_prefix('/')?;
        let is_plain = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        is_plain.then_some(name)
    }
}

fn extension_for(content_type: &str) -> &'static str {
    match content_type.trim().to_ascii_lowercase().as_str() {
        "image/png" => "png",
        "image/webp" => "webp",
        _ => "jpg",
    }
}

#[async_trait]
impl ImageHost for DiskImageHost {
    async fn upload(&self, upload: ImageUpload) -> ImageResult<String> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let name = format!(
            "{}.{}",
            Uuid::new_v4(),
            extension_for(&upload.content_type)
        );
        tokio::fs::write(self.dir.join(&name), &upload.bytes).await?;
        tracing::debug!(
            "Stored {} ({} bytes) as {}",
            upload.file_name,
            upload.bytes.len(),
            name
        );
        Ok(format!("{}/{}", URL_PREFIX, name))
    }

    async fn delete(&self, reference: &str) -> ImageResult<bool> {
        let Some(name) = self.file_name_of(reference) else {
            return Ok(false);
        };
        match tokio::fs::remove_file(self.dir.join(name)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
