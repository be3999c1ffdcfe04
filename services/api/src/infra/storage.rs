use std::path::PathBuf;

use anyhow::Context as _;
use uuid::Uuid;

use crate::domain::image::DecodedImage;
use crate::domain::repository::ImageStorage;
use crate::error::ApiError;

/// Subdirectory of the media root holding recipe images.
const RECIPE_IMAGE_DIR: &str = "recipes/images";

/// Writes images under `root` and hands back `base_url`-prefixed references.
#[derive(Clone)]
pub struct LocalImageStorage {
    pub root: PathBuf,
    pub base_url: String,
}

impl LocalImageStorage {
    fn public_url(&self, file_name: &str) -> String {
        format!(
            "{}/{RECIPE_IMAGE_DIR}/{file_name}",
            self.base_url.trim_end_matches('/')
        )
    }

    /// File name behind a reference produced by [`Self::public_url`].
    fn file_name<'a>(&self, url: &'a str) -> Option<&'a str> {
        let prefix = self.public_url("");
        let name = url.strip_prefix(&prefix)?;
        let plain = !name.is_empty() && !name.contains(['/', '\\']) && !name.starts_with('.');
        plain.then_some(name)
    }
}

impl ImageStorage for LocalImageStorage {
    async fn store(&self, image: &DecodedImage) -> Result<String, ApiError> {
        let dir = self.root.join(RECIPE_IMAGE_DIR);
        tokio::fs::create_dir_all(&dir)
            .await
            .with_context(|| format!("create image dir {}", dir.display()))?;
        let file_name = format!("{}.{}", Uuid::new_v4(), image.extension);
        let path = dir.join(&file_name);
        tokio::fs::write(&path, &image.bytes)
            .await
            .with_context(|| format!("write image {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = image.bytes.len(), "image stored");
        Ok(self.public_url(&file_name))
    }

    async fn remove(&self, url: &str) -> Result<(), ApiError> {
        let Some(file_name) = self.file_name(url) else {
            return Ok(());
        };
        let path = self.root.join(RECIPE_IMAGE_DIR).join(file_name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(path = %path.display(), "image removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e)
                .context(format!("remove image {}", path.display()))
                .into()),
        }
    }
}
