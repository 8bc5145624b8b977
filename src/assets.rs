//! Stored assets referenced by job submissions.
//!
//! Uploaded and restored files land in the settings' upload directory under
//! fresh uuid names. The returned path is what a submission passes back as
//! `icon_path` or `keystore_path`.

use crate::{
    bundler::{Settings, error::ErrorExt},
    error::{Result, SwabError},
    project::{ICON_EXTENSIONS, IconAsset},
};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Writes assets into the upload directory.
#[derive(Clone, Debug)]
pub struct AssetStore {
    dir: PathBuf,
    max_bytes: u64,
}

impl AssetStore {
    pub fn new(settings: &Settings) -> Self {
        Self::with_limit(settings.upload_dir(), settings.max_upload_bytes())
    }

    pub fn with_limit(dir: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            dir: dir.into(),
            max_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Stores an app icon.
    ///
    /// The original file name must end in `.png`, `.jpg` or `.jpeg`, and the
    /// content must actually be a PNG or JPEG image.
    pub async fn store_icon(&self, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        let extension = extension_of(original_name)
            .filter(|ext| ICON_EXTENSIONS.contains(&ext.as_str()))
            .ok_or_else(|| SwabError::InvalidUpload("Invalid file type. Use PNG or JPG".into()))?;
        self.check_size(bytes)?;

        match image::guess_format(bytes) {
            Ok(ImageFormat::Png | ImageFormat::Jpeg) => {}
            _ => {
                return Err(SwabError::InvalidUpload(format!(
                    "{original_name} is not a PNG or JPEG image"
                )));
            }
        }

        self.write(&extension, bytes).await
    }

    /// Stores a signing keystore. Any file type is accepted.
    pub async fn store_keystore(&self, original_name: &str, bytes: &[u8]) -> Result<PathBuf> {
        if bytes.is_empty() {
            return Err(SwabError::InvalidUpload("No file selected".into()));
        }
        self.check_size(bytes)?;
        let extension = extension_of(original_name).unwrap_or_else(|| "jks".to_string());
        self.write(&extension, bytes).await
    }

    /// Stores an icon restored from a project file.
    pub(crate) async fn restore_icon(&self, icon: &IconAsset) -> Result<PathBuf> {
        self.write(&icon.extension, &icon.bytes).await
    }

    /// Stores a keystore restored from a project file.
    pub(crate) async fn restore_keystore(&self, bytes: &[u8]) -> Result<PathBuf> {
        self.write("jks", bytes).await
    }

    fn check_size(&self, bytes: &[u8]) -> Result<()> {
        if bytes.len() as u64 > self.max_bytes {
            return Err(SwabError::InvalidUpload(format!(
                "file exceeds the {} byte upload limit",
                self.max_bytes
            )));
        }
        Ok(())
    }

    async fn write(&self, extension: &str, bytes: &[u8]) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .fs_context("creating upload directory", &self.dir)?;
        let path = self.dir.join(format!("{}.{}", Uuid::new_v4(), extension));
        tokio::fs::write(&path, bytes)
            .await
            .fs_context("writing upload", &path)?;
        log::debug!("Stored {} bytes at {}", bytes.len(), path.display());
        Ok(path)
    }
}

fn extension_of(name: &str) -> Option<String> {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
}
