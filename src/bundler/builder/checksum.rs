//! Artifact metadata and checksum calculation.

use crate::bundler::{Result, error::ErrorExt};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

/// A finished artifact ready to hand to a caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Artifact {
    /// Location on disk.
    pub path: PathBuf,
    /// Suggested download name.
    pub file_name: String,
    /// Size in bytes.
    pub size: u64,
    /// Hex-encoded SHA-256 of the content.
    pub sha256: String,
}

impl Artifact {
    /// Reads size and checksum of the file at `path`.
    pub async fn describe(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path)
            .await
            .fs_context("reading metadata of", path)?;
        let sha256 = calculate_sha256(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok(Self {
            path: path.to_path_buf(),
            file_name,
            size: metadata.len(),
            sha256,
        })
    }
}

/// Calculates the SHA-256 checksum of a file.
///
/// Reads the file in 8KB chunks to handle large files efficiently.
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash (64 characters)
/// * `Err` - If the file cannot be read
pub async fn calculate_sha256(file_path: &Path) -> Result<String> {
    let mut file = tokio::fs::File::open(file_path)
        .await
        .fs_context("opening file for hashing", file_path)?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; 8192];

    loop {
        let n = file
            .read(&mut buffer)
            .await
            .fs_context("reading file for hash calculation", file_path)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}
