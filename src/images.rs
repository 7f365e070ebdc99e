//! Uploaded image storage behind the [`ImageStore`] trait.
//!
//! DESIGN
//! ======
//! Elements refer to images by reference string `/uploads/<name>`. Upload
//! names are sanitized and prefixed with a fresh UUID, so two uploads never
//! collide and nothing user-supplied reaches a path unescaped. Resolution
//! accepts only a bare basename under `/uploads/`; anything that could walk
//! out of the upload directory is rejected as `Invalid`.

#[cfg(test)]
#[path = "images_test.rs"]
mod images_test;

#[cfg(test)]
use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
#[cfg(test)]
use tokio::sync::RwLock;
use uuid::Uuid;

/// URL prefix under which uploads are referenced and served.
pub const UPLOAD_PREFIX: &str = "/uploads/";

const MAX_NAME_LEN: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum ImageStoreError {
    #[error("image not found: {0}")]
    NotFound(String),
    #[error("invalid image reference: {0}")]
    Invalid(String),
    #[error("image store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl crate::error::ErrorCode for ImageStoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_IMAGE_NOT_FOUND",
            Self::Invalid(_) => "E_VALIDATION",
            Self::Io(_) => "E_STORAGE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Persist uploaded bytes and return their `/uploads/<name>` reference.
    async fn store_upload(&self, bytes: &[u8], filename: &str) -> Result<String, ImageStoreError>;

    /// Load the bytes behind a reference.
    async fn resolve(&self, reference: &str) -> Result<Vec<u8>, ImageStoreError>;
}

// =============================================================================
// NAMES
// =============================================================================

/// Reduce a client filename to a safe basename.
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let base = raw.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed = cleaned.trim_start_matches('.');
    if trimmed.is_empty() {
        return "image".to_owned();
    }
    trimmed.chars().take(MAX_NAME_LEN).collect()
}

/// The stored basename behind a reference.
///
/// # Errors
///
/// Returns [`ImageStoreError::Invalid`] unless the reference is exactly
/// `/uploads/<basename>` with no separators or leading dot.
pub fn reference_name(reference: &str) -> Result<&str, ImageStoreError> {
    let invalid = || ImageStoreError::Invalid(reference.to_owned());
    let name = reference.strip_prefix(UPLOAD_PREFIX).ok_or_else(invalid)?;
    if name.is_empty() || name.starts_with('.') || name.contains(['/', '\\', '\0']) {
        return Err(invalid());
    }
    Ok(name)
}

/// Accepted upload formats, by magic bytes.
#[must_use]
pub fn sniff_format(bytes: &[u8]) -> Option<image::ImageFormat> {
    match image::guess_format(bytes) {
        Ok(format @ (image::ImageFormat::Png | image::ImageFormat::Jpeg | image::ImageFormat::Gif)) => Some(format),
        _ => None,
    }
}

fn stored_name(filename: &str) -> String {
    format!("{}-{}", Uuid::new_v4().simple(), sanitize_filename(filename))
}

// =============================================================================
// DISK
// =============================================================================

/// Stores uploads as files in one directory.
pub struct DiskImageStore {
    dir: PathBuf,
}

impl DiskImageStore {
    /// Use `dir`, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`ImageStoreError::Io`] if the directory cannot be created.
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self, ImageStoreError> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        Ok(Self { dir })
    }
}

#[async_trait]
impl ImageStore for DiskImageStore {
    async fn store_upload(&self, bytes: &[u8], filename: &str) -> Result<String, ImageStoreError> {
        let name = stored_name(filename);
        tokio::fs::write(self.dir.join(&name), bytes).await?;
        tracing::info!(name = %name, bytes = bytes.len(), "image stored");
        Ok(format!("{UPLOAD_PREFIX}{name}"))
    }

    async fn resolve(&self, reference: &str) -> Result<Vec<u8>, ImageStoreError> {
        let name = reference_name(reference)?;
        match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(ImageStoreError::NotFound(reference.to_owned())),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// MEMORY
// =============================================================================

/// Keeps uploads in a map.
#[cfg(test)]
#[derive(Default)]
pub struct MemoryImageStore {
    files: RwLock<HashMap<String, Vec<u8>>>,
}

#[cfg(test)]
impl MemoryImageStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn store_upload(&self, bytes: &[u8], filename: &str) -> Result<String, ImageStoreError> {
        let name = stored_name(filename);
        self.files.write().await.insert(name.clone(), bytes.to_vec());
        Ok(format!("{UPLOAD_PREFIX}{name}"))
    }

    async fn resolve(&self, reference: &str) -> Result<Vec<u8>, ImageStoreError> {
        let name = reference_name(reference)?;
        self.files
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| ImageStoreError::NotFound(reference.to_owned()))
    }
}
