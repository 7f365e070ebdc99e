//! Export service: snapshot, resolve images, render.
//!
//! DESIGN
//! ======
//! An export reads one consistent snapshot under the document read lock and
//! releases it before any slow work. Image references are resolved
//! concurrently, each under its own timeout; a failed or slow image only
//! skips the elements that use it. Rendering is CPU-bound and runs on the
//! blocking pool.
//!
//! Skipped elements are logged, never surfaced to the client: the export
//! still succeeds with everything else drawn.

#[cfg(test)]
#[path = "export_test.rs"]
mod export_test;

use std::sync::Arc;
use std::time::Duration;

use canvas::scene::build_scene;
use tracing::{info, warn};

use super::canvas::{CanvasError, CanvasService};
use crate::error::ErrorCode;
use crate::images::ImageStore;
use crate::render::{self, ExportFormat, ImageSet, RenderError, Rendered};

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Canvas(#[from] CanvasError),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error("render task failed: {0}")]
    Join(String),
}

impl ErrorCode for ExportError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Canvas(e) => e.error_code(),
            Self::Render(e) => e.error_code(),
            Self::Join(_) => "E_RENDER_FATAL",
        }
    }

    fn retryable(&self) -> bool {
        match self {
            Self::Canvas(e) => e.retryable(),
            Self::Render(_) | Self::Join(_) => false,
        }
    }
}

pub struct ExportService {
    canvas: Arc<CanvasService>,
    images: Arc<dyn ImageStore>,
    resolve_timeout: Duration,
    jpeg_quality: u8,
}

impl ExportService {
    #[must_use]
    pub fn new(
        canvas: Arc<CanvasService>,
        images: Arc<dyn ImageStore>,
        resolve_timeout: Duration,
        jpeg_quality: u8,
    ) -> Self {
        Self { canvas, images, resolve_timeout, jpeg_quality }
    }

    /// Render the current document in `format`.
    ///
    /// # Errors
    ///
    /// `Canvas` if the snapshot cannot be read; `Render` for an unusable
    /// page or encoder failure; `Join` if the render task panics.
    pub async fn export(&self, format: ExportFormat) -> Result<Vec<u8>, ExportError> {
        let snapshot = self.canvas.snapshot().await?;
        let scene = build_scene(&snapshot);
        let images = self.resolve_images(&scene.image_sources()).await;

        let jpeg_quality = self.jpeg_quality;
        let rendered: Rendered = tokio::task::spawn_blocking(move || match format {
            ExportFormat::Pdf => render::pdf::render_pdf(&scene, &images),
            ExportFormat::Png | ExportFormat::Jpeg => render::raster::render_raster(&scene, &images, format, jpeg_quality),
        })
        .await
        .map_err(|e| ExportError::Join(e.to_string()))??;

        for (id, failure) in &rendered.skipped {
            warn!(element_id = %id, error = %failure, format = format.as_str(), "element skipped during export");
        }
        info!(
            format = format.as_str(),
            elements = snapshot.elements.len(),
            skipped = rendered.skipped.len(),
            bytes = rendered.bytes.len(),
            "canvas exported"
        );
        Ok(rendered.bytes)
    }

    async fn resolve_images(&self, sources: &[&str]) -> ImageSet {
        let timeout = self.resolve_timeout;
        let lookups = sources.iter().map(|src| async move {
            let bytes = match tokio::time::timeout(timeout, self.images.resolve(src)).await {
                Ok(Ok(bytes)) => Ok(bytes),
                Ok(Err(e)) => Err(e.to_string()),
                Err(_) => Err(format!("timed out after {}ms", timeout.as_millis())),
            };
            ((*src).to_owned(), bytes)
        });
        futures::future::join_all(lookups).await.into_iter().collect()
    }
}
