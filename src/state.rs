//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! wires the document store into the canvas service and hands the export
//! service the same canvas service, so exports see the same document lock
//! as mutations.

use std::sync::Arc;

use crate::config::Config;
use crate::images::ImageStore;
use crate::services::canvas::CanvasService;
use crate::services::export::ExportService;
use crate::store::DocumentStore;

/// Clone is required by Axum; every field is Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub canvas: Arc<CanvasService>,
    pub export: Arc<ExportService>,
    pub images: Arc<dyn ImageStore>,
    pub config: Arc<Config>,
}

impl AppState {
    #[must_use]
    pub fn new(config: Config, store: Arc<dyn DocumentStore>, images: Arc<dyn ImageStore>) -> Self {
        let canvas = Arc::new(CanvasService::new(store));
        let export = Arc::new(ExportService::new(
            canvas.clone(),
            images.clone(),
            config.image_resolve_timeout,
            config.jpeg_quality,
        ));
        Self { canvas, export, images, config: Arc::new(config) }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use super::*;
    use crate::images::MemoryImageStore;
    use crate::store::MemoryStore;

    /// `AppState` over in-memory stores with default config.
    #[must_use]
    pub fn test_app_state() -> AppState {
        test_app_state_with_config(Config::default())
    }

    #[must_use]
    pub fn test_app_state_with_config(config: Config) -> AppState {
        AppState::new(config, Arc::new(MemoryStore::new()), Arc::new(MemoryImageStore::new()))
    }
}
