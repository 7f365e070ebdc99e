//! Domain services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own document rules, locking, and export orchestration so
//! route handlers stay focused on request parsing and status mapping.

pub mod canvas;
pub mod export;
