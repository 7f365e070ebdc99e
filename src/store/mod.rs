//! Document persistence behind the [`DocumentStore`] trait.
//!
//! DESIGN
//! ======
//! The store is dumb storage: it keeps the canvas singleton and element
//! records and knows nothing about ordering rules or locking. Those belong
//! to `services::canvas`, which serializes every read-modify-write.
//!
//! `MemoryStore` backs tests and runs without `DATABASE_URL`; `PgStore`
//! keeps the same data in Postgres.

pub mod memory;
pub mod pg;

use async_trait::async_trait;
use canvas::doc::{Canvas, Element, ElementId};

pub use memory::MemoryStore;
pub use pg::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("stored element {id} is unreadable: {source}")]
    Corrupt {
        id: ElementId,
        #[source]
        source: serde_json::Error,
    },
    #[error("encode error: {0}")]
    Encode(#[from] serde_json::Error),
}

impl crate::error::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        "E_STORAGE"
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The canvas singleton, if it has been created.
    async fn get_canvas(&self) -> Result<Option<Canvas>, StoreError>;

    /// Create or replace the canvas singleton.
    async fn put_canvas(&self, canvas: &Canvas) -> Result<(), StoreError>;

    async fn get_element(&self, id: ElementId) -> Result<Option<Element>, StoreError>;

    /// Elements for `ids` in the same order. Unknown ids are left out.
    async fn get_elements(&self, ids: &[ElementId]) -> Result<Vec<Element>, StoreError>;

    /// Create or replace an element record.
    async fn put_element(&self, element: &Element) -> Result<(), StoreError>;

    /// Remove an element record. Returns whether it existed.
    async fn delete_element(&self, id: ElementId) -> Result<bool, StoreError>;

    async fn delete_all_elements(&self) -> Result<(), StoreError>;
}
