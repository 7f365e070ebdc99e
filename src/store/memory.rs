//! In-memory document store.

#[cfg(test)]
#[path = "memory_test.rs"]
mod memory_test;

use std::collections::HashMap;

use async_trait::async_trait;
use canvas::doc::{Canvas, Element, ElementId};
use tokio::sync::RwLock;

use super::{DocumentStore, StoreError};

#[derive(Default)]
struct Inner {
    canvas: Option<Canvas>,
    elements: HashMap<ElementId, Element>,
}

/// Volatile store used by tests and when no database is configured.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of element records, referenced or not.
    #[cfg(test)]
    pub async fn element_count(&self) -> usize {
        self.inner.read().await.elements.len()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_canvas(&self) -> Result<Option<Canvas>, StoreError> {
        Ok(self.inner.read().await.canvas.clone())
    }

    async fn put_canvas(&self, canvas: &Canvas) -> Result<(), StoreError> {
        self.inner.write().await.canvas = Some(canvas.clone());
        Ok(())
    }

    async fn get_element(&self, id: ElementId) -> Result<Option<Element>, StoreError> {
        Ok(self.inner.read().await.elements.get(&id).cloned())
    }

    async fn get_elements(&self, ids: &[ElementId]) -> Result<Vec<Element>, StoreError> {
        let inner = self.inner.read().await;
        Ok(ids.iter().filter_map(|id| inner.elements.get(id).cloned()).collect())
    }

    async fn put_element(&self, element: &Element) -> Result<(), StoreError> {
        self.inner.write().await.elements.insert(element.id, element.clone());
        Ok(())
    }

    async fn delete_element(&self, id: ElementId) -> Result<bool, StoreError> {
        Ok(self.inner.write().await.elements.remove(&id).is_some())
    }

    async fn delete_all_elements(&self) -> Result<(), StoreError> {
        self.inner.write().await.elements.clear();
        Ok(())
    }
}
