//! Postgres document store.
//!
//! The canvas singleton is one row in `canvases` (id pinned to 1) whose
//! `element_ids` array holds render order. Element records live in
//! `canvas_elements` as JSONB in their wire shape, so loose or partial
//! records load exactly as they were written.

#[cfg(test)]
#[path = "pg_test.rs"]
mod pg_test;

use std::collections::HashMap;

use async_trait::async_trait;
use canvas::doc::{Canvas, Element, ElementId};
use sqlx::PgPool;

use super::{DocumentStore, StoreError};

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn decode(id: ElementId, data: serde_json::Value) -> Result<Element, StoreError> {
    serde_json::from_value(data).map_err(|source| StoreError::Corrupt { id, source })
}

#[async_trait]
impl DocumentStore for PgStore {
    async fn get_canvas(&self) -> Result<Option<Canvas>, StoreError> {
        let row = sqlx::query_as::<_, (i32, i32, String, Vec<ElementId>)>(
            "SELECT width, height, background_color, element_ids FROM canvases WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(width, height, background_color, elements)| Canvas {
            width: u32::try_from(width).unwrap_or(0),
            height: u32::try_from(height).unwrap_or(0),
            background_color,
            elements,
        }))
    }

    async fn put_canvas(&self, canvas: &Canvas) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO canvases (id, width, height, background_color, element_ids, updated_at) \
             VALUES (1, $1, $2, $3, $4, now()) \
             ON CONFLICT (id) DO UPDATE SET \
                 width = EXCLUDED.width, \
                 height = EXCLUDED.height, \
                 background_color = EXCLUDED.background_color, \
                 element_ids = EXCLUDED.element_ids, \
                 updated_at = now()",
        )
        .bind(i32::try_from(canvas.width).unwrap_or(i32::MAX))
        .bind(i32::try_from(canvas.height).unwrap_or(i32::MAX))
        .bind(&canvas.background_color)
        .bind(&canvas.elements)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_element(&self, id: ElementId) -> Result<Option<Element>, StoreError> {
        let row = sqlx::query_as::<_, (serde_json::Value,)>("SELECT data FROM canvas_elements WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(|(data,)| decode(id, data)).transpose()
    }

    async fn get_elements(&self, ids: &[ElementId]) -> Result<Vec<Element>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, (ElementId, serde_json::Value)>(
            "SELECT id, data FROM canvas_elements WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_id: HashMap<ElementId, serde_json::Value> = rows.into_iter().collect();
        ids.iter()
            .filter_map(|id| by_id.remove(id).map(|data| decode(*id, data)))
            .collect()
    }

    async fn put_element(&self, element: &Element) -> Result<(), StoreError> {
        let data = serde_json::to_value(element)?;
        sqlx::query(
            "INSERT INTO canvas_elements (id, kind, data, updated_at) VALUES ($1, $2, $3, now()) \
             ON CONFLICT (id) DO UPDATE SET kind = EXCLUDED.kind, data = EXCLUDED.data, updated_at = now()",
        )
        .bind(element.id)
        .bind(element.kind().as_str())
        .bind(data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete_element(&self, id: ElementId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM canvas_elements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_all_elements(&self) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM canvas_elements").execute(&self.pool).await?;
        Ok(())
    }
}
