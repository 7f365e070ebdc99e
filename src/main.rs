mod config;
mod db;
mod error;
mod images;
mod render;
mod routes;
mod services;
mod state;
mod store;

use std::sync::Arc;

use crate::config::Config;
use crate::images::DiskImageStore;
use crate::store::{DocumentStore, MemoryStore, PgStore};

#[tokio::main]
async fn main() {
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    if let Err(e) = dotenv
        && !e.not_found()
    {
        tracing::warn!(error = %e, "failed to load .env");
    }

    let config = Config::from_env();
    let port = config.port;

    let store: Arc<dyn DocumentStore> = match config.database_url.as_deref() {
        Some(url) => {
            let pool = db::init_pool(url).await.expect("database init failed");
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using in-memory document store");
            Arc::new(MemoryStore::new())
        }
    };
    let images = DiskImageStore::open(config.upload_dir.clone())
        .await
        .expect("upload directory init failed");

    let state = state::AppState::new(config, store, Arc::new(images));
    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "canvas-editor listening");
    axum::serve(listener, app).await.expect("server failed");
}
