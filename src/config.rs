//! Server configuration parsed from environment variables.
//!
//! A `.env` file in the working directory is loaded by `main` before this
//! runs. Every knob has a typed default; a value that fails to parse falls
//! back to the default instead of aborting startup.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;
pub const DEFAULT_IMAGE_RESOLVE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_JPEG_QUALITY: u8 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub port: u16,
    /// Postgres connection string; the in-memory store is used when unset.
    pub database_url: Option<String>,
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub image_resolve_timeout: Duration,
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            database_url: None,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            image_resolve_timeout: Duration::from_millis(DEFAULT_IMAGE_RESOLVE_TIMEOUT_MS),
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Config {
    /// Build config from environment variables.
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `DATABASE_URL`: Postgres store when set and non-empty
    /// - `UPLOAD_DIR`: default `uploads`
    /// - `MAX_UPLOAD_BYTES`: default 5 MiB
    /// - `IMAGE_RESOLVE_TIMEOUT_MS`: default 5000
    /// - `JPEG_QUALITY`: 1-100, default 80
    #[must_use]
    pub fn from_env() -> Self {
        let database_url = std::env::var("DATABASE_URL").ok().filter(|v| !v.trim().is_empty());
        let upload_dir = std::env::var("UPLOAD_DIR")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .map_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR), PathBuf::from);

        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            database_url,
            upload_dir,
            max_upload_bytes: env_parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            image_resolve_timeout: Duration::from_millis(env_parse(
                "IMAGE_RESOLVE_TIMEOUT_MS",
                DEFAULT_IMAGE_RESOLVE_TIMEOUT_MS,
            )),
            jpeg_quality: env_parse("JPEG_QUALITY", DEFAULT_JPEG_QUALITY).clamp(1, 100),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
