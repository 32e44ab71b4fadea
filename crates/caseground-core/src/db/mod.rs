//! Database layer for caseground
//!
//! Provides SQLite-based storage with:
//! - Case chunks and their metadata
//! - Embedding BLOBs with cosine search computed in Rust
//! - Embedding model bookkeeping

mod schema;
mod stats;
pub mod vectors;

pub use schema::Database;
pub use stats::{DatabaseStats, ModelInfo};
use std::path::PathBuf;

impl Database {
    /// Get the default database path, honouring `CASEGROUND_DB`
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("CASEGROUND_DB") {
            return PathBuf::from(path);
        }
        dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CACHE_DIR_NAME)
            .join("index.sqlite")
    }
}
