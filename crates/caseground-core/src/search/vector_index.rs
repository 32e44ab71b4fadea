//! Vector index trait for storing and querying case chunks

use super::RetrievedDocument;
use crate::error::Result;
use async_trait::async_trait;
use std::collections::HashMap;

/// A chunk ready to be written to the index
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub text: String,
    pub embedding: Vec<f32>,
    pub metadata: HashMap<String, String>,
}

/// Storage for embedded documents with nearest-neighbour search.
///
/// The retrieval pipeline only calls [`VectorIndex::query`]; `upsert` is
/// used by ingestion.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Return up to `k` documents nearest to `embedding`, ordered by
    /// ascending cosine distance.
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>>;

    /// Insert a record, replacing any record with the same id.
    async fn upsert(&self, record: IndexRecord, model: &str) -> Result<()>;

    /// Embedding models that produced the stored vectors, if known
    async fn models(&self) -> Result<Vec<String>> {
        Ok(Vec::new())
    }
}
