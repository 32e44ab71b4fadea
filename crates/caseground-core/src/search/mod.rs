//! Retrieval of prior case records
//!
//! Provides:
//! - The [`VectorIndex`] seam over stored case chunks
//! - Per-domain retrieval with a fixed relevance threshold
//! - Assembly of retrieved blocks into one grounding context

mod context;
mod retriever;
mod vector_index;

pub use context::*;
pub use retriever::*;
pub use vector_index::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Hits must be strictly more similar than this to reach the generator
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Results requested per query when the case was split into several domains
pub const DOMAIN_RESULT_BUDGET: usize = 3;

/// Results requested when a single query covers the whole case
pub const SINGLE_QUERY_RESULT_BUDGET: usize = 5;

/// Whether a similarity score passes the relevance threshold
pub fn is_admissible(similarity: f64) -> bool {
    similarity > SIMILARITY_THRESHOLD
}

/// Per-query result budget for a decomposed case.
///
/// Several domain queries each get a small budget so the combined context
/// stays bounded; a lone query gets a larger one.
pub fn result_budget(query_count: usize) -> usize {
    if query_count > 1 {
        DOMAIN_RESULT_BUDGET
    } else {
        SINGLE_QUERY_RESULT_BUDGET
    }
}

/// A stored document returned by a nearest-neighbour query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub text: String,
    /// Cosine distance to the query vector
    pub distance: f64,
    pub metadata: HashMap<String, String>,
}

impl RetrievedDocument {
    pub fn similarity(&self) -> f64 {
        1.0 - self.distance
    }
}

/// One admissible hit, tagged with the domain query that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextBlock {
    pub domain_label: String,
    pub similarity: f64,
    pub text: String,
}
