//! Relevance-filtered retrieval across domain queries

use super::{is_admissible, ContextBlock, VectorIndex};
use crate::error::{CasegroundError, Result};
use crate::llm::Embedder;
use crate::query::DomainQuery;
use futures::stream::{self, StreamExt};
use serde::Serialize;

const DEFAULT_CONCURRENCY: usize = 4;

/// Result of one retrieval pass
#[derive(Debug, Clone, Default, Serialize)]
pub struct RetrievalOutcome {
    /// Admissible blocks in query order, then rank order
    pub blocks: Vec<ContextBlock>,
    /// Labels of queries that could not be embedded or searched
    pub skipped: Vec<String>,
}

/// Runs one embedding call and one index query per domain query
pub struct Retriever<'a> {
    embedder: &'a dyn Embedder,
    index: &'a dyn VectorIndex,
    concurrency: usize,
}

impl<'a> Retriever<'a> {
    pub fn new(embedder: &'a dyn Embedder, index: &'a dyn VectorIndex) -> Self {
        Self {
            embedder,
            index,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Maximum number of sub-queries in flight at once
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Retrieve admissible context blocks for every query.
    ///
    /// Failed sub-queries are skipped. Never returns an error.
    pub async fn retrieve(&self, queries: &[DomainQuery], k_per_query: usize) -> Vec<ContextBlock> {
        self.retrieve_with_report(queries, k_per_query).await.blocks
    }

    /// Like [`Retriever::retrieve`], also reporting which queries were skipped
    pub async fn retrieve_with_report(
        &self,
        queries: &[DomainQuery],
        k_per_query: usize,
    ) -> RetrievalOutcome {
        tracing::debug!(
            "Retrieving for {} queries (k={}, {} concurrent)",
            queries.len(),
            k_per_query,
            self.concurrency
        );

        let mut results: Vec<_> = stream::iter(queries.iter().enumerate())
            .map(|(idx, query)| async move { (idx, self.search_one(query, k_per_query).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.sort_by_key(|(idx, _)| *idx);

        let mut outcome = RetrievalOutcome::default();
        for ((_, result), query) in results.into_iter().zip(queries) {
            match result {
                Ok(blocks) => outcome.blocks.extend(blocks),
                Err(e) => {
                    tracing::warn!("Skipping query '{}': {}", query.domain_label, e);
                    outcome.skipped.push(query.domain_label.clone());
                }
            }
        }
        outcome
    }

    async fn search_one(&self, query: &DomainQuery, k: usize) -> Result<Vec<ContextBlock>> {
        let embedding = self.embedder.embed(&query.search_text()).await?;
        if embedding.is_empty() {
            return Err(CasegroundError::ProviderUnavailable(format!(
                "empty embedding from {}",
                self.embedder.model_name()
            )));
        }

        let hits = self.index.query(&embedding, k).await?;
        let total = hits.len();

        let blocks: Vec<ContextBlock> = hits
            .into_iter()
            .filter(|doc| is_admissible(doc.similarity()))
            .map(|doc| ContextBlock {
                domain_label: query.domain_label.clone(),
                similarity: doc.similarity(),
                text: doc.text,
            })
            .collect();

        tracing::debug!(
            "Query '{}': {} of {} hits admissible",
            query.domain_label,
            blocks.len(),
            total
        );
        Ok(blocks)
    }
}
