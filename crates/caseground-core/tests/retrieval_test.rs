//! Integration tests for decomposed retrieval
//!
//! Tests:
//! 1. Cross-query ordering under skewed latency
//! 2. Similarity threshold boundary
//! 3. All hits below threshold yields the no-context marker
//! 4. Decomposed retrieval over the SQLite index

use async_trait::async_trait;
use caseground_core::search::{result_budget, IndexRecord};
use caseground_core::{
    assemble, decompose, AssembledContext, CasegroundError, Database, DomainQuery, Embedder,
    Result, RetrievedDocument, Retriever, VectorIndex, NO_CONTEXT_MARKER,
};
use std::collections::HashMap;
use std::time::Duration;

/// Embeds by label; the first label answers slowest
struct SlowFirstEmbedder;

#[async_trait]
impl Embedder for SlowFirstEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let (delay, vector) = if text.starts_with("精細動作") {
            (80, vec![1.0, 0.0, 0.0])
        } else if text.starts_with("粗大動作") {
            (40, vec![0.0, 1.0, 0.0])
        } else {
            (0, vec![0.0, 0.0, 1.0])
        };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        "axes"
    }
}

/// Returns the same hits for every query
struct FixedIndex {
    distances: Vec<f64>,
}

#[async_trait]
impl VectorIndex for FixedIndex {
    async fn query(&self, _embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>> {
        Ok(self
            .distances
            .iter()
            .take(k)
            .map(|distance| RetrievedDocument {
                text: format!("distance {}", distance),
                distance: *distance,
                metadata: HashMap::new(),
            })
            .collect())
    }

    async fn upsert(&self, _record: IndexRecord, _model: &str) -> Result<()> {
        Err(CasegroundError::Index("read-only".into()))
    }
}

async fn seeded_db() -> Database {
    let db = Database::open_in_memory().unwrap();
    db.initialize().unwrap();

    let records = [
        ("fine_0", "握筆姿勢不成熟", vec![1.0, 0.05, 0.0]),
        ("fine_1", "剪刀操作困難", vec![0.9, 0.1, 0.1]),
        ("gross_0", "單腳站立不穩", vec![0.05, 1.0, 0.0]),
        ("sensory_0", "對聲音敏感", vec![0.0, 0.0, 1.0]),
    ];
    for (id, text, embedding) in records {
        db.upsert(
            IndexRecord {
                id: id.to_string(),
                text: text.to_string(),
                embedding,
                metadata: HashMap::from([("source_file".to_string(), id.to_string())]),
            },
            "axes",
        )
        .await
        .unwrap();
    }
    db
}

#[tokio::test]
async fn test_ordering_survives_skewed_latency() {
    let db = seeded_db().await;
    let queries = decompose("精細動作：握筆不穩\n粗大動作：無法單腳站立\n感覺處理：怕吵");
    assert_eq!(queries.len(), 3);

    let blocks = Retriever::new(&SlowFirstEmbedder, &db)
        .with_concurrency(3)
        .retrieve(&queries, result_budget(queries.len()))
        .await;

    let labels: Vec<&str> = blocks.iter().map(|b| b.domain_label.as_str()).collect();
    assert_eq!(labels, vec!["精細動作", "精細動作", "粗大動作", "感覺處理"]);
    assert_eq!(blocks[0].text, "握筆姿勢不成熟");
    assert_eq!(blocks[1].text, "剪刀操作困難");
    assert!(blocks[0].similarity >= blocks[1].similarity);
}

#[tokio::test]
async fn test_threshold_boundary() {
    let index = FixedIndex {
        distances: vec![0.3999999, 0.4, 0.41],
    };
    let blocks = Retriever::new(&SlowFirstEmbedder, &index)
        .retrieve(&[DomainQuery::new("感覺處理", "怕吵")], 5)
        .await;

    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].text, "distance 0.3999999");
}

#[tokio::test]
async fn test_all_below_threshold_yields_marker() {
    let index = FixedIndex {
        distances: vec![0.4, 0.5, 0.9],
    };
    let queries = decompose("孩子坐不住");
    let blocks = Retriever::new(&SlowFirstEmbedder, &index)
        .retrieve(&queries, result_budget(queries.len()))
        .await;
    assert!(blocks.is_empty());

    let context = assemble(&blocks);
    assert_eq!(context, AssembledContext::NoRelevantContext);
    assert_eq!(context.as_str(), NO_CONTEXT_MARKER);
}

#[tokio::test]
async fn test_sqlite_grounding_headers() {
    let db = seeded_db().await;
    let queries = decompose("粗大動作：無法單腳站立");
    let blocks = Retriever::new(&SlowFirstEmbedder, &db)
        .retrieve(&queries, 3)
        .await;
    let context = assemble(&blocks);

    assert!(context.is_grounded());
    assert!(context
        .as_str()
        .starts_with("【針對「粗大動作」的歷史參考資料 (1.00)】\n單腳站立不穩"));
}
