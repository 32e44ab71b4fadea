//! Vector storage operations
//!
//! Stores embeddings as BLOBs and computes cosine similarity in Rust.

use super::Database;
use crate::error::Result;
use crate::search::{IndexRecord, RetrievedDocument, VectorIndex};
use async_trait::async_trait;
use chrono::Utc;
use rusqlite::params;
use std::collections::HashMap;

impl Database {
    /// Insert or replace a chunk and its embedding
    pub fn upsert_record(&self, record: &IndexRecord, model: &str) -> Result<()> {
        let now = Utc::now().to_rfc3339();
        let metadata = serde_json::to_string(&record.metadata)?;
        let embedding_bytes = embedding_to_bytes(&record.embedding);

        let conn = self.conn()?;
        conn.execute("BEGIN IMMEDIATE", [])?;
        let result = (|| {
            conn.execute(
                "INSERT INTO documents (id, text, metadata, model, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET
                    text = excluded.text,
                    metadata = excluded.metadata,
                    model = excluded.model,
                    created_at = excluded.created_at",
                params![record.id, record.text, metadata, model, now],
            )?;
            conn.execute(
                "INSERT OR REPLACE INTO embeddings (id, embedding) VALUES (?1, ?2)",
                params![record.id, embedding_bytes],
            )?;
            Ok(())
        })();

        if result.is_ok() {
            conn.execute("COMMIT", [])?;
        } else {
            let _ = conn.execute("ROLLBACK", []);
        }
        result
    }

    /// Nearest stored chunks by cosine distance, closest first
    pub fn nearest(&self, query: &[f32], k: usize) -> Result<Vec<RetrievedDocument>> {
        if k == 0 {
            return Ok(Vec::new());
        }

        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT d.text, d.metadata, e.embedding
             FROM documents d
             JOIN embeddings e ON e.id = d.id",
        )?;

        let mut scored = stmt
            .query_map([], |row| {
                let text: String = row.get(0)?;
                let metadata: String = row.get(1)?;
                let embedding_bytes: Vec<u8> = row.get(2)?;
                let embedding = bytes_to_embedding(&embedding_bytes);
                Ok((text, metadata, cosine_similarity(query, &embedding)))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        scored.sort_by(|a, b| b.2.total_cmp(&a.2));
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(text, metadata, similarity)| -> Result<RetrievedDocument> {
                let metadata: HashMap<String, String> = serde_json::from_str(&metadata)?;
                Ok(RetrievedDocument {
                    text,
                    distance: 1.0 - similarity as f64,
                    metadata,
                })
            })
            .collect()
    }

    /// Register model with its dimensions
    pub fn register_model(&self, model: &str, dimensions: usize) -> Result<()> {
        let now = Utc::now().to_rfc3339();

        self.conn()?.execute(
            "INSERT INTO model_metadata (model, dimensions, created_at, last_used_at)
             VALUES (?1, ?2, ?3, ?3)
             ON CONFLICT(model) DO UPDATE SET last_used_at = ?3",
            params![model, dimensions as i64, now],
        )?;

        Ok(())
    }

    /// Get stored model dimensions
    pub fn get_model_dimensions(&self, model: &str) -> Result<Option<usize>> {
        let result = self.conn()?.query_row(
            "SELECT dimensions FROM model_metadata WHERE model = ?1",
            params![model],
            |row| row.get::<_, i64>(0),
        );

        match result {
            Ok(dims) => Ok(Some(dims as usize)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Names of the embedding models that produced stored vectors
    pub fn stored_models(&self) -> Result<Vec<String>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT model FROM documents ORDER BY model")?;
        let models = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(models)
    }
}

#[async_trait]
impl VectorIndex for Database {
    async fn query(&self, embedding: &[f32], k: usize) -> Result<Vec<RetrievedDocument>> {
        self.nearest(embedding, k)
    }

    async fn upsert(&self, record: IndexRecord, model: &str) -> Result<()> {
        self.upsert_record(&record, model)
    }

    async fn models(&self) -> Result<Vec<String>> {
        self.stored_models()
    }
}

/// Convert f32 embedding to bytes (little-endian)
pub fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert bytes to f32 embedding
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, embedding: Vec<f32>) -> IndexRecord {
        IndexRecord {
            id: id.to_string(),
            text: format!("text of {}", id),
            embedding,
            metadata: HashMap::from([("source_file".to_string(), id.to_string())]),
        }
    }

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db
    }

    #[test]
    fn test_cosine_similarity_identical() {
        let a = vec![1.0, 0.0, 0.0];
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_orthogonal() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![0.0, 1.0, 0.0];
        assert!(cosine_similarity(&a, &b).abs() < 0.0001);
    }

    #[test]
    fn test_cosine_similarity_dimension_mismatch() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0, 0.0, 0.0]), 0.0);
    }

    #[test]
    fn test_nearest_orders_by_distance() {
        let db = test_db();
        db.upsert_record(&record("far", vec![0.0, 1.0]), "m").unwrap();
        db.upsert_record(&record("near", vec![1.0, 0.1]), "m").unwrap();
        db.upsert_record(&record("exact", vec![1.0, 0.0]), "m").unwrap();

        let hits = db.nearest(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].text, "text of exact");
        assert!(hits[0].distance.abs() < 1e-6);
        assert_eq!(hits[1].text, "text of near");
        assert_eq!(hits[1].metadata["source_file"], "near");
    }

    #[test]
    fn test_upsert_replaces() {
        let db = test_db();
        db.upsert_record(&record("a", vec![0.0, 1.0]), "m").unwrap();
        db.upsert_record(&record("a", vec![1.0, 0.0]), "m").unwrap();

        let hits = db.nearest(&[1.0, 0.0], 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert!(hits[0].similarity() > 0.99);
    }

    #[test]
    fn test_register_model() {
        let db = test_db();
        assert_eq!(db.get_model_dimensions("nomic-embed-text").unwrap(), None);
        db.register_model("nomic-embed-text", 768).unwrap();
        db.register_model("nomic-embed-text", 768).unwrap();
        assert_eq!(
            db.get_model_dimensions("nomic-embed-text").unwrap(),
            Some(768)
        );
    }

    #[tokio::test]
    async fn test_vector_index_trait() {
        let db = test_db();
        let index: &dyn VectorIndex = &db;
        index.upsert(record("a", vec![1.0, 0.0]), "m").await.unwrap();
        let hits = index.query(&[1.0, 0.0], 3).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(db.stored_models().unwrap(), vec!["m"]);
    }
}
