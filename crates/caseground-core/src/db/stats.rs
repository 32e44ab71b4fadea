//! Database statistics

use super::Database;
use crate::error::Result;

/// An embedding model with stored vectors
#[derive(Debug, Clone, serde::Serialize)]
pub struct ModelInfo {
    pub model: String,
    pub dimensions: usize,
}

/// Database stats
#[derive(Debug, Clone, serde::Serialize)]
pub struct DatabaseStats {
    pub document_count: usize,
    pub embedded_count: usize,
    pub models: Vec<ModelInfo>,
}

impl Database {
    /// Get database statistics
    pub fn get_stats(&self) -> Result<DatabaseStats> {
        let conn = self.conn()?;

        let document_count: i64 =
            conn.query_row("SELECT COUNT(*) FROM documents", [], |row| row.get(0))?;

        let embedded_count: i64 = conn
            .query_row("SELECT COUNT(*) FROM embeddings", [], |row| row.get(0))
            .unwrap_or(0);

        let mut stmt =
            conn.prepare("SELECT model, dimensions FROM model_metadata ORDER BY model")?;
        let models = stmt
            .query_map([], |row| {
                Ok(ModelInfo {
                    model: row.get(0)?,
                    dimensions: row.get::<_, i64>(1)? as usize,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(DatabaseStats {
            document_count: document_count as usize,
            embedded_count: embedded_count as usize,
            models,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::IndexRecord;
    use std::collections::HashMap;

    #[test]
    fn test_stats_empty() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        let stats = db.get_stats().unwrap();
        assert_eq!(stats.document_count, 0);
        assert_eq!(stats.embedded_count, 0);
        assert!(stats.models.is_empty());
    }

    #[test]
    fn test_stats_counts() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        for id in ["a", "b"] {
            db.upsert_record(
                &IndexRecord {
                    id: id.to_string(),
                    text: "x".to_string(),
                    embedding: vec![1.0, 2.0, 3.0],
                    metadata: HashMap::new(),
                },
                "nomic-embed-text",
            )
            .unwrap();
        }
        db.register_model("nomic-embed-text", 3).unwrap();

        let stats = db.get_stats().unwrap();
        assert_eq!(stats.document_count, 2);
        assert_eq!(stats.embedded_count, 2);
        assert_eq!(stats.models[0].model, "nomic-embed-text");
        assert_eq!(stats.models[0].dimensions, 3);
    }
}
