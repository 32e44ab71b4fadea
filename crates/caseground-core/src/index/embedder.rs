//! Embedding structured reports into the vector index

use super::chunker::{chunk_report, StructuredReport};
use crate::db::Database;
use crate::error::{CasegroundError, Result};
use crate::llm::Embedder;
use crate::search::{IndexRecord, VectorIndex};
use serde::Serialize;
use std::path::{Path, PathBuf};

const BATCH_SIZE: usize = 32;

/// Ingestion progress, reported after each file
#[derive(Debug, Clone)]
pub struct IngestProgress {
    pub total_files: usize,
    pub processed_files: usize,
    pub current_file: PathBuf,
    pub stored_chunks: usize,
}

/// Ingestion statistics
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestStats {
    pub total_files: usize,
    pub ingested_files: usize,
    pub failed_files: usize,
    pub stored_chunks: usize,
}

/// Read a structured report, defaulting its source name to the file name
pub fn load_report(path: &Path) -> Result<StructuredReport> {
    let content = std::fs::read_to_string(path)?;
    let mut report: StructuredReport = serde_json::from_str(&content)?;
    if report.source_file.is_none() {
        report.source_file = path
            .file_name()
            .map(|name| name.to_string_lossy().to_string());
    }
    Ok(report)
}

/// Chunk, embed and store each report file.
///
/// A file that cannot be read, parsed or embedded is logged and counted in
/// [`IngestStats::failed_files`]; the remaining files are still processed.
pub async fn ingest_reports(
    db: &Database,
    embedder: &dyn Embedder,
    files: &[PathBuf],
    progress: Option<Box<dyn Fn(IngestProgress) + Send + Sync>>,
) -> Result<IngestStats> {
    let mut stats = IngestStats {
        total_files: files.len(),
        ..Default::default()
    };

    for (idx, path) in files.iter().enumerate() {
        match ingest_file(db, embedder, path).await {
            Ok(stored) => {
                tracing::debug!("Stored {} chunks from {}", stored, path.display());
                stats.ingested_files += 1;
                stats.stored_chunks += stored;
            }
            Err(e) => {
                tracing::warn!("Failed to ingest {}: {}", path.display(), e);
                stats.failed_files += 1;
            }
        }

        if let Some(ref cb) = progress {
            cb(IngestProgress {
                total_files: stats.total_files,
                processed_files: idx + 1,
                current_file: path.clone(),
                stored_chunks: stats.stored_chunks,
            });
        }
    }

    tracing::info!(
        "Ingested {}/{} reports ({} chunks, {} failed)",
        stats.ingested_files,
        stats.total_files,
        stats.stored_chunks,
        stats.failed_files
    );

    Ok(stats)
}

async fn ingest_file(db: &Database, embedder: &dyn Embedder, path: &Path) -> Result<usize> {
    let report = load_report(path)?;
    let chunks = chunk_report(&report);
    let model = embedder.model_name().to_string();
    let mut stored = 0;

    for batch in chunks.chunks(BATCH_SIZE) {
        let texts: Vec<String> = batch.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;
        if embeddings.len() != batch.len() {
            return Err(CasegroundError::Index(format!(
                "expected {} embeddings, got {}",
                batch.len(),
                embeddings.len()
            )));
        }

        for (chunk, embedding) in batch.iter().zip(embeddings) {
            if embedding.is_empty() {
                return Err(CasegroundError::ProviderUnavailable(format!(
                    "empty embedding for {}",
                    chunk.id
                )));
            }
            if stored == 0 {
                db.register_model(&model, embedding.len())?;
            }

            db.upsert(
                IndexRecord {
                    id: chunk.id.clone(),
                    text: chunk.text.clone(),
                    embedding,
                    metadata: chunk.metadata.clone(),
                },
                &model,
            )
            .await?;
            stored += 1;
        }
    }

    Ok(stored)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fs;

    struct LengthEmbedder;

    #[async_trait]
    impl Embedder for LengthEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            Ok(vec![text.chars().count() as f32, 1.0])
        }

        fn model_name(&self) -> &str {
            "length"
        }
    }

    #[tokio::test]
    async fn test_ingest_counts_failures() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a_structured.json");
        let bad = dir.path().join("b_structured.json");
        fs::write(
            &good,
            r#"{"assessment_domains": [{"domain": "精細動作"}], "family_concerns": "坐不住"}"#,
        )
        .unwrap();
        fs::write(&bad, "not json").unwrap();

        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();

        let stats = ingest_reports(&db, &LengthEmbedder, &[good, bad], None)
            .await
            .unwrap();

        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.ingested_files, 1);
        assert_eq!(stats.failed_files, 1);
        assert_eq!(stats.stored_chunks, 2);

        let db_stats = db.get_stats().unwrap();
        assert_eq!(db_stats.document_count, 2);
        assert_eq!(db.get_model_dimensions("length").unwrap(), Some(2));
        assert_eq!(db.stored_models().unwrap(), vec!["length"]);
    }

    #[test]
    fn test_load_report_defaults_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c_structured.json");
        fs::write(&path, "{}").unwrap();
        let report = load_report(&path).unwrap();
        assert_eq!(report.source(), "c_structured.json");
    }
}
