//! End-to-end report pipeline
//!
//! decompose → retrieve → assemble → generate, surfaced as one lazy
//! sequence of cumulative status and report strings.

use crate::config::Config;
use crate::error::Result;
use crate::generate::{Backend, Dispatcher, GenerationRequest, SYSTEM_PROMPT};
use crate::llm::Embedder;
use crate::query::{DomainQuery, SectionDecomposer};
use crate::search::{
    assemble, result_budget, AssembledContext, RetrievalOutcome, Retriever, VectorIndex,
    SIMILARITY_THRESHOLD,
};
use async_stream::stream;
use futures::{Stream, StreamExt};
use serde::Serialize;
use std::sync::Arc;

/// Emitted instead of a report when the case text is blank
pub const EMPTY_INPUT_MESSAGE: &str = "錯誤：請輸入個案的主訴與觀察內容。";

const STATUS_ANALYSING: &str = "正在分析資料...";

const DEFAULT_CONCURRENCY: usize = 4;

/// Everything retrieval produced for one case
#[derive(Debug, Clone, Serialize)]
pub struct Grounding {
    pub queries: Vec<DomainQuery>,
    pub k_per_query: usize,
    pub retrieval: RetrievalOutcome,
    pub context: AssembledContext,
}

/// Runs one case through retrieval and generation
pub struct ReportPipeline {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    dispatcher: Dispatcher,
    decomposer: SectionDecomposer,
    system_instructions: String,
    concurrency: usize,
}

impl ReportPipeline {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            embedder,
            index,
            dispatcher,
            decomposer: SectionDecomposer::default(),
            system_instructions: SYSTEM_PROMPT.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    /// Build with the configured Ollama embedder and both backends
    pub fn from_config(config: &Config, index: Arc<dyn VectorIndex>) -> Result<Self> {
        let dispatcher = Dispatcher::from_config(config)?;
        let embedder: Arc<dyn Embedder> = Arc::new(dispatcher.local().clone());

        let mut pipeline = Self::new(embedder, index, dispatcher)
            .with_concurrency(config.retrieval.concurrency);
        if let Some(ref system) = config.prompts.system {
            pipeline = pipeline.with_system_instructions(system.clone());
        }
        Ok(pipeline)
    }

    pub fn with_decomposer(mut self, decomposer: SectionDecomposer) -> Self {
        self.decomposer = decomposer;
        self
    }

    pub fn with_system_instructions(mut self, instructions: impl Into<String>) -> Self {
        self.system_instructions = instructions.into();
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Decompose the case, retrieve per domain and assemble the context
    pub async fn ground(&self, case_text: &str) -> Grounding {
        self.ground_with_budget(case_text, None).await
    }

    /// Like [`ReportPipeline::ground`] with an explicit per-query result budget
    pub async fn ground_with_budget(
        &self,
        case_text: &str,
        k_per_query: Option<usize>,
    ) -> Grounding {
        let queries = self.decomposer.decompose(case_text);
        let k_per_query = k_per_query.unwrap_or_else(|| result_budget(queries.len()));

        self.warn_on_model_mismatch().await;

        let retrieval = Retriever::new(self.embedder.as_ref(), self.index.as_ref())
            .with_concurrency(self.concurrency)
            .retrieve_with_report(&queries, k_per_query)
            .await;
        let context = assemble(&retrieval.blocks);

        Grounding {
            queries,
            k_per_query,
            retrieval,
            context,
        }
    }

    async fn warn_on_model_mismatch(&self) {
        let model = self.embedder.model_name();
        match self.index.models().await {
            Ok(models) if !models.is_empty() && !models.iter().any(|m| m == model) => {
                tracing::warn!(
                    "Index was built with {:?} but queries use {}; similarity scores will be unreliable",
                    models,
                    model
                );
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Could not read index models: {}", e),
        }
    }

    /// Generate a report for `case_text`.
    ///
    /// Yields a growing status log first, then cumulative report text from
    /// the selected backend. A generation failure ends the sequence with a
    /// single error string.
    pub fn generate_report<'a>(
        &'a self,
        case_text: &'a str,
        backend: Backend,
    ) -> impl Stream<Item = String> + 'a {
        stream! {
            if case_text.trim().is_empty() {
                yield EMPTY_INPUT_MESSAGE.to_string();
                return;
            }

            let mut status = STATUS_ANALYSING.to_string();
            yield status.clone();

            let grounding = self.ground(case_text).await;

            status.push('\n');
            status.push_str(&decomposition_summary(&grounding.queries));
            yield status.clone();

            status.push('\n');
            status.push_str(&retrieval_summary(&grounding));
            yield status.clone();

            let request = GenerationRequest::new(case_text, grounding.context, backend)
                .with_system_instructions(self.system_instructions.clone());

            let mut report = self.dispatcher.generate(&request);
            while let Some(item) = report.next().await {
                yield item;
            }
        }
    }
}

fn decomposition_summary(queries: &[DomainQuery]) -> String {
    if queries.iter().all(DomainQuery::is_general) {
        return "未偵測到領域標籤，以整段描述進行檢索。".to_string();
    }
    let labels: Vec<&str> = queries.iter().map(|q| q.domain_label.as_str()).collect();
    format!("已拆解為 {} 個領域查詢：{}", queries.len(), labels.join("、"))
}

fn retrieval_summary(grounding: &Grounding) -> String {
    let mut summary = match &grounding.context {
        AssembledContext::Grounded { block_count, .. } => format!(
            "篩選完成，找到 {} 筆高相關案例 (>{})。生成報告中...",
            block_count, SIMILARITY_THRESHOLD
        ),
        AssembledContext::NoRelevantContext => format!(
            "⚠️ 未找到高相關案例 (>{})，僅依一般邏輯生成。",
            SIMILARITY_THRESHOLD
        ),
    };
    if !grounding.retrieval.skipped.is_empty() {
        summary.push_str(&format!(
            "\n⚠️ {} 個查詢無法檢索，已略過：{}",
            grounding.retrieval.skipped.len(),
            grounding.retrieval.skipped.join("、")
        ));
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;
    use crate::query::{Section, SectionTokenizer};
    use crate::search::{ContextBlock, IndexRecord, NO_CONTEXT_MARKER};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct UnitEmbedder;

    #[async_trait]
    impl Embedder for UnitEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>> {
            Ok(vec![1.0, 0.0])
        }

        fn model_name(&self) -> &str {
            "unit"
        }
    }

    /// Every non-blank line is its own section
    struct LineTokenizer;

    impl SectionTokenizer for LineTokenizer {
        fn sections(&self, text: &str) -> Vec<Section> {
            text.lines()
                .enumerate()
                .map(|(i, line)| Section {
                    label: Some(format!("第{}行", i + 1)),
                    content: line.to_string(),
                })
                .collect()
        }
    }

    fn grounding(context: AssembledContext, skipped: Vec<String>) -> Grounding {
        Grounding {
            queries: vec![DomainQuery::general("孩子坐不住")],
            k_per_query: 5,
            retrieval: RetrievalOutcome {
                blocks: Vec::<ContextBlock>::new(),
                skipped,
            },
            context,
        }
    }

    #[tokio::test]
    async fn test_ground_uses_configured_decomposer() {
        let db = Database::open_in_memory().unwrap();
        db.initialize().unwrap();
        db.upsert(
            IndexRecord {
                id: "case_domain_0".into(),
                text: "握筆姿勢不成熟".into(),
                embedding: vec![1.0, 0.0],
                metadata: HashMap::new(),
            },
            "unit",
        )
        .await
        .unwrap();

        let dispatcher = Dispatcher::from_config(&Config::default()).unwrap();
        let pipeline = ReportPipeline::new(Arc::new(UnitEmbedder), Arc::new(db), dispatcher)
            .with_decomposer(SectionDecomposer::new(Box::new(LineTokenizer)));

        let grounding = pipeline.ground("握筆不穩\n無法單腳站立").await;
        let labels: Vec<_> = grounding
            .queries
            .iter()
            .map(|q| q.domain_label.as_str())
            .collect();
        assert_eq!(labels, vec!["第1行", "第2行"]);
        assert_eq!(grounding.k_per_query, 3);
        assert_eq!(grounding.context.block_count(), 2);
        assert!(grounding.context.as_str().contains("【針對「第2行」的歷史參考資料 (1.00)】"));
    }

    #[test]
    fn test_retrieval_summary_grounded() {
        let summary = retrieval_summary(&grounding(
            AssembledContext::Grounded {
                text: "x".into(),
                block_count: 3,
            },
            vec![],
        ));
        assert_eq!(summary, "篩選完成，找到 3 筆高相關案例 (>0.6)。生成報告中...");
    }

    #[test]
    fn test_retrieval_summary_no_context() {
        let summary = retrieval_summary(&grounding(
            AssembledContext::NoRelevantContext,
            vec!["精細動作".into()],
        ));
        assert!(summary.starts_with("⚠️ 未找到高相關案例 (>0.6)，僅依一般邏輯生成。"));
        assert!(summary.contains("1 個查詢無法檢索，已略過：精細動作"));
        assert!(!summary.contains(NO_CONTEXT_MARKER));
    }

    #[test]
    fn test_decomposition_summary() {
        assert_eq!(
            decomposition_summary(&[
                DomainQuery::new("精細動作", "握筆不穩"),
                DomainQuery::new("粗大動作", "無法單腳站立"),
            ]),
            "已拆解為 2 個領域查詢：精細動作、粗大動作"
        );
        assert!(
            decomposition_summary(&[DomainQuery::general("孩子坐不住")]).starts_with("未偵測到")
        );
    }
}
