//! Caseground Core Library
//!
//! Retrieval-grounded drafting of occupational-therapy assessment reports.
//!
//! # Features
//! - Decomposition of a case description into per-domain queries
//! - Concurrent per-domain retrieval with a fixed similarity threshold
//! - Grounding context assembly with an explicit no-match marker
//! - Streaming generation through a local Ollama model or the Anthropic API
//! - SQLite vector index and ingestion of structured reports

pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod index;
pub mod llm;
pub mod pipeline;
pub mod query;
pub mod search;

pub use config::{CloudServiceConfig, Config, LocalServiceConfig};
pub use db::{Database, DatabaseStats};
pub use error::{CasegroundError, Error, Result};
pub use generate::{Backend, Dispatcher, GenerationRequest};
pub use index::{chunk_report, find_report_files, ingest_reports, IngestStats, StructuredReport};
pub use llm::{AnthropicClient, ChatMessage, Embedder, OllamaClient};
pub use pipeline::{Grounding, ReportPipeline};
pub use query::{decompose, DomainQuery, SectionDecomposer, SectionTokenizer};
pub use search::{
    assemble, AssembledContext, ContextBlock, RetrievedDocument, Retriever, VectorIndex,
    NO_CONTEXT_MARKER, SIMILARITY_THRESHOLD,
};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "caseground";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "caseground";
