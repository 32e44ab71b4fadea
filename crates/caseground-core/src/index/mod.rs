//! Corpus ingestion
//!
//! Report discovery, chunking, and embedding into the vector index.

mod chunker;
mod embedder;
mod scanner;

pub use chunker::*;
pub use embedder::*;
pub use scanner::*;
