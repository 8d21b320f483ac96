//! Retrieval pipeline: chunking, ranking, context assembly, and the facade.

pub mod chunking;
pub mod context;
pub mod ranking;
mod service;
pub mod types;

pub use service::{RagApi, RagService};
pub use types::{
    Chunk, ChunkingError, CorpusSnapshot, Document, InitError, QueryError, ReloadError,
    ReloadOutcome, ScoredChunk, StatusSnapshot,
};
