//! Core data types and error definitions for the retrieval pipeline.

use thiserror::Error;

use crate::drive::DriveError;
use crate::gemini::CompletionError;

/// A plain-text document fetched from the Drive folder.
///
/// Identity is the `name`; when a folder listing repeats a name, the later
/// file's text replaces the earlier entry in place.
#[derive(Debug, Clone)]
pub struct Document {
    /// File name as reported by the folder listing.
    pub name: String,
    /// Extracted plain-text content.
    pub text: String,
}

/// A fixed-size window of one document's text.
///
/// `start` and `end` are character offsets local to the owning document, with
/// `0 <= start < end <= chars(document)`.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Name of the document this window was cut from.
    pub file: String,
    /// Window text.
    pub text: String,
    /// Character offset of the first character in the window.
    pub start: usize,
    /// Character offset one past the last character in the window.
    pub end: usize,
}

/// A chunk paired with its relevance score for one query. Scores fall in `[0, 1]`.
#[derive(Debug, Clone, Copy)]
pub struct ScoredChunk<'a> {
    /// The scored window.
    pub chunk: &'a Chunk,
    /// Fraction of query tokens found in the window.
    pub score: f64,
}

/// Immutable view of one completed document load.
///
/// Reload builds a fresh snapshot off to the side and swaps it in whole, so a
/// concurrent query sees either the old corpus or the new one, never a mix.
#[derive(Debug)]
pub struct CorpusSnapshot {
    /// Folder the documents were fetched from.
    pub folder_id: String,
    /// Documents in listing order.
    pub documents: Vec<Document>,
    /// All windows, in document order then ascending offset.
    pub chunks: Vec<Chunk>,
}

/// Summary of a completed reload.
#[derive(Debug, Clone, Copy)]
pub struct ReloadOutcome {
    /// Number of documents with extractable text.
    pub documents_loaded: usize,
    /// Number of windows cut from those documents.
    pub chunks_built: usize,
}

/// Point-in-time service state reported by the status endpoint and the UI.
#[derive(Debug, Clone)]
pub struct StatusSnapshot {
    /// Whether at least one load has completed.
    pub initialized: bool,
    /// Documents in the current corpus (zero before the first load).
    pub document_count: usize,
    /// The configured folder identifier.
    pub folder_id: String,
}

/// Errors produced while cutting documents into windows.
#[derive(Debug, Error)]
pub enum ChunkingError {
    /// A zero-width window can never advance through the text.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap at or above the window size would stall or reverse the cursor.
    #[error("chunk overlap ({overlap}) must be smaller than chunk size ({chunk_size})")]
    OverlapTooLarge {
        /// Configured window size in characters.
        chunk_size: usize,
        /// Configured overlap in characters.
        overlap: usize,
    },
}

/// Errors emitted while answering a query.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The query was missing or contained only whitespace.
    #[error("Query must not be empty")]
    EmptyQuery,
    /// No load has completed yet.
    #[error("No documents loaded yet; POST /api/reload to fetch the folder")]
    NotReady,
    /// The folder was fetched but produced no readable documents.
    #[error("The folder contained no readable documents")]
    NoDocuments,
    /// The completion backend rejected or failed the request.
    #[error(transparent)]
    Completion(#[from] CompletionError),
}

/// Errors emitted while reloading the corpus.
#[derive(Debug, Error)]
pub enum ReloadError {
    /// Listing or fetching folder contents failed.
    #[error("Failed to fetch documents: {0}")]
    Drive(#[from] DriveError),
    /// The fetched documents could not be windowed.
    #[error("Failed to chunk documents: {0}")]
    Chunking(#[from] ChunkingError),
}

/// Errors emitted while constructing the service at startup.
#[derive(Debug, Error)]
pub enum InitError {
    /// The Drive client could not be constructed.
    #[error("Failed to initialize the Drive client: {0}")]
    Drive(#[from] DriveError),
    /// The Gemini client could not be constructed or found a usable model.
    #[error("Failed to initialize the Gemini client: {0}")]
    Completion(#[from] CompletionError),
}
