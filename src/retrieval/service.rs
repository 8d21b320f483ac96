//! Pipeline facade coordinating document loading, ranking, and completion.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::config::get_config;
use crate::drive::{DocumentSource, DriveClient};
use crate::gemini::{CompletionBackend, GeminiClient, build_prompt};
use crate::retrieval::chunking::chunk_documents;
use crate::retrieval::context::{assemble_all_documents, assemble_chunks, truncate_to_budget};
use crate::retrieval::ranking::rank_chunks;
use crate::retrieval::types::{
    CorpusSnapshot, InitError, QueryError, ReloadError, ReloadOutcome, StatusSnapshot,
};

/// Coordinates the full question-answering pipeline: folder loading, window
/// ranking, context assembly, and completion.
///
/// The service owns long-lived handles to the document source and completion
/// backend plus the current corpus snapshot. Construct it once near process
/// start and share it through an `Arc`.
pub struct RagService {
    source: Box<dyn DocumentSource + Send + Sync>,
    completion: Box<dyn CompletionBackend + Send + Sync>,
    corpus: RwLock<Option<Arc<CorpusSnapshot>>>,
}

/// Abstraction over the pipeline used by the HTTP surface.
#[async_trait]
pub trait RagApi: Send + Sync {
    /// Answer one question from the loaded corpus.
    async fn answer_query(&self, query: &str) -> Result<String, QueryError>;

    /// Re-fetch the folder (or an override) and swap in a fresh corpus.
    async fn reload_documents(
        &self,
        folder_override: Option<String>,
    ) -> Result<ReloadOutcome, ReloadError>;

    /// Report whether a corpus is loaded and how big it is.
    async fn status(&self) -> StatusSnapshot;
}

impl RagService {
    /// Build a new service, constructing both collaborator clients and
    /// negotiating a usable Gemini model.
    pub async fn new() -> Result<Self, InitError> {
        let source = DriveClient::new()?;
        let mut completion = GeminiClient::new()?;
        completion.resolve_model().await?;
        tracing::info!(model = %completion.model(), "Pipeline ready");

        Ok(Self {
            source: Box::new(source),
            completion: Box::new(completion),
            corpus: RwLock::new(None),
        })
    }

    /// Answer one question from the loaded corpus.
    ///
    /// Ranks every window against the query and forwards the best ones as
    /// context; when no window shares a token with the query, whole documents
    /// serve as context instead. Either way the context is cut to the
    /// configured budget right before the completion call.
    pub async fn answer_query(&self, query: &str) -> Result<String, QueryError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(QueryError::EmptyQuery);
        }

        let snapshot = {
            let corpus = self.corpus.read().await;
            corpus.as_ref().cloned().ok_or(QueryError::NotReady)?
        };
        if snapshot.documents.is_empty() {
            return Err(QueryError::NoDocuments);
        }

        let config = get_config();
        let ranked = rank_chunks(trimmed, &snapshot.chunks, config.top_k);
        let context = if ranked.is_empty() {
            tracing::debug!("No window shares a token with the query; using whole documents");
            assemble_all_documents(&snapshot.documents, config.max_context_length)
        } else {
            assemble_chunks(&ranked)
        };
        let context = truncate_to_budget(context, config.max_context_length);

        tracing::debug!(
            folder = %snapshot.folder_id,
            windows = ranked.len(),
            context_chars = context.chars().count(),
            "Submitting prompt"
        );
        let prompt = build_prompt(trimmed, &context);
        let answer = self.completion.generate(&prompt).await?;
        Ok(answer)
    }

    /// Re-fetch the folder and atomically swap in a fresh corpus snapshot.
    ///
    /// An override applies to this reload only; the configured folder stays
    /// the default for later ones. The new snapshot is built off to the side,
    /// so concurrent queries keep reading the old corpus until the swap.
    pub async fn reload_documents(
        &self,
        folder_override: Option<String>,
    ) -> Result<ReloadOutcome, ReloadError> {
        let config = get_config();
        let folder_id = folder_override
            .as_deref()
            .map(str::trim)
            .filter(|folder| !folder.is_empty())
            .unwrap_or(&config.drive_folder_id)
            .to_string();

        let documents = self.source.fetch_documents(&folder_id).await?;
        let chunks = chunk_documents(&documents, config.chunk_size, config.chunk_overlap)?;
        let outcome = ReloadOutcome {
            documents_loaded: documents.len(),
            chunks_built: chunks.len(),
        };
        tracing::info!(
            folder = %folder_id,
            documents = outcome.documents_loaded,
            chunks = outcome.chunks_built,
            "Corpus reloaded"
        );

        let snapshot = Arc::new(CorpusSnapshot {
            folder_id,
            documents,
            chunks,
        });
        *self.corpus.write().await = Some(snapshot);
        Ok(outcome)
    }

    /// Report current corpus state without touching collaborators.
    pub async fn status(&self) -> StatusSnapshot {
        let config = get_config();
        let corpus = self.corpus.read().await;
        match corpus.as_ref() {
            Some(snapshot) => StatusSnapshot {
                initialized: true,
                document_count: snapshot.documents.len(),
                folder_id: config.drive_folder_id.clone(),
            },
            None => StatusSnapshot {
                initialized: false,
                document_count: 0,
                folder_id: config.drive_folder_id.clone(),
            },
        }
    }
}

#[async_trait]
impl RagApi for RagService {
    async fn answer_query(&self, query: &str) -> Result<String, QueryError> {
        RagService::answer_query(self, query).await
    }

    async fn reload_documents(
        &self,
        folder_override: Option<String>,
    ) -> Result<ReloadOutcome, ReloadError> {
        RagService::reload_documents(self, folder_override).await
    }

    async fn status(&self) -> StatusSnapshot {
        RagService::status(self).await
    }
}
