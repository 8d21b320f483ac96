//! HTTP surface for GemDrive.
//!
//! This module exposes a compact Axum router with the endpoints the embedded
//! page and API clients share:
//!
//! - `GET /` – Browser query page showing the connected folder and document count.
//! - `POST /api/query` – Retrieve relevant context and answer a question via Gemini.
//!   Accepts `{"query": "..."}` and returns `{"response": "..."}`.
//! - `POST /api/reload` – Re-fetch the Drive folder and rebuild the corpus. The body
//!   is optional; `{"folder_id": "..."}` targets a different folder for this reload only.
//! - `GET /api/status` – Report load state, document count, and the configured folder.
//!
//! Every failure is returned as `{"error": "<message>"}` with a status code that
//! reflects the cause, so the page's fetch handler and curl users read failures
//! the same way.

use crate::gemini::CompletionError;
use crate::retrieval::{QueryError, RagApi, ReloadError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router exposing the query API surface and the embedded page.
pub fn create_router<S>(service: Arc<S>) -> Router
where
    S: RagApi + 'static,
{
    Router::new()
        .route("/", get(index_page::<S>))
        .route("/api/query", post(answer_query::<S>))
        .route("/api/reload", post(reload_documents::<S>))
        .route("/api/status", get(get_status::<S>))
        .with_state(service)
}

/// Request body for the `POST /api/query` endpoint.
#[derive(Deserialize)]
struct QueryRequest {
    /// Question to answer from the loaded documents.
    #[serde(default)]
    query: String,
}

/// Success response for the `POST /api/query` endpoint.
#[derive(Serialize)]
struct QueryResponse {
    /// Answer text produced by the completion model.
    response: String,
}

/// Answer a question against the loaded corpus.
///
/// Retrieval selects the windows that share the most vocabulary with the
/// question (falling back to every document when nothing overlaps), and the
/// assembled context plus the question go to the completion backend.
async fn answer_query<S>(
    State(service): State<Arc<S>>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>, AppError>
where
    S: RagApi,
{
    let answer = service.answer_query(&request.query).await?;
    Ok(Json(QueryResponse { response: answer }))
}

/// Request body for the `POST /api/reload` endpoint.
#[derive(Default, Deserialize)]
struct ReloadRequest {
    /// Optional folder override applied to this reload only.
    #[serde(default)]
    folder_id: Option<String>,
}

/// Success response for the `POST /api/reload` endpoint.
#[derive(Serialize)]
struct ReloadResponse {
    /// Always `true`; failed reloads use the error shape instead.
    success: bool,
    /// Number of documents fetched from the folder.
    documents_loaded: usize,
}

/// Re-fetch the folder and swap in a fresh corpus.
async fn reload_documents<S>(
    State(service): State<Arc<S>>,
    body: Bytes,
) -> Result<Json<ReloadResponse>, AppError>
where
    S: RagApi,
{
    // The body is optional; anything unparsable counts as "no override".
    let request = serde_json::from_slice::<ReloadRequest>(&body).unwrap_or_default();
    let outcome = service.reload_documents(request.folder_id).await?;
    tracing::info!(
        documents = outcome.documents_loaded,
        chunks = outcome.chunks_built,
        "Reload request completed"
    );
    Ok(Json(ReloadResponse {
        success: true,
        documents_loaded: outcome.documents_loaded,
    }))
}

/// Response body for `GET /api/status`.
#[derive(Serialize)]
struct StatusResponse {
    /// Whether a document load has completed since startup.
    initialized: bool,
    /// Number of documents in the current corpus.
    document_count: usize,
    /// Folder the service is configured to read.
    folder_id: String,
}

/// Report whether documents are loaded, how many, and from where.
async fn get_status<S>(State(service): State<Arc<S>>) -> Json<StatusResponse>
where
    S: RagApi,
{
    let status = service.status().await;
    Json(StatusResponse {
        initialized: status.initialized,
        document_count: status.document_count,
        folder_id: status.folder_id,
    })
}

/// Serve the embedded query page with the current corpus details filled in.
async fn index_page<S>(State(service): State<Arc<S>>) -> Html<String>
where
    S: RagApi,
{
    let status = service.status().await;
    let page = INDEX_TEMPLATE
        .replace("{{folder_id}}", &status.folder_id)
        .replace("{{document_count}}", &status.document_count.to_string());
    Html(page)
}

enum AppError {
    Query(QueryError),
    Reload(ReloadError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            Self::Query(error) => (query_status(error), error.to_string()),
            Self::Reload(error) => (reload_status(error), error.to_string()),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

impl From<QueryError> for AppError {
    fn from(inner: QueryError) -> Self {
        Self::Query(inner)
    }
}

impl From<ReloadError> for AppError {
    fn from(inner: ReloadError) -> Self {
        Self::Reload(inner)
    }
}

fn query_status(error: &QueryError) -> StatusCode {
    match error {
        QueryError::EmptyQuery => StatusCode::BAD_REQUEST,
        QueryError::NotReady | QueryError::NoDocuments => StatusCode::SERVICE_UNAVAILABLE,
        QueryError::Completion(inner) => completion_status(inner),
    }
}

fn completion_status(error: &CompletionError) -> StatusCode {
    match error {
        CompletionError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
        CompletionError::PaidTierRequired => StatusCode::PAYMENT_REQUIRED,
        _ => StatusCode::BAD_GATEWAY,
    }
}

fn reload_status(error: &ReloadError) -> StatusCode {
    match error {
        ReloadError::Drive(_) => StatusCode::BAD_GATEWAY,
        ReloadError::Chunking(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

const INDEX_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
    <title>GemDrive</title>
    <style>
        body {
            font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif;
            max-width: 900px;
            margin: 0 auto;
            padding: 20px;
            background: #f5f5f5;
        }
        .container {
            background: white;
            border-radius: 8px;
            padding: 30px;
            box-shadow: 0 2px 10px rgba(0,0,0,0.1);
        }
        h1 {
            color: #1a73e8;
            margin-bottom: 10px;
        }
        .subtitle {
            color: #666;
            margin-bottom: 25px;
        }
        .info {
            background: #e3f2fd;
            padding: 15px;
            border-radius: 4px;
            margin-bottom: 20px;
            border-left: 4px solid #1a73e8;
        }
        textarea {
            width: 100%;
            min-height: 100px;
            padding: 12px;
            border: 2px solid #ddd;
            border-radius: 4px;
            font-size: 14px;
            font-family: inherit;
            resize: vertical;
            box-sizing: border-box;
        }
        textarea:focus {
            outline: none;
            border-color: #1a73e8;
        }
        button {
            background: #1a73e8;
            color: white;
            border: none;
            padding: 12px 24px;
            border-radius: 4px;
            font-size: 16px;
            cursor: pointer;
            margin-top: 10px;
        }
        button:disabled {
            background: #ccc;
            cursor: not-allowed;
        }
        .answer {
            margin-top: 20px;
            padding: 20px;
            background: #f9f9f9;
            border-radius: 4px;
            border-left: 4px solid #1a73e8;
            white-space: pre-wrap;
            line-height: 1.6;
        }
        .answer.pending {
            color: #666;
            font-style: italic;
        }
        .answer.error {
            color: #d32f2f;
            background: #ffebee;
            border-left-color: #d32f2f;
        }
    </style>
</head>
<body>
    <div class="container">
        <h1>GemDrive</h1>
        <p class="subtitle">Ask Gemini about the documents in your Google Drive folder</p>

        <div class="info">
            <strong>Connected folder:</strong> {{folder_id}}<br>
            <strong>Documents loaded:</strong> {{document_count}}
        </div>

        <form id="query-form">
            <label for="query"><strong>Your question:</strong></label>
            <textarea id="query" name="query" placeholder="Ask anything about your documents..."></textarea>
            <button type="submit">Ask Gemini</button>
        </form>

        <div id="answer" class="answer" style="display: none;"></div>
    </div>

    <script>
        const form = document.getElementById('query-form');
        const queryInput = document.getElementById('query');
        const answerBox = document.getElementById('answer');
        const button = form.querySelector('button');

        form.addEventListener('submit', async (event) => {
            event.preventDefault();
            const query = queryInput.value;
            if (!query.trim()) {
                return;
            }

            answerBox.style.display = 'block';
            answerBox.className = 'answer pending';
            answerBox.textContent = 'Asking Gemini...';
            button.disabled = true;

            try {
                const response = await fetch('/api/query', {
                    method: 'POST',
                    headers: { 'Content-Type': 'application/json' },
                    body: JSON.stringify({ query: query }),
                });
                const data = await response.json();
                if (data.error) {
                    answerBox.className = 'answer error';
                    answerBox.textContent = 'Error: ' + data.error;
                } else {
                    answerBox.className = 'answer';
                    answerBox.textContent = data.response;
                }
            } catch (error) {
                answerBox.className = 'answer error';
                answerBox.textContent = 'Error: ' + error.message;
            } finally {
                button.disabled = false;
            }
        });
    </script>
</body>
</html>
"##;
