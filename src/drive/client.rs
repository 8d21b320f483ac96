//! HTTP client wrapper for the Drive REST API.
//!
//! Text extraction depends on the MIME type: Google Docs and Slides are
//! exported as `text/plain`, Google Sheets as `text/csv`, and plain text or
//! CSV files are downloaded directly. Everything else is skipped with a log
//! line. Folder listings follow `nextPageToken` pagination.

use async_trait::async_trait;
use reqwest::{Client, Method};

use crate::config::get_config;
use crate::drive::DocumentSource;
use crate::drive::types::{DriveError, DriveFile, FileListResponse};
use crate::retrieval::Document;

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/drive/v3";
const LIST_FIELDS: &str = "nextPageToken, files(id, name, mimeType)";
const LIST_PAGE_SIZE: &str = "100";

const MIME_GOOGLE_DOC: &str = "application/vnd.google-apps.document";
const MIME_GOOGLE_SLIDES: &str = "application/vnd.google-apps.presentation";
const MIME_GOOGLE_SHEET: &str = "application/vnd.google-apps.spreadsheet";
const MIME_TEXT_PLAIN: &str = "text/plain";
const MIME_TEXT_CSV: &str = "text/csv";

/// Lightweight HTTP client for Drive folder and file operations.
pub struct DriveClient {
    pub(crate) client: Client,
    pub(crate) base_url: String,
    pub(crate) access_token: String,
}

impl DriveClient {
    /// Construct a new client using configuration derived from the environment.
    pub fn new() -> Result<Self, DriveError> {
        let config = get_config();
        let client = Client::builder().user_agent("gemdrive/0.1").build()?;

        let raw_base = config.drive_api_url.as_deref().unwrap_or(DEFAULT_BASE_URL);
        let base_url = normalize_base_url(raw_base).map_err(DriveError::InvalidUrl)?;
        tracing::debug!(url = %base_url, folder = %config.drive_folder_id, "Initialized Drive HTTP client");

        Ok(Self {
            client,
            base_url,
            access_token: config.drive_access_token.clone(),
        })
    }

    /// List every non-trashed file in the folder, following pagination.
    pub async fn list_folder(&self, folder_id: &str) -> Result<Vec<DriveFile>, DriveError> {
        let query = format!("'{folder_id}' in parents and trashed=false");
        let mut files = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self.request(Method::GET, "files")?.query(&[
                ("q", query.as_str()),
                ("fields", LIST_FIELDS),
                ("pageSize", LIST_PAGE_SIZE),
            ]);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token.as_str())]);
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                let error = DriveError::UnexpectedStatus { status, body };
                tracing::error!(folder = folder_id, error = %error, "Failed to list folder");
                return Err(error);
            }

            let payload: FileListResponse = response.json().await?;
            files.extend(payload.files);

            match payload.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(files)
    }

    /// Extract one file's text, or `None` when the MIME type has no text
    /// representation.
    pub async fn fetch_file_text(&self, file: &DriveFile) -> Result<Option<String>, DriveError> {
        let response = match file.mime_type.as_str() {
            MIME_GOOGLE_DOC | MIME_GOOGLE_SLIDES => self.export(&file.id, MIME_TEXT_PLAIN).await?,
            MIME_GOOGLE_SHEET => self.export(&file.id, MIME_TEXT_CSV).await?,
            MIME_TEXT_PLAIN | MIME_TEXT_CSV => self.download(&file.id).await?,
            other => {
                tracing::debug!(
                    file = %file.name,
                    mime_type = other,
                    "Skipping file without a text representation"
                );
                return Ok(None);
            }
        };

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DriveError::UnexpectedStatus { status, body });
        }

        let bytes = response.bytes().await?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    async fn export(&self, file_id: &str, mime_type: &str) -> Result<reqwest::Response, DriveError> {
        let response = self
            .request(Method::GET, &format!("files/{file_id}/export"))?
            .query(&[("mimeType", mime_type)])
            .send()
            .await?;
        Ok(response)
    }

    async fn download(&self, file_id: &str) -> Result<reqwest::Response, DriveError> {
        let response = self
            .request(Method::GET, &format!("files/{file_id}"))?
            .query(&[("alt", "media")])
            .send()
            .await?;
        Ok(response)
    }

    fn request(&self, method: Method, path: &str) -> Result<reqwest::RequestBuilder, DriveError> {
        let url = format_endpoint(&self.base_url, path);
        Ok(self
            .client
            .request(method, url)
            .bearer_auth(&self.access_token))
    }
}

#[async_trait]
impl DocumentSource for DriveClient {
    /// Fetch the folder's readable documents in listing order.
    ///
    /// A failing listing aborts the load; a failing or unsupported file is
    /// logged and dropped. When a name repeats, the later file's text replaces
    /// the earlier entry in place.
    async fn fetch_documents(&self, folder_id: &str) -> Result<Vec<Document>, DriveError> {
        let files = self.list_folder(folder_id).await?;
        tracing::info!(folder = folder_id, files = files.len(), "Listed folder contents");

        let mut documents: Vec<Document> = Vec::new();
        for file in &files {
            match self.fetch_file_text(file).await {
                Ok(Some(text)) if !text.trim().is_empty() => {
                    if let Some(existing) = documents.iter_mut().find(|doc| doc.name == file.name) {
                        existing.text = text;
                    } else {
                        documents.push(Document {
                            name: file.name.clone(),
                            text,
                        });
                    }
                }
                Ok(Some(_)) => {
                    tracing::debug!(file = %file.name, "Skipping file with empty extracted text");
                }
                Ok(None) => {}
                Err(error) => {
                    tracing::warn!(file = %file.name, error = %error, "Failed to extract file; skipping");
                }
            }
        }

        Ok(documents)
    }
}

fn normalize_base_url(url: &str) -> Result<String, String> {
    let mut parsed = reqwest::Url::parse(url).map_err(|err| err.to_string())?;
    let path = parsed.path().trim_end_matches('/').to_string();
    parsed.set_path(&path);
    Ok(parsed.to_string())
}

fn format_endpoint(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    format!("{base}/{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::GET, MockServer};
    use serde_json::json;

    fn test_client(server: &MockServer) -> DriveClient {
        DriveClient {
            client: Client::builder()
                .user_agent("gemdrive-test")
                .build()
                .expect("client"),
            base_url: server.base_url(),
            access_token: "test-token".to_string(),
        }
    }

    fn file(id: &str, name: &str, mime_type: &str) -> DriveFile {
        DriveFile {
            id: id.to_string(),
            name: name.to_string(),
            mime_type: mime_type.to_string(),
        }
    }

    #[tokio::test]
    async fn list_folder_emits_expected_query() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files")
                    .header("authorization", "Bearer test-token")
                    .query_param("q", "'folder-123' in parents and trashed=false")
                    .query_param("fields", "nextPageToken, files(id, name, mimeType)")
                    .query_param("pageSize", "100");
                then.status(200).json_body(json!({
                    "files": [
                        {"id": "file-1", "name": "notes.txt", "mimeType": "text/plain"},
                        {"id": "file-2", "name": "report", "mimeType": "application/vnd.google-apps.document"}
                    ]
                }));
            })
            .await;

        let client = test_client(&server);
        let files = client.list_folder("folder-123").await.expect("listing");

        mock.assert();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].id, "file-1");
        assert_eq!(files[0].name, "notes.txt");
        assert_eq!(files[1].mime_type, "application/vnd.google-apps.document");
    }

    #[tokio::test]
    async fn list_folder_follows_next_page_token() {
        let server = MockServer::start_async().await;
        let first_page = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files")
                    .query_param("q", "'folder-123' in parents and trashed=false")
                    .matches(|req| {
                        req.query_params
                            .as_ref()
                            .is_none_or(|params| params.iter().all(|(key, _)| key != "pageToken"))
                    });
                then.status(200).json_body(json!({
                    "nextPageToken": "token-page-2",
                    "files": [
                        {"id": "file-1", "name": "alpha.txt", "mimeType": "text/plain"}
                    ]
                }));
            })
            .await;
        let second_page = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files")
                    .query_param("q", "'folder-123' in parents and trashed=false")
                    .query_param("pageToken", "token-page-2");
                then.status(200).json_body(json!({
                    "files": [
                        {"id": "file-2", "name": "beta.txt", "mimeType": "text/plain"}
                    ]
                }));
            })
            .await;

        let client = test_client(&server);
        let files = client.list_folder("folder-123").await.expect("listing");

        first_page.assert();
        second_page.assert();
        let names: Vec<&str> = files.iter().map(|file| file.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "beta.txt"]);
    }

    #[tokio::test]
    async fn google_doc_exports_as_plain_text() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files/file-9/export")
                    .query_param("mimeType", "text/plain");
                then.status(200).body("Exported body");
            })
            .await;

        let client = test_client(&server);
        let text = client
            .fetch_file_text(&file("file-9", "report", MIME_GOOGLE_DOC))
            .await
            .expect("fetch");

        mock.assert();
        assert_eq!(text.as_deref(), Some("Exported body"));
    }

    #[tokio::test]
    async fn plain_text_downloads_directly() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/files/file-1")
                    .query_param("alt", "media");
                then.status(200).body("raw text");
            })
            .await;

        let client = test_client(&server);
        let text = client
            .fetch_file_text(&file("file-1", "notes.txt", MIME_TEXT_PLAIN))
            .await
            .expect("fetch");

        mock.assert();
        assert_eq!(text.as_deref(), Some("raw text"));
    }

    #[tokio::test]
    async fn unsupported_mime_type_is_skipped_without_a_request() {
        let server = MockServer::start_async().await;
        let client = test_client(&server);

        let text = client
            .fetch_file_text(&file("file-7", "photo.png", "image/png"))
            .await
            .expect("fetch");

        assert!(text.is_none());
    }

    #[tokio::test]
    async fn fetch_documents_drops_failing_and_unsupported_files() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files");
                then.status(200).json_body(json!({
                    "files": [
                        {"id": "file-a", "name": "kept.txt", "mimeType": "text/plain"},
                        {"id": "file-b", "name": "broken", "mimeType": "application/vnd.google-apps.document"},
                        {"id": "file-c", "name": "photo.png", "mimeType": "image/png"}
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/file-a");
                then.status(200).body("alpha content");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/file-b/export");
                then.status(403).body("insufficient permissions");
            })
            .await;

        let client = test_client(&server);
        let documents = client.fetch_documents("folder-123").await.expect("fetch");

        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0].name, "kept.txt");
        assert_eq!(documents[0].text, "alpha content");
    }

    #[tokio::test]
    async fn duplicate_names_replace_earlier_content_in_place() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files");
                then.status(200).json_body(json!({
                    "files": [
                        {"id": "file-1", "name": "notes.txt", "mimeType": "text/plain"},
                        {"id": "file-2", "name": "menu.txt", "mimeType": "text/plain"},
                        {"id": "file-3", "name": "notes.txt", "mimeType": "text/plain"}
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/file-1");
                then.status(200).body("first version");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/file-2");
                then.status(200).body("lunch menu");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/file-3");
                then.status(200).body("second version");
            })
            .await;

        let client = test_client(&server);
        let documents = client.fetch_documents("folder-123").await.expect("fetch");

        let names: Vec<&str> = documents.iter().map(|doc| doc.name.as_str()).collect();
        assert_eq!(names, vec!["notes.txt", "menu.txt"]);
        assert_eq!(documents[0].text, "second version");
    }

    #[tokio::test]
    async fn empty_extraction_is_treated_as_absent() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files");
                then.status(200).json_body(json!({
                    "files": [
                        {"id": "file-1", "name": "blank.txt", "mimeType": "text/plain"}
                    ]
                }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files/file-1");
                then.status(200).body("   \n");
            })
            .await;

        let client = test_client(&server);
        let documents = client.fetch_documents("folder-123").await.expect("fetch");

        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn listing_failure_aborts_the_load() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/files");
                then.status(500).body("internal error");
            })
            .await;

        let client = test_client(&server);
        let error = client.fetch_documents("folder-123").await.unwrap_err();

        assert!(matches!(error, DriveError::UnexpectedStatus { .. }));
    }
}
