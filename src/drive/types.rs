//! Shared types used by the Drive client.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors returned while interacting with the Drive API.
#[derive(Debug, Error)]
pub enum DriveError {
    /// Base URL failed to parse or normalize.
    #[error("Invalid Drive URL: {0}")]
    InvalidUrl(String),
    /// HTTP layer failed before receiving a response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    /// Drive responded with an unexpected status code.
    #[error("Unexpected Drive response ({status}): {body}")]
    UnexpectedStatus {
        /// HTTP status returned from Drive.
        status: StatusCode,
        /// Body payload associated with the failing response.
        body: String,
    },
}

/// One entry from a folder listing.
#[derive(Debug, Clone, Deserialize)]
pub struct DriveFile {
    /// Drive file identifier.
    pub id: String,
    /// Display name within the folder.
    pub name: String,
    /// Reported MIME type; decides how text is extracted.
    #[serde(rename = "mimeType", default)]
    pub mime_type: String,
}

#[derive(Deserialize)]
pub(crate) struct FileListResponse {
    #[serde(default)]
    pub(crate) files: Vec<DriveFile>,
    #[serde(rename = "nextPageToken", default)]
    pub(crate) next_page_token: Option<String>,
}
