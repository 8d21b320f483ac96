//! Google Drive folder access.

use async_trait::async_trait;

pub mod client;
pub mod types;

pub use client::DriveClient;
pub use types::{DriveError, DriveFile};

/// Interface implemented by document stores the pipeline can load from.
#[async_trait]
pub trait DocumentSource {
    /// Fetch every readable document in the folder, in listing order.
    async fn fetch_documents(
        &self,
        folder_id: &str,
    ) -> Result<Vec<crate::retrieval::Document>, DriveError>;
}
