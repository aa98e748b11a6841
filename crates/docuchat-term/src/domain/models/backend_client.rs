use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use super::BackendError;
use super::DocumentId;
use super::DocumentInsights;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UploadReceipt {
    pub document_id: String,
    #[serde(default)]
    pub original_s3_key: Option<String>,
    #[serde(default)]
    pub compressed_s3_key: Option<String>,
}

/// Contract of the document backend: question answering, summarization,
/// insights and upload.
#[async_trait]
pub trait BackendClient: Send + Sync {
    async fn ask(&self, document_id: &DocumentId, question: &str) -> Result<String, BackendError>;
    async fn summarize(&self, document_id: &DocumentId) -> Result<String, BackendError>;
    /// `Ok(None)` means the backend answered with an empty payload.
    async fn fetch_insights(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<DocumentInsights>, BackendError>;
    async fn upload(&self, path: &Path) -> Result<UploadReceipt, BackendError>;
}

pub type BackendClientBox = Box<dyn BackendClient>;
