use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::models::BackendClient;
use crate::domain::models::BackendError;
use crate::domain::models::DocumentId;
use crate::domain::models::DocumentInsights;
use crate::domain::models::UploadReceipt;

pub const DOCUMENT_ID: &str = "0123456789abcdef0123456789abcdef.pdf";
pub const OTHER_DOCUMENT_ID: &str = "fedcba9876543210fedcba9876543210.mp4";

/// Backend double. Answers echo the question unless overridden, and every call
/// is recorded in order.
#[derive(Clone)]
pub struct MockBackendClient {
    pub calls: Arc<Mutex<Vec<String>>>,
    answers: HashMap<String, Result<String, BackendError>>,
    delays: HashMap<String, Duration>,
    summary: Result<String, BackendError>,
    insights: Result<Option<DocumentInsights>, BackendError>,
}

impl Default for MockBackendClient {
    fn default() -> MockBackendClient {
        return MockBackendClient {
            calls: Arc::new(Mutex::new(vec![])),
            answers: HashMap::new(),
            delays: HashMap::new(),
            summary: Ok("A short summary.".to_string()),
            insights: Ok(None),
        };
    }
}

impl MockBackendClient {
    pub fn with_answer(mut self, question: &str, answer: Result<String, BackendError>) -> Self {
        self.answers.insert(question.to_string(), answer);
        return self;
    }

    pub fn with_delay(mut self, question: &str, delay: Duration) -> Self {
        self.delays.insert(question.to_string(), delay);
        return self;
    }

    pub fn with_summary(mut self, summary: Result<String, BackendError>) -> Self {
        self.summary = summary;
        return self;
    }

    pub fn with_insights(mut self, insights: Result<Option<DocumentInsights>, BackendError>) -> Self {
        self.insights = insights;
        return self;
    }

    pub fn calls(&self) -> Vec<String> {
        return self.calls.lock().unwrap().clone();
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl BackendClient for MockBackendClient {
    async fn ask(&self, document_id: &DocumentId, question: &str) -> Result<String, BackendError> {
        self.record(format!("ask {document_id} {question}"));
        if let Some(delay) = self.delays.get(question) {
            tokio::time::sleep(*delay).await;
        }

        return self
            .answers
            .get(question)
            .cloned()
            .unwrap_or_else(|| return Ok(format!("You asked: {question}")));
    }

    async fn summarize(&self, document_id: &DocumentId) -> Result<String, BackendError> {
        self.record(format!("summarize {document_id}"));
        return self.summary.clone();
    }

    async fn fetch_insights(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<DocumentInsights>, BackendError> {
        self.record(format!("insights {document_id}"));
        return self.insights.clone();
    }

    async fn upload(&self, path: &Path) -> Result<UploadReceipt, BackendError> {
        self.record(format!("upload {}", path.display()));
        return Ok(UploadReceipt {
            document_id: DOCUMENT_ID.to_string(),
            original_s3_key: None,
            compressed_s3_key: None,
        });
    }
}
