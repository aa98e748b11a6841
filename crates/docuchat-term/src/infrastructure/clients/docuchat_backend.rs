#[cfg(test)]
#[path = "docuchat_backend_test.rs"]
mod tests;

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use crate::domain::models::BackendClient;
use crate::domain::models::BackendError;
use crate::domain::models::DocumentId;
use crate::domain::models::DocumentInsights;
use crate::domain::models::UploadReceipt;

pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Serialize)]
struct QueryRequest<'a> {
    document_id: &'a str,
    question: &'a str,
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    document_id: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    answer: String,
    #[serde(default)]
    raw_answer: Option<String>,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
    #[serde(default)]
    raw_summary: Option<String>,
}

/// Prefers the markdown form of a reply; the plain field may be pre-rendered
/// HTML.
fn pick_reply(rendered: String, raw: Option<String>) -> String {
    match raw {
        Some(raw) if !raw.trim().is_empty() => return raw,
        _ => return rendered,
    }
}

/// Pulls `detail` out of an error payload when there is one.
fn error_detail(body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        if let Some(Value::String(detail)) = map.get("detail") {
            return detail.to_string();
        }
    }

    return body.trim().to_string();
}

fn is_empty_payload(value: &Value) -> bool {
    match value {
        Value::Null => return true,
        Value::Bool(flag) => return !flag,
        Value::Number(number) => return number.as_f64() == Some(0.0),
        Value::Object(map) => return map.is_empty(),
        Value::String(text) => return text.trim().is_empty(),
        _ => return false,
    }
}

fn upload_mime(path: &Path) -> Result<&'static str, BackendError> {
    let extension = path
        .extension()
        .and_then(|e| return e.to_str())
        .map(|e| return e.to_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => return Ok("application/pdf"),
        "mp4" => return Ok("video/mp4"),
        _ => {
            return Err(BackendError::InvalidUpload(format!(
                "{} is not a PDF or MP4 file",
                path.display()
            )))
        }
    }
}

pub struct DocuchatBackend {
    url: String,
    client: reqwest::Client,
}

impl DocuchatBackend {
    pub fn new(url: &str, timeout: Duration) -> Result<DocuchatBackend, BackendError> {
        if url.trim().is_empty() {
            return Err(BackendError::Transport("backend URL is not defined".to_string()));
        }

        let client = reqwest::Client::builder().timeout(timeout).build()?;

        return Ok(DocuchatBackend {
            url: url.trim_end_matches('/').to_string(),
            client,
        });
    }

    async fn read_json<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(status = status.as_u16(), body = %body, "backend request failed");
            return Err(BackendError::Status {
                status: status.as_u16(),
                body: error_detail(&body),
            });
        }

        return Ok(serde_json::from_str::<T>(&body)?);
    }
}

#[async_trait]
impl BackendClient for DocuchatBackend {
    async fn ask(&self, document_id: &DocumentId, question: &str) -> Result<String, BackendError> {
        let res = self
            .client
            .post(format!("{}/query", self.url))
            .json(&QueryRequest {
                document_id: document_id.as_str(),
                question,
            })
            .send()
            .await?;

        let payload = self.read_json::<QueryResponse>(res).await?;

        return Ok(pick_reply(payload.answer, payload.raw_answer));
    }

    async fn summarize(&self, document_id: &DocumentId) -> Result<String, BackendError> {
        let res = self
            .client
            .post(format!("{}/summarize", self.url))
            .json(&SummarizeRequest {
                document_id: document_id.as_str(),
            })
            .send()
            .await?;

        let payload = self.read_json::<SummarizeResponse>(res).await?;

        return Ok(pick_reply(payload.summary, payload.raw_summary));
    }

    async fn fetch_insights(
        &self,
        document_id: &DocumentId,
    ) -> Result<Option<DocumentInsights>, BackendError> {
        let res = self
            .client
            .get(format!("{}/document/{}", self.url, document_id))
            .send()
            .await?;

        let value = self.read_json::<Value>(res).await?;
        if is_empty_payload(&value) {
            return Ok(None);
        }

        return Ok(Some(serde_json::from_value::<DocumentInsights>(value)?));
    }

    async fn upload(&self, path: &Path) -> Result<UploadReceipt, BackendError> {
        let mime = upload_mime(path)?;
        let size = fs::metadata(path).await?.len();
        if size > MAX_UPLOAD_BYTES {
            return Err(BackendError::InvalidUpload(format!(
                "{} is {size} bytes, the upload limit is {MAX_UPLOAD_BYTES} bytes",
                path.display()
            )));
        }

        let file_name = path
            .file_name()
            .and_then(|e| return e.to_str())
            .unwrap_or("document")
            .to_string();
        let content = fs::read(path).await?;
        let part = multipart::Part::bytes(content)
            .file_name(file_name)
            .mime_str(mime)?;

        tracing::info!(path = %path.display(), size, "uploading document");
        let res = self
            .client
            .post(format!("{}/upload", self.url))
            .multipart(multipart::Form::new().part("file", part))
            .send()
            .await?;

        let receipt = self.read_json::<UploadReceipt>(res).await?;
        DocumentId::parse(&receipt.document_id)?;

        return Ok(receipt);
    }
}
