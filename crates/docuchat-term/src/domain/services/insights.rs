#[cfg(test)]
#[path = "insights_test.rs"]
mod tests;

use crate::domain::models::BackendClient;
use crate::domain::models::DocumentId;
use crate::domain::models::DocumentInsights;

pub struct InsightsFetcher {}

impl InsightsFetcher {
    /// Resolves the insights for a document. Never fails: an empty payload
    /// becomes the "no data" placeholder and any error becomes a placeholder
    /// describing it.
    pub async fn fetch(client: &dyn BackendClient, document_id: &DocumentId) -> DocumentInsights {
        match client.fetch_insights(document_id).await {
            Ok(Some(insights)) if !insights.is_empty() => {
                tracing::debug!(
                    document_id = %document_id,
                    keywords = insights.keywords.len(),
                    tables = insights.tables.len(),
                    "insights loaded"
                );
                return insights;
            }
            Ok(_) => {
                tracing::info!(document_id = %document_id, "backend has no insights for document");
                return DocumentInsights::no_data();
            }
            Err(err) => {
                tracing::error!(document_id = %document_id, error = %err, "insights fetch failed");
                return DocumentInsights::failed(document_id, &err.to_string());
            }
        }
    }
}
