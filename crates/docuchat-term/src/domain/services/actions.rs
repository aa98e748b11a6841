#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::InsightsFetcher;
use crate::domain::models::Action;
use crate::domain::models::BackendClient;
use crate::domain::models::BackendClientBox;
use crate::domain::models::Event;

fn report(event_tx: &mpsc::UnboundedSender<Event>, event: Event) {
    if let Err(err) = event_tx.send(event) {
        tracing::warn!(error = %err, "event receiver dropped, result lost");
    }
}

/// Runs every action on its own task so a slow request never holds up the
/// ones behind it. Results come back as events in completion order.
pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        backend: BackendClientBox,
        event_tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        let backend: Arc<dyn BackendClient> = Arc::from(backend);

        while let Some(action) = rx.recv().await {
            let backend = backend.clone();
            let event_tx = event_tx.clone();

            match action {
                Action::Ask(origin, question) => {
                    tracing::debug!(document_id = %origin.document_id, "asking question");
                    tokio::spawn(async move {
                        let result = backend.ask(&origin.document_id, &question).await;
                        report(&event_tx, Event::AnswerReceived(origin, result));
                    });
                }
                Action::Summarize(origin) => {
                    tracing::debug!(document_id = %origin.document_id, "requesting summary");
                    tokio::spawn(async move {
                        let result = backend.summarize(&origin.document_id).await;
                        report(&event_tx, Event::SummaryReceived(origin, result));
                    });
                }
                Action::FetchInsights(origin) => {
                    tokio::spawn(async move {
                        let insights =
                            InsightsFetcher::fetch(backend.as_ref(), &origin.document_id).await;
                        report(&event_tx, Event::InsightsReceived(origin, insights));
                    });
                }
                Action::StartRecordingTimer(origin, cycle, window) => {
                    tokio::spawn(async move {
                        tokio::time::sleep(window).await;
                        report(&event_tx, Event::RecordingElapsed(origin, cycle));
                    });
                }
            }
        }

        tracing::debug!("action channel closed");

        return Ok(());
    }
}
