use std::time::Duration;

use super::DocumentId;

/// The session an outbound request was issued under. Results carry it back so
/// the session can drop anything that arrives after it moved on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOrigin {
    pub document_id: DocumentId,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum Action {
    Ask(RequestOrigin, String),
    Summarize(RequestOrigin),
    FetchInsights(RequestOrigin),
    StartRecordingTimer(RequestOrigin, u64, Duration),
}
