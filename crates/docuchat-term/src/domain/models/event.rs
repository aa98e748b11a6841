use tui_textarea::Input;

use super::BackendError;
use super::DocumentInsights;
use super::RequestOrigin;

#[derive(Debug)]
pub enum Event {
    AnswerReceived(RequestOrigin, Result<String, BackendError>),
    SummaryReceived(RequestOrigin, Result<String, BackendError>),
    InsightsReceived(RequestOrigin, DocumentInsights),
    RecordingElapsed(RequestOrigin, u64),
    KeyboardCharInput(Input),
    KeyboardCTRLC,
    KeyboardCTRLP,
    KeyboardCTRLR,
    KeyboardCTRLS,
    KeyboardCTRLT,
    KeyboardEnter,
    KeyboardPaste(String),
    UITick,
    UIScrollDown,
    UIScrollUp,
    UIScrollPageDown,
    UIScrollPageUp,
}
