#[cfg(test)]
#[path = "session_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;
use tokio::sync::watch;

use super::sanitize;
use crate::domain::models::Action;
use crate::domain::models::DocumentId;
use crate::domain::models::DocumentInsights;
use crate::domain::models::Event;
use crate::domain::models::Message;
use crate::domain::models::RecordingState;
use crate::domain::models::RequestOrigin;
use crate::domain::models::SessionFlags;
use crate::domain::models::SlashCommand;
use crate::domain::models::ThemeMode;

pub const INVALID_DOCUMENT_MESSAGE: &str =
    "Invalid document ID. Upload a PDF or MP4 document and try again.";
pub const ASK_FAILED_MESSAGE: &str = "An error occurred, please try again.";
pub const SUMMARY_FAILED_MESSAGE: &str = "Failed to summarize, please try again.";
pub const SUMMARY_REQUEST_MESSAGE: &str = "Summarize this document.";
pub const EMPTY_ANSWER_MESSAGE: &str = "No relevant information found.";
pub const VOICE_TRANSCRIPT: &str = "Tell me what this document is about.";

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /summary (/s) - Asks the backend for a summary of the document.
- /record (/r) - Starts or stops a voice question.
- /theme - Switches between the dark and light theme.
- /panel (/p) - Shows or hides the insights panel.
- /quit /exit (/q) - Exit docuchat.
- /help (/h) - Provides this help menu.

HOTKEYS:
- Up arrow - Scroll up.
- Down arrow - Scroll down.
- CTRL+U - Page up.
- CTRL+D - Page down.
- CTRL+R - Start or stop a voice question.
- CTRL+S - Summarize the document.
- CTRL+T - Toggle theme.
- CTRL+P - Toggle the insights panel.
- CTRL+C - Exit.
        "#;

    return text.trim().to_string();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitOutcome {
    Ready,
    /// The document id was rejected; the caller should leave the session.
    Redirect,
}

pub struct SessionProps {
    pub action_tx: mpsc::UnboundedSender<Action>,
    pub dark_mode: bool,
    pub recording_window: Duration,
}

/// Owns the conversation for one document and every flag around it. All
/// outbound requests go through here and every result is routed back through
/// `handle_event`.
pub struct Session {
    action_tx: mpsc::UnboundedSender<Action>,
    recording_window: Duration,
    document_id: Option<DocumentId>,
    generation: u64,
    messages: Vec<Message>,
    input: String,
    insights: Option<DocumentInsights>,
    flags: SessionFlags,
    recording: RecordingState,
    recording_cycle: u64,
    pending_requests: usize,
    revision: u64,
    updates: watch::Sender<u64>,
}

impl Session {
    pub fn new(props: SessionProps) -> Session {
        let (updates, _) = watch::channel(0);

        return Session {
            action_tx: props.action_tx,
            recording_window: props.recording_window,
            document_id: None,
            generation: 0,
            messages: vec![],
            input: String::new(),
            insights: None,
            flags: SessionFlags::new(props.dark_mode),
            recording: RecordingState::Idle,
            recording_cycle: 0,
            pending_requests: 0,
            revision: 0,
            updates,
        };
    }

    pub fn initialize(&mut self, raw_document_id: &str) -> Result<InitOutcome> {
        self.reset();

        let document_id = match DocumentId::parse(raw_document_id) {
            Ok(document_id) => document_id,
            Err(err) => {
                tracing::warn!(error = %err, "refusing to start session");
                self.messages.push(Message::error(INVALID_DOCUMENT_MESSAGE));
                self.notify();
                return Ok(InitOutcome::Redirect);
            }
        };

        tracing::info!(document_id = %document_id, generation = self.generation, "session started");
        self.messages.push(Message::system(&format!(
            "I've loaded your document \"{document_id}\". What would you like to know about it?"
        )));
        self.document_id = Some(document_id);
        self.fetch_insights()?;
        self.notify();

        return Ok(InitOutcome::Ready);
    }

    /// Ends the session. Results still in flight are discarded when they land.
    pub fn teardown(&mut self) {
        if let Some(document_id) = &self.document_id {
            tracing::info!(document_id = %document_id, "session ended");
        }
        self.reset();
        self.notify();
    }

    fn reset(&mut self) {
        self.generation += 1;
        self.document_id = None;
        self.messages.clear();
        self.input.clear();
        self.insights = None;
        self.flags = SessionFlags {
            is_loading: false,
            is_recording: false,
            is_fetching_insights: false,
            ..self.flags
        };
        self.recording = RecordingState::Idle;
        self.pending_requests = 0;
    }

    fn origin(&self) -> Option<RequestOrigin> {
        return self.document_id.as_ref().map(|document_id| {
            return RequestOrigin {
                document_id: document_id.clone(),
                generation: self.generation,
            };
        });
    }

    fn is_current(&self, origin: &RequestOrigin) -> bool {
        return self.generation == origin.generation
            && self.document_id.as_ref() == Some(&origin.document_id);
    }

    pub fn fetch_insights(&mut self) -> Result<()> {
        let origin = match self.origin() {
            Some(origin) => origin,
            None => return Ok(()),
        };

        self.flags.is_fetching_insights = true;
        self.action_tx.send(Action::FetchInsights(origin))?;
        self.notify();

        return Ok(());
    }

    pub fn submit_question(&mut self, text: &str) -> Result<()> {
        let origin = match self.origin() {
            Some(origin) => origin,
            None => return Ok(()),
        };

        let from_recording = self.recording == RecordingState::Submitting;
        if text.trim().is_empty() && !from_recording {
            return Ok(());
        }

        let question = if text.trim().is_empty() {
            VOICE_TRANSCRIPT.to_string()
        } else {
            text.trim().to_string()
        };

        self.messages.push(Message::user(&question));
        self.input.clear();
        self.begin_request();
        if from_recording {
            self.recording = RecordingState::Idle;
        }
        self.notify();

        if let Err(err) = self.action_tx.send(Action::Ask(origin, question)) {
            tracing::error!(error = %err, "question could not be dispatched");
            self.fail_dispatch(ASK_FAILED_MESSAGE);
        }

        return Ok(());
    }

    pub fn request_summary(&mut self) -> Result<()> {
        let origin = match self.origin() {
            Some(origin) => origin,
            None => return Ok(()),
        };

        self.messages.push(Message::user(SUMMARY_REQUEST_MESSAGE));
        self.begin_request();
        self.notify();

        if let Err(err) = self.action_tx.send(Action::Summarize(origin)) {
            tracing::error!(error = %err, "summary could not be dispatched");
            self.fail_dispatch(SUMMARY_FAILED_MESSAGE);
        }

        return Ok(());
    }

    fn fail_dispatch(&mut self, message: &str) {
        self.complete_request();
        self.messages.push(Message::error(message));
        self.notify();
    }

    /// Submits the input buffer, running it as a slash command when it is one.
    /// Returns true when the user asked to quit.
    pub fn submit_input(&mut self) -> Result<bool> {
        let input = self.input.clone();

        if let Some(command) = SlashCommand::parse(&input) {
            self.input.clear();
            if command.is_quit() {
                return Ok(true);
            }
            if command.is_help() {
                self.messages.push(Message::system(&help_text()));
            } else if command.is_summary() {
                self.request_summary()?;
            } else if command.is_record() {
                self.toggle_recording()?;
            } else if command.is_theme() {
                self.toggle_theme();
            } else if command.is_panel() {
                self.toggle_side_panel();
            } else {
                self.messages.push(Message::error(&format!(
                    "Unknown command {}. Type /help for the list of commands.",
                    command.command
                )));
            }
            self.notify();

            return Ok(false);
        }

        self.submit_question(&input)?;

        return Ok(false);
    }

    pub fn toggle_recording(&mut self) -> Result<()> {
        let origin = match self.origin() {
            Some(origin) => origin,
            None => return Ok(()),
        };

        match self.recording {
            RecordingState::Idle => {
                self.recording = RecordingState::Recording;
                self.flags.is_recording = true;
                self.recording_cycle += 1;
                tracing::debug!(cycle = self.recording_cycle, "recording started");
                self.notify();
                self.action_tx.send(Action::StartRecordingTimer(
                    origin,
                    self.recording_cycle,
                    self.recording_window,
                ))?;
            }
            RecordingState::Recording => self.finish_recording()?,
            RecordingState::Submitting => {}
        }

        return Ok(());
    }

    fn finish_recording(&mut self) -> Result<()> {
        tracing::debug!(cycle = self.recording_cycle, "recording finished");
        self.recording = RecordingState::Submitting;
        self.flags.is_recording = false;
        self.input = VOICE_TRANSCRIPT.to_string();
        let transcript = self.input.clone();

        return self.submit_question(&transcript);
    }

    pub fn toggle_theme(&mut self) {
        self.flags.dark_mode = !self.flags.dark_mode;
        self.notify();
    }

    pub fn toggle_side_panel(&mut self) {
        self.flags.show_side_panel = !self.flags.show_side_panel;
        self.notify();
    }

    fn begin_request(&mut self) {
        self.pending_requests += 1;
        self.flags.is_loading = true;
    }

    fn complete_request(&mut self) {
        self.pending_requests = self.pending_requests.saturating_sub(1);
        self.flags.is_loading = self.pending_requests > 0;
    }

    /// Applies a result produced by the actions worker. Results issued under
    /// another session are dropped.
    pub fn handle_event(&mut self, event: Event) -> Result<()> {
        match event {
            Event::AnswerReceived(origin, result) => {
                if !self.is_current(&origin) {
                    tracing::debug!(document_id = %origin.document_id, "discarding stale answer");
                    return Ok(());
                }
                self.complete_request();
                match result {
                    Ok(answer) => self.push_answer(&answer),
                    Err(err) => {
                        tracing::error!(document_id = %origin.document_id, error = %err, "question failed");
                        self.messages.push(Message::error(ASK_FAILED_MESSAGE));
                    }
                }
            }
            Event::SummaryReceived(origin, result) => {
                if !self.is_current(&origin) {
                    tracing::debug!(document_id = %origin.document_id, "discarding stale summary");
                    return Ok(());
                }
                self.complete_request();
                match result {
                    Ok(summary) => self.push_answer(&summary),
                    Err(err) => {
                        tracing::error!(document_id = %origin.document_id, error = %err, "summary failed");
                        self.messages.push(Message::error(SUMMARY_FAILED_MESSAGE));
                    }
                }
            }
            Event::InsightsReceived(origin, insights) => {
                if !self.is_current(&origin) {
                    tracing::debug!(document_id = %origin.document_id, "discarding stale insights");
                    return Ok(());
                }
                self.insights = Some(insights);
                self.flags.is_fetching_insights = false;
            }
            Event::RecordingElapsed(origin, cycle) => {
                if !self.is_current(&origin)
                    || cycle != self.recording_cycle
                    || self.recording != RecordingState::Recording
                {
                    return Ok(());
                }
                self.finish_recording()?;
            }
            _ => return Ok(()),
        }

        self.notify();

        return Ok(());
    }

    fn push_answer(&mut self, raw: &str) {
        let answer = sanitize(raw);
        if answer.is_empty() {
            self.messages.push(Message::system(EMPTY_ANSWER_MESSAGE));
            return;
        }
        self.messages.push(Message::system(&answer));
    }

    pub fn set_input(&mut self, text: &str) {
        self.input = text.to_string();
        self.notify();
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
        self.notify();
    }

    pub fn pop_input_char(&mut self) -> Option<char> {
        let popped = self.input.pop();
        if popped.is_some() {
            self.notify();
        }

        return popped;
    }

    fn notify(&mut self) {
        self.revision += 1;
        self.updates.send_replace(self.revision);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        return self.updates.subscribe();
    }

    pub fn document_id(&self) -> Option<&DocumentId> {
        return self.document_id.as_ref();
    }

    pub fn messages(&self) -> &[Message] {
        return &self.messages;
    }

    pub fn input(&self) -> &str {
        return &self.input;
    }

    pub fn insights(&self) -> Option<&DocumentInsights> {
        return self.insights.as_ref();
    }

    pub fn flags(&self) -> SessionFlags {
        return self.flags;
    }

    pub fn recording_state(&self) -> RecordingState {
        return self.recording;
    }

    pub fn theme(&self) -> ThemeMode {
        return ThemeMode::from_dark_mode(self.flags.dark_mode);
    }

    pub fn revision(&self) -> u64 {
        return self.revision;
    }
}
