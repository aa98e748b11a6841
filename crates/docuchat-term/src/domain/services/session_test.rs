use std::time::Duration;

use anyhow::Result;
use tokio::sync::mpsc;

use super::InitOutcome;
use super::Session;
use super::SessionProps;
use super::ASK_FAILED_MESSAGE;
use super::EMPTY_ANSWER_MESSAGE;
use super::INVALID_DOCUMENT_MESSAGE;
use super::SUMMARY_FAILED_MESSAGE;
use super::SUMMARY_REQUEST_MESSAGE;
use super::VOICE_TRANSCRIPT;
use crate::domain::models::Action;
use crate::domain::models::BackendError;
use crate::domain::models::DocumentInsights;
use crate::domain::models::Event;
use crate::domain::models::RecordingState;
use crate::domain::models::RequestOrigin;
use crate::domain::models::Role;
use crate::domain::models::ThemeMode;
use crate::domain::services::extract_diagram;
use crate::domain::services::ActionsService;
use crate::test_utils::MockBackendClient;
use crate::test_utils::DOCUMENT_ID;
use crate::test_utils::OTHER_DOCUMENT_ID;

fn create_session() -> (Session, mpsc::UnboundedReceiver<Action>) {
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
    let session = Session::new(SessionProps {
        action_tx,
        dark_mode: true,
        recording_window: Duration::from_millis(2000),
    });

    return (session, action_rx);
}

fn drain(rx: &mut mpsc::UnboundedReceiver<Action>) -> Vec<Action> {
    let mut actions = vec![];
    while let Ok(action) = rx.try_recv() {
        actions.push(action);
    }

    return actions;
}

fn ask_origin(actions: &[Action]) -> RequestOrigin {
    for action in actions {
        if let Action::Ask(origin, _) = action {
            return origin.clone();
        }
    }
    panic!("no ask action in {actions:?}");
}

fn started_session() -> Result<(Session, mpsc::UnboundedReceiver<Action>)> {
    let (mut session, mut action_rx) = create_session();
    session.initialize(DOCUMENT_ID)?;
    drain(&mut action_rx);

    return Ok((session, action_rx));
}

#[test]
fn it_welcomes_and_fetches_insights_for_a_valid_id() -> Result<()> {
    let (mut session, mut action_rx) = create_session();

    let outcome = session.initialize(DOCUMENT_ID)?;

    assert_eq!(outcome, InitOutcome::Ready);
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].role, Role::System);
    assert!(session.messages()[0].content.contains(DOCUMENT_ID));
    assert!(session.flags().is_fetching_insights);
    assert!(session.flags().show_side_panel);

    let actions = drain(&mut action_rx);
    assert_eq!(actions.len(), 1);
    assert!(matches!(
        &actions[0],
        Action::FetchInsights(origin) if origin.document_id.as_str() == DOCUMENT_ID
    ));

    return Ok(());
}

#[test]
fn it_rejects_an_invalid_id_without_any_requests() -> Result<()> {
    let (mut session, mut action_rx) = create_session();

    let outcome = session.initialize("zz.pdf")?;

    assert_eq!(outcome, InitOutcome::Redirect);
    assert_eq!(session.messages().len(), 1);
    assert_eq!(session.messages()[0].content, INVALID_DOCUMENT_MESSAGE);
    assert!(session.document_id().is_none());
    assert!(drain(&mut action_rx).is_empty());

    session.submit_question("anything?")?;
    session.request_summary()?;
    assert_eq!(session.messages().len(), 1);
    assert!(drain(&mut action_rx).is_empty());

    return Ok(());
}

#[test]
fn it_ignores_blank_questions() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.submit_question("")?;
    session.submit_question("   \n ")?;

    assert_eq!(session.messages().len(), 1);
    assert!(!session.flags().is_loading);
    assert!(drain(&mut action_rx).is_empty());

    return Ok(());
}

#[test]
fn it_appends_a_sanitized_answer() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.set_input("What are the key points?");
    let quit = session.submit_input()?;
    assert!(!quit);
    assert_eq!(session.input(), "");
    assert!(session.flags().is_loading);

    let actions = drain(&mut action_rx);
    assert!(matches!(
        &actions[0],
        Action::Ask(_, question) if question == "What are the key points?"
    ));

    session.handle_event(Event::AnswerReceived(
        ask_origin(&actions),
        Ok("The key points are: A, B, C.\" ".to_string()),
    ))?;

    let messages = session.messages();
    assert_eq!(messages.len(), 3);
    assert_eq!(messages[1].role, Role::User);
    assert_eq!(messages[1].content, "What are the key points?");
    assert_eq!(messages[2].role, Role::System);
    assert_eq!(messages[2].content, "The key points are: A, B, C.");
    assert!(!session.flags().is_loading);

    return Ok(());
}

#[test]
fn it_trims_trailing_spaces_from_an_answer() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.set_input("What are the key points?");
    session.submit_input()?;
    let origin = ask_origin(&drain(&mut action_rx));
    session.handle_event(Event::AnswerReceived(
        origin,
        Ok("The key points are: A, B, C.   ".to_string()),
    ))?;

    assert_eq!(session.messages().len(), 3);
    assert_eq!(session.messages()[2].content, "The key points are: A, B, C.");
    assert!(!session.flags().is_loading);

    return Ok(());
}

#[test]
fn it_keeps_a_trailing_diagram_intact() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.submit_question("How does it flow?")?;
    let origin = ask_origin(&drain(&mut action_rx));
    session.handle_event(Event::AnswerReceived(
        origin,
        Ok("Here is the flow:\n\n```mermaid\ngraph TD\nA-->B\n```\n".to_string()),
    ))?;

    let extracted = extract_diagram(&session.messages()[2].content);
    assert_eq!(extracted.diagram.as_deref(), Some("graph TD\nA-->B"));
    assert_eq!(extracted.prose.trim(), "Here is the flow:");

    return Ok(());
}

#[test]
fn it_recovers_when_a_request_cannot_be_dispatched() -> Result<()> {
    let (mut session, action_rx) = started_session()?;
    drop(action_rx);

    session.submit_question("Hello?")?;
    assert!(!session.flags().is_loading);
    assert_eq!(session.messages().len(), 3);
    assert_eq!(session.messages()[1].content, "Hello?");
    assert_eq!(session.messages()[2].content, ASK_FAILED_MESSAGE);

    session.request_summary()?;
    assert!(!session.flags().is_loading);
    assert_eq!(session.messages()[3].content, SUMMARY_REQUEST_MESSAGE);
    assert_eq!(session.messages()[4].content, SUMMARY_FAILED_MESSAGE);

    return Ok(());
}

#[test]
fn it_replaces_an_empty_answer_with_a_notice() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.submit_question("Anything?")?;
    let origin = ask_origin(&drain(&mut action_rx));
    session.handle_event(Event::AnswerReceived(origin, Ok("  \"\" ".to_string())))?;

    assert_eq!(session.messages()[2].content, EMPTY_ANSWER_MESSAGE);

    return Ok(());
}

#[test]
fn it_reports_failed_questions() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.submit_question("What is this?")?;
    let origin = ask_origin(&drain(&mut action_rx));
    session.handle_event(Event::AnswerReceived(
        origin,
        Err(BackendError::Status {
            status: 500,
            body: "boom".to_string(),
        }),
    ))?;

    let last = session.messages().last().unwrap();
    assert_eq!(last.content, ASK_FAILED_MESSAGE);
    assert_eq!(last.role, Role::System);
    assert!(last.is_error());
    assert!(!session.flags().is_loading);

    return Ok(());
}

#[test]
fn it_requests_and_reports_summaries() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.set_input("/s");
    session.submit_input()?;

    let actions = drain(&mut action_rx);
    let origin = match &actions[0] {
        Action::Summarize(origin) => origin.clone(),
        other => panic!("unexpected action {other:?}"),
    };
    assert_eq!(session.messages()[1].content, SUMMARY_REQUEST_MESSAGE);
    assert!(session.flags().is_loading);

    session.handle_event(Event::SummaryReceived(
        origin,
        Err(BackendError::Transport("refused".to_string())),
    ))?;

    assert_eq!(session.messages()[2].content, SUMMARY_FAILED_MESSAGE);
    assert!(!session.flags().is_loading);

    return Ok(());
}

#[test]
fn it_discards_results_from_a_previous_session() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.submit_question("Old question")?;
    let stale = ask_origin(&drain(&mut action_rx));

    session.initialize(OTHER_DOCUMENT_ID)?;
    let messages_before = session.messages().to_vec();
    let revision_before = session.revision();

    session.handle_event(Event::AnswerReceived(stale.clone(), Ok("late".to_string())))?;
    session.handle_event(Event::InsightsReceived(stale, DocumentInsights::no_data()))?;

    assert_eq!(session.messages(), messages_before.as_slice());
    assert_eq!(session.revision(), revision_before);
    assert!(session.insights().is_none());
    assert!(session.flags().is_fetching_insights);

    return Ok(());
}

#[test]
fn it_discards_results_after_teardown_of_the_same_document() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.submit_question("Question")?;
    let stale = ask_origin(&drain(&mut action_rx));

    session.teardown();
    session.initialize(DOCUMENT_ID)?;
    session.handle_event(Event::AnswerReceived(stale, Ok("late".to_string())))?;

    assert_eq!(session.messages().len(), 1);
    assert!(!session.flags().is_loading);

    return Ok(());
}

#[test]
fn it_submits_the_transcript_once_when_recording_is_stopped_early() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.toggle_recording()?;
    assert_eq!(session.recording_state(), RecordingState::Recording);
    assert!(session.flags().is_recording);

    let (origin, cycle, window) = match drain(&mut action_rx).remove(0) {
        Action::StartRecordingTimer(origin, cycle, window) => (origin, cycle, window),
        other => panic!("unexpected action {other:?}"),
    };
    assert_eq!(window, Duration::from_millis(2000));

    session.toggle_recording()?;
    assert_eq!(session.recording_state(), RecordingState::Idle);
    assert!(!session.flags().is_recording);

    session.handle_event(Event::RecordingElapsed(origin, cycle))?;

    let questions = session
        .messages()
        .iter()
        .filter(|message| return message.role == Role::User)
        .collect::<Vec<_>>();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].content, VOICE_TRANSCRIPT);

    let asks = drain(&mut action_rx)
        .into_iter()
        .filter(|action| return matches!(action, Action::Ask(..)))
        .count();
    assert_eq!(asks, 1);

    return Ok(());
}

#[test]
fn it_submits_the_transcript_when_the_window_elapses() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.toggle_recording()?;
    let (origin, cycle) = match drain(&mut action_rx).remove(0) {
        Action::StartRecordingTimer(origin, cycle, _) => (origin, cycle),
        other => panic!("unexpected action {other:?}"),
    };

    session.handle_event(Event::RecordingElapsed(origin, cycle))?;

    assert_eq!(session.recording_state(), RecordingState::Idle);
    assert_eq!(session.input(), "");
    assert_eq!(session.messages().last().unwrap().content, VOICE_TRANSCRIPT);
    assert!(session.flags().is_loading);
    assert!(matches!(
        &drain(&mut action_rx)[0],
        Action::Ask(_, question) if question == VOICE_TRANSCRIPT
    ));

    return Ok(());
}

#[test]
fn it_ignores_timers_from_an_earlier_recording() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.toggle_recording()?;
    let (origin, first_cycle) = match drain(&mut action_rx).remove(0) {
        Action::StartRecordingTimer(origin, cycle, _) => (origin, cycle),
        other => panic!("unexpected action {other:?}"),
    };
    session.toggle_recording()?;
    session.toggle_recording()?;
    drain(&mut action_rx);

    session.handle_event(Event::RecordingElapsed(origin, first_cycle))?;

    assert_eq!(session.recording_state(), RecordingState::Recording);
    assert!(drain(&mut action_rx).is_empty());

    return Ok(());
}

#[test]
fn it_toggles_theme_and_panel() -> Result<()> {
    let (mut session, _action_rx) = started_session()?;
    let mut updates = session.subscribe();

    assert_eq!(session.theme(), ThemeMode::Dark);
    session.toggle_theme();
    assert_eq!(session.theme(), ThemeMode::Light);
    assert!(updates.has_changed()?);
    updates.borrow_and_update();

    session.set_input("/panel");
    session.submit_input()?;
    assert!(!session.flags().show_side_panel);
    assert!(updates.has_changed()?);

    return Ok(());
}

#[test]
fn it_handles_slash_commands() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;

    session.set_input("/help");
    assert!(!session.submit_input()?);
    assert!(session.messages()[1].content.contains("COMMANDS:"));

    session.set_input("/nope");
    assert!(!session.submit_input()?);
    assert!(session.messages()[2].is_error());

    session.set_input("/quit");
    assert!(session.submit_input()?);
    assert!(drain(&mut action_rx).is_empty());

    return Ok(());
}

#[test]
fn it_edits_the_input_buffer() -> Result<()> {
    let (mut session, _action_rx) = started_session()?;
    let revision = session.revision();

    session.push_input_char('h');
    session.push_input_char('é');
    assert_eq!(session.input(), "hé");
    assert_eq!(session.pop_input_char(), Some('é'));
    assert_eq!(session.input(), "h");
    assert_eq!(session.revision(), revision + 3);

    session.set_input("");
    let revision = session.revision();
    assert_eq!(session.pop_input_char(), None);
    assert_eq!(session.revision(), revision);

    return Ok(());
}

#[tokio::test]
async fn it_appends_concurrent_answers_in_completion_order() -> Result<()> {
    let (mut session, mut action_rx) = create_session();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let backend = MockBackendClient::default()
        .with_answer("Slow question", Ok("Slow answer".to_string()))
        .with_delay("Slow question", Duration::from_millis(200))
        .with_answer("Fast question", Ok("Fast answer".to_string()));

    tokio::spawn(async move {
        ActionsService::start(Box::new(backend), event_tx, &mut action_rx)
            .await
            .unwrap();
    });

    session.initialize(DOCUMENT_ID)?;
    session.submit_question("Slow question")?;
    session.submit_question("Fast question")?;

    let mut answers = 0;
    while answers < 2 {
        let event = event_rx.recv().await.unwrap();
        let is_answer = matches!(event, Event::AnswerReceived(..));
        session.handle_event(event)?;
        if is_answer {
            answers += 1;
            assert_eq!(session.flags().is_loading, answers < 2);
        }
    }

    let contents = session
        .messages()
        .iter()
        .skip(1)
        .map(|message| return message.content.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        contents,
        vec!["Slow question", "Fast question", "Fast answer", "Slow answer"]
    );

    return Ok(());
}

#[tokio::test]
async fn it_shows_a_placeholder_when_insights_fail() -> Result<()> {
    let (mut session, mut action_rx) = create_session();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<Event>();
    let backend = MockBackendClient::default()
        .with_insights(Err(BackendError::Transport("connection refused".to_string())));

    tokio::spawn(async move {
        ActionsService::start(Box::new(backend), event_tx, &mut action_rx)
            .await
            .unwrap();
    });

    session.initialize(DOCUMENT_ID)?;
    let event = event_rx.recv().await.unwrap();
    session.handle_event(event)?;

    let insights = session.insights().unwrap();
    assert!(insights
        .text
        .starts_with(&format!("Failed to load insights for {DOCUMENT_ID}")));
    assert!(insights.text.contains("connection refused"));
    assert!(insights.chart_keywords().is_empty());
    assert!(!session.flags().is_fetching_insights);

    return Ok(());
}
