use std::time::Duration;

use anyhow::Result;
use ratatui::backend::TestBackend;
use ratatui::Terminal;
use tokio::sync::mpsc;

use super::insights_lines;
use super::wrapped_height;
use super::Scroll;
use super::View;
use crate::domain::models::Action;
use crate::domain::models::DocumentInsights;
use crate::domain::models::Event;
use crate::domain::models::InsightsMetadata;
use crate::domain::models::ThemeMode;
use crate::domain::services::Session;
use crate::domain::services::SessionProps;
use crate::test_utils::DOCUMENT_ID;

fn started_session() -> Result<(Session, mpsc::UnboundedReceiver<Action>)> {
    let (action_tx, action_rx) = mpsc::unbounded_channel::<Action>();
    let mut session = Session::new(SessionProps {
        action_tx,
        dark_mode: true,
        recording_window: Duration::from_millis(2000),
    });
    session.initialize(DOCUMENT_ID)?;

    return Ok((session, action_rx));
}

fn deliver_insights(
    session: &mut Session,
    action_rx: &mut mpsc::UnboundedReceiver<Action>,
    insights: DocumentInsights,
) -> Result<()> {
    while let Ok(action) = action_rx.try_recv() {
        if let Action::FetchInsights(origin) = action {
            session.handle_event(Event::InsightsReceived(origin, insights))?;
            return Ok(());
        }
    }
    panic!("no insights request was issued");
}

fn screen(terminal: &Terminal<TestBackend>) -> String {
    let buffer = terminal.backend().buffer();
    let width = buffer.area.width as usize;

    return buffer
        .content
        .chunks(width)
        .map(|row| return row.iter().map(|cell| return cell.symbol()).collect::<String>())
        .collect::<Vec<String>>()
        .join("\n");
}

fn report() -> DocumentInsights {
    return DocumentInsights {
        text: "Quarterly numbers.".to_string(),
        key_points: vec!["Revenue grew".to_string()],
        tables: vec!["| Year | Revenue |\n| --- | --- |\n| 2023 | 10 |".to_string()],
        metadata: InsightsMetadata {
            title: Some("Annual report".to_string()),
            author: None,
        },
        keywords: vec!["revenue".to_string(), "growth".to_string()],
    };
}

#[test]
fn it_scrolls_and_follows_the_bottom() {
    let mut scroll = Scroll::default();
    assert_eq!(scroll.resolve(50, 10), 40);

    scroll.up(5);
    assert_eq!(scroll.resolve(60, 10), 35);

    scroll.down(100);
    assert_eq!(scroll.resolve(60, 10), 50);
    assert_eq!(scroll.resolve(70, 10), 60);
}

#[test]
fn it_measures_wrapped_lines() {
    let lines = vec![
        ratatui::text::Line::from("1234567890"),
        ratatui::text::Line::default(),
        ratatui::text::Line::from("123"),
    ];

    assert_eq!(wrapped_height(&lines, 4), 5);
    assert_eq!(wrapped_height(&lines, 0), 0);
}

#[test]
fn it_measures_word_wrapped_lines() -> Result<()> {
    let lines = vec![ratatui::text::Line::from("aaaaaa bbbbbb cccccc")];
    assert_eq!(wrapped_height(&lines, 10), 3);

    let mut terminal = Terminal::new(TestBackend::new(10, 2))?;
    let mut scroll = Scroll::default();
    let offset = scroll.resolve(wrapped_height(&lines, 10), 2);
    terminal.draw(|frame| {
        frame.render_widget(
            ratatui::widgets::Paragraph::new(lines.clone())
                .wrap(ratatui::widgets::Wrap { trim: false })
                .scroll((offset, 0)),
            frame.area(),
        );
    })?;
    assert!(screen(&terminal).contains("cccccc"));

    return Ok(());
}

#[test]
fn it_lists_insights_for_the_side_panel() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;
    let palette = ThemeMode::Dark.palette();

    let loading = insights_lines(&session, &palette);
    assert_eq!(loading[0].to_string(), "Loading insights...");

    deliver_insights(&mut session, &mut action_rx, report())?;
    let lines = insights_lines(&session, &palette)
        .iter()
        .map(|line| return line.to_string())
        .collect::<Vec<String>>();

    assert_eq!(lines[0], "Title: Annual report");
    assert_eq!(lines[1], "Author: None available");
    assert!(lines.contains(&"• Revenue grew".to_string()));
    assert!(lines.contains(&"Tables".to_string()));
    assert!(lines.iter().any(|line| return line.contains("2023")));

    return Ok(());
}

#[test]
fn it_draws_chat_and_side_panel() -> Result<()> {
    let (mut session, mut action_rx) = started_session()?;
    deliver_insights(&mut session, &mut action_rx, report())?;

    let mut terminal = Terminal::new(TestBackend::new(120, 30))?;
    let mut view = View::new(&session);
    view.sync(&session);
    terminal.draw(|frame| view.draw(frame, &session))?;

    let output = screen(&terminal);
    assert!(output.contains("Docuchat"));
    assert!(output.contains(DOCUMENT_ID));
    assert!(output.contains("Annual report"));
    assert!(output.contains("Keywords"));
    assert!(view.chart.current().is_some());

    session.toggle_side_panel();
    terminal.draw(|frame| view.draw(frame, &session))?;
    assert!(!screen(&terminal).contains("Annual report"));

    return Ok(());
}

#[test]
fn it_mirrors_the_session_input() -> Result<()> {
    let (mut session, _action_rx) = started_session()?;
    let mut view = View::new(&session);

    session.set_input("draft question");
    view.sync(&session);
    assert_eq!(view.textarea.lines().join("\n"), "draft question");

    session.submit_input()?;
    view.sync(&session);
    assert_eq!(view.textarea.lines().join("\n"), "");
    assert!(view.lines.len() > 1);

    return Ok(());
}
