#[cfg(test)]
#[path = "events_test.rs"]
mod tests;

use anyhow::Result;
use crossterm::event::Event as CrosstermEvent;
use crossterm::event::EventStream;
use crossterm::event::KeyCode;
use crossterm::event::KeyEventKind;
use crossterm::event::KeyModifiers;
use crossterm::event::MouseEventKind;
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time;
use tui_textarea::Input;
use tui_textarea::Key;

use crate::domain::models::Event;

/// Maps a terminal event onto the session's event vocabulary.
pub fn map_crossterm(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Paste(text) => {
            return Some(Event::KeyboardPaste(text));
        }
        CrosstermEvent::Mouse(mouse_event) => match mouse_event.kind {
            MouseEventKind::ScrollUp => return Some(Event::UIScrollUp),
            MouseEventKind::ScrollDown => return Some(Event::UIScrollDown),
            _ => return None,
        },
        CrosstermEvent::Key(key_event) => {
            if key_event.kind == KeyEventKind::Release {
                return None;
            }

            let key = match key_event.code {
                KeyCode::Char(c) => Key::Char(c),
                KeyCode::Enter => Key::Enter,
                KeyCode::Left => Key::Left,
                KeyCode::Right => Key::Right,
                KeyCode::Up => Key::Up,
                KeyCode::Down => Key::Down,
                KeyCode::Home => Key::Home,
                KeyCode::End => Key::End,
                KeyCode::PageUp => Key::PageUp,
                KeyCode::PageDown => Key::PageDown,
                KeyCode::Tab => Key::Tab,
                KeyCode::Delete => Key::Delete,
                KeyCode::Backspace => Key::Backspace,
                KeyCode::Esc => Key::Esc,
                _ => return None,
            };

            let input = Input {
                key,
                ctrl: key_event.modifiers.contains(KeyModifiers::CONTROL),
                alt: key_event.modifiers.contains(KeyModifiers::ALT),
                shift: key_event.modifiers.contains(KeyModifiers::SHIFT),
            };

            match input {
                Input { key: Key::Down, .. } => return Some(Event::UIScrollDown),
                Input { key: Key::Up, .. } => return Some(Event::UIScrollUp),
                Input {
                    key: Key::PageDown, ..
                }
                | Input {
                    key: Key::Char('d'),
                    ctrl: true,
                    ..
                } => return Some(Event::UIScrollPageDown),
                Input {
                    key: Key::PageUp, ..
                }
                | Input {
                    key: Key::Char('u'),
                    ctrl: true,
                    ..
                } => return Some(Event::UIScrollPageUp),
                Input {
                    key: Key::Char('c'),
                    ctrl: true,
                    ..
                } => return Some(Event::KeyboardCTRLC),
                Input {
                    key: Key::Char('p'),
                    ctrl: true,
                    ..
                } => return Some(Event::KeyboardCTRLP),
                Input {
                    key: Key::Char('r'),
                    ctrl: true,
                    ..
                } => return Some(Event::KeyboardCTRLR),
                Input {
                    key: Key::Char('s'),
                    ctrl: true,
                    ..
                } => return Some(Event::KeyboardCTRLS),
                Input {
                    key: Key::Char('t'),
                    ctrl: true,
                    ..
                } => return Some(Event::KeyboardCTRLT),
                Input {
                    key: Key::Enter, ..
                } => return Some(Event::KeyboardEnter),
                input => return Some(Event::KeyboardCharInput(input)),
            }
        }
        _ => return None,
    }
}

pub struct EventsService {
    crossterm_events: EventStream,
    events: mpsc::UnboundedReceiver<Event>,
}

impl EventsService {
    pub fn new(events: mpsc::UnboundedReceiver<Event>) -> EventsService {
        return EventsService {
            crossterm_events: EventStream::new(),
            events,
        };
    }

    pub async fn next(&mut self) -> Result<Event> {
        loop {
            let evt = tokio::select! {
                event = self.events.recv() => event,
                event = self.crossterm_events.next() => match event {
                    Some(Ok(input)) => map_crossterm(input),
                    Some(Err(err)) => {
                        tracing::warn!(error = %err, "terminal event error");
                        None
                    }
                    None => None
                },
                _ = time::sleep(time::Duration::from_millis(500)) => Some(Event::UITick)
            };

            if let Some(event) = evt {
                return Ok(event);
            }
        }
    }
}
