#[cfg(test)]
#[path = "content_test.rs"]
mod tests;

use ratatui::prelude::*;

use super::extract_diagram;
use super::render_markdown;
use super::DiagramSlots;
use crate::domain::models::DiagramBlock;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::ThemeMode;

/// Diagram blocks for the current message list, one per message at most.
pub fn diagram_blocks(messages: &[Message]) -> Vec<DiagramBlock> {
    return messages
        .iter()
        .enumerate()
        .filter(|(_, message)| return message.role == Role::System)
        .filter_map(|(idx, message)| {
            return extract_diagram(&message.content)
                .diagram
                .map(|code| return DiagramBlock::new(idx, &code));
        })
        .collect();
}

/// Renders chat messages: prose through markdown, diagrams through the
/// diagram slots.
pub struct MessageRenderer {
    diagrams: DiagramSlots,
}

impl MessageRenderer {
    pub fn new(theme: ThemeMode) -> MessageRenderer {
        return MessageRenderer {
            diagrams: DiagramSlots::new(theme),
        };
    }

    pub fn diagrams(&self) -> &DiagramSlots {
        return &self.diagrams;
    }

    pub fn render(&mut self, index: usize, message: &Message, theme: ThemeMode) -> Vec<Line<'static>> {
        let palette = theme.palette();
        let (author, author_color) = match message.role {
            Role::User => ("You", palette.user),
            Role::System => ("Docuchat", palette.accent),
        };

        let mut lines = vec![Line::from(Span::styled(
            author,
            Style::default().fg(author_color).bold(),
        ))];

        if message.is_error() {
            lines.extend(message.content.lines().map(|line| {
                return Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(palette.error),
                ));
            }));
            return lines;
        }

        if message.role == Role::User {
            lines.extend(message.content.lines().map(|line| {
                return Line::from(Span::styled(
                    line.to_string(),
                    Style::default().fg(palette.text),
                ));
            }));
            return lines;
        }

        let extracted = extract_diagram(&message.content);
        lines.extend(render_markdown(&extracted.prose, &palette));
        if let Some(code) = extracted.diagram {
            let block = DiagramBlock::new(index, &code);
            lines.extend(self.diagrams.render(&block, theme).iter().cloned());
        }

        return lines;
    }

    pub fn render_all(&mut self, messages: &[Message], theme: ThemeMode) -> Vec<Line<'static>> {
        self.diagrams.retain(&diagram_blocks(messages));

        let mut lines = vec![];
        for (idx, message) in messages.iter().enumerate() {
            if idx > 0 {
                lines.push(Line::default());
            }
            lines.extend(self.render(idx, message, theme));
        }

        return lines;
    }
}
