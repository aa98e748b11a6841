#[cfg(test)]
#[path = "ui_test.rs"]
mod tests;

use std::io;

use anyhow::Result;
use crossterm::event::DisableBracketedPaste;
use crossterm::event::DisableMouseCapture;
use crossterm::event::EnableBracketedPaste;
use crossterm::event::EnableMouseCapture;
use crossterm::execute;
use crossterm::terminal::disable_raw_mode;
use crossterm::terminal::enable_raw_mode;
use crossterm::terminal::EnterAlternateScreen;
use crossterm::terminal::LeaveAlternateScreen;
use ratatui::prelude::*;
use ratatui::widgets::Block;
use ratatui::widgets::Borders;
use ratatui::widgets::Paragraph;
use ratatui::widgets::Wrap;
use tokio::sync::mpsc;
use tui_textarea::TextArea;

use crate::domain::models::Event;
use crate::domain::models::Palette;
use crate::domain::models::ThemeMode;
use crate::domain::models::NONE_AVAILABLE;
use crate::domain::services::render_markdown;
use crate::domain::services::ChartRegistry;
use crate::domain::services::ChartSlot;
use crate::domain::services::EventsService;
use crate::domain::services::MessageRenderer;
use crate::domain::services::Session;

const SIDE_PANEL_WIDTH: u16 = 44;
const TEXT_PREVIEW_CHARS: usize = 400;

#[derive(Debug, Clone, Copy)]
struct Scroll {
    position: u16,
    follow: bool,
}

impl Default for Scroll {
    fn default() -> Scroll {
        return Scroll {
            position: 0,
            follow: true,
        };
    }
}

impl Scroll {
    fn up(&mut self, amount: u16) {
        self.follow = false;
        self.position = self.position.saturating_sub(amount);
    }

    fn down(&mut self, amount: u16) {
        self.position = self.position.saturating_add(amount);
    }

    fn last(&mut self) {
        self.follow = true;
    }

    /// Clamps to the content and returns the offset to render at.
    fn resolve(&mut self, content_height: u16, view_height: u16) -> u16 {
        let max = content_height.saturating_sub(view_height);
        if self.follow || self.position >= max {
            self.position = max;
            self.follow = true;
        }

        return self.position;
    }
}

/// Rows the chat paragraph occupies once ratatui word-wraps it at `width`.
fn wrapped_height(lines: &[Line<'_>], width: u16) -> u16 {
    let total = Paragraph::new(lines.to_vec())
        .wrap(Wrap { trim: false })
        .line_count(width);

    return u16::try_from(total).unwrap_or(u16::MAX);
}

fn new_textarea(text: &str) -> TextArea<'static> {
    let mut textarea = TextArea::new(text.lines().map(|e| return e.to_string()).collect());
    textarea.set_placeholder_text("Ask a question about the document...");
    textarea.move_cursor(tui_textarea::CursorMove::End);

    return textarea;
}

fn textarea_text(textarea: &TextArea<'_>) -> String {
    return textarea.lines().join("\n");
}

fn section(title: &str, palette: &Palette) -> Line<'static> {
    return Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(palette.accent).bold(),
    ));
}

/// Side panel contents for the current insights, without the keyword chart.
pub fn insights_lines(session: &Session, palette: &Palette) -> Vec<Line<'static>> {
    let insights = match session.insights() {
        Some(insights) => insights,
        None => {
            let text = if session.flags().is_fetching_insights {
                "Loading insights..."
            } else {
                NONE_AVAILABLE
            };
            return vec![Line::from(Span::styled(
                text,
                Style::default().fg(palette.text_muted),
            ))];
        }
    };

    let field = |label: &str, value: &Option<String>| {
        return Line::from(vec![
            Span::styled(format!("{label}: "), Style::default().fg(palette.text_muted)),
            Span::styled(
                value.clone().unwrap_or_else(|| return NONE_AVAILABLE.to_string()),
                Style::default().fg(palette.text_strong),
            ),
        ]);
    };

    let mut lines = vec![
        field("Title", &insights.metadata.title),
        field("Author", &insights.metadata.author),
        Line::default(),
    ];

    let mut preview = insights
        .text
        .chars()
        .take(TEXT_PREVIEW_CHARS)
        .collect::<String>();
    if insights.text.chars().count() > TEXT_PREVIEW_CHARS {
        preview.push('…');
    }
    if !preview.trim().is_empty() {
        lines.extend(preview.lines().map(|line| {
            return Line::from(Span::styled(
                line.to_string(),
                Style::default().fg(palette.text),
            ));
        }));
        lines.push(Line::default());
    }

    lines.push(section("Key points", palette));
    if insights.key_points.is_empty() {
        lines.push(Line::from(NONE_AVAILABLE));
    }
    for point in &insights.key_points {
        lines.push(Line::from(vec![
            Span::styled("• ", Style::default().fg(palette.accent)),
            Span::styled(point.to_string(), Style::default().fg(palette.text)),
        ]));
    }

    if !insights.tables.is_empty() {
        lines.push(Line::default());
        lines.push(section("Tables", palette));
        for (idx, table) in insights.tables.iter().enumerate() {
            if idx > 0 {
                lines.push(Line::default());
            }
            lines.extend(render_markdown(table, palette));
        }
    }

    return lines;
}

fn status_line(session: &Session, palette: &Palette) -> Line<'static> {
    let flags = session.flags();
    let mut spans = vec![];

    if flags.is_recording {
        spans.push(Span::styled(
            "● Recording... (CTRL+R to stop) ",
            Style::default().fg(palette.error).bold(),
        ));
    } else if flags.is_loading {
        spans.push(Span::styled(
            "Thinking... ",
            Style::default().fg(palette.accent),
        ));
    }
    if flags.is_fetching_insights {
        spans.push(Span::styled(
            "Loading insights... ",
            Style::default().fg(palette.text_muted),
        ));
    }

    spans.push(Span::styled(
        "CTRL+S summary · CTRL+R record · CTRL+T theme · CTRL+P panel · CTRL+C quit",
        Style::default().fg(palette.text_muted),
    ));

    return Line::from(spans);
}

/// Per-terminal view state. Everything here derives from the session.
struct View {
    textarea: TextArea<'static>,
    renderer: MessageRenderer,
    chart: ChartSlot,
    scroll: Scroll,
    lines: Vec<Line<'static>>,
    rendered_for: Option<(usize, ThemeMode)>,
    view_height: u16,
}

impl View {
    fn new(session: &Session) -> View {
        return View {
            textarea: new_textarea(session.input()),
            renderer: MessageRenderer::new(session.theme()),
            chart: ChartSlot::new(ChartRegistry::default()),
            scroll: Scroll::default(),
            lines: vec![],
            rendered_for: None,
            view_height: 0,
        };
    }

    /// Brings the cached transcript and the input box in line with the
    /// session.
    fn sync(&mut self, session: &Session) {
        let key = (session.messages().len(), session.theme());
        if self.rendered_for != Some(key) {
            self.lines = self.renderer.render_all(session.messages(), session.theme());
            self.rendered_for = Some(key);
        }

        if textarea_text(&self.textarea) != session.input() {
            self.textarea = new_textarea(session.input());
        }
    }

    fn draw(&mut self, frame: &mut Frame, session: &Session) {
        let theme = session.theme();
        let palette = theme.palette();
        let base = Style::default().fg(palette.text).bg(palette.background);
        let border = Style::default().fg(palette.border);

        frame.render_widget(Block::default().style(base), frame.area());

        let mut constraints = vec![Constraint::Min(20)];
        if session.flags().show_side_panel {
            constraints.push(Constraint::Length(SIDE_PANEL_WIDTH));
        }
        let columns = Layout::horizontal(constraints).split(frame.area());

        let chat_column = Layout::vertical([
            Constraint::Min(3),
            Constraint::Length(5),
            Constraint::Length(1),
        ])
        .split(columns[0]);

        let title = match session.document_id() {
            Some(document_id) => format!(" Docuchat · {document_id} "),
            None => " Docuchat ".to_string(),
        };
        let chat_block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(title);
        let chat_inner = chat_block.inner(chat_column[0]);
        self.view_height = chat_inner.height;
        let offset = self.scroll.resolve(
            wrapped_height(&self.lines, chat_inner.width),
            chat_inner.height,
        );
        frame.render_widget(
            Paragraph::new(self.lines.clone())
                .block(chat_block)
                .style(base)
                .wrap(Wrap { trim: false })
                .scroll((offset, 0)),
            chat_column[0],
        );

        self.textarea.set_block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(" Question "),
        );
        self.textarea.set_style(base);
        self.textarea
            .set_cursor_line_style(Style::default().fg(palette.text_strong));
        frame.render_widget(&self.textarea, chat_column[1]);

        frame.render_widget(
            Paragraph::new(status_line(session, &palette)).style(base),
            chat_column[2],
        );

        if !session.flags().show_side_panel {
            return;
        }

        let keywords = session
            .insights()
            .map(|insights| return insights.chart_keywords().to_vec())
            .unwrap_or_default();
        let chart_height = if keywords.is_empty() {
            0
        } else {
            u16::try_from(keywords.len()).unwrap_or(u16::MAX).saturating_add(2).min(14)
        };
        let panel = Layout::vertical([Constraint::Min(3), Constraint::Length(chart_height)])
            .split(columns[1]);

        frame.render_widget(
            Paragraph::new(insights_lines(session, &palette))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(" Insights "),
                )
                .style(base)
                .wrap(Wrap { trim: false }),
            panel[0],
        );

        if let Some(chart) = self.chart.render(&keywords, theme) {
            frame.render_widget(
                chart.widget().block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(border)
                        .title(" Keywords "),
                ),
                panel[1],
            );
        }
    }
}

pub fn destruct_terminal_for_panic() {
    let _ = disable_raw_mode();
    let _ = execute!(
        io::stdout(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    );
}

/// Drives the session until the user quits. Backend results arrive on `rx`
/// next to terminal input.
pub async fn start_loop<B: Backend>(
    terminal: &mut Terminal<B>,
    session: &mut Session,
    rx: mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut view = View::new(session);
    let mut updates = session.subscribe();
    let mut events = EventsService::new(rx);
    view.sync(session);

    loop {
        if updates.has_changed()? {
            updates.borrow_and_update();
            view.sync(session);
        }
        terminal.draw(|frame| view.draw(frame, session))?;

        let page = view.view_height.max(1);
        match events.next().await? {
            Event::KeyboardCTRLC => break,
            Event::KeyboardEnter => {
                session.set_input(&textarea_text(&view.textarea));
                view.scroll.last();
                if session.submit_input()? {
                    break;
                }
            }
            Event::KeyboardCharInput(input) => {
                view.textarea.input(input);
                session.set_input(&textarea_text(&view.textarea));
            }
            Event::KeyboardPaste(text) => {
                view.textarea.insert_str(text.replace('\r', "\n"));
                session.set_input(&textarea_text(&view.textarea));
            }
            Event::KeyboardCTRLP => session.toggle_side_panel(),
            Event::KeyboardCTRLR => session.toggle_recording()?,
            Event::KeyboardCTRLS => {
                view.scroll.last();
                session.request_summary()?;
            }
            Event::KeyboardCTRLT => session.toggle_theme(),
            Event::UIScrollUp => view.scroll.up(1),
            Event::UIScrollDown => view.scroll.down(1),
            Event::UIScrollPageUp => view.scroll.up(page),
            Event::UIScrollPageDown => view.scroll.down(page),
            Event::UITick => {}
            event => session.handle_event(event)?,
        }
    }

    session.teardown();
    view.chart.dispose();

    return Ok(());
}

/// Takes over the terminal for the chat loop and restores it afterwards, also
/// when the loop fails.
pub async fn run(session: &mut Session, rx: mpsc::UnboundedReceiver<Event>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    let res = start_loop(&mut terminal, session, rx).await;

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    return res;
}
