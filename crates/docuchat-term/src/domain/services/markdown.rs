#[cfg(test)]
#[path = "markdown_test.rs"]
mod tests;

use once_cell::sync::Lazy;
use pulldown_cmark::CodeBlockKind;
use pulldown_cmark::Event;
use pulldown_cmark::Options;
use pulldown_cmark::Parser;
use pulldown_cmark::Tag;
use pulldown_cmark::TagEnd;
use ratatui::prelude::*;
use regex::Regex;

use crate::domain::models::Palette;

static HTML_BREAK: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(r"(?i)<br\s*/?>|</(p|div|li|tr|h[1-6]|ul|ol|table|thead|tbody|blockquote)>")
        .unwrap();
});
static HTML_ITEM: Lazy<Regex> = Lazy::new(|| return Regex::new(r"(?i)<li[^>]*>").unwrap());
static HTML_CELL: Lazy<Regex> = Lazy::new(|| return Regex::new(r"(?i)</t[dh]>").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| return Regex::new(r"<[^>]*>").unwrap());

/// Reduces generated HTML to its text content, one line per block element.
pub fn html_to_text(html: &str) -> Vec<String> {
    let text = HTML_ITEM.replace_all(html, "• ");
    let text = HTML_CELL.replace_all(&text, " │ ");
    let text = HTML_BREAK.replace_all(&text, "\n");
    let text = HTML_TAG.replace_all(&text, "");
    let text = text
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");

    return text
        .lines()
        .map(|line| return line.trim().trim_end_matches('│').trim_end().to_string())
        .filter(|line| return !line.is_empty())
        .collect();
}

struct ListState {
    next_number: Option<u64>,
}

struct TableState {
    rows: Vec<Vec<String>>,
    row: Vec<String>,
    cell: String,
}

/// Renders markdown prose into styled terminal lines.
pub fn render_markdown(text: &str, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![];
    let mut spans: Vec<Span<'static>> = vec![];

    let mut bold = false;
    let mut italic = false;
    let mut heading = false;
    let mut code_block: Option<String> = None;
    let mut lists: Vec<ListState> = vec![];
    let mut table: Option<TableState> = None;

    let flush = |lines: &mut Vec<Line<'static>>, spans: &mut Vec<Span<'static>>| {
        if !spans.is_empty() {
            lines.push(Line::from(std::mem::take(spans)));
        }
    };

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    for event in Parser::new_ext(text, options) {
        match event {
            Event::Start(Tag::Heading { .. }) => {
                flush(&mut lines, &mut spans);
                heading = true;
            }
            Event::End(TagEnd::Heading(_)) => {
                flush(&mut lines, &mut spans);
                heading = false;
            }
            Event::Start(Tag::Strong) => bold = true,
            Event::End(TagEnd::Strong) => bold = false,
            Event::Start(Tag::Emphasis) => italic = true,
            Event::End(TagEnd::Emphasis) => italic = false,

            Event::Start(Tag::Paragraph) => {}
            Event::End(TagEnd::Paragraph) => {
                flush(&mut lines, &mut spans);
                if lists.is_empty() {
                    lines.push(Line::default());
                }
            }

            Event::Start(Tag::List(start)) => {
                flush(&mut lines, &mut spans);
                lists.push(ListState { next_number: start });
            }
            Event::End(TagEnd::List(_)) => {
                flush(&mut lines, &mut spans);
                lists.pop();
                if lists.is_empty() {
                    lines.push(Line::default());
                }
            }
            Event::Start(Tag::Item) => {
                flush(&mut lines, &mut spans);
                let depth = lists.len().saturating_sub(1);
                let marker = match lists.last_mut() {
                    Some(ListState {
                        next_number: Some(number),
                    }) => {
                        let marker = format!("{number}. ");
                        *number += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                spans.push(Span::styled(
                    format!("{}{marker}", "  ".repeat(depth)),
                    Style::default().fg(palette.accent),
                ));
            }
            Event::End(TagEnd::Item) => flush(&mut lines, &mut spans),

            Event::Start(Tag::CodeBlock(kind)) => {
                flush(&mut lines, &mut spans);
                let lang = match kind {
                    CodeBlockKind::Fenced(lang) => lang.to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                lines.push(Line::from(Span::styled(
                    format!("┌─ {lang}"),
                    Style::default().fg(palette.text_muted),
                )));
                code_block = Some(String::new());
            }
            Event::End(TagEnd::CodeBlock) => {
                for code_line in code_block.take().unwrap_or_default().lines() {
                    lines.push(Line::from(vec![
                        Span::styled("│ ", Style::default().fg(palette.text_muted)),
                        Span::styled(code_line.to_string(), Style::default().fg(palette.code)),
                    ]));
                }
                lines.push(Line::from(Span::styled(
                    "└─",
                    Style::default().fg(palette.text_muted),
                )));
            }

            Event::Start(Tag::Table(_)) => {
                flush(&mut lines, &mut spans);
                table = Some(TableState {
                    rows: vec![],
                    row: vec![],
                    cell: String::new(),
                });
            }
            Event::End(TagEnd::Table) => {
                if let Some(state) = table.take() {
                    lines.extend(render_table(&state.rows, palette));
                    lines.push(Line::default());
                }
            }
            Event::Start(Tag::TableHead) | Event::Start(Tag::TableRow) => {
                if let Some(state) = table.as_mut() {
                    state.row.clear();
                }
            }
            Event::End(TagEnd::TableHead) | Event::End(TagEnd::TableRow) => {
                if let Some(state) = table.as_mut() {
                    let row = std::mem::take(&mut state.row);
                    state.rows.push(row);
                }
            }
            Event::Start(Tag::TableCell) => {
                if let Some(state) = table.as_mut() {
                    state.cell.clear();
                }
            }
            Event::End(TagEnd::TableCell) => {
                if let Some(state) = table.as_mut() {
                    let cell = state.cell.trim().to_string();
                    state.row.push(cell);
                }
            }

            Event::Text(content) => {
                if let Some(code) = code_block.as_mut() {
                    code.push_str(&content);
                } else if let Some(state) = table.as_mut() {
                    state.cell.push_str(&content);
                } else {
                    let mut style = Style::default().fg(palette.text);
                    if heading {
                        style = style.fg(palette.accent).bold();
                    }
                    if bold {
                        style = style.fg(palette.text_strong).bold();
                    }
                    if italic {
                        style = style.italic();
                    }
                    spans.push(Span::styled(content.to_string(), style));
                }
            }
            Event::Code(code) => {
                if let Some(state) = table.as_mut() {
                    state.cell.push_str(&code);
                } else {
                    spans.push(Span::styled(
                        format!("`{code}`"),
                        Style::default().fg(palette.code),
                    ));
                }
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                let text_lines = html_to_text(&html);
                if let Some(state) = table.as_mut() {
                    state.cell.push_str(&text_lines.join(" "));
                    continue;
                }
                let block = text_lines.len() > 1 || html.ends_with('\n');
                for (idx, text_line) in text_lines.into_iter().enumerate() {
                    if idx > 0 {
                        flush(&mut lines, &mut spans);
                    }
                    spans.push(Span::styled(text_line, Style::default().fg(palette.text)));
                }
                if block {
                    flush(&mut lines, &mut spans);
                }
            }
            Event::SoftBreak => {
                if let Some(state) = table.as_mut() {
                    state.cell.push(' ');
                } else {
                    spans.push(Span::raw(" "));
                }
            }
            Event::HardBreak => flush(&mut lines, &mut spans),
            Event::Rule => {
                flush(&mut lines, &mut spans);
                lines.push(Line::from(Span::styled(
                    "─".repeat(24),
                    Style::default().fg(palette.border),
                )));
            }
            _ => {}
        }
    }

    flush(&mut lines, &mut spans);
    while lines.last().map(|line| return line.width() == 0).unwrap_or(false) {
        lines.pop();
    }

    return lines;
}

/// Renders collected table rows, first row as header, as aligned text.
pub fn render_table(rows: &[Vec<String>], palette: &Palette) -> Vec<Line<'static>> {
    let columns = rows.iter().map(|row| return row.len()).max().unwrap_or(0);
    if columns == 0 {
        return vec![];
    }

    let mut widths = vec![0; columns];
    for row in rows {
        for (idx, cell) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(cell.chars().count());
        }
    }

    let separator = Style::default().fg(palette.border);
    let mut lines = vec![];
    for (row_idx, row) in rows.iter().enumerate() {
        let mut spans = vec![];
        for (idx, width) in widths.iter().copied().enumerate() {
            if idx > 0 {
                spans.push(Span::styled(" │ ", separator));
            }
            let cell = row.get(idx).map(String::as_str).unwrap_or("");
            let style = if row_idx == 0 {
                Style::default().fg(palette.text_strong).bold()
            } else {
                Style::default().fg(palette.text)
            };
            spans.push(Span::styled(format!("{cell:<width$}"), style));
        }
        lines.push(Line::from(spans));

        if row_idx == 0 {
            let rule = widths
                .iter()
                .map(|width| return "─".repeat(*width))
                .collect::<Vec<String>>()
                .join("─┼─");
            lines.push(Line::from(Span::styled(rule, separator)));
        }
    }

    return lines;
}
