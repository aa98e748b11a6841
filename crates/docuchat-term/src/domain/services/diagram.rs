#[cfg(test)]
#[path = "diagram_test.rs"]
mod tests;

use std::collections::HashMap;

use anyhow::bail;
use anyhow::Result;
use once_cell::sync::Lazy;
use ratatui::prelude::*;
use regex::Regex;

use crate::domain::models::DiagramBlock;
use crate::domain::models::Palette;
use crate::domain::models::ThemeMode;

static ARROW: Lazy<Regex> = Lazy::new(|| {
    return Regex::new(
        r"\s*(?:--\s*(?P<text>[^-|>\s][^|>]*?)\s*-->|(?:-->|==>|-\.->|---)\s*(?:\|(?P<pipe>[^|]*)\|)?)\s*",
    )
    .unwrap();
});
static NODE_ID: Lazy<Regex> = Lazy::new(|| return Regex::new(r"^[A-Za-z0-9_]+").unwrap());

const IGNORED_STATEMENTS: &[&str] = &["%%", "classDef", "class ", "style ", "linkStyle", "click "];

/// Turns diagram source into terminal lines. Output depends on the theme the
/// engine was built for, so an engine is rebuilt rather than restyled.
pub trait DiagramEngine: Send {
    fn theme(&self) -> ThemeMode;
    fn render(&self, code: &str) -> Result<Vec<Line<'static>>>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Edge {
    from: String,
    to: String,
    label: Option<String>,
}

/// Renders mermaid `graph`/`flowchart` diagrams as an arrow listing.
pub struct FlowchartEngine {
    theme: ThemeMode,
    palette: Palette,
}

impl FlowchartEngine {
    pub fn new(theme: ThemeMode) -> FlowchartEngine {
        return FlowchartEngine {
            theme,
            palette: theme.palette(),
        };
    }
}

fn parse_node(token: &str, labels: &mut HashMap<String, String>) -> Result<String> {
    let token = token.trim().trim_end_matches(';').trim();
    let id = match NODE_ID.find(token) {
        Some(m) => m.as_str().to_string(),
        None => bail!("unrecognized node {token:?}"),
    };

    let shape = token[id.len()..].trim();
    if !shape.is_empty() {
        let label = shape
            .trim_start_matches(['[', '(', '{', '>', '/', '\\'])
            .trim_end_matches([']', ')', '}', '/', '\\'])
            .trim()
            .trim_matches('"')
            .to_string();
        if label.is_empty() || label.len() == shape.len() {
            bail!("unrecognized node shape {token:?}");
        }
        labels.insert(id.clone(), label);
    }

    return Ok(id);
}

fn parse_flowchart(code: &str) -> Result<(String, Vec<String>, Vec<Edge>)> {
    let mut statements = code
        .lines()
        .flat_map(|line| return line.split(';'))
        .map(str::trim)
        .filter(|stmt| return !stmt.is_empty());

    let header = match statements.next() {
        Some(header) => header.to_string(),
        None => bail!("empty diagram"),
    };
    let kind = header.split_whitespace().next().unwrap_or_default();
    if kind != "graph" && kind != "flowchart" {
        bail!("unsupported diagram type {kind:?}");
    }

    let mut labels: HashMap<String, String> = HashMap::new();
    let mut order: Vec<String> = vec![];
    let mut edges: Vec<Edge> = vec![];

    for stmt in statements {
        if stmt == "end"
            || stmt.starts_with("subgraph")
            || stmt.starts_with("direction")
            || IGNORED_STATEMENTS.iter().any(|prefix| return stmt.starts_with(prefix))
        {
            continue;
        }

        let mut nodes: Vec<String> = vec![];
        let mut edge_labels: Vec<Option<String>> = vec![];
        let mut last = 0;
        for caps in ARROW.captures_iter(stmt) {
            let arrow = caps.get(0).map(|m| return m.range()).unwrap_or(0..0);
            nodes.push(parse_node(&stmt[last..arrow.start], &mut labels)?);
            let label = caps
                .name("text")
                .or_else(|| return caps.name("pipe"))
                .map(|m| return m.as_str().trim().to_string())
                .filter(|label| return !label.is_empty());
            edge_labels.push(label);
            last = arrow.end;
        }
        nodes.push(parse_node(&stmt[last..], &mut labels)?);

        for node in nodes.iter() {
            if !order.contains(node) {
                order.push(node.to_string());
            }
        }
        for (idx, label) in edge_labels.into_iter().enumerate() {
            edges.push(Edge {
                from: nodes[idx].to_string(),
                to: nodes[idx + 1].to_string(),
                label,
            });
        }
    }

    if order.is_empty() {
        bail!("diagram has no nodes");
    }

    let named = order
        .iter()
        .map(|id| return labels.get(id).cloned().unwrap_or_else(|| return id.to_string()))
        .collect::<Vec<String>>();
    let edges = edges
        .into_iter()
        .map(|edge| {
            return Edge {
                from: labels.get(&edge.from).cloned().unwrap_or(edge.from),
                to: labels.get(&edge.to).cloned().unwrap_or(edge.to),
                label: edge.label,
            };
        })
        .collect();

    return Ok((header, named, edges));
}

impl DiagramEngine for FlowchartEngine {
    fn theme(&self) -> ThemeMode {
        return self.theme;
    }

    fn render(&self, code: &str) -> Result<Vec<Line<'static>>> {
        let (header, nodes, edges) = parse_flowchart(code)?;
        let muted = Style::default().fg(self.palette.text_muted);
        let node_style = Style::default().fg(self.palette.text_strong).bold();
        let arrow_style = Style::default().fg(self.palette.accent);

        let mut lines = vec![Line::from(Span::styled(format!("◆ {header}"), muted))];
        for edge in edges.iter() {
            let arrow = match &edge.label {
                Some(label) => format!(" ── {label} ──▶ "),
                None => " ──▶ ".to_string(),
            };
            lines.push(Line::from(vec![
                Span::styled("  ", muted),
                Span::styled(edge.from.to_string(), node_style),
                Span::styled(arrow, arrow_style),
                Span::styled(edge.to.to_string(), node_style),
            ]));
        }

        for node in nodes.iter() {
            let linked = edges
                .iter()
                .any(|edge| return &edge.from == node || &edge.to == node);
            if !linked {
                lines.push(Line::from(vec![
                    Span::styled("  ▪ ", arrow_style),
                    Span::styled(node.to_string(), node_style),
                ]));
            }
        }

        return Ok(lines);
    }
}

/// Fallback for diagrams the engine cannot parse: the source as plain text.
fn render_unparsed(code: &str, reason: &str, palette: &Palette) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        format!("◆ diagram could not be rendered: {reason}"),
        Style::default().fg(palette.error),
    ))];
    lines.extend(code.lines().map(|line| {
        return Line::from(Span::styled(
            format!("  {line}"),
            Style::default().fg(palette.text_muted),
        ));
    }));

    return lines;
}

#[derive(Debug, Clone)]
struct DiagramSlot {
    code: String,
    lines: Vec<Line<'static>>,
}

/// Rendered diagrams keyed by their stable block id. A slot is only filled
/// again when its code changes or the theme changes, in which case the engine
/// is rebuilt and every slot is cleared.
pub struct DiagramSlots {
    engine: Box<dyn DiagramEngine>,
    slots: HashMap<String, DiagramSlot>,
    engine_generation: u64,
    render_count: u64,
}

impl DiagramSlots {
    pub fn new(theme: ThemeMode) -> DiagramSlots {
        return DiagramSlots {
            engine: Box::new(FlowchartEngine::new(theme)),
            slots: HashMap::new(),
            engine_generation: 1,
            render_count: 0,
        };
    }

    fn reinitialize(&mut self, theme: ThemeMode) {
        tracing::debug!(theme = %theme, slots = self.slots.len(), "reinitializing diagram engine");
        self.slots.clear();
        self.engine = Box::new(FlowchartEngine::new(theme));
        self.engine_generation += 1;
    }

    pub fn render(&mut self, block: &DiagramBlock, theme: ThemeMode) -> &[Line<'static>] {
        if self.engine.theme() != theme {
            self.reinitialize(theme);
        }

        let filled = self
            .slots
            .get(&block.id)
            .map(|slot| return slot.code == block.code)
            .unwrap_or(false);

        if !filled {
            self.render_count += 1;
            let lines = match self.engine.render(&block.code) {
                Ok(lines) => lines,
                Err(err) => {
                    tracing::warn!(id = %block.id, error = %err, "diagram render failed");
                    render_unparsed(&block.code, &err.to_string(), &theme.palette())
                }
            };
            self.slots.insert(
                block.id.to_string(),
                DiagramSlot {
                    code: block.code.to_string(),
                    lines,
                },
            );
        }

        return self
            .slots
            .get(&block.id)
            .map(|slot| return slot.lines.as_slice())
            .unwrap_or(&[]);
    }

    /// Drops slots whose block no longer exists.
    pub fn retain(&mut self, blocks: &[DiagramBlock]) {
        self.slots
            .retain(|id, _| return blocks.iter().any(|block| return &block.id == id));
    }

    pub fn len(&self) -> usize {
        return self.slots.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.slots.is_empty();
    }

    pub fn engine_generation(&self) -> u64 {
        return self.engine_generation;
    }

    pub fn render_count(&self) -> u64 {
        return self.render_count;
    }
}
