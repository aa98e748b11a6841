#[cfg(test)]
#[path = "keyword_chart_test.rs"]
mod tests;

use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use ratatui::prelude::*;
use ratatui::widgets::Bar;
use ratatui::widgets::BarChart;
use ratatui::widgets::BarGroup;

use crate::domain::models::ThemeMode;

/// Tracks chart instances bound to the rendering backend.
#[derive(Clone, Debug, Default)]
pub struct ChartRegistry {
    live: Arc<AtomicUsize>,
    created: Arc<AtomicUsize>,
}

impl ChartRegistry {
    fn register(&self) -> ChartLease {
        self.live.fetch_add(1, Ordering::SeqCst);
        self.created.fetch_add(1, Ordering::SeqCst);
        return ChartLease {
            live: self.live.clone(),
        };
    }

    pub fn live(&self) -> usize {
        return self.live.load(Ordering::SeqCst);
    }

    pub fn created(&self) -> usize {
        return self.created.load(Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct ChartLease {
    live: Arc<AtomicUsize>,
}

impl Drop for ChartLease {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Bar chart over ranked keywords: the first keyword is the most frequent.
#[derive(Debug)]
pub struct KeywordChart {
    bars: Vec<(String, u64)>,
    theme: ThemeMode,
    _lease: ChartLease,
}

impl KeywordChart {
    fn new(keywords: &[String], theme: ThemeMode, lease: ChartLease) -> KeywordChart {
        let total = keywords.len() as u64;
        let bars = keywords
            .iter()
            .enumerate()
            .map(|(idx, keyword)| return (keyword.to_string(), total - idx as u64))
            .collect();

        return KeywordChart {
            bars,
            theme,
            _lease: lease,
        };
    }

    pub fn bars(&self) -> &[(String, u64)] {
        return &self.bars;
    }

    pub fn theme(&self) -> ThemeMode {
        return self.theme;
    }

    pub fn widget(&self) -> BarChart<'_> {
        let palette = self.theme.palette();
        let bars = self
            .bars
            .iter()
            .map(|(keyword, value)| {
                return Bar::default()
                    .value(*value)
                    .label(Line::from(keyword.as_str()))
                    .style(Style::default().fg(palette.bar))
                    .value_style(Style::default().fg(palette.background).bg(palette.bar));
            })
            .collect::<Vec<Bar>>();

        return BarChart::default()
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .label_style(Style::default().fg(palette.text))
            .data(BarGroup::default().bars(&bars));
    }
}

/// Holds at most one live chart. Any prior chart is disposed before a new one
/// is bound.
#[derive(Debug)]
pub struct ChartSlot {
    registry: ChartRegistry,
    chart: Option<KeywordChart>,
    rendered_for: Option<(Vec<String>, ThemeMode)>,
}

impl ChartSlot {
    pub fn new(registry: ChartRegistry) -> ChartSlot {
        return ChartSlot {
            registry,
            chart: None,
            rendered_for: None,
        };
    }

    pub fn render(&mut self, keywords: &[String], theme: ThemeMode) -> Option<&KeywordChart> {
        let unchanged = self
            .rendered_for
            .as_ref()
            .map(|(prev, prev_theme)| return prev.as_slice() == keywords && *prev_theme == theme)
            .unwrap_or(false);
        if unchanged {
            return self.chart.as_ref();
        }

        self.dispose();
        self.rendered_for = Some((keywords.to_vec(), theme));
        if keywords.is_empty() {
            return None;
        }

        tracing::debug!(keywords = keywords.len(), theme = %theme, "binding keyword chart");
        self.chart = Some(KeywordChart::new(keywords, theme, self.registry.register()));

        return self.chart.as_ref();
    }

    pub fn current(&self) -> Option<&KeywordChart> {
        return self.chart.as_ref();
    }

    pub fn dispose(&mut self) {
        if self.chart.take().is_some() {
            tracing::debug!("disposed keyword chart");
        }
        self.rendered_for = None;
    }
}
