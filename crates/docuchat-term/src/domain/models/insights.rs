#[cfg(test)]
#[path = "insights_test.rs"]
mod tests;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use super::DocumentId;

pub const NONE_AVAILABLE: &str = "None available";
pub const NO_DATA_TEXT: &str = "No data available for this document.";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct InsightsMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
}

/// Descriptive data the backend derives from a document. Always replaced as a
/// whole, never merged.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "InsightsWire")]
pub struct DocumentInsights {
    pub text: String,
    pub key_points: Vec<String>,
    /// Markdown tables.
    pub tables: Vec<String>,
    pub metadata: InsightsMetadata,
    pub keywords: Vec<String>,
}

impl DocumentInsights {
    pub fn no_data() -> DocumentInsights {
        return DocumentInsights {
            text: NO_DATA_TEXT.to_string(),
            key_points: vec![NONE_AVAILABLE.to_string()],
            tables: vec![],
            metadata: InsightsMetadata::default(),
            keywords: vec![NONE_AVAILABLE.to_string()],
        };
    }

    pub fn failed(document_id: &DocumentId, reason: &str) -> DocumentInsights {
        return DocumentInsights {
            text: format!("Failed to load insights for {document_id}: {reason}"),
            key_points: vec![NONE_AVAILABLE.to_string()],
            tables: vec![],
            metadata: InsightsMetadata::default(),
            keywords: vec![NONE_AVAILABLE.to_string()],
        };
    }

    pub fn is_empty(&self) -> bool {
        return self.text.trim().is_empty()
            && self.key_points.is_empty()
            && self.tables.is_empty()
            && self.keywords.is_empty()
            && self.metadata == InsightsMetadata::default();
    }

    /// Keywords worth charting. Placeholder entries are not real keywords.
    pub fn chart_keywords(&self) -> &[String] {
        if self.keywords.len() == 1 && self.keywords[0] == NONE_AVAILABLE {
            return &[];
        }

        return &self.keywords;
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TableWire {
    Markdown(String),
    Rows(Vec<Vec<Value>>),
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct InsightsWire {
    text: Option<String>,
    key_points: Option<Vec<String>>,
    tables: Option<Vec<TableWire>>,
    metadata: Option<BTreeMap<String, Value>>,
    keywords: Option<Vec<String>>,
}

impl From<InsightsWire> for DocumentInsights {
    fn from(wire: InsightsWire) -> Self {
        let metadata = wire.metadata.unwrap_or_default();
        let lookup = |name: &str| {
            return metadata
                .iter()
                .find(|(key, _)| return key.trim_start_matches('/').eq_ignore_ascii_case(name))
                .and_then(|(_, val)| return val.as_str())
                .map(|val| return val.trim().to_string())
                .filter(|val| return !val.is_empty());
        };

        let tables = wire
            .tables
            .unwrap_or_default()
            .into_iter()
            .filter_map(|table| match table {
                TableWire::Markdown(markdown) => Some(markdown),
                TableWire::Rows(rows) => rows_to_markdown(&rows),
            })
            .filter(|table| return !table.trim().is_empty())
            .collect();

        return DocumentInsights {
            text: wire.text.unwrap_or_default(),
            key_points: wire.key_points.unwrap_or_default(),
            tables,
            metadata: InsightsMetadata {
                title: lookup("title"),
                author: lookup("author"),
            },
            keywords: wire.keywords.unwrap_or_default(),
        };
    }
}

fn cell_text(cell: &Value) -> String {
    let text = match cell {
        Value::Null => String::new(),
        Value::String(s) => s.to_string(),
        other => other.to_string(),
    };

    return text.replace('\n', " ").replace('|', "\\|").trim().to_string();
}

/// Converts a row matrix, first row being the header, into a markdown table.
pub fn rows_to_markdown(rows: &[Vec<Value>]) -> Option<String> {
    let columns = rows.iter().map(|row| return row.len()).max().unwrap_or(0);
    if columns == 0 {
        return None;
    }

    let format_row = |row: &Vec<Value>| {
        let mut cells = row.iter().map(cell_text).collect::<Vec<String>>();
        cells.resize(columns, String::new());
        return format!("| {} |", cells.join(" | "));
    };

    let mut lines = vec![format_row(&rows[0])];
    lines.push(format!("|{}", " --- |".repeat(columns)));
    lines.extend(rows[1..].iter().map(format_row));

    return Some(lines.join("\n"));
}
