#[cfg(test)]
#[path = "document_test.rs"]
mod tests;

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use super::BackendError;

static DOCUMENT_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| return Regex::new(r"^[a-f0-9]{32}\.(pdf|mp4)$").unwrap());

/// Identifier the backend assigns to an uploaded document: 32 lowercase hex
/// characters followed by `.pdf` or `.mp4`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn parse(raw: &str) -> Result<DocumentId, BackendError> {
        if !DOCUMENT_ID_PATTERN.is_match(raw) {
            return Err(BackendError::InvalidDocumentId(raw.to_string()));
        }

        return Ok(DocumentId(raw.to_string()));
    }

    pub fn as_str(&self) -> &str {
        return &self.0;
    }

    pub fn extension(&self) -> &str {
        return self.0.rsplit('.').next().unwrap_or_default();
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        return f.write_str(&self.0);
    }
}
