#[cfg(test)]
#[path = "sanitizer_test.rs"]
mod tests;

fn is_trailing_artifact(c: char) -> bool {
    return c.is_whitespace() || matches!(c, '"' | '\'' | ',' | '“' | '”' | '‘' | '’');
}

/// Normalizes raw answer text before it is shown: trailing runs of
/// whitespace, quotes and commas are stripped, then both ends are trimmed.
///
/// The result never ends in an artifact character, so sanitizing twice is
/// the same as sanitizing once.
pub fn sanitize(raw: &str) -> String {
    return raw
        .trim_end_matches(is_trailing_artifact)
        .trim()
        .to_string();
}
