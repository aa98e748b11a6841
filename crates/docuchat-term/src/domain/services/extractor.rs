#[cfg(test)]
#[path = "extractor_test.rs"]
mod tests;

pub const DIAGRAM_LANGUAGE: &str = "mermaid";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted {
    pub prose: String,
    pub diagram: Option<String>,
}

struct Fence {
    marker: char,
    len: usize,
    info: String,
}

fn opening_fence(line: &str) -> Option<Fence> {
    let trimmed = line.trim_start();
    let marker = trimmed.chars().next()?;
    if marker != '`' && marker != '~' {
        return None;
    }

    let len = trimmed.chars().take_while(|c| return *c == marker).count();
    if len < 3 {
        return None;
    }

    let info = trimmed[len * marker.len_utf8()..].trim();
    if marker == '`' && info.contains('`') {
        return None;
    }

    return Some(Fence {
        marker,
        len,
        info: info.to_string(),
    });
}

fn closes(fence: &Fence, line: &str) -> bool {
    let trimmed = line.trim();
    let len = trimmed.chars().take_while(|c| return *c == fence.marker).count();
    return len >= fence.len && trimmed.chars().all(|c| return c == fence.marker);
}

fn is_diagram(fence: &Fence) -> bool {
    return fence
        .info
        .split_whitespace()
        .next()
        .map(|lang| return lang.eq_ignore_ascii_case(DIAGRAM_LANGUAGE))
        .unwrap_or(false);
}

/// Separates the first fenced diagram block from the surrounding prose.
///
/// Other fenced blocks are skipped over so a diagram tag quoted inside them is
/// not picked up. An unterminated fence means there is no diagram and the text
/// is returned untouched.
pub fn extract_diagram(text: &str) -> Extracted {
    let not_found = || {
        return Extracted {
            prose: text.to_string(),
            diagram: None,
        };
    };

    let mut offset = 0;
    let mut lines = text.split_inclusive('\n');

    while let Some(line) = lines.next() {
        let line_start = offset;
        offset += line.len();

        let fence = match opening_fence(line) {
            Some(fence) => fence,
            None => continue,
        };

        let code_start = offset;
        let mut closing: Option<(usize, usize)> = None;
        for inner in lines.by_ref() {
            let inner_start = offset;
            offset += inner.len();
            if closes(&fence, inner) {
                closing = Some((inner_start, offset));
                break;
            }
        }

        let (close_start, block_end) = match closing {
            Some(bounds) => bounds,
            None => return not_found(),
        };

        if !is_diagram(&fence) {
            continue;
        }

        let code = text[code_start..close_start]
            .strip_suffix('\n')
            .unwrap_or(&text[code_start..close_start]);
        let code = code.strip_suffix('\r').unwrap_or(code);

        let mut prose = String::with_capacity(text.len());
        prose.push_str(&text[..line_start]);
        prose.push_str(&text[block_end..]);

        return Extracted {
            prose,
            diagram: Some(code.to_string()),
        };
    }

    return not_found();
}
