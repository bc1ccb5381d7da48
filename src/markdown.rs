//! Markdown post-processing.
//!
//! The converter's raw output tends to carry trailing spaces and long runs of
//! blank lines left behind by empty wrappers. This module tidies that up
//! without touching fenced code, where whitespace is content.

/// Number of backticks or tildes that open or close a fence.
const FENCE_MIN: usize = 3;

/// Normalize converted Markdown.
///
/// # Rules
///
/// - Trailing whitespace is trimmed from every line outside fenced code
/// - Runs of blank lines outside fenced code collapse to a single blank line
/// - Leading and trailing blank lines are removed
///
/// # Examples
///
/// ```
/// use rs_capture::markdown::normalize;
///
/// let raw = "\n\n# Title   \n\n\n\nBody\n\n```\nx  \n\n\n\ny\n```\n\n";
/// assert_eq!(normalize(raw), "# Title\n\nBody\n\n```\nx  \n\n\n\ny\n```");
/// ```
#[must_use]
pub fn normalize(markdown: &str) -> String {
    let mut out: Vec<&str> = Vec::new();
    let mut fence: Option<(char, usize)> = None;
    let mut blank_run = 0usize;

    for line in markdown.lines() {
        if let Some((ch, len)) = fence {
            out.push(line);
            if closes_fence(line, ch, len) {
                fence = None;
            }
            continue;
        }

        let trimmed = line.trim_end();
        if trimmed.is_empty() {
            blank_run += 1;
            if blank_run == 1 && !out.is_empty() {
                out.push("");
            }
            continue;
        }
        blank_run = 0;
        fence = opens_fence(trimmed);
        out.push(trimmed);
    }

    while out.last().is_some_and(|l| l.trim().is_empty()) {
        out.pop();
    }
    out.join("\n")
}

/// Fence character and length if `line` opens a fenced code block.
/// A backtick fence's info string may not contain backticks.
fn opens_fence(line: &str) -> Option<(char, usize)> {
    let body = line.trim_start();
    let ch = body.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = body.chars().take_while(|c| *c == ch).count();
    if len < FENCE_MIN {
        return None;
    }
    let info = &body[len * ch.len_utf8()..];
    (ch != '`' || !info.contains('`')).then_some((ch, len))
}

fn closes_fence(line: &str, ch: char, len: usize) -> bool {
    let body = line.trim();
    body.chars().take_while(|c| *c == ch).count() >= len && body.chars().all(|c| c == ch)
}

/// Whether a normalized document has any visible content.
#[must_use]
pub fn is_blank(markdown: &str) -> bool {
    markdown.chars().all(char::is_whitespace)
}
