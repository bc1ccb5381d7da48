//! Post-processing for the code-only and summary-only modes.

use crate::dom::{self, Document, Selection};
use crate::patterns::BLANK_LINE;

pub const NO_CODE_BLOCKS: &str = "No code blocks found";
pub const NO_CONTEXT: &str = "No context found";

/// Separator between collected code blocks.
pub const CODE_SEPARATOR: &str = "\n\n---\n\n";

/// Marker placed between the head and tail of a condensed summary.
pub const ELLIPSIS: &str = "...";

/// Text of every `<pre>` and every `<code>` outside a `<pre>`, in document
/// order, joined by [`CODE_SEPARATOR`]. `None` when there are none.
#[must_use]
pub fn code_blocks(doc: &Document) -> Option<String> {
    let blocks: Vec<String> = dom::query_all(doc, "pre, code")
        .into_iter()
        .filter(|node| {
            dom::node_tag(node).as_deref() == Some("pre") || !dom::has_ancestor_tag(node, "pre")
        })
        .map(|node| dom::text_content(&Selection::from(node)).trim().to_string())
        .filter(|text| !text.is_empty())
        .collect();
    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join(CODE_SEPARATOR))
    }
}

/// Rendered text of a markup fragment with `pre`/`code` removed.
#[must_use]
pub fn text_without_code(html: &str) -> String {
    let doc = dom::parse(html);
    dom::inner_text_excluding(&doc.select("body"), |node| {
        matches!(dom::node_tag(node).as_deref(), Some("pre" | "code"))
    })
}

/// Split `text` into blank-line separated paragraphs. With more than `max`
/// paragraphs, keep the first and last `edge` around an ellipsis.
///
/// ```rust
/// use rs_capture::extractor::modes::condense;
///
/// let text = (1..=8).map(|i| format!("p{i}")).collect::<Vec<_>>().join("\n\n");
/// assert_eq!(
///     condense(&text, 6, 3).as_deref(),
///     Some("p1\n\np2\n\np3\n\n...\n\np6\n\np7\n\np8")
/// );
/// assert_eq!(condense(" \n\n ", 6, 3), None);
/// ```
#[must_use]
pub fn condense(text: &str, max: usize, edge: usize) -> Option<String> {
    let paragraphs: Vec<&str> = BLANK_LINE
        .split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect();
    if paragraphs.is_empty() {
        return None;
    }
    if paragraphs.len() <= max || edge * 2 >= paragraphs.len() {
        return Some(paragraphs.join("\n\n"));
    }
    let mut kept: Vec<&str> = paragraphs[..edge].to_vec();
    kept.push(ELLIPSIS);
    kept.extend_from_slice(&paragraphs[paragraphs.len() - edge..]);
    Some(kept.join("\n\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_blocks_skip_nested_code() {
        let doc = dom::parse(
            "<p>Use <code>cargo</code>:</p><pre><code>cargo build\n</code></pre><pre>  </pre>",
        );
        assert_eq!(
            code_blocks(&doc).as_deref(),
            Some("cargo\n\n---\n\ncargo build")
        );
    }

    #[test]
    fn test_no_code_blocks() {
        assert!(code_blocks(&dom::parse("<p>Prose only</p>")).is_none());
    }

    #[test]
    fn test_text_without_code() {
        let text = text_without_code("<p>Intro</p><pre>let x = 1;</pre><p>See <code>x</code> here</p>");
        assert_eq!(text, "Intro\n\nSee here");
    }

    #[test]
    fn test_condense_keeps_short_text() {
        let text = "a\n\nb\n   \nc";
        assert_eq!(condense(text, 6, 3).as_deref(), Some("a\n\nb\n\nc"));
    }

    #[test]
    fn test_condense_exactly_max() {
        let text = (1..=6).map(|i| i.to_string()).collect::<Vec<_>>().join("\n\n");
        assert_eq!(condense(&text, 6, 3).as_deref(), Some(text.as_str()));
    }
}
