//! DOM Operations Adapter
//!
//! Thin layer over the `dom_query` crate giving the extractor a small,
//! consistent vocabulary: parsing, cloning, attribute and class access,
//! inline-style visibility, and an approximation of rendered text.
//!
//! There is no layout engine here. "Rendered" text is computed from markup
//! alone: whitespace is collapsed like a browser would, block elements break
//! lines, and elements hidden by inline style are skipped.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

// === Parsing ===

/// Parse HTML string into document
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// Deep-clone a document so it can be pruned without touching the page.
pub fn clone_document(doc: &Document) -> Document {
    Document::from(doc.html().to_string())
}

// === Querying ===

/// First element matching `selector` in the document.
///
/// Selectors come from data tables and may be malformed; a selector that
/// fails to parse simply matches nothing.
#[must_use]
pub fn query<'a>(doc: &'a Document, selector: &str) -> Option<Selection<'a>> {
    doc.try_select(selector)
        .and_then(|sel| sel.nodes().first().copied().map(Selection::from))
}

/// All elements matching `selector` in the document, in document order.
#[must_use]
pub fn query_all<'a>(doc: &'a Document, selector: &str) -> Vec<NodeRef<'a>> {
    doc.try_select(selector)
        .map(|sel| sel.nodes().to_vec())
        .unwrap_or_default()
}

/// All elements matching `selector` below `root`, in document order.
#[must_use]
pub fn query_within<'a>(root: &Selection<'a>, selector: &str) -> Vec<NodeRef<'a>> {
    root.try_select(selector)
        .map(|sel| sel.nodes().to_vec())
        .unwrap_or_default()
}

// === Node Information ===

/// Tag name of a single node, `None` for text and comment nodes.
#[must_use]
pub fn node_tag(node: &NodeRef) -> Option<String> {
    if node.is_element() {
        node.node_name().map(|t| t.to_ascii_lowercase())
    } else {
        None
    }
}

/// Get any attribute value
#[inline]
#[must_use]
pub fn get_attribute(sel: &Selection, name: &str) -> Option<String> {
    sel.attr(name).map(|s| s.to_string())
}

/// Whitespace-separated class tokens of a node.
#[must_use]
pub fn class_tokens(node: &NodeRef) -> Vec<String> {
    node.attr("class")
        .map(|c| c.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// True when any ancestor of `node` (excluding itself) has tag `tag`.
#[must_use]
pub fn has_ancestor_tag(node: &NodeRef, tag: &str) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if node_tag(&parent).is_some_and(|t| t == tag) {
            return true;
        }
        current = parent.parent();
    }
    false
}

// === Text Content ===

/// Get all text content of node and descendants, unrendered.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}

/// Get inner HTML content
#[inline]
#[must_use]
pub fn inner_html(sel: &Selection) -> StrTendril {
    sel.inner_html()
}

/// Get outer HTML content
#[inline]
#[must_use]
pub fn outer_html(sel: &Selection) -> StrTendril {
    sel.html()
}

/// Escape text for embedding in markup.
#[must_use]
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

// === Visibility ===

/// True when the element is hidden by its own inline style or `hidden`
/// attribute. Ancestors are not consulted.
#[must_use]
pub fn is_hidden(node: &NodeRef) -> bool {
    if !node.is_element() {
        return false;
    }
    if node.has_attr("hidden") {
        return true;
    }
    node.attr("style")
        .is_some_and(|style| style_hides(&style))
}

/// Whether an inline `style` declaration block hides its element.
#[must_use]
pub fn style_hides(style: &str) -> bool {
    style.split(';').any(|decl| {
        let Some((prop, value)) = decl.split_once(':') else {
            return false;
        };
        let prop = prop.trim().to_ascii_lowercase();
        let value = value
            .trim()
            .trim_end_matches("!important")
            .trim()
            .to_ascii_lowercase();
        match prop.as_str() {
            "display" => value == "none",
            "visibility" => value == "hidden" || value == "collapse",
            "opacity" => value.parse::<f32>().is_ok_and(|v| v <= 0.0),
            _ => false,
        }
    })
}

// === Rendered Text ===

/// Tags whose content never renders as text.
const NON_RENDERED_TAGS: &[&str] = &[
    "script", "style", "noscript", "template", "head", "title", "meta", "link",
];

/// Blocks separated from their neighbours by a blank line.
const PARAGRAPH_TAGS: &[&str] = &[
    "p", "h1", "h2", "h3", "h4", "h5", "h6", "pre", "blockquote", "ul", "ol", "table",
    "article", "section",
];

/// Blocks separated from their neighbours by a single line break.
const LINE_TAGS: &[&str] = &[
    "address", "aside", "details", "dialog", "dd", "div", "dl", "dt", "fieldset",
    "figcaption", "figure", "footer", "form", "header", "hgroup", "li", "main", "nav",
    "summary", "tr", "caption", "tbody", "thead", "tfoot",
];

/// Approximate `innerText` of a selection.
///
/// Whitespace is collapsed outside `<pre>`, block elements introduce line
/// breaks (a blank line for paragraph-like blocks), `<br>` is a newline,
/// table cells are tab separated, and non-rendered or inline-hidden
/// elements are skipped.
///
/// # Example
///
/// ```rust
/// use rs_capture::dom;
///
/// let doc = dom::parse("<div><p>One  two</p><p>Three<br>four</p></div>");
/// assert_eq!(dom::inner_text(&doc.select("div")), "One two\n\nThree\nfour");
/// ```
#[must_use]
pub fn inner_text(sel: &Selection) -> String {
    inner_text_excluding(sel, |_| false)
}

/// Like [`inner_text`], additionally skipping every element for which
/// `skip` returns true (with its whole subtree).
#[must_use]
pub fn inner_text_excluding<F>(sel: &Selection, skip: F) -> String
where
    F: Fn(&NodeRef) -> bool,
{
    let mut buffer = TextBuffer::default();
    for node in sel.nodes() {
        render_node(node, &mut buffer, false, &skip);
    }
    buffer.finish()
}

fn render_node<F>(node: &NodeRef, out: &mut TextBuffer, preformatted: bool, skip: &F)
where
    F: Fn(&NodeRef) -> bool,
{
    if node.is_text() {
        out.push_text(&node.text(), preformatted);
        return;
    }
    if !node.is_element() {
        // Document and fragment roots carry children; comments do not.
        render_children(node, out, preformatted, skip);
        return;
    }

    let tag = node_tag(node).unwrap_or_default();
    if NON_RENDERED_TAGS.contains(&tag.as_str()) || is_hidden(node) || skip(node) {
        return;
    }

    match tag.as_str() {
        "br" => out.push_break(1),
        "td" | "th" => {
            out.push_cell_gap();
            render_children(node, out, preformatted, skip);
        }
        t if PARAGRAPH_TAGS.contains(&t) => {
            out.push_break(2);
            render_children(node, out, preformatted || t == "pre", skip);
            out.push_break(2);
        }
        t if LINE_TAGS.contains(&t) => {
            out.push_break(1);
            render_children(node, out, preformatted, skip);
            out.push_break(1);
        }
        _ => render_children(node, out, preformatted, skip),
    }
}

fn render_children<F>(node: &NodeRef, out: &mut TextBuffer, preformatted: bool, skip: &F)
where
    F: Fn(&NodeRef) -> bool,
{
    let mut child = node.first_child();
    while let Some(current) = child {
        render_node(&current, out, preformatted, skip);
        child = current.next_sibling();
    }
}

/// Accumulates rendered text, deferring separators until the next visible
/// character so output never starts or ends with whitespace.
#[derive(Default)]
struct TextBuffer {
    out: String,
    pending_breaks: usize,
    pending_space: bool,
    pending_tab: bool,
}

impl TextBuffer {
    fn push_text(&mut self, text: &str, preformatted: bool) {
        if preformatted {
            if text.is_empty() {
                return;
            }
            self.flush_pending();
            self.out.push_str(text);
            return;
        }
        for ch in text.chars() {
            if ch.is_whitespace() {
                if self.pending_breaks == 0 && !self.ends_with_whitespace() {
                    self.pending_space = true;
                }
            } else {
                self.flush_pending();
                self.out.push(ch);
            }
        }
    }

    fn push_break(&mut self, count: usize) {
        self.pending_breaks = self.pending_breaks.max(count);
        self.pending_space = false;
        self.pending_tab = false;
    }

    fn push_cell_gap(&mut self) {
        if self.pending_breaks == 0 && !self.out.is_empty() && !self.out.ends_with('\n') {
            self.pending_tab = true;
            self.pending_space = false;
        }
    }

    fn ends_with_whitespace(&self) -> bool {
        self.out.is_empty() || self.out.ends_with(char::is_whitespace)
    }

    fn flush_pending(&mut self) {
        if !self.out.is_empty() {
            if self.pending_breaks > 0 {
                let existing = self.out.chars().rev().take_while(|&c| c == '\n').count();
                for _ in existing..self.pending_breaks {
                    self.out.push('\n');
                }
            } else if self.pending_tab {
                self.out.push('\t');
            } else if self.pending_space {
                self.out.push(' ');
            }
        }
        self.pending_breaks = 0;
        self.pending_space = false;
        self.pending_tab = false;
    }

    fn finish(self) -> String {
        self.out.trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_ignores_invalid_selector() {
        let doc = parse("<div class=\"a\">x</div>");
        assert!(query(&doc, "div[").is_none());
        assert!(query_all(&doc, ":::").is_empty());
        assert!(query(&doc, "div.a").is_some());
    }

    #[test]
    fn test_tag_and_classes() {
        let doc = parse(r#"<section class=" one  two ">x</section>"#);
        let section = doc.select("section");
        let node = section.nodes()[0];
        assert_eq!(node_tag(&node), Some("section".to_string()));
        assert_eq!(class_tokens(&node), vec!["one", "two"]);
    }

    #[test]
    fn test_style_hides() {
        assert!(style_hides("display: none"));
        assert!(style_hides("color:red; visibility:hidden"));
        assert!(style_hides("opacity: 0"));
        assert!(style_hides("opacity:0.0 !important"));
        assert!(style_hides("DISPLAY:NONE"));
        assert!(!style_hides("display:block; opacity:0.5"));
        assert!(!style_hides("broken"));
    }

    #[test]
    fn test_hidden_attribute() {
        let doc = parse(r#"<div id="a" hidden>x</div><div id="b">y</div>"#);
        assert!(is_hidden(&doc.select("#a").nodes()[0]));
        assert!(!is_hidden(&doc.select("#b").nodes()[0]));
    }

    #[test]
    fn test_inner_text_collapses_whitespace() {
        let doc = parse("<div>  Hello \n\n   <b>world</b>  again </div>");
        assert_eq!(inner_text(&doc.select("div")), "Hello world again");
    }

    #[test]
    fn test_inner_text_paragraph_breaks() {
        let doc = parse("<article><h2>Title</h2><p>First</p><p>Second</p><div>Line</div></article>");
        assert_eq!(
            inner_text(&doc.select("article")),
            "Title\n\nFirst\n\nSecond\n\nLine"
        );
    }

    #[test]
    fn test_inner_text_preserves_pre() {
        let doc = parse("<div><p>Intro</p><pre>let x = 1;\n    x + 1</pre></div>");
        assert_eq!(
            inner_text(&doc.select("div")),
            "Intro\n\nlet x = 1;\n    x + 1"
        );
    }

    #[test]
    fn test_inner_text_skips_hidden_and_scripts() {
        let doc = parse(
            r#"<div>Shown<script>var x;</script><span style="display:none">Hidden</span></div>"#,
        );
        assert_eq!(inner_text(&doc.select("div")), "Shown");
    }

    #[test]
    fn test_inner_text_excluding_subtrees() {
        let doc = parse("<div><p>Keep</p><pre>drop</pre><p>Also</p></div>");
        let text = inner_text_excluding(&doc.select("div"), |n| {
            node_tag(n).is_some_and(|t| t == "pre")
        });
        assert_eq!(text, "Keep\n\nAlso");
    }

    #[test]
    fn test_has_ancestor_tag() {
        let doc = parse("<pre><code>x</code></pre><code>y</code>");
        let codes = doc.select("code");
        let nodes = codes.nodes();
        assert!(has_ancestor_tag(&nodes[0], "pre"));
        assert!(!has_ancestor_tag(&nodes[1], "pre"));
    }

    #[test]
    fn test_escape_text() {
        assert_eq!(escape_text("a < b & c > d"), "a &lt; b &amp; c &gt; d");
    }

    #[test]
    fn test_clone_document_is_independent() {
        let doc = parse(r#"<div id="original">content</div>"#);
        let cloned = clone_document(&doc);
        cloned.select("#original").remove();
        assert!(doc.select("#original").exists());
        assert!(!cloned.select("#original").exists());
    }
}
