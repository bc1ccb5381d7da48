//! Noise filtering.
//!
//! One data-driven rule set, shared by every tier, decides which subtrees
//! are page chrome rather than content: denylisted tags, denylisted class
//! tokens, and elements hidden by inline style.

use std::collections::HashSet;

use crate::dom::{self, Document, NodeRef, Selection};

/// Default element tags that never carry content.
pub const DEFAULT_NOISE_TAGS: &[&str] = &[
    "nav", "footer", "header", "script", "style", "button", "aside", "noscript", "template",
];

/// Default class tokens marking chrome. Matched against whole tokens only,
/// so `ad` rejects `class="ad"` but not `class="heading"`.
pub const DEFAULT_NOISE_CLASSES: &[&str] = &[
    "nav",
    "footer",
    "header",
    "sidebar",
    "menu",
    "toolbar",
    "ad",
    "advertisement",
    "icon",
    "avatar",
    "timestamp",
];

/// Criteria for excluding DOM subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoiseRule {
    tag_denylist: HashSet<String>,
    class_denylist: HashSet<String>,
    check_visibility: bool,
}

impl Default for NoiseRule {
    fn default() -> Self {
        Self::new(
            DEFAULT_NOISE_TAGS.iter().copied(),
            DEFAULT_NOISE_CLASSES.iter().copied(),
        )
    }
}

impl NoiseRule {
    /// Build a rule from tag and class denylists. Visibility checks are on.
    pub fn new<'a>(
        tags: impl IntoIterator<Item = &'a str>,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        Self {
            tag_denylist: tags.into_iter().map(str::to_ascii_lowercase).collect(),
            class_denylist: classes.into_iter().map(str::to_string).collect(),
            check_visibility: true,
        }
    }

    /// Enable or disable the inline-style visibility predicate.
    #[must_use]
    pub fn with_visibility_check(mut self, enabled: bool) -> Self {
        self.check_visibility = enabled;
        self
    }

    /// Whether `tag` is denylisted.
    #[must_use]
    pub fn is_noise_tag(&self, tag: &str) -> bool {
        self.tag_denylist.contains(&tag.to_ascii_lowercase())
    }

    /// Whether any of the node's class tokens is denylisted.
    #[must_use]
    pub fn has_noise_class(&self, node: &NodeRef) -> bool {
        dom::class_tokens(node)
            .iter()
            .any(|token| self.class_denylist.contains(token))
    }

    /// Tag or class match on a single element (markup noise only).
    #[must_use]
    pub fn is_markup_noise(&self, node: &NodeRef) -> bool {
        dom::node_tag(node).is_some_and(|t| self.is_noise_tag(&t)) || self.has_noise_class(node)
    }

    /// Whether this element, on its own, is rejected: denylisted tag,
    /// denylisted class, or (when enabled) hidden.
    #[must_use]
    pub fn rejects(&self, node: &NodeRef) -> bool {
        node.is_element()
            && (self.is_markup_noise(node) || (self.check_visibility && dom::is_hidden(node)))
    }

    /// Whether a node and all of its ancestors are visible.
    ///
    /// This is the visibility predicate only; denylisted tags do not make
    /// an element invisible.
    #[must_use]
    pub fn is_visible(&self, node: &NodeRef) -> bool {
        if !self.check_visibility {
            return true;
        }
        let mut current = Some(*node);
        while let Some(n) = current {
            if dom::is_hidden(&n) {
                return false;
            }
            current = n.parent();
        }
        true
    }

    /// Remove every denylisted tag/class subtree below `root`, in place.
    /// Returns the number of subtrees removed.
    pub fn strip(&self, root: &Selection) -> usize {
        let doomed: Vec<NodeRef> = dom::query_within(root, "*")
            .into_iter()
            .filter(|node| self.is_markup_noise(node))
            .collect();
        for node in &doomed {
            Selection::from(*node).remove();
        }
        doomed.len()
    }

    /// Clone `doc`, strip noise from the clone's body, and return its inner
    /// markup. The page itself is untouched.
    #[must_use]
    pub fn stripped_body_html(&self, doc: &Document) -> String {
        let clone = dom::clone_document(doc);
        let body = clone.select("body");
        let removed = self.strip(&body);
        tracing::trace!(removed, "stripped noise subtrees from body clone");
        dom::inner_html(&body).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first<'a>(doc: &'a Document, css: &str) -> NodeRef<'a> {
        doc.select(css).nodes()[0]
    }

    #[test]
    fn test_rejects_tags_and_classes() {
        let doc = dom::parse(
            r#"<nav id="n">x</nav><div id="s" class="x sidebar">y</div><div id="h" class="heading">z</div>"#,
        );
        let rule = NoiseRule::default();
        assert!(rule.rejects(&first(&doc, "#n")));
        assert!(rule.rejects(&first(&doc, "#s")));
        assert!(!rule.rejects(&first(&doc, "#h")));
    }

    #[test]
    fn test_visibility_predicate() {
        let doc = dom::parse(
            r#"<div style="opacity:0"><p id="inner">x</p></div><p id="shown">y</p>"#,
        );
        let rule = NoiseRule::default();
        assert!(!rule.is_visible(&first(&doc, "#inner")));
        assert!(rule.is_visible(&first(&doc, "#shown")));

        let lax = NoiseRule::default().with_visibility_check(false);
        assert!(lax.is_visible(&first(&doc, "#inner")));
    }

    #[test]
    fn test_strip_removes_subtrees() {
        let doc = dom::parse(
            r#"<body><header>H</header><p>Body</p><div class="ad"><p>Buy</p></div><footer>F</footer></body>"#,
        );
        let rule = NoiseRule::default();
        let html = rule.stripped_body_html(&doc);
        assert_eq!(html.trim(), "<p>Body</p>");
        // Original page is untouched
        assert!(doc.select("header").exists());
    }

    #[test]
    fn test_custom_rule() {
        let rule = NoiseRule::new(["marquee"], ["promo"]);
        assert!(rule.is_noise_tag("MARQUEE"));
        assert!(!rule.is_noise_tag("nav"));
        let doc = dom::parse(r#"<div class="promo">x</div>"#);
        assert!(rule.has_noise_class(&first(&doc, "div")));
    }
}
