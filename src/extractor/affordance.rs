//! Tier 3: the page's own copy/export control.
//!
//! Each candidate is clicked, given time to populate the clipboard, and the
//! clipboard is read back. This is the only tier that suspends.

use tracing::{debug, warn};

use super::cascade::{dedupe, exceeds, Harvest};
use super::{Extractor, PageHost, Tier};
use crate::dom::{self, NodeRef, Selection};

/// Interactive elements whose label is checked against the keyword rules.
const INTERACTIVE: &str = "button, [role=\"button\"], a[role=\"button\"]";

/// Known copy/export controls; only the first match of each is tried.
const COPY_SELECTORS: &[&str] = &[
    "button[data-testid*=\"copy\"]",
    "button[aria-label*=\"Copy\"]",
    "button[aria-label*=\"copy\"]",
    "[data-testid=\"copy-button\"]",
    "button[data-testid*=\"copy-conversation\"]",
    "button[aria-label*=\"Copy conversation\"]",
];

/// Whether a lowercase control label reads like "copy/export everything".
pub(crate) fn is_copy_label(label: &str) -> bool {
    const PHRASES: &[&str] = &[
        "copy conversation",
        "copy chat",
        "export conversation",
        "share conversation",
    ];
    PHRASES.iter().any(|p| label.contains(p))
        || (label.contains("export") && (label.contains("conversation") || label.contains("chat")))
        || (label.contains("copy") && (label.contains("all") || label.contains("full")))
}

fn label_of(node: &NodeRef) -> String {
    let sel = Selection::from(*node);
    let text = dom::text_content(&sel);
    let text = text.trim();
    if text.is_empty() {
        node.attr("aria-label")
            .map(|a| a.to_lowercase())
            .unwrap_or_default()
    } else {
        text.to_lowercase()
    }
}

impl<H: PageHost> Extractor<H> {
    /// Candidates in trial order: keyword matches first, then the fixed
    /// selector list.
    pub(crate) fn copy_candidates(&self) -> Vec<NodeRef<'_>> {
        let doc = self.page.document();
        let by_label = dom::query_all(doc, INTERACTIVE)
            .into_iter()
            .filter(|node| is_copy_label(&label_of(node)));
        let by_selector = COPY_SELECTORS
            .iter()
            .filter_map(|css| dom::query_all(doc, css).into_iter().next());
        dedupe(by_label.chain(by_selector))
            .into_iter()
            .filter(|node| self.noise.is_visible(node))
            .collect()
    }

    /// Tier 3.
    pub(crate) async fn copy_affordance(&self) -> Option<Harvest> {
        let min = Tier::CopyAffordance.min_chars(&self.options);
        for node in self.copy_candidates() {
            let control = Selection::from(node);
            if let Err(err) = self.host.activate(&control) {
                debug!(error = %err, "copy control activation failed");
                continue;
            }
            self.host.settle(self.options.copy_settle).await;
            match self.host.read_clipboard().await {
                Ok(text) if exceeds(text.trim(), min) => {
                    debug!(label = %label_of(&node), "copy control produced clipboard text");
                    return Some(Harvest::text(Tier::CopyAffordance, text));
                }
                Ok(text) => {
                    debug!(chars = text.trim().chars().count(), "clipboard text below threshold");
                }
                Err(err) => warn!(error = %err, "clipboard read failed, trying next control"),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::SnapshotHost;
    use crate::options::Options;
    use crate::page::Page;

    #[test]
    fn test_copy_labels() {
        assert!(is_copy_label("copy conversation"));
        assert!(is_copy_label("export chat as markdown"));
        assert!(is_copy_label("copy all"));
        assert!(!is_copy_label("copy"));
        assert!(!is_copy_label("export"));
        assert!(!is_copy_label("share"));
    }

    #[test]
    fn test_candidates_are_ordered_and_unique() {
        let page = Page::parse(
            r#"<body>
            <button id="attr" data-testid="copy-turn">icon</button>
            <button id="text">Copy conversation</button>
            <div role="button" id="aria" aria-label="Export chat"></div>
            <button id="hidden" style="display:none">Copy all</button>
            </body>"#,
        );
        let ex = Extractor::new(page, SnapshotHost).with_options(Options::immediate());
        let ids: Vec<String> = ex
            .copy_candidates()
            .iter()
            .filter_map(|n| n.attr("id").map(|a| a.to_string()))
            .collect();
        assert_eq!(ids, vec!["text", "aria", "attr"]);
    }

    #[tokio::test]
    async fn test_snapshot_host_has_no_clipboard() {
        let page = Page::parse(r#"<button>Copy conversation</button>"#);
        let ex = Extractor::new(page, SnapshotHost).with_options(Options::immediate());
        assert!(ex.copy_affordance().await.is_none());
    }
}
