//! The short-circuiting cascade and its DOM-synchronous tiers.
//!
//! Tiers 1, 2 and 4 through 7 run to completion without yielding. Tier 3
//! lives in `affordance` because it suspends.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{Extractor, PageHost, Tier};
use crate::dom::{self, NodeRef, Selection};
use crate::result::ExtractionResult;

/// Generic content containers, probed in order.
pub(crate) const DEEP_TARGET_SELECTORS: &[&str] = &[
    "article",
    "main",
    "[role=\"article\"]",
    "[role=\"main\"]",
    ".content",
    ".post",
    ".message",
    ".chat-message",
    "div[role=\"presentation\"]",
];

/// Chat and app containers, probed in order.
pub(crate) const CONTAINER_SELECTORS: &[&str] = &[
    "main > div > div > div.overflow-y-auto",
    "div[data-testid*=\"conversation\"]",
    "div[role=\"presentation\"] > div > div > div",
    "div[data-testid*=\"conversation-turn\"]",
    "div[data-message-author-role]",
    "div[role=\"log\"]",
    "div[aria-live=\"polite\"]",
    "div[data-message-id]",
    "main > div > div",
    "div[class*=\"Message\"]",
    "div.chat-container",
    "div.conversation",
    "div.messages",
    "div[class*=\"chat\"]",
    "div[class*=\"conversation\"]",
    "div[class*=\"message\"]",
    "main",
    "article",
];

/// Controls that reveal collapsed content.
const EXPAND_CONTROLS: &str = "button, [role=\"button\"]";
const EXPAND_KEYWORDS: &[&str] = &["show more", "expand", "view more"];

/// Content produced by the winning tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harvest {
    pub tier: Tier,
    pub content: String,
    pub is_html: bool,
    /// Tier-specific title (adapters only); the page title otherwise.
    pub title: Option<String>,
}

impl Harvest {
    fn markup(tier: Tier, content: String) -> Self {
        Self {
            tier,
            content,
            is_html: true,
            title: None,
        }
    }

    pub(crate) fn text(tier: Tier, content: String) -> Self {
        Self {
            tier,
            content,
            is_html: false,
            title: None,
        }
    }

    /// Wrap as a successful result, preferring the tier's own title.
    #[must_use]
    pub fn into_result(self, page_title: String) -> ExtractionResult {
        let title = self
            .title
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(page_title);
        ExtractionResult::found(self.content, self.is_html, title, Some(self.tier))
    }
}

/// Strict "longer than" check in characters.
pub(crate) fn exceeds(text: &str, threshold: Option<usize>) -> bool {
    threshold.is_none_or(|min| text.chars().count() > min)
}

impl<H: PageHost> Extractor<H> {
    /// Run `tiers` in order; the first one that produces content wins.
    pub(crate) async fn run_cascade(&self, tiers: &[Tier]) -> Option<Harvest> {
        self.cascade(tiers, false).await
    }

    /// As [`Self::run_cascade`]; `exclude_code` keeps `pre`/`code` out of
    /// the structural walk.
    pub(crate) async fn cascade(&self, tiers: &[Tier], exclude_code: bool) -> Option<Harvest> {
        for &tier in tiers {
            debug!(%tier, side_effects = tier.has_side_effects(), suspends = tier.suspends(), "trying tier");
            let harvest = match tier {
                Tier::AdapterMatch => self.adapter_match(),
                Tier::UserSelection => self.user_selection(),
                Tier::CopyAffordance => self.copy_affordance().await,
                Tier::DeepTarget => self.deep_target(),
                Tier::ContainerDrill => self.container_drill(),
                Tier::StructuralWalk => self.structural_walk(exclude_code),
                Tier::FullBody => Some(self.full_body()),
            };
            if let Some(harvest) = harvest {
                info!(%tier, rank = tier.rank(), is_html = harvest.is_html, "tier produced content");
                return Some(harvest);
            }
        }
        None
    }

    /// Tier 1.
    pub(crate) fn adapter_match(&self) -> Option<Harvest> {
        let host = self.page.hostname()?;
        let found = self.registry.resolve(&host, self.page.document())?;
        debug!(adapter = %found.adapter, host = %host, "adapter resolved");
        Some(Harvest {
            title: Some(found.title),
            ..Harvest::markup(Tier::AdapterMatch, found.content_html)
        })
    }

    /// Tier 2.
    pub(crate) fn user_selection(&self) -> Option<Harvest> {
        let selection = self.page.selection()?;
        let min = Tier::UserSelection.min_chars(&self.options);
        if !exceeds(selection.text.trim(), min) || selection.html.trim().is_empty() {
            return None;
        }
        Some(Harvest::markup(Tier::UserSelection, selection.html.clone()))
    }

    /// Tier 4.
    pub(crate) fn deep_target(&self) -> Option<Harvest> {
        let min = Tier::DeepTarget.min_chars(&self.options);
        let doc = self.page.document();
        DEEP_TARGET_SELECTORS.iter().find_map(|css| {
            let element = dom::query(doc, css)?;
            if !exceeds(&dom::inner_text(&element), min) {
                return None;
            }
            debug!(selector = css, "deep target accepted");
            Some(Harvest::markup(
                Tier::DeepTarget,
                dom::inner_html(&element).to_string(),
            ))
        })
    }

    /// Tier 5.
    pub(crate) fn container_drill(&self) -> Option<Harvest> {
        let min = Tier::ContainerDrill.min_chars(&self.options);
        let threshold = min.unwrap_or(0);
        let doc = self.page.document();
        for css in CONTAINER_SELECTORS {
            let candidates = dom::query_all(doc, css);
            if candidates.is_empty() {
                continue;
            }
            let mut best: Option<(usize, Selection)> = None;
            for node in candidates {
                let candidate = Selection::from(node);
                self.expand_collapsed(&candidate);
                let html_len = dom::inner_html(&candidate).chars().count();
                let text_len = dom::inner_text(&candidate).chars().count();
                let size = html_len.max(text_len);
                if size > threshold && best.as_ref().is_none_or(|(s, _)| size > *s) {
                    best = Some((size, candidate));
                }
            }
            let Some((size, winner)) = best else {
                continue;
            };
            let html = dom::inner_html(&winner);
            if exceeds(html.trim(), min) {
                debug!(selector = css, size, "container drill accepted markup");
                return Some(Harvest::markup(Tier::ContainerDrill, html.to_string()));
            }
            let text = dom::inner_text(&winner);
            if exceeds(text.trim(), min) {
                debug!(selector = css, size, "container drill accepted text");
                return Some(Harvest::text(Tier::ContainerDrill, text));
            }
        }
        None
    }

    /// Click every "show more" style control inside `container`.
    fn expand_collapsed(&self, container: &Selection) {
        for node in dom::query_within(container, EXPAND_CONTROLS) {
            let control = Selection::from(node);
            let label = dom::text_content(&control).to_lowercase();
            if !EXPAND_KEYWORDS.iter().any(|k| label.contains(k)) {
                continue;
            }
            if let Err(err) = self.host.activate(&control) {
                debug!(error = %err, "expand control activation failed");
            }
        }
    }

    /// Tier 6.
    pub(crate) fn structural_walk(&self, exclude_code: bool) -> Option<Harvest> {
        let body = self.page.body();
        let mut chunks = Vec::new();
        for node in body.nodes() {
            self.collect_text(node, exclude_code, &mut chunks);
        }
        let text = chunks.join("\n\n");
        if exceeds(&text, Tier::StructuralWalk.min_chars(&self.options)) {
            Some(Harvest::text(Tier::StructuralWalk, text))
        } else {
            debug!(chars = text.chars().count(), "structural walk below threshold");
            None
        }
    }

    fn collect_text(&self, node: &NodeRef, exclude_code: bool, out: &mut Vec<String>) {
        if node.is_text() {
            let text = node.text();
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
            return;
        }
        if node.is_element() {
            if self.noise.rejects(node) {
                return;
            }
            if exclude_code && dom::node_tag(node).is_some_and(|t| t == "pre" || t == "code") {
                return;
            }
        }
        let mut child = node.first_child();
        while let Some(current) = child {
            self.collect_text(&current, exclude_code, out);
            child = current.next_sibling();
        }
    }

    /// Tier 7. Never fails; the content may be empty.
    pub(crate) fn full_body(&self) -> Harvest {
        let html = self.noise.stripped_body_html(self.page.document());
        Harvest::markup(Tier::FullBody, html)
    }
}

/// Distinct nodes in first-seen order.
pub(crate) fn dedupe<'a>(nodes: impl IntoIterator<Item = NodeRef<'a>>) -> Vec<NodeRef<'a>> {
    let mut seen = HashSet::new();
    nodes.into_iter().filter(|n| seen.insert(n.id)).collect()
}
