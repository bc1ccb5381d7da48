//! Platform adapter registry.
//!
//! Known chat and document platforms are described declaratively: a
//! hostname pattern plus a title selector and a content selector. One
//! generic routine evaluates them, so supporting a new platform is a data
//! change (see [`AdapterRegistry::from_json`]).
//!
//! Selectors target third-party markup and are inherently best-effort.

use serde::{Deserialize, Serialize};

use crate::dom::{self, Document, Selection};
use crate::error::{Error, Result};

/// A platform-specific extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdapterEntry {
    /// Short platform name, used in logs.
    pub name: String,
    /// `example.com` or `*.example.com`; both match the apex and subdomains.
    pub hostname_pattern: String,
    /// Element whose text is the conversation/document title.
    pub title_selector: String,
    /// Element(s) holding the content.
    pub content_selector: String,
}

/// Content resolved through an adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterMatch {
    /// Name of the adapter that resolved.
    pub adapter: String,
    /// Trimmed text of the title element (may be empty).
    pub title: String,
    /// Concatenated outer markup of every content element.
    pub content_html: String,
}

impl AdapterEntry {
    pub fn new(
        name: impl Into<String>,
        hostname_pattern: impl Into<String>,
        title_selector: impl Into<String>,
        content_selector: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            hostname_pattern: hostname_pattern.into(),
            title_selector: title_selector.into(),
            content_selector: content_selector.into(),
        }
    }

    /// Whether this entry applies to `host`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rs_capture::adapters::AdapterEntry;
    ///
    /// let entry = AdapterEntry::new("x", "*.example.com", "h1", "main");
    /// assert!(entry.matches_host("example.com"));
    /// assert!(entry.matches_host("chat.Example.com"));
    /// assert!(!entry.matches_host("notexample.com"));
    /// ```
    #[must_use]
    pub fn matches_host(&self, host: &str) -> bool {
        let pattern = self.hostname_pattern.trim().to_ascii_lowercase();
        let pattern = pattern.strip_prefix("*.").unwrap_or(&pattern);
        if pattern.is_empty() {
            return false;
        }
        let host = host.trim_end_matches('.').to_ascii_lowercase();
        host == pattern
            || host
                .strip_suffix(pattern)
                .is_some_and(|rest| rest.ends_with('.'))
    }

    /// Query both selectors against `doc`.
    ///
    /// Resolves only when the title selector matches an element and the
    /// content selector matches at least one element with non-blank inner
    /// markup (an unrendered, virtualized container does not count).
    #[must_use]
    pub fn apply(&self, doc: &Document) -> Option<AdapterMatch> {
        let title = dom::query(doc, &self.title_selector)?;
        let nodes: Vec<Selection> = dom::query_all(doc, &self.content_selector)
            .into_iter()
            .map(Selection::from)
            .filter(|sel| !dom::inner_html(sel).trim().is_empty())
            .collect();
        if nodes.is_empty() {
            return None;
        }
        let content_html: String = nodes
            .iter()
            .map(|sel| dom::outer_html(sel).to_string())
            .collect();
        Some(AdapterMatch {
            adapter: self.name.clone(),
            title: dom::text_content(&title)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
            content_html,
        })
    }
}

/// Ordered set of adapter entries, evaluated first to last.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRegistry {
    entries: Vec<AdapterEntry>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl AdapterRegistry {
    /// A registry with no entries.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Entries for the chat platforms known at release time.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            entries: vec![
                AdapterEntry::new(
                    "chatgpt",
                    "chatgpt.com",
                    "title",
                    "div[data-message-author-role]",
                ),
                AdapterEntry::new(
                    "chatgpt-legacy",
                    "chat.openai.com",
                    "title",
                    "div[data-message-author-role]",
                ),
                AdapterEntry::new(
                    "claude",
                    "claude.ai",
                    "title",
                    "div[data-testid=\"user-message\"], div.font-claude-message",
                ),
                AdapterEntry::new(
                    "gemini",
                    "gemini.google.com",
                    "title",
                    "user-query, message-content",
                ),
                AdapterEntry::new("ai-studio", "aistudio.google.com", "title", "ms-chat-turn"),
                AdapterEntry::new("perplexity", "perplexity.ai", "h1", "div.prose"),
                AdapterEntry::new("deepseek", "chat.deepseek.com", "title", "div.ds-markdown"),
            ],
        }
    }

    /// Load entries from a JSON array of `AdapterEntry` objects.
    ///
    /// ```rust
    /// use rs_capture::adapters::AdapterRegistry;
    ///
    /// let registry = AdapterRegistry::from_json(r##"[{
    ///     "name": "wiki",
    ///     "hostnamePattern": "wiki.example.org",
    ///     "titleSelector": "h1",
    ///     "contentSelector": "#content"
    /// }]"##)?;
    /// assert_eq!(registry.len(), 1);
    /// # Ok::<(), rs_capture::Error>(())
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let entries: Vec<AdapterEntry> =
            serde_json::from_str(json).map_err(|e| Error::InvalidAdapter(e.to_string()))?;
        if let Some(bad) = entries.iter().find(|e| e.hostname_pattern.trim().is_empty()) {
            return Err(Error::InvalidAdapter(format!(
                "adapter '{}' has an empty hostname pattern",
                bad.name
            )));
        }
        Ok(Self { entries })
    }

    /// Append an entry; it is consulted after every existing entry.
    pub fn register(&mut self, entry: AdapterEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[AdapterEntry] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries whose pattern matches `host`, in registry order.
    pub fn candidates<'a>(&'a self, host: &'a str) -> impl Iterator<Item = &'a AdapterEntry> + 'a {
        self.entries.iter().filter(move |e| e.matches_host(host))
    }

    /// First matching entry that resolves against `doc`.
    #[must_use]
    pub fn resolve(&self, host: &str, doc: &Document) -> Option<AdapterMatch> {
        self.candidates(host).find_map(|entry| {
            let found = entry.apply(doc);
            if found.is_none() {
                tracing::debug!(adapter = %entry.name, host, "adapter matched host but did not resolve");
            }
            found
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_matching() {
        let entry = AdapterEntry::new("c", "claude.ai", "title", "main");
        assert!(entry.matches_host("claude.ai"));
        assert!(entry.matches_host("www.claude.ai"));
        assert!(entry.matches_host("claude.ai."));
        assert!(!entry.matches_host("notclaude.ai"));
        assert!(!entry.matches_host("claude.ai.evil.com"));
        assert!(!AdapterEntry::new("e", "", "a", "b").matches_host("example.com"));
    }

    #[test]
    fn test_apply_concatenates_content() {
        let doc = dom::parse(
            r#"<html><head><title>Thread</title></head><body>
            <div data-message-author-role="user">Question</div>
            <div data-message-author-role="assistant">Answer</div>
            </body></html>"#,
        );
        let registry = AdapterRegistry::builtin();
        let found = registry.resolve("chatgpt.com", &doc).unwrap();
        assert_eq!(found.adapter, "chatgpt");
        assert_eq!(found.title, "Thread");
        assert!(found.content_html.contains("Question"));
        assert!(found.content_html.contains("Answer"));
    }

    #[test]
    fn test_unresolved_entry_falls_through() {
        let mut registry = AdapterRegistry::empty();
        registry.register(AdapterEntry::new("first", "example.com", "h1", "#missing"));
        registry.register(AdapterEntry::new("second", "example.com", "h1", "#content"));
        let doc = dom::parse(r#"<h1>T</h1><div id="content">Body</div>"#);
        assert_eq!(registry.resolve("example.com", &doc).unwrap().adapter, "second");
    }

    #[test]
    fn test_blank_content_does_not_resolve() {
        let entry = AdapterEntry::new("x", "example.com", "h1", "#content");
        let doc = dom::parse(r#"<h1>T</h1><div id="content">  </div>"#);
        assert!(entry.apply(&doc).is_none());
        let doc = dom::parse(r#"<div id="content">x</div>"#);
        assert!(entry.apply(&doc).is_none(), "missing title element");
    }

    #[test]
    fn test_invalid_selector_never_panics() {
        let entry = AdapterEntry::new("bad", "example.com", "h1[", "###");
        let doc = dom::parse("<h1>T</h1>");
        assert!(entry.apply(&doc).is_none());
    }

    #[test]
    fn test_from_json_rejects_empty_pattern() {
        let err = AdapterRegistry::from_json(
            r#"[{"name":"x","hostnamePattern":" ","titleSelector":"h1","contentSelector":"p"}]"#,
        )
        .unwrap_err();
        assert!(matches!(err, Error::InvalidAdapter(_)));
        assert!(AdapterRegistry::from_json("not json").is_err());
    }
}
