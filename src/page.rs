//! The page an extractor runs against.
//!
//! A `Page` is the extractor's view of its execution context: the live
//! document, the address it was loaded from, and whatever the user has
//! selected. It is owned by a single page-side task and never shared.

use url::Url;

use crate::dom::{self, Document, Selection};
use crate::encoding;

/// Title used when the document has none.
pub const UNTITLED: &str = "Untitled";

/// The user's active text selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSelection {
    /// What `toString()` of the selection would give.
    pub text: String,
    /// Markup of the cloned selection range.
    pub html: String,
}

impl UserSelection {
    #[must_use]
    pub fn new(text: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            html: html.into(),
        }
    }

    /// A selection of plain text; its markup is the escaped text.
    #[must_use]
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let html = dom::escape_text(&text);
        Self { text, html }
    }

    /// Simulate selecting every element matching `selector` on `page`.
    /// Returns `None` when nothing matches.
    #[must_use]
    pub fn from_elements(page: &Page, selector: &str) -> Option<Self> {
        let nodes = dom::query_all(page.document(), selector);
        if nodes.is_empty() {
            return None;
        }
        let mut text = Vec::with_capacity(nodes.len());
        let mut html = String::new();
        for node in nodes {
            let sel = Selection::from(node);
            text.push(dom::inner_text(&sel));
            html.push_str(&dom::outer_html(&sel));
        }
        Some(Self {
            text: text.join("\n"),
            html,
        })
    }
}

/// A parsed page plus the context the extractor can observe.
pub struct Page {
    document: Document,
    url: Option<Url>,
    selection: Option<UserSelection>,
}

impl Page {
    /// Parse a page from markup.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            document: dom::parse(html),
            url: None,
            selection: None,
        }
    }

    /// Parse a page from raw bytes, detecting the character encoding.
    #[must_use]
    pub fn from_bytes(html: &[u8]) -> Self {
        Self::parse(&encoding::decode_html(html))
    }

    /// Attach the address the page was loaded from. Unparseable addresses
    /// are dropped; hostname-based behaviour then simply does not apply.
    #[must_use]
    pub fn with_url(mut self, url: &str) -> Self {
        match Url::parse(url) {
            Ok(parsed) => self.url = Some(parsed),
            Err(err) => {
                tracing::warn!(url, error = %err, "ignoring unparseable page url");
                self.url = None;
            }
        }
        self
    }

    /// Attach the user's current selection.
    #[must_use]
    pub fn with_selection(mut self, selection: UserSelection) -> Self {
        self.selection = Some(selection);
        self
    }

    /// Replace (or clear) the current selection.
    pub fn set_selection(&mut self, selection: Option<UserSelection>) {
        self.selection = selection;
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub fn url(&self) -> Option<&Url> {
        self.url.as_ref()
    }

    /// Lowercase hostname, when the page has an address with a host.
    #[must_use]
    pub fn hostname(&self) -> Option<String> {
        self.url
            .as_ref()
            .and_then(Url::host_str)
            .map(str::to_ascii_lowercase)
    }

    #[must_use]
    pub fn selection(&self) -> Option<&UserSelection> {
        self.selection.as_ref()
    }

    /// The `<body>` element.
    #[must_use]
    pub fn body(&self) -> Selection<'_> {
        self.document.select("body")
    }

    /// Document title, or [`UNTITLED`].
    #[must_use]
    pub fn title(&self) -> String {
        let title = dom::text_content(&self.document.select("head title"));
        let title = title.trim();
        if title.is_empty() {
            UNTITLED.to_string()
        } else {
            title.to_string()
        }
    }
}

impl std::fmt::Debug for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Page")
            .field("url", &self.url.as_ref().map(Url::as_str))
            .field("selection", &self.selection)
            .finish_non_exhaustive()
    }
}
