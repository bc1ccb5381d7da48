//! Page-side tier cascade extractor.
//!
//! The extractor lives inside the page's execution context. It owns the
//! [`Page`], reaches the outside world only through a [`PageHost`], and
//! answers one [`ExtractionRequest`] at a time with exactly one
//! [`ExtractionResult`].
//!
//! # Module Structure
//!
//! - `tiers`: the fixed, ranked set of strategies
//! - `cascade`: the synchronous tiers and the short-circuiting driver
//! - `affordance`: the clipboard-backed copy/export tier
//! - `modes`: code-only and summary-only post-processing
//!
//! The page context is single threaded: nothing here is `Send`, and the
//! extractor is expected to run on a `tokio::task::LocalSet`.
//!
//! # Usage
//!
//! ```rust
//! use rs_capture::extractor::{Extractor, SnapshotHost, Tier};
//! use rs_capture::{ExtractMode, Options, Page};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_time().build()?.block_on(async {
//! let page = Page::parse("<body><article><p>An article that is comfortably longer than fifty characters.</p></article></body>");
//! let extractor = Extractor::new(page, SnapshotHost).with_options(Options::immediate());
//! let result = extractor.extract(ExtractMode::Persist).await;
//! assert!(result.success);
//! assert_eq!(result.tier, Some(Tier::DeepTarget));
//! # });
//! # Ok::<(), std::io::Error>(())
//! ```

mod affordance;
mod cascade;
pub mod modes;
mod tiers;

use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::adapters::AdapterRegistry;
use crate::channel::InboundMessage;
use crate::dom::Selection;
use crate::error::{Error, Result};
use crate::noise::NoiseRule;
use crate::options::Options;
use crate::page::Page;
use crate::result::{ExtractMode, ExtractionRequest, ExtractionResult};

pub use cascade::Harvest;
pub use tiers::Tier;

/// Reason reported when the cascade produced nothing at all.
pub const NO_CONTENT: &str = "No content found";

/// Capabilities the page context offers the extractor beyond the DOM.
#[async_trait(?Send)]
pub trait PageHost {
    /// Simulate a user activation (click) on `element`. The page may react
    /// by mutating the document.
    fn activate(&self, element: &Selection<'_>) -> Result<()>;

    /// Read the system clipboard.
    async fn read_clipboard(&self) -> Result<String>;

    /// Yield for `delay` so the page can react to an activation.
    async fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait(?Send)]
impl<T: PageHost + ?Sized> PageHost for Rc<T> {
    fn activate(&self, element: &Selection<'_>) -> Result<()> {
        (**self).activate(element)
    }

    async fn read_clipboard(&self) -> Result<String> {
        (**self).read_clipboard().await
    }

    async fn settle(&self, delay: Duration) {
        (**self).settle(delay).await;
    }
}

/// Host for static snapshots: clicks do nothing and there is no clipboard.
#[derive(Debug, Clone, Copy, Default)]
pub struct SnapshotHost;

#[async_trait(?Send)]
impl PageHost for SnapshotHost {
    fn activate(&self, _element: &Selection<'_>) -> Result<()> {
        Ok(())
    }

    async fn read_clipboard(&self) -> Result<String> {
        Err(Error::Clipboard("snapshot pages have no clipboard".to_string()))
    }

    async fn settle(&self, _delay: Duration) {}
}

/// The page-embedded extractor.
pub struct Extractor<H> {
    page: Page,
    host: H,
    registry: AdapterRegistry,
    noise: NoiseRule,
    options: Options,
}

impl<H: PageHost> Extractor<H> {
    /// Extractor with the built-in adapters, default noise rule and options.
    pub fn new(page: Page, host: H) -> Self {
        Self {
            page,
            host,
            registry: AdapterRegistry::builtin(),
            noise: NoiseRule::default(),
            options: Options::default(),
        }
    }

    #[must_use]
    pub fn with_registry(mut self, registry: AdapterRegistry) -> Self {
        self.registry = registry;
        self
    }

    #[must_use]
    pub fn with_noise(mut self, noise: NoiseRule) -> Self {
        self.noise = noise;
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutable access, e.g. to change the user's selection between requests.
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    /// Answer one request.
    pub async fn handle(&self, request: ExtractionRequest) -> ExtractionResult {
        self.extract(request.mode).await
    }

    /// Wire-level entry point: decode a JSON message, answer it, and encode
    /// the result. Malformed messages get a `success: false` reply rather
    /// than no reply.
    pub async fn handle_json(&self, raw: &str) -> String {
        let result = match serde_json::from_str::<InboundMessage>(raw) {
            Ok(InboundMessage::Extract(request)) => self.handle(request).await,
            Err(err) => {
                warn!(error = %err, "rejecting malformed extraction message");
                ExtractionResult::failed(describe_malformed(raw))
            }
        };
        serde_json::to_string(&result)
            .unwrap_or_else(|_| r#"{"success":false,"error":"Extraction failed"}"#.to_string())
    }

    /// Run the extraction for `mode`.
    pub async fn extract(&self, mode: ExtractMode) -> ExtractionResult {
        let title = self.page.title();
        debug!(%mode, url = ?self.page.url().map(url::Url::as_str), "extraction requested");

        let result = match mode {
            ExtractMode::Persist | ExtractMode::InlinePaste => {
                match self.run_cascade(&Tier::CASCADE).await {
                    Some(harvest) => harvest.into_result(title),
                    None => ExtractionResult::failed(NO_CONTENT).with_title(title),
                }
            }
            ExtractMode::CodeOnly => match modes::code_blocks(self.page.document()) {
                Some(code) => ExtractionResult::found(code, false, title, None),
                None => ExtractionResult::failed(modes::NO_CODE_BLOCKS).with_title(title),
            },
            ExtractMode::SummaryOnly => self.summary(title).await,
        };

        if result.success {
            info!(%mode, tier = ?result.tier, chars = result.content_str().chars().count(), "extraction finished");
        } else {
            info!(%mode, error = ?result.error, "extraction found nothing");
        }
        result
    }

    async fn summary(&self, title: String) -> ExtractionResult {
        let Some(harvest) = self.cascade(&Tier::SUMMARY, true).await else {
            return ExtractionResult::failed(NO_CONTENT).with_title(title);
        };
        let text = if harvest.is_html {
            modes::text_without_code(&harvest.content)
        } else {
            harvest.content
        };
        match modes::condense(
            &text,
            self.options.summary_max_paragraphs,
            self.options.summary_edge,
        ) {
            Some(summary) => ExtractionResult::found(summary, false, title, Some(harvest.tier)),
            None => ExtractionResult::failed(modes::NO_CONTEXT).with_title(title),
        }
    }
}

fn describe_malformed(raw: &str) -> String {
    let value: serde_json::Value = serde_json::from_str(raw).unwrap_or_default();
    match value.get("action").and_then(serde_json::Value::as_str) {
        Some("extract") => {
            let mode = value.get("mode").map_or_else(|| "none".to_string(), ToString::to_string);
            format!("Unknown mode: {mode}")
        }
        Some(action) => format!("Unsupported action: {action}"),
        None => "Malformed message".to_string(),
    }
}
