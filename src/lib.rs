//! # rs-capture
//!
//! Resilient content capture from arbitrary web pages.
//!
//! Pages are uncontrolled: markup varies by site, content may be
//! virtualized, collapsed, or only reachable through the page's own copy
//! button. This crate turns any page into a usable, non-empty text artifact
//! by running a ranked cascade of extraction strategies inside the page and
//! falling back to a metadata-only artifact when everything else fails.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_capture::{capture_snapshot, ExtractMode};
//!
//! let html = r#"<html><head><title>Release notes</title></head>
//! <body><nav>Home | Blog</nav><article><p>Version 2 ships a faster parser, a new cache and clearer error messages.</p></article></body></html>"#;
//!
//! let result = capture_snapshot(html, Some("https://example.com/notes"), ExtractMode::Persist)?;
//! assert!(result.success);
//! assert_eq!(result.title.as_deref(), Some("Release notes"));
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - **Page side**: [`extractor::Extractor`] owns a [`Page`] and answers
//!   [`ExtractionRequest`]s using the [`adapters`] registry and the
//!   [`noise`] filter.
//! - **Channel**: [`channel`] carries requests and replies between the two
//!   sides; a missing extractor is reported distinctly.
//! - **Controller side**: [`orchestrator::Orchestrator`] dispatches modes,
//!   reconnects once, converts markup with [`conversion`], synthesizes
//!   fallbacks with [`fallback`], and delivers the artifact.

mod error;
mod options;
mod patterns;
mod result;

/// DOM operations over `dom_query`, including a rendered-text approximation.
pub mod dom;

/// Character encoding detection and transcoding.
pub mod encoding;

/// The page an extractor runs against.
pub mod page;

/// Noise rules shared by every tier.
pub mod noise;

/// Declarative, site-specific extraction rules.
pub mod adapters;

/// The page-side tier cascade.
pub mod extractor;

/// Request/response channel between orchestrator and extractor.
pub mod channel;

/// Markup to Markdown conversion.
pub mod conversion;

/// Markdown normalization.
pub mod markdown;

/// Metadata-only fallback artifacts.
pub mod fallback;

/// Controller-side mode dispatch and delivery.
pub mod orchestrator;

/// Background handling of `saveFile` requests.
pub mod persist;

// Public API - re-exports
pub use error::{Error, Result};
pub use options::Options;
pub use page::{Page, UserSelection};
pub use result::{ExtractMode, ExtractionRequest, ExtractionResult};

/// Run one extraction against a static HTML snapshot.
///
/// Snapshots have no clipboard and ignore clicks, so the copy-affordance
/// tier never wins and expand controls stay collapsed.
///
/// Drives its own single-threaded runtime; from async code use
/// [`capture_snapshot_async`].
///
/// # Errors
///
/// Returns an I/O error if the single-threaded runtime cannot be built.
///
/// # Panics
///
/// Panics when called from within a tokio runtime.
pub fn capture_snapshot(
    html: &str,
    url: Option<&str>,
    mode: ExtractMode,
) -> std::io::Result<ExtractionResult> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;
    Ok(runtime.block_on(capture_snapshot_async(html, url, mode)))
}

/// [`capture_snapshot`] on the caller's runtime. The future is not `Send`.
pub async fn capture_snapshot_async(
    html: &str,
    url: Option<&str>,
    mode: ExtractMode,
) -> ExtractionResult {
    let mut page = Page::parse(html);
    if let Some(url) = url {
        page = page.with_url(url);
    }
    extractor::Extractor::new(page, extractor::SnapshotHost)
        .with_options(Options::immediate())
        .extract(mode)
        .await
}
