//! Conversion stage: extracted markup to Markdown.
//!
//! A conversion either yields non-empty text or reports
//! [`Error::ConversionFailed`]. Panics inside the underlying converter are
//! caught and reported the same way, so callers can always fall back to
//! synthesis instead of crashing.

use std::panic::{self, AssertUnwindSafe};

use quick_html2md::{html_to_markdown_with_options, MarkdownOptions};

use crate::error::{Error, Result};
use crate::markdown;
use crate::options::Options;

/// Markup-to-text transform used by the orchestrator.
pub trait Converter: Send + Sync {
    /// Convert `html`. Empty output is an error.
    fn convert(&self, html: &str) -> Result<String>;
}

/// HTML to GitHub-flavoured Markdown via `quick_html2md`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkdownConverter {
    pub include_links: bool,
    pub include_images: bool,
    pub preserve_tables: bool,
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::from_options(&Options::default())
    }
}

impl MarkdownConverter {
    #[must_use]
    pub fn from_options(options: &Options) -> Self {
        Self {
            include_links: options.markdown_links,
            include_images: options.markdown_images,
            preserve_tables: options.markdown_tables,
        }
    }

    fn markdown_options(&self) -> MarkdownOptions {
        MarkdownOptions::new()
            .include_links(self.include_links)
            .include_images(self.include_images)
            .preserve_tables(self.preserve_tables)
    }
}

impl Converter for MarkdownConverter {
    fn convert(&self, html: &str) -> Result<String> {
        let md_options = self.markdown_options();
        let raw = panic::catch_unwind(AssertUnwindSafe(|| {
            html_to_markdown_with_options(html, &md_options)
        }))
        .map_err(|payload| {
            let reason = payload
                .downcast_ref::<&str>()
                .map(ToString::to_string)
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "converter panicked".to_string());
            Error::ConversionFailed(reason)
        })?;

        let normalized = markdown::normalize(&raw);
        if markdown::is_blank(&normalized) {
            return Err(Error::ConversionFailed("conversion produced no text".to_string()));
        }
        Ok(normalized)
    }
}
