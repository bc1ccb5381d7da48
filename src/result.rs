//! Request and result types exchanged between the orchestrator and the
//! page-side extractor.
//!
//! These are plain data: they are created on one side of the message
//! channel, serialized with serde, and never mutated after creation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::extractor::Tier;

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtractMode {
    /// Full capture, converted to markdown and saved as a file.
    Persist,
    /// Full capture, converted to markdown and copied for pasting elsewhere.
    InlinePaste,
    /// Only code blocks, copied verbatim.
    CodeOnly,
    /// A condensed plain-text digest, copied verbatim.
    SummaryOnly,
}

impl ExtractMode {
    /// All modes in presentation order.
    pub const ALL: [Self; 4] = [
        Self::Persist,
        Self::InlinePaste,
        Self::CodeOnly,
        Self::SummaryOnly,
    ];

    /// Wire name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Persist => "persist",
            Self::InlinePaste => "inline-paste",
            Self::CodeOnly => "code-only",
            Self::SummaryOnly => "summary-only",
        }
    }

    /// Whether the extracted content goes through markdown conversion.
    #[must_use]
    pub const fn converts(self) -> bool {
        matches!(self, Self::Persist | Self::InlinePaste)
    }
}

impl fmt::Display for ExtractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A user-initiated extraction intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionRequest {
    /// Requested mode.
    pub mode: ExtractMode,
}

impl ExtractionRequest {
    #[must_use]
    pub const fn new(mode: ExtractMode) -> Self {
        Self { mode }
    }
}

/// Outcome of one extraction attempt, as produced inside the page.
///
/// A `success: false` result is legitimate here: the guarantee of a
/// non-empty artifact is enforced by the orchestrator, not the extractor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    /// Whether the extractor produced content for the mode.
    pub success: bool,

    /// Extracted markup or plain text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    /// Page (or adapter) title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Whether `content` is markup that should be converted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_html: Option<bool>,

    /// Human-readable failure reason when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Cascade tier that produced the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tier: Option<Tier>,
}

impl ExtractionResult {
    /// Successful result.
    #[must_use]
    pub fn found(content: String, is_html: bool, title: String, tier: Option<Tier>) -> Self {
        Self {
            success: true,
            content: Some(content),
            title: Some(title),
            is_html: Some(is_html),
            error: None,
            tier,
        }
    }

    /// Failed result carrying a reason.
    #[must_use]
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Attach a title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Content, or the empty string.
    #[must_use]
    pub fn content_str(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }

    /// True when content is missing or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.content_str().trim().is_empty()
    }
}
