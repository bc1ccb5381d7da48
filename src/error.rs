//! Error types for rs-capture.
//!
//! Only a handful of these ever reach the user: see [`Error::user_message`].
//! Everything else is absorbed by the orchestrator and turned into a
//! synthesized artifact.

use crate::result::ExtractMode;

/// Error type for capture operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// There is no active tab to extract from.
    #[error("No active target to extract from")]
    NoActiveTarget,

    /// The page-side extractor could not be reached (not injected, or
    /// discarded on navigation). Distinct from an extraction failure.
    #[error("Could not establish connection: {0}")]
    ChannelUnavailable(String),

    /// The extractor ran but found nothing usable for the requested mode.
    #[error("No content found for {mode} mode: {reason}")]
    NoContent {
        /// Mode that was requested.
        mode: ExtractMode,
        /// Reason reported by the extractor.
        reason: String,
    },

    /// Markup to markdown conversion panicked or produced nothing.
    #[error("Conversion failed: {0}")]
    ConversionFailed(String),

    /// The system clipboard could not be read or written.
    #[error("Clipboard unavailable: {0}")]
    Clipboard(String),

    /// A host operation (script injection, click dispatch) failed.
    #[error("Host operation failed: {0}")]
    Host(String),

    /// An adapter table could not be parsed.
    #[error("Invalid adapter definition: {0}")]
    InvalidAdapter(String),

    /// The final artifact could not be handed to its destination.
    #[error("Destination rejected artifact: {0}")]
    Destination(String),
}

impl Error {
    /// Short, human-readable message for the transient error signal.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::NoActiveTarget => "No active tab",
            Self::ChannelUnavailable(_) => "Page not ready. Try refreshing.",
            Self::NoContent {
                mode: ExtractMode::CodeOnly,
                ..
            } => "No code blocks found",
            Self::NoContent {
                mode: ExtractMode::SummaryOnly,
                ..
            } => "No context found",
            Self::NoContent { .. } => "No content found on this page.",
            _ => "Something went wrong",
        }
    }
}

/// Result type alias for capture operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_follow_mode() {
        let code = Error::NoContent {
            mode: ExtractMode::CodeOnly,
            reason: "No code blocks found".into(),
        };
        assert_eq!(code.user_message(), "No code blocks found");

        let summary = Error::NoContent {
            mode: ExtractMode::SummaryOnly,
            reason: "No context found".into(),
        };
        assert_eq!(summary.user_message(), "No context found");

        assert_eq!(
            Error::ChannelUnavailable("gone".into()).user_message(),
            "Page not ready. Try refreshing."
        );
        assert_eq!(Error::NoActiveTarget.user_message(), "No active tab");
        assert_eq!(
            Error::ConversionFailed("boom".into()).user_message(),
            "Something went wrong"
        );
    }
}
