//! Configuration options for capture.
//!
//! The `Options` struct holds every threshold, delay and naming constant used
//! by the extractor and the orchestrator. Both sides of the message channel
//! take their own copy.

use std::time::Duration;

/// Configuration options for capture.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use rs_capture::Options;
///
/// let options = Options {
///     copy_settle: Duration::ZERO,
///     paste_envelope: false,
///     ..Options::default()
/// };
/// assert_eq!(options.walk_min_chars, 50);
/// ```
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Options {
    /// A user selection must be longer than this (trimmed characters) to win.
    ///
    /// Default: `10`
    pub selection_min_chars: usize,

    /// Clipboard text produced by a copy affordance must be longer than this.
    ///
    /// Default: `50`
    pub copy_min_chars: usize,

    /// How long to wait after activating a copy affordance before reading
    /// the clipboard.
    ///
    /// Default: `500ms`
    pub copy_settle: Duration,

    /// Rendered text of a generic content container must be longer than this.
    ///
    /// Default: `50`
    pub deep_target_min_chars: usize,

    /// Combined markup/text length a chat container must exceed.
    ///
    /// Default: `100`
    pub container_min_chars: usize,

    /// Joined text from the structural walk must be longer than this.
    ///
    /// Default: `50`
    pub walk_min_chars: usize,

    /// Summaries with more paragraphs than this are condensed.
    ///
    /// Default: `6`
    pub summary_max_paragraphs: usize,

    /// Number of leading and trailing paragraphs a condensed summary keeps.
    ///
    /// Default: `3`
    pub summary_edge: usize,

    /// Delay between re-injecting the extractor and resending the request.
    ///
    /// Default: `100ms`
    pub reconnect_settle: Duration,

    /// Root folder for persisted artifacts (`ROOT/{project}/{title}.md`),
    /// read by `persist::Background::from_options`.
    ///
    /// Default: `"Captures"`
    pub root_folder: String,

    /// Wrap inline-paste artifacts in a context-injection envelope.
    ///
    /// Default: `true`
    pub paste_envelope: bool,

    /// Keep link targets when converting to markdown.
    ///
    /// Default: `true`
    pub markdown_links: bool,

    /// Keep images when converting to markdown.
    ///
    /// Default: `true`
    pub markdown_images: bool,

    /// Render tables as GFM tables when converting to markdown.
    ///
    /// Default: `true`
    pub markdown_tables: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            selection_min_chars: 10,
            copy_min_chars: 50,
            copy_settle: Duration::from_millis(500),
            deep_target_min_chars: 50,
            container_min_chars: 100,
            walk_min_chars: 50,
            summary_max_paragraphs: 6,
            summary_edge: 3,
            reconnect_settle: Duration::from_millis(100),
            root_folder: "Captures".to_string(),
            paste_envelope: true,
            markdown_links: true,
            markdown_images: true,
            markdown_tables: true,
        }
    }
}

impl Options {
    /// Options with every delay set to zero, for snapshot runs and tests.
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            copy_settle: Duration::ZERO,
            reconnect_settle: Duration::ZERO,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_thresholds() {
        let options = Options::default();
        assert_eq!(options.selection_min_chars, 10);
        assert_eq!(options.copy_min_chars, 50);
        assert_eq!(options.container_min_chars, 100);
        assert_eq!(options.copy_settle, Duration::from_millis(500));
        assert_eq!(options.root_folder, "Captures");
    }

    #[test]
    fn test_immediate_only_changes_delays() {
        let options = Options::immediate();
        assert_eq!(options.copy_settle, Duration::ZERO);
        assert_eq!(options.reconnect_settle, Duration::ZERO);
        assert_eq!(options.walk_min_chars, 50);
        assert!(options.paste_envelope);
    }
}
