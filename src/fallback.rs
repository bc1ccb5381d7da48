//! Fallback synthesis and the inline-paste envelope.
//!
//! Both are pure string templates: they never fail and never return an
//! empty string.

/// Placeholder used when the page address is unknown.
pub const UNKNOWN_URL: &str = "Unknown URL";

/// Note appended to every synthesized artifact.
pub const FALLBACK_NOTE: &str =
    "[NOTE: Content extraction failed on this page, but metadata was preserved.]";

/// Metadata-only artifact for pages where nothing could be extracted.
///
/// ```rust
/// use rs_capture::fallback::synthesize;
///
/// assert_eq!(
///     synthesize("Untitled", None),
///     "# Untitled\n\nSource: Unknown URL\n\n[NOTE: Content extraction failed on this page, but metadata was preserved.]"
/// );
/// ```
#[must_use]
pub fn synthesize(title: &str, url: Option<&str>) -> String {
    let url = url.filter(|u| !u.trim().is_empty()).unwrap_or(UNKNOWN_URL);
    format!("# {title}\n\nSource: {url}\n\n{FALLBACK_NOTE}")
}

/// Wrap `body` so it can be pasted into an assistant as standing context.
#[must_use]
pub fn paste_envelope(title: &str, url: Option<&str>, body: &str) -> String {
    let source = match url.filter(|u| !u.trim().is_empty()) {
        Some(url) => format!("{title} ({url})"),
        None => title.to_string(),
    };
    format!(
        "[SYSTEM: CONTEXT INJECTION]\n\nSOURCE: {source}\n\n---\n\n{body}\n\n---\n\nINSTRUCTION: Read the context above. Wait for my next command."
    )
}
