//! Compiled regex patterns shared across the crate.
//!
//! All patterns are compiled once at first use using `LazyLock`.

#![allow(clippy::expect_used)]

use std::sync::LazyLock;

use regex::Regex;

// =============================================================================
// Charset Detection
// =============================================================================

/// `<meta charset="...">`, quoted or bare.
pub static META_CHARSET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([^"'\s;>/]+)"#).expect("META_CHARSET regex")
});

// =============================================================================
// Text Shaping
// =============================================================================

/// A blank line (two line breaks with only spaces or tabs between).
/// Paragraph-like chunks are split on this.
pub static BLANK_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n[ \t]*\n").expect("BLANK_LINE regex"));

// =============================================================================
// Destination Naming
// =============================================================================

/// Characters that are not allowed in file names on common filesystems.
pub static FILENAME_DISALLOWED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"[\\/:*?"<>|]"#).expect("FILENAME_DISALLOWED regex"));

/// Leading `www.` label of a hostname.
pub static WWW_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^www\.").expect("WWW_PREFIX regex"));
