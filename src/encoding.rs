//! Character encoding detection for raw page snapshots.
//!
//! Snapshots captured as bytes are decoded to UTF-8 before parsing: a byte
//! order mark wins, then a charset declared in a `<meta>` tag within the
//! first kilobyte, then UTF-8.

use encoding_rs::{Encoding, UTF_8};

use crate::patterns::META_CHARSET;

/// How many leading bytes are searched for a charset declaration.
const SNIFF_LEN: usize = 1024;

/// Detect the character encoding of an HTML snapshot.
///
/// Covers both `<meta charset="...">` and
/// `<meta http-equiv="Content-Type" content="...; charset=...">`.
/// Unknown labels fall through to UTF-8.
#[must_use]
pub fn detect_encoding(html: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(html) {
        return encoding;
    }

    let head = String::from_utf8_lossy(&html[..html.len().min(SNIFF_LEN)]);
    META_CHARSET
        .captures(&head)
        .and_then(|c| c.get(1))
        .and_then(|m| Encoding::for_label(m.as_str().as_bytes()))
        .unwrap_or(UTF_8)
}

/// Decode an HTML snapshot to UTF-8.
///
/// Invalid sequences become U+FFFD rather than errors.
///
/// # Examples
///
/// ```
/// use rs_capture::encoding::decode_html;
///
/// let html = b"<meta charset=\"ISO-8859-1\"><p>Caf\xE9</p>";
/// assert!(decode_html(html).contains("Café"));
/// ```
#[must_use]
pub fn decode_html(html: &[u8]) -> String {
    let encoding = detect_encoding(html);
    let (decoded, used, had_errors) = encoding.decode(html);
    if had_errors {
        tracing::debug!(encoding = used.name(), "snapshot contained undecodable bytes");
    }
    decoded.into_owned()
}
