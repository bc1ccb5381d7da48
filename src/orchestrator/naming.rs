//! Destination naming for persisted artifacts.

use url::Url;

use crate::patterns::{FILENAME_DISALLOWED, WWW_PREFIX};

/// Replace characters most filesystems reject (`\ / : * ? " < > |`) with `_`.
///
/// ```rust
/// use rs_capture::orchestrator::naming::sanitize_title;
///
/// assert_eq!(sanitize_title(r#"a/b: "c"?"#), "a_b_ _c__");
/// ```
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    FILENAME_DISALLOWED.replace_all(title, "_").into_owned()
}

/// Folder for an artifact: the configured routing label, else the page's
/// hostname without `www.` and with dots turned into underscores, else empty.
#[must_use]
pub fn derive_project(label: Option<&str>, url: Option<&str>) -> String {
    if let Some(label) = label.map(str::trim).filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    url.and_then(|u| Url::parse(u).ok())
        .and_then(|u| u.host_str().map(str::to_string))
        .map(|host| WWW_PREFIX.replace(&host, "").replace('.', "_"))
        .unwrap_or_default()
}
