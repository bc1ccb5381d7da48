//! Controller-side extraction orchestrator.
//!
//! One user action runs one pass of a small state machine:
//!
//! 1. resolve the active tab (none is terminal)
//! 2. send the request, re-injecting the extractor exactly once if it is
//!    unreachable
//! 3. turn the [`ExtractionResult`] into a final artifact for the mode,
//!    synthesizing one when extraction or conversion came up empty
//! 4. hand the artifact to the file saver (persist) or the clipboard
//!
//! A [`Signal::Progress`] is emitted when the pass starts and exactly one
//! [`Signal::Success`] or [`Signal::Error`] when it ends. Nothing is sticky:
//! a failed pass leaves the orchestrator ready for the next one.

pub mod naming;
pub mod ports;

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::conversion::{Converter, MarkdownConverter};
use crate::error::{Error, Result};
use crate::extractor::Tier;
use crate::fallback;
use crate::options::Options;
use crate::page::UNTITLED;
use crate::persist::SaveFileRequest;
use crate::result::{ExtractMode, ExtractionRequest, ExtractionResult};

use naming::{derive_project, sanitize_title};
use ports::{Ports, Signal, Tab, ROUTING_LABEL_KEY};

/// Where a finished artifact went.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// Persisted under this path.
    File { path: String },
    /// Copied to the system clipboard.
    Clipboard,
}

/// A completed extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub mode: ExtractMode,
    /// Exactly what was saved or copied. Never empty.
    pub artifact: String,
    pub destination: Destination,
    /// True when the artifact is the metadata-only fallback.
    pub synthesized: bool,
    /// Tier that produced the content, when the extractor reported one.
    pub tier: Option<Tier>,
    /// Whether a reconnection was needed to reach the extractor.
    pub reconnected: bool,
}

/// Confirmation shown after a successful pass.
#[must_use]
pub const fn success_message(mode: ExtractMode) -> &'static str {
    match mode {
        ExtractMode::Persist => "Saved!",
        ExtractMode::InlinePaste => "Copied! Paste into AI",
        ExtractMode::CodeOnly | ExtractMode::SummaryOnly => "Copied!",
    }
}

pub struct Orchestrator {
    ports: Ports,
    converter: Arc<dyn Converter>,
    options: Options,
    in_flight: Mutex<()>,
}

impl Orchestrator {
    pub fn new(ports: Ports, options: Options) -> Self {
        let converter = Arc::new(MarkdownConverter::from_options(&options));
        Self {
            ports,
            converter,
            options,
            in_flight: Mutex::new(()),
        }
    }

    /// Replace the markup converter.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn Converter>) -> Self {
        self.converter = converter;
        self
    }

    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Configured routing label, if any.
    pub async fn routing_label(&self) -> Option<String> {
        self.ports
            .config
            .get(ROUTING_LABEL_KEY)
            .await
            .filter(|l| !l.trim().is_empty())
    }

    pub async fn set_routing_label(&self, label: &str) -> Result<()> {
        self.ports.config.set(ROUTING_LABEL_KEY, label.trim()).await
    }

    /// Run one extraction end to end. Passes are serialized: a second call
    /// waits for the one in flight.
    pub async fn extract(&self, mode: ExtractMode) -> Result<Outcome> {
        let _guard = self.in_flight.lock().await;
        self.ports.notifier.notify(Signal::Progress(mode)).await;

        match self.run(mode).await {
            Ok(outcome) => {
                info!(
                    %mode,
                    tier = ?outcome.tier,
                    synthesized = outcome.synthesized,
                    chars = outcome.artifact.chars().count(),
                    "artifact delivered"
                );
                self.ports
                    .notifier
                    .notify(Signal::Success(success_message(mode)))
                    .await;
                Ok(outcome)
            }
            Err(err) => {
                warn!(%mode, error = %err, "extraction failed");
                self.ports
                    .notifier
                    .notify(Signal::Error(err.user_message()))
                    .await;
                Err(err)
            }
        }
    }

    async fn run(&self, mode: ExtractMode) -> Result<Outcome> {
        let tab = self
            .ports
            .tabs
            .active_tab()
            .await
            .ok_or(Error::NoActiveTarget)?;
        let (result, reconnected) = self.request(&tab, mode).await?;

        let title = non_blank(result.title.as_deref())
            .or_else(|| non_blank(tab.title.as_deref()))
            .unwrap_or(UNTITLED)
            .to_string();
        let (artifact, synthesized) = self.finalize(mode, &result, &title, tab.url.as_deref())?;
        let destination = self.deliver(mode, &tab, &title, &artifact).await?;

        Ok(Outcome {
            mode,
            artifact,
            destination,
            synthesized,
            tier: result.tier,
            reconnected,
        })
    }

    /// Send the request, with exactly one reconnection on a channel failure.
    async fn request(&self, tab: &Tab, mode: ExtractMode) -> Result<(ExtractionResult, bool)> {
        let request = ExtractionRequest::new(mode);
        let tabs = &self.ports.tabs;
        match tabs.send_message(tab.id, request).await {
            Ok(result) => return Ok((result, false)),
            Err(Error::ChannelUnavailable(reason)) => {
                warn!(tab = tab.id, reason = %reason, "extractor unreachable, re-injecting");
            }
            Err(err) => return Err(err),
        }

        tabs.inject_extractor(tab.id)
            .await
            .map_err(|err| Error::ChannelUnavailable(format!("re-injection failed: {err}")))?;
        if !self.options.reconnect_settle.is_zero() {
            tokio::time::sleep(self.options.reconnect_settle).await;
        }
        let result = tabs.send_message(tab.id, request).await?;
        debug!(tab = tab.id, "reconnected to extractor");
        Ok((result, true))
    }

    /// Final artifact for `mode` and whether it was synthesized.
    fn finalize(
        &self,
        mode: ExtractMode,
        result: &ExtractionResult,
        title: &str,
        url: Option<&str>,
    ) -> Result<(String, bool)> {
        if mode.converts() {
            let body = self.convert(result);
            let (body, synthesized) = match body {
                Some(body) => (body, false),
                None => {
                    warn!(%mode, reason = ?result.error, "no usable content, synthesizing fallback");
                    (fallback::synthesize(title, url), true)
                }
            };
            let artifact = if mode == ExtractMode::InlinePaste && self.options.paste_envelope {
                fallback::paste_envelope(title, url, &body)
            } else {
                body
            };
            return Ok((artifact, synthesized));
        }

        if !result.success {
            let reason = result
                .error
                .clone()
                .unwrap_or_else(|| "No content found".to_string());
            return Err(Error::NoContent { mode, reason });
        }
        if result.is_blank() {
            warn!(%mode, "extractor reported success without content, synthesizing fallback");
            return Ok((fallback::synthesize(title, url), true));
        }
        Ok((result.content_str().to_string(), false))
    }

    /// Converted (or verbatim) content, or `None` when synthesis is needed.
    fn convert(&self, result: &ExtractionResult) -> Option<String> {
        if !result.success || result.is_blank() {
            return None;
        }
        if !result.is_html.unwrap_or(false) {
            return Some(result.content_str().to_string());
        }
        match self.converter.convert(result.content_str()) {
            Ok(markdown) if !markdown.trim().is_empty() => Some(markdown),
            Ok(_) => None,
            Err(err) => {
                warn!(error = %err, "conversion failed");
                None
            }
        }
    }

    async fn deliver(
        &self,
        mode: ExtractMode,
        tab: &Tab,
        title: &str,
        artifact: &str,
    ) -> Result<Destination> {
        if mode != ExtractMode::Persist {
            self.ports.clipboard.write_text(artifact).await?;
            return Ok(Destination::Clipboard);
        }

        let label = self.routing_label().await;
        let project = derive_project(label.as_deref(), tab.url.as_deref());
        let title = sanitize_title(title);
        let path = self
            .ports
            .saver
            .save_file(SaveFileRequest {
                content: artifact.to_string(),
                title,
                project,
            })
            .await?;
        Ok(Destination::File { path })
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_messages() {
        assert_eq!(success_message(ExtractMode::Persist), "Saved!");
        assert_eq!(success_message(ExtractMode::InlinePaste), "Copied! Paste into AI");
        assert_eq!(success_message(ExtractMode::SummaryOnly), "Copied!");
    }

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  a ")), Some("a"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }
}
