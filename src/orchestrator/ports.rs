//! External collaborators of the orchestrator.
//!
//! The controller surface reaches tabs, the clipboard, file persistence,
//! configuration storage and the user only through these traits, so every
//! one of them can be swapped for an in-memory fake.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::persist::SaveFileRequest;
use crate::result::{ExtractMode, ExtractionRequest, ExtractionResult};

/// Storage key of the routing label.
pub const ROUTING_LABEL_KEY: &str = "routingLabel";

pub type TabId = u64;

/// The tab an extraction targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub url: Option<String>,
    pub title: Option<String>,
}

impl Tab {
    #[must_use]
    pub fn new(id: TabId) -> Self {
        Self {
            id,
            url: None,
            title: None,
        }
    }

    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Tabs and the extractors embedded in them.
#[async_trait]
pub trait TabHost: Send + Sync {
    /// The currently focused tab, if any.
    async fn active_tab(&self) -> Option<Tab>;

    /// Deliver a request to the tab's extractor and await its reply.
    ///
    /// Must fail with [`crate::Error::ChannelUnavailable`] when no extractor
    /// is listening in the tab.
    async fn send_message(&self, tab: TabId, request: ExtractionRequest) -> Result<ExtractionResult>;

    /// (Re-)inject the extractor into the tab.
    async fn inject_extractor(&self, tab: TabId) -> Result<()>;
}

/// The system clipboard.
#[async_trait]
pub trait Clipboard: Send + Sync {
    async fn write_text(&self, text: &str) -> Result<()>;
}

/// Hand-off to file persistence.
#[async_trait]
pub trait FileSaver: Send + Sync {
    /// Persist the artifact and return the path it was written to.
    async fn save_file(&self, request: SaveFileRequest) -> Result<String>;
}

/// Persisted key/value configuration.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    async fn get(&self, key: &str) -> Option<String>;
    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// Transient feedback for the user-facing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signal {
    /// An extraction for this mode has started.
    Progress(ExtractMode),
    /// Finished; carries the confirmation text.
    Success(&'static str),
    /// Failed; carries the short user-facing message.
    Error(&'static str),
}

/// The user-facing surface.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, signal: Signal);
}

/// Every collaborator the orchestrator needs.
#[derive(Clone)]
pub struct Ports {
    pub tabs: Arc<dyn TabHost>,
    pub clipboard: Arc<dyn Clipboard>,
    pub saver: Arc<dyn FileSaver>,
    pub config: Arc<dyn ConfigStore>,
    pub notifier: Arc<dyn Notifier>,
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryConfigStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.values.read().await.get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Notifier that discards every signal.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentNotifier;

#[async_trait]
impl Notifier for SilentNotifier {
    async fn notify(&self, _signal: Signal) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_config_store() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.get(ROUTING_LABEL_KEY).await, None);
        store.set(ROUTING_LABEL_KEY, "research").await.unwrap();
        assert_eq!(store.get(ROUTING_LABEL_KEY).await.as_deref(), Some("research"));
    }

    #[test]
    fn test_tab_builder() {
        let tab = Tab::new(7).with_url("https://a.b/").with_title("T");
        assert_eq!(tab.id, 7);
        assert_eq!(tab.url.as_deref(), Some("https://a.b/"));
        assert_eq!(tab.title.as_deref(), Some("T"));
    }
}
