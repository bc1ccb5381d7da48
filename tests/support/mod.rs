//! Scripted hosts and in-memory collaborators shared by the integration
//! tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rs_capture::channel::{channel, spawn_extractor, ExtractorLink};
use rs_capture::dom::{self, Selection};
use rs_capture::extractor::{Extractor, PageHost, SnapshotHost};
use rs_capture::orchestrator::ports::{
    Clipboard, MemoryConfigStore, Notifier, Ports, Signal, Tab, TabHost, TabId,
};
use rs_capture::orchestrator::Orchestrator;
use rs_capture::persist::{Background, FileSink};
use rs_capture::{Error, ExtractionRequest, ExtractionResult, Options, Page, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const PAGE_URL: &str = "https://www.example.com/posts/1";

/// Route library logs to the test writer. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rs_capture=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_test_writer())
        .try_init();
}

// =============================================================================
// Page side
// =============================================================================

/// Page host whose clicks follow a script.
///
/// Elements are addressed by their `id` attribute.
#[derive(Default)]
pub struct ScriptedHost {
    /// Clicking the element puts this text on the clipboard.
    copies: HashMap<String, String>,
    /// Clicking the element replaces it with this markup.
    reveals: HashMap<String, String>,
    clipboard: RefCell<String>,
    clipboard_denied: bool,
    clicks: RefCell<Vec<String>>,
}

impl ScriptedHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn copies(mut self, id: &str, text: &str) -> Self {
        self.copies.insert(id.to_string(), text.to_string());
        self
    }

    pub fn reveals(mut self, id: &str, html: &str) -> Self {
        self.reveals.insert(id.to_string(), html.to_string());
        self
    }

    pub fn deny_clipboard(mut self) -> Self {
        self.clipboard_denied = true;
        self
    }

    pub fn clicks(&self) -> Vec<String> {
        self.clicks.borrow().clone()
    }
}

#[async_trait(?Send)]
impl PageHost for ScriptedHost {
    fn activate(&self, element: &Selection<'_>) -> Result<()> {
        let id = dom::get_attribute(element, "id").unwrap_or_default();
        self.clicks.borrow_mut().push(id.clone());
        if let Some(text) = self.copies.get(&id) {
            *self.clipboard.borrow_mut() = text.clone();
        }
        if let Some(html) = self.reveals.get(&id) {
            element.replace_with_html(html.as_str());
        }
        Ok(())
    }

    async fn read_clipboard(&self) -> Result<String> {
        if self.clipboard_denied {
            return Err(Error::Clipboard("permission denied".to_string()));
        }
        Ok(self.clipboard.borrow().clone())
    }
}

pub fn snapshot(html: &str) -> Extractor<SnapshotHost> {
    Extractor::new(Page::parse(html), SnapshotHost).with_options(Options::immediate())
}

// =============================================================================
// Controller side
// =============================================================================

/// Tab host backed by a real extractor on the current `LocalSet`.
pub struct FakeTabs {
    tab: Option<Tab>,
    html: String,
    link: Mutex<Option<ExtractorLink>>,
    sends: AtomicUsize,
    injections: AtomicUsize,
    refuse_injection: bool,
    injects_closed_inbox: bool,
}

impl FakeTabs {
    /// A tab showing `html` whose extractor has not been injected yet.
    pub fn new(html: &str) -> Self {
        Self {
            tab: Some(Tab::new(1).with_url(PAGE_URL)),
            html: html.to_string(),
            link: Mutex::new(None),
            sends: AtomicUsize::new(0),
            injections: AtomicUsize::new(0),
            refuse_injection: false,
            injects_closed_inbox: false,
        }
    }

    /// As [`FakeTabs::new`] with the extractor already running. Must be
    /// called inside a `LocalSet`.
    pub fn injected(html: &str) -> Self {
        let tabs = Self::new(html);
        let link = tabs.spawn();
        *tabs.link.lock().unwrap() = Some(link);
        tabs
    }

    pub fn without_tab() -> Self {
        Self {
            tab: None,
            ..Self::new("")
        }
    }

    pub fn with_tab(mut self, tab: Tab) -> Self {
        self.tab = Some(tab);
        self
    }

    pub fn refusing_injection(mut self) -> Self {
        self.refuse_injection = true;
        self
    }

    /// Injection reports success, but the page navigates before the new
    /// extractor takes any request.
    pub fn closing_after_injection(mut self) -> Self {
        self.injects_closed_inbox = true;
        self
    }

    /// Drop the extractor, as a navigation would.
    pub fn navigate_away(&self) {
        *self.link.lock().unwrap() = None;
    }

    pub fn sends(&self) -> usize {
        self.sends.load(Ordering::SeqCst)
    }

    pub fn injections(&self) -> usize {
        self.injections.load(Ordering::SeqCst)
    }

    fn spawn(&self) -> ExtractorLink {
        let html = self.html.clone();
        let url = self.tab.as_ref().and_then(|t| t.url.clone());
        spawn_extractor(move || {
            let mut page = Page::parse(&html);
            if let Some(url) = url {
                page = page.with_url(&url);
            }
            Extractor::new(page, SnapshotHost).with_options(Options::immediate())
        })
    }
}

#[async_trait]
impl TabHost for FakeTabs {
    async fn active_tab(&self) -> Option<Tab> {
        self.tab.clone()
    }

    async fn send_message(&self, _tab: TabId, request: ExtractionRequest) -> Result<ExtractionResult> {
        self.sends.fetch_add(1, Ordering::SeqCst);
        let link = self.link.lock().unwrap().clone();
        match link {
            Some(link) => link.request(request.into()).await,
            None => Err(Error::ChannelUnavailable(
                "Receiving end does not exist".to_string(),
            )),
        }
    }

    async fn inject_extractor(&self, _tab: TabId) -> Result<()> {
        self.injections.fetch_add(1, Ordering::SeqCst);
        if self.refuse_injection {
            return Err(Error::Host("cannot script this page".to_string()));
        }
        let link = if self.injects_closed_inbox {
            let (link, mut inbox) = channel(1);
            inbox.close();
            link
        } else {
            self.spawn()
        };
        *self.link.lock().unwrap() = Some(link);
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryClipboard {
    writes: Mutex<Vec<String>>,
}

impl MemoryClipboard {
    pub fn last(&self) -> Option<String> {
        self.writes.lock().unwrap().last().cloned()
    }

    pub fn writes(&self) -> usize {
        self.writes.lock().unwrap().len()
    }
}

#[async_trait]
impl Clipboard for MemoryClipboard {
    async fn write_text(&self, text: &str) -> Result<()> {
        self.writes.lock().unwrap().push(text.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemorySink {
    files: Mutex<Vec<(String, String)>>,
}

impl MemorySink {
    pub fn files(&self) -> Vec<(String, String)> {
        self.files.lock().unwrap().clone()
    }
}

#[async_trait]
impl FileSink for MemorySink {
    async fn write(&self, path: &str, content: &str) -> Result<()> {
        self.files
            .lock()
            .unwrap()
            .push((path.to_string(), content.to_string()));
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    signals: Mutex<Vec<Signal>>,
}

impl RecordingNotifier {
    pub fn signals(&self) -> Vec<Signal> {
        self.signals.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(&self, signal: Signal) {
        self.signals.lock().unwrap().push(signal);
    }
}

/// Every controller-side collaborator, wired to in-memory fakes.
pub struct Harness {
    pub tabs: Arc<FakeTabs>,
    pub clipboard: Arc<MemoryClipboard>,
    pub background: Arc<Background<MemorySink>>,
    pub config: Arc<MemoryConfigStore>,
    pub notifier: Arc<RecordingNotifier>,
}

impl Harness {
    pub fn new(tabs: FakeTabs) -> Self {
        Self::with_options(tabs, &Options::immediate())
    }

    /// As [`Harness::new`] with the background rooted per `options`.
    pub fn with_options(tabs: FakeTabs, options: &Options) -> Self {
        init_tracing();
        Self {
            tabs: Arc::new(tabs),
            clipboard: Arc::new(MemoryClipboard::default()),
            background: Arc::new(Background::from_options(MemorySink::default(), options)),
            config: Arc::new(MemoryConfigStore::new()),
            notifier: Arc::new(RecordingNotifier::default()),
        }
    }

    pub fn ports(&self) -> Ports {
        Ports {
            tabs: self.tabs.clone(),
            clipboard: self.clipboard.clone(),
            saver: self.background.clone(),
            config: self.config.clone(),
            notifier: self.notifier.clone(),
        }
    }

    pub fn orchestrator(&self) -> Orchestrator {
        Orchestrator::new(self.ports(), Options::immediate())
    }

    pub fn saved(&self) -> Vec<(String, String)> {
        self.background.sink().files()
    }
}
