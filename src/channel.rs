//! Extraction message channel.
//!
//! Request/response between the orchestrator and a page-side extractor.
//! Every request travels with its own `oneshot` reply sender, which is the
//! single resolution point for that request: the extractor may take as
//! long as it needs (clipboard settle included) and the requester simply
//! awaits the reply.
//!
//! A missing extractor (never injected, or discarded on navigation) shows
//! up as [`Error::ChannelUnavailable`], distinct from an extraction that
//! ran and found nothing.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::extractor::{Extractor, PageHost};
use crate::result::{ExtractMode, ExtractionRequest, ExtractionResult};

/// Default number of requests that may queue for one extractor.
pub const DEFAULT_CAPACITY: usize = 8;

/// Messages the extractor understands.
///
/// On the wire: `{"action":"extract","mode":"persist"}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum InboundMessage {
    Extract(ExtractionRequest),
}

impl From<ExtractionRequest> for InboundMessage {
    fn from(request: ExtractionRequest) -> Self {
        Self::Extract(request)
    }
}

/// One in-flight request and the means to answer it.
#[derive(Debug)]
pub struct Envelope {
    pub message: InboundMessage,
    reply: oneshot::Sender<ExtractionResult>,
}

impl Envelope {
    /// Resolve the request. Returns false when the requester has gone away.
    pub fn respond(self, result: ExtractionResult) -> bool {
        self.reply.send(result).is_ok()
    }
}

/// Requester side of the channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ExtractorLink {
    tx: mpsc::Sender<Envelope>,
}

/// Extractor side of the channel.
#[derive(Debug)]
pub struct ExtractorInbox {
    rx: mpsc::Receiver<Envelope>,
}

/// Create a connected link/inbox pair.
#[must_use]
pub fn channel(capacity: usize) -> (ExtractorLink, ExtractorInbox) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    (ExtractorLink { tx }, ExtractorInbox { rx })
}

impl ExtractorLink {
    /// Send `message` and wait for its reply.
    pub async fn request(&self, message: InboundMessage) -> Result<ExtractionResult> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope { message, reply })
            .await
            .map_err(|_| Error::ChannelUnavailable("no extractor is listening".to_string()))?;
        response.await.map_err(|_| {
            Error::ChannelUnavailable("extractor went away before replying".to_string())
        })
    }

    /// Shorthand for an extract request.
    pub async fn extract(&self, mode: ExtractMode) -> Result<ExtractionResult> {
        self.request(ExtractionRequest::new(mode).into()).await
    }

    /// Whether the extractor side has been dropped.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl ExtractorInbox {
    /// Next request, or `None` once every link is dropped.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }

    /// Stop accepting requests, as a page does when navigating away.
    /// Requests already queued can still be drained.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Answer requests one at a time until every link is dropped.
pub async fn serve<H: PageHost>(mut inbox: ExtractorInbox, extractor: Extractor<H>) {
    while let Some(envelope) = inbox.recv().await {
        trace!(message = ?envelope.message, "extractor received message");
        let result = match envelope.message {
            InboundMessage::Extract(request) => extractor.handle(request).await,
        };
        if !envelope.respond(result) {
            debug!("requester dropped before the reply was ready");
        }
    }
    debug!("extractor inbox closed");
}

/// Build an extractor on the current `LocalSet` and return its link.
///
/// The factory runs inside the spawned task, so the page (which is not
/// `Send`) never crosses threads.
///
/// # Panics
///
/// Panics when called outside a `tokio::task::LocalSet`.
pub fn spawn_extractor<F, H>(factory: F) -> ExtractorLink
where
    F: FnOnce() -> Extractor<H> + 'static,
    H: PageHost + 'static,
{
    let (link, inbox) = channel(DEFAULT_CAPACITY);
    tokio::task::spawn_local(async move {
        serve(inbox, factory()).await;
    });
    link
}
