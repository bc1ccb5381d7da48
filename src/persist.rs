//! Background side of the `saveFile` hand-off.
//!
//! The controller sends `{action: "saveFile", content, title, project}`;
//! the background derives `ROOT/{project}/{title}.md` and passes the blob
//! to a [`FileSink`], the actual persistence mechanism.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::options::Options;
use crate::orchestrator::naming::sanitize_title;
use crate::orchestrator::ports::FileSaver;

/// Request to persist one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFileRequest {
    pub content: String,
    pub title: String,
    #[serde(default)]
    pub project: String,
}

/// Messages the background understands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum BackgroundMessage {
    SaveFile(SaveFileRequest),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveFileResponse {
    pub success: bool,
}

/// `ROOT/{project}/{title}.md`, or `ROOT/{title}.md` without a project.
///
/// ```rust
/// use rs_capture::persist::download_path;
///
/// assert_eq!(download_path("Captures", "claude_ai", "Chat"), "Captures/claude_ai/Chat.md");
/// assert_eq!(download_path("Captures", " ", "a:b"), "Captures/a_b.md");
/// ```
#[must_use]
pub fn download_path(root: &str, project: &str, title: &str) -> String {
    let title = sanitize_title(title);
    match project.trim() {
        "" => format!("{root}/{title}.md"),
        project => format!("{root}/{project}/{title}.md"),
    }
}

/// Writes a text blob under a relative path.
#[async_trait]
pub trait FileSink: Send + Sync {
    async fn write(&self, path: &str, content: &str) -> Result<()>;
}

/// Background handler for `saveFile` messages.
pub struct Background<S> {
    sink: S,
    root: String,
}

impl<S: FileSink> Background<S> {
    pub fn new(sink: S, root: impl Into<String>) -> Self {
        Self {
            sink,
            root: root.into(),
        }
    }

    /// Background rooted at [`Options::root_folder`].
    pub fn from_options(sink: S, options: &Options) -> Self {
        Self::new(sink, options.root_folder.clone())
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Persist one artifact. Blank content or title is refused.
    pub async fn handle(&self, request: &SaveFileRequest) -> SaveFileResponse {
        SaveFileResponse {
            success: self.save(request).await.is_ok(),
        }
    }

    async fn save(&self, request: &SaveFileRequest) -> Result<String> {
        if request.content.trim().is_empty() || request.title.trim().is_empty() {
            warn!("refusing to save an artifact without content or title");
            return Err(Error::Destination(format!(
                "nothing to save for '{}'",
                request.title
            )));
        }
        let path = download_path(&self.root, &request.project, &request.title);
        match self.sink.write(&path, &request.content).await {
            Ok(()) => {
                info!(path = %path, bytes = request.content.len(), "artifact saved");
                Ok(path)
            }
            Err(err) => {
                warn!(path = %path, error = %err, "artifact could not be saved");
                Err(Error::Destination(format!("could not save '{path}': {err}")))
            }
        }
    }

    /// Wire-level entry point.
    pub async fn handle_json(&self, raw: &str) -> SaveFileResponse {
        match serde_json::from_str::<BackgroundMessage>(raw) {
            Ok(BackgroundMessage::SaveFile(request)) => self.handle(&request).await,
            Err(err) => {
                warn!(error = %err, "ignoring malformed background message");
                SaveFileResponse { success: false }
            }
        }
    }
}

#[async_trait]
impl<S: FileSink> FileSaver for Background<S> {
    async fn save_file(&self, request: SaveFileRequest) -> Result<String> {
        self.save(&request).await
    }
}
