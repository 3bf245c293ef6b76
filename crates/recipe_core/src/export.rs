//! Export pipeline: snapshot → document bytes → object store → retrieval URL.

use std::sync::Arc;

use async_trait::async_trait;
use shared::{
    domain::RecipeSnapshot,
    protocol::{ObjectUploadResponse, PDF_CONTENT_TYPE},
};
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};
use uuid::Uuid;

pub const DEFAULT_OBJECT_PREFIX: &str = "recipes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReceipt {
    pub object_name: String,
    pub url: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ExportState {
    #[default]
    Idle,
    Generating,
    Uploading,
    Done(ExportReceipt),
    Failed(String),
}

impl ExportState {
    pub fn is_busy(&self) -> bool {
        matches!(self, ExportState::Generating | ExportState::Uploading)
    }
}

#[derive(Debug, Error)]
#[error("{message}")]
pub struct RenderError {
    message: String,
}

impl RenderError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    InFlight,
    #[error("Failed to generate PDF: {0}")]
    Render(String),
    #[error("Failed to upload PDF: {0}")]
    Upload(String),
}

/// Turns a snapshot into a binary document. Runs on the blocking pool.
pub trait DocumentRenderer: Send + Sync + 'static {
    fn render(&self, snapshot: &RecipeSnapshot) -> Result<Vec<u8>, RenderError>;

    fn content_type(&self) -> &'static str {
        PDF_CONTENT_TYPE
    }

    fn file_extension(&self) -> &'static str {
        "pdf"
    }
}

#[async_trait]
pub trait ObjectUploader: Send + Sync {
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<ObjectUploadResponse>;
}

/// Single-flight export: a request made while another one is generating or
/// uploading is rejected. In-flight uploads are never cancelled.
pub struct ExportPipeline {
    renderer: Arc<dyn DocumentRenderer>,
    uploader: Arc<dyn ObjectUploader>,
    object_prefix: String,
    state: watch::Sender<ExportState>,
}

impl ExportPipeline {
    pub fn new(renderer: Arc<dyn DocumentRenderer>, uploader: Arc<dyn ObjectUploader>) -> Self {
        let (state, _) = watch::channel(ExportState::Idle);
        Self {
            renderer,
            uploader,
            object_prefix: DEFAULT_OBJECT_PREFIX.to_string(),
            state,
        }
    }

    pub fn with_object_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.object_prefix = prefix.into().trim_matches('/').to_string();
        self
    }

    pub fn state(&self) -> ExportState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ExportState> {
        self.state.subscribe()
    }

    /// Back to `Idle` once the user dismisses a finished export. Ignored while
    /// an export is running.
    pub fn reset(&self) {
        self.state.send_if_modified(|state| {
            if state.is_busy() || *state == ExportState::Idle {
                return false;
            }
            *state = ExportState::Idle;
            true
        });
    }

    pub async fn export(&self, snapshot: RecipeSnapshot) -> Result<ExportReceipt, ExportError> {
        let started = self.state.send_if_modified(|state| {
            if state.is_busy() {
                return false;
            }
            *state = ExportState::Generating;
            true
        });
        if !started {
            warn!("export requested while another export is in flight");
            return Err(ExportError::InFlight);
        }

        let renderer = Arc::clone(&self.renderer);
        let rendered = tokio::task::spawn_blocking(move || renderer.render(&snapshot)).await;
        let bytes = match rendered {
            Ok(Ok(bytes)) if bytes.is_empty() => {
                return self.fail(ExportError::Render(
                    "renderer produced an empty document".to_string(),
                ));
            }
            Ok(Ok(bytes)) => bytes,
            Ok(Err(err)) => return self.fail(ExportError::Render(err.to_string())),
            Err(join_err) => return self.fail(ExportError::Render(join_err.to_string())),
        };

        self.state.send_replace(ExportState::Uploading);
        let object_name = self.next_object_name();
        let size_bytes = bytes.len();
        info!(%object_name, size_bytes, "uploading rendered recipe");

        match self
            .uploader
            .upload(&object_name, self.renderer.content_type(), bytes)
            .await
        {
            Ok(response) => {
                let receipt = ExportReceipt {
                    object_name: response.object_name,
                    url: response.url,
                    size_bytes: response.size_bytes,
                };
                info!(url = %receipt.url, "recipe export complete");
                self.state.send_replace(ExportState::Done(receipt.clone()));
                Ok(receipt)
            }
            Err(err) => self.fail(ExportError::Upload(format!("{err:#}"))),
        }
    }

    fn next_object_name(&self) -> String {
        let file_name = format!(
            "recipe-{}.{}",
            Uuid::new_v4(),
            self.renderer.file_extension()
        );
        if self.object_prefix.is_empty() {
            file_name
        } else {
            format!("{}/{file_name}", self.object_prefix)
        }
    }

    fn fail(&self, err: ExportError) -> Result<ExportReceipt, ExportError> {
        error!(%err, "recipe export failed");
        self.state.send_replace(ExportState::Failed(err.to_string()));
        Err(err)
    }
}

#[cfg(test)]
#[path = "tests/export_tests.rs"]
mod tests;
