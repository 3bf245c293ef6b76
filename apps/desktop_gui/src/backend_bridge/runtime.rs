//! Runtime bridge between UI command queue and backend event intake.

use std::{path::PathBuf, sync::Arc, thread};

use anyhow::Context;
use crossbeam_channel::{Receiver, Sender, TrySendError};
use recipe_core::{DocumentRenderer, ExportError, ExportPipeline, HttpObjectUploader};
use recipe_pdf::PdfRecipeRenderer;
use shared::domain::RecipeSnapshot;

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};

pub fn launch(cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>, server_url: String) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                let _ = ui_tx.try_send(UiEvent::Error(UiError::from_message(
                    UiErrorContext::BackendStartup,
                    format!("backend worker startup failure: failed to build runtime: {err}"),
                )));
                tracing::error!("failed to build backend runtime: {err}");
                return;
            }
        };

        runtime.block_on(async move {
            let renderer = Arc::new(PdfRecipeRenderer::new());
            let pipeline = Arc::new(ExportPipeline::new(
                renderer.clone(),
                Arc::new(HttpObjectUploader::new(server_url.as_str())),
            ));
            tokio::spawn(forward_export_states(Arc::clone(&pipeline), ui_tx.clone()));
            tracing::info!(%server_url, "backend worker ready");

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "backend command received");
                match cmd {
                    BackendCommand::Export { snapshot } => {
                        let pipeline = Arc::clone(&pipeline);
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            if let Err(ExportError::InFlight) = pipeline.export(snapshot).await {
                                let _ = ui_tx.try_send(UiEvent::Info(
                                    "An export is already in progress".to_string(),
                                ));
                            }
                        });
                    }
                    BackendCommand::SavePdf { snapshot, path } => {
                        let renderer = renderer.clone();
                        let ui_tx = ui_tx.clone();
                        tokio::spawn(async move {
                            let event = match save_pdf(renderer, snapshot, path).await {
                                Ok(path) => UiEvent::PdfSaved(path),
                                Err(err) => UiEvent::Error(UiError::from_message(
                                    UiErrorContext::SavePdf,
                                    format!("{err:#}"),
                                )),
                            };
                            let _ = ui_tx.try_send(event);
                        });
                    }
                    BackendCommand::ResetExport => pipeline.reset(),
                }
            }
            tracing::info!("ui command channel closed; backend worker exiting");
        });
    });
}

/// Mirrors every pipeline state change into the UI queue.
async fn forward_export_states(pipeline: Arc<ExportPipeline>, ui_tx: Sender<UiEvent>) {
    let mut states = pipeline.subscribe();
    while states.changed().await.is_ok() {
        let state = states.borrow_and_update().clone();
        if let Err(TrySendError::Disconnected(_)) =
            ui_tx.try_send(UiEvent::ExportStateChanged(state))
        {
            break;
        }
    }
}

async fn save_pdf(
    renderer: Arc<PdfRecipeRenderer>,
    snapshot: RecipeSnapshot,
    path: PathBuf,
) -> anyhow::Result<PathBuf> {
    let bytes = tokio::task::spawn_blocking(move || renderer.render(&snapshot))
        .await
        .context("PDF render task panicked")?
        .context("Failed to generate PDF")?;
    tokio::fs::write(&path, bytes)
        .await
        .with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), "saved recipe PDF");
    Ok(path)
}
