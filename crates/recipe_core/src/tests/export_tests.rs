use super::*;
use crate::session::RecipeSession;
use anyhow::anyhow;
use shared::protocol::object_url;
use tokio::sync::{Mutex, Notify};

struct FixedRenderer(Vec<u8>);

impl DocumentRenderer for FixedRenderer {
    fn render(&self, _snapshot: &RecipeSnapshot) -> Result<Vec<u8>, RenderError> {
        Ok(self.0.clone())
    }
}

struct FailingRenderer;

impl DocumentRenderer for FailingRenderer {
    fn render(&self, _snapshot: &RecipeSnapshot) -> Result<Vec<u8>, RenderError> {
        Err(RenderError::new("font table missing"))
    }
}

#[derive(Default)]
struct RecordingUploader {
    uploads: Mutex<Vec<(String, String, usize)>>,
    fail_with: Option<String>,
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl ObjectUploader for RecordingUploader {
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> anyhow::Result<ObjectUploadResponse> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        if let Some(message) = &self.fail_with {
            return Err(anyhow!(message.clone()));
        }
        self.uploads.lock().await.push((
            object_name.to_string(),
            content_type.to_string(),
            bytes.len(),
        ));
        Ok(ObjectUploadResponse {
            object_name: object_name.to_string(),
            url: object_url("http://files.test", object_name),
            size_bytes: bytes.len() as u64,
        })
    }
}

fn snapshot() -> RecipeSnapshot {
    RecipeSession::new().with_notes_text("notes").snapshot()
}

#[tokio::test]
async fn successful_export_ends_done_with_url() {
    let uploader = Arc::new(RecordingUploader::default());
    let pipeline = ExportPipeline::new(
        Arc::new(FixedRenderer(b"%PDF-1.3 body".to_vec())),
        uploader.clone(),
    );

    let receipt = pipeline.export(snapshot()).await.expect("export");

    assert!(receipt.object_name.starts_with("recipes/recipe-"));
    assert!(receipt.object_name.ends_with(".pdf"));
    assert_eq!(
        receipt.url,
        format!("http://files.test/objects/{}", receipt.object_name)
    );
    assert_eq!(pipeline.state(), ExportState::Done(receipt.clone()));

    let uploads = uploader.uploads.lock().await;
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].1, "application/pdf");
    assert_eq!(uploads[0].2, 13);
}

#[tokio::test]
async fn each_export_uses_a_fresh_object_name() {
    let pipeline = ExportPipeline::new(
        Arc::new(FixedRenderer(b"pdf".to_vec())),
        Arc::new(RecordingUploader::default()),
    )
    .with_object_prefix("/shared/recipes/");

    let first = pipeline.export(snapshot()).await.expect("first");
    let second = pipeline.export(snapshot()).await.expect("second");
    assert_ne!(first.object_name, second.object_name);
    assert!(first.object_name.starts_with("shared/recipes/recipe-"));
}

#[tokio::test]
async fn render_failure_is_reported_and_nothing_is_uploaded() {
    let uploader = Arc::new(RecordingUploader::default());
    let pipeline = ExportPipeline::new(Arc::new(FailingRenderer), uploader.clone());

    let err = pipeline.export(snapshot()).await.expect_err("render failure");
    assert_eq!(err, ExportError::Render("font table missing".to_string()));
    assert_eq!(
        pipeline.state(),
        ExportState::Failed("Failed to generate PDF: font table missing".to_string())
    );
    assert!(uploader.uploads.lock().await.is_empty());
}

#[tokio::test]
async fn empty_document_counts_as_render_failure() {
    let pipeline = ExportPipeline::new(
        Arc::new(FixedRenderer(Vec::new())),
        Arc::new(RecordingUploader::default()),
    );
    let err = pipeline.export(snapshot()).await.expect_err("empty");
    assert!(matches!(err, ExportError::Render(_)));
}

#[tokio::test]
async fn upload_failure_surfaces_the_underlying_message() {
    let uploader = Arc::new(RecordingUploader {
        fail_with: Some("bucket unavailable".to_string()),
        ..Default::default()
    });
    let pipeline = ExportPipeline::new(Arc::new(FixedRenderer(b"pdf".to_vec())), uploader);

    let err = pipeline.export(snapshot()).await.expect_err("upload failure");
    assert_eq!(err.to_string(), "Failed to upload PDF: bucket unavailable");
    assert_eq!(
        pipeline.state(),
        ExportState::Failed("Failed to upload PDF: bucket unavailable".to_string())
    );

    pipeline.reset();
    assert_eq!(pipeline.state(), ExportState::Idle);
}

#[tokio::test]
async fn second_export_while_uploading_is_rejected() {
    let gate = Arc::new(Notify::new());
    let uploader = Arc::new(RecordingUploader {
        gate: Some(Arc::clone(&gate)),
        ..Default::default()
    });
    let pipeline = Arc::new(ExportPipeline::new(
        Arc::new(FixedRenderer(b"pdf".to_vec())),
        uploader.clone(),
    ));

    let mut states = pipeline.subscribe();
    let running = tokio::spawn({
        let pipeline = Arc::clone(&pipeline);
        async move { pipeline.export(snapshot()).await }
    });
    states
        .wait_for(|state| *state == ExportState::Uploading)
        .await
        .expect("uploading");

    assert_eq!(
        pipeline.export(snapshot()).await,
        Err(ExportError::InFlight)
    );
    pipeline.reset();
    assert_eq!(pipeline.state(), ExportState::Uploading);

    gate.notify_one();
    let receipt = running.await.expect("join").expect("first export");
    assert_eq!(pipeline.state(), ExportState::Done(receipt));
    assert_eq!(uploader.uploads.lock().await.len(), 1);
}

#[tokio::test]
async fn a_new_export_may_follow_a_failed_one() {
    let pipeline = ExportPipeline::new(
        Arc::new(FailingRenderer),
        Arc::new(RecordingUploader::default()),
    );
    assert!(pipeline.export(snapshot()).await.is_err());
    let second = pipeline.export(snapshot()).await;
    assert!(matches!(second, Err(ExportError::Render(_))));
}
