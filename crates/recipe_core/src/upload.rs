use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    error::ApiError,
    protocol::{ObjectUploadResponse, OBJECTS_ROUTE},
};
use tracing::debug;

use crate::export::ObjectUploader;

/// Uploads documents to the recipe object-store server over HTTP.
#[derive(Debug, Clone)]
pub struct HttpObjectUploader {
    http: Client,
    server_url: String,
}

impl HttpObjectUploader {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        Self {
            http,
            server_url: server_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl ObjectUploader for HttpObjectUploader {
    async fn upload(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<ObjectUploadResponse> {
        debug!(object_name, size_bytes = bytes.len(), "posting object");
        let response = self
            .http
            .post(format!("{}{OBJECTS_ROUTE}", self.server_url))
            .query(&[("name", object_name), ("content_type", content_type)])
            .body(bytes)
            .send()
            .await
            .with_context(|| format!("failed to reach object store at {}", self.server_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|api_error| api_error.message)
                .unwrap_or(body);
            return Err(anyhow!("object store rejected upload ({status}): {message}"));
        }

        response
            .json::<ObjectUploadResponse>()
            .await
            .context("object store returned an unreadable upload response")
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{
        body::Bytes,
        extract::{Query, State},
        http::StatusCode,
        routing::post,
        Json, Router,
    };
    use shared::{
        error::ErrorCode,
        protocol::{object_url, ObjectUploadQuery},
    };
    use tokio::net::TcpListener;

    use super::*;

    type Received = Arc<Mutex<Vec<(ObjectUploadQuery, Vec<u8>)>>>;

    async fn accept(
        State(received): State<Received>,
        Query(query): Query<ObjectUploadQuery>,
        body: Bytes,
    ) -> Json<ObjectUploadResponse> {
        let response = ObjectUploadResponse {
            object_name: query.name.clone(),
            url: object_url("http://files.test", &query.name),
            size_bytes: body.len() as u64,
        };
        received
            .lock()
            .expect("lock")
            .push((query, body.to_vec()));
        Json(response)
    }

    async fn reject() -> (StatusCode, Json<ApiError>) {
        (
            StatusCode::CONFLICT,
            Json(ApiError::new(ErrorCode::Conflict, "object already exists")),
        )
    }

    async fn serve(app: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("serve");
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn upload_posts_bytes_with_name_and_content_type() {
        let received: Received = Arc::default();
        let app = Router::new()
            .route("/objects", post(accept))
            .with_state(Arc::clone(&received));
        let server_url = serve(app).await;

        let uploader = HttpObjectUploader::new(format!("{server_url}/"));
        let response = uploader
            .upload("recipes/recipe-1.pdf", "application/pdf", b"%PDF-1.3".to_vec())
            .await
            .expect("upload");

        assert_eq!(response.object_name, "recipes/recipe-1.pdf");
        assert_eq!(response.url, "http://files.test/objects/recipes/recipe-1.pdf");
        assert_eq!(response.size_bytes, 8);

        let received = received.lock().expect("lock");
        assert_eq!(received.len(), 1);
        assert_eq!(received[0].0.content_type.as_deref(), Some("application/pdf"));
        assert_eq!(received[0].1, b"%PDF-1.3");
    }

    #[tokio::test]
    async fn upload_surfaces_server_error_message() {
        let app = Router::new().route("/objects", post(reject));
        let server_url = serve(app).await;

        let err = HttpObjectUploader::new(server_url)
            .upload("recipes/a.pdf", "application/pdf", vec![1, 2, 3])
            .await
            .expect_err("conflict");
        let message = format!("{err:#}");
        assert!(message.contains("409"), "{message}");
        assert!(message.contains("object already exists"), "{message}");
    }

    #[tokio::test]
    async fn upload_reports_unreachable_server() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        drop(listener);

        let err = HttpObjectUploader::new(format!("http://{addr}"))
            .upload("recipes/a.pdf", "application/pdf", vec![1])
            .await
            .expect_err("unreachable");
        assert!(format!("{err:#}").contains("failed to reach object store"));
    }
}
