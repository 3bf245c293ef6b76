use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use shared::{
    error::{ApiError, ErrorCode},
    protocol::{ObjectSummary, ObjectUploadQuery, ObjectUploadResponse, DEFAULT_CONTENT_TYPE},
};
use tracing::error;

use crate::app_state::AppState;

type HttpError = (StatusCode, Json<ApiError>);

#[derive(Debug, Deserialize)]
pub(crate) struct ListObjectsQuery {
    limit: Option<u32>,
}

pub(crate) fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn into_http(err: ApiError) -> HttpError {
    if err.code == ErrorCode::Internal {
        error!(message = %err.message, "object store request failed");
    }
    (status_for(err.code), Json(err))
}

pub(crate) async fn upload_object(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ObjectUploadQuery>,
    body: Bytes,
) -> Result<Json<ObjectUploadResponse>, HttpError> {
    server_api::store_object(&state.api, &q.name, q.content_type.as_deref(), &body)
        .await
        .map(Json)
        .map_err(into_http)
}

pub(crate) async fn list_objects(
    State(state): State<Arc<AppState>>,
    Query(q): Query<ListObjectsQuery>,
) -> Result<Json<Vec<ObjectSummary>>, HttpError> {
    server_api::list_objects(&state.api, q.limit)
        .await
        .map(Json)
        .map_err(into_http)
}

pub(crate) async fn download_object(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, HttpError> {
    let object = server_api::fetch_object(&state.api, &name)
        .await
        .map_err(into_http)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&object.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(DEFAULT_CONTENT_TYPE)),
    );
    let filename = object
        .object_name
        .rsplit('/')
        .next()
        .unwrap_or(object.object_name.as_str());
    if let Ok(value) = HeaderValue::from_str(&format!("inline; filename=\"{filename}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }

    Ok((StatusCode::OK, headers, object.bytes))
}
