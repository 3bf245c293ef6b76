use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
pub const OBJECTS_ROUTE: &str = "/objects";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObjectUploadQuery {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectUploadResponse {
    pub object_name: String,
    pub url: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectSummary {
    pub object_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

/// Public retrieval URL for a stored object.
pub fn object_url(public_base_url: &str, object_name: &str) -> String {
    format!(
        "{}{OBJECTS_ROUTE}/{}",
        public_base_url.trim_end_matches('/'),
        object_name.trim_start_matches('/')
    )
}
