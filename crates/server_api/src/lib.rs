use shared::{
    error::{ApiError, ErrorCode},
    protocol::{object_url, ObjectSummary, ObjectUploadResponse, DEFAULT_CONTENT_TYPE},
};
use storage::{PutOutcome, Storage, StoredObject};
use tracing::{info, warn};

pub const DEFAULT_MAX_OBJECT_BYTES: usize = 16 * 1024 * 1024;
pub const MAX_OBJECT_NAME_LEN: usize = 180;
pub const MAX_LIST_LIMIT: u32 = 500;
const MAX_CONTENT_TYPE_LEN: usize = 127;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub public_url: String,
    pub max_object_bytes: usize,
}

impl ApiContext {
    pub fn new(storage: Storage, public_url: impl Into<String>) -> Self {
        Self {
            storage,
            public_url: public_url.into(),
            max_object_bytes: DEFAULT_MAX_OBJECT_BYTES,
        }
    }

    pub fn with_max_object_bytes(mut self, max_object_bytes: usize) -> Self {
        self.max_object_bytes = max_object_bytes;
        self
    }
}

/// Object names are relative `/`-separated paths of plain segments.
pub fn validate_object_name(name: &str) -> Result<(), ApiError> {
    let invalid = |reason: &str| {
        Err(ApiError::new(
            ErrorCode::Validation,
            format!("invalid object name '{name}': {reason}"),
        ))
    };

    if name.is_empty() {
        return invalid("name is empty");
    }
    if name.len() > MAX_OBJECT_NAME_LEN {
        return invalid("name is too long");
    }
    if name.starts_with('/') || name.contains('\\') {
        return invalid("name must be a relative path");
    }
    for segment in name.split('/') {
        if segment.is_empty() || segment == "." || segment == ".." {
            return invalid("empty or relative path segment");
        }
        if !segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
        {
            return invalid("only letters, digits, '-', '_' and '.' are allowed");
        }
    }
    Ok(())
}

fn normalize_content_type(content_type: Option<&str>) -> Result<String, ApiError> {
    let content_type = content_type
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(DEFAULT_CONTENT_TYPE);
    if content_type.len() > MAX_CONTENT_TYPE_LEN
        || !content_type.contains('/')
        || content_type.chars().any(|c| c.is_control())
    {
        return Err(ApiError::new(
            ErrorCode::Validation,
            format!("invalid content type '{content_type}'"),
        ));
    }
    Ok(content_type.to_string())
}

pub async fn store_object(
    ctx: &ApiContext,
    name: &str,
    content_type: Option<&str>,
    bytes: &[u8],
) -> Result<ObjectUploadResponse, ApiError> {
    if bytes.is_empty() {
        return Err(ApiError::new(ErrorCode::Validation, "object body is empty"));
    }
    if bytes.len() > ctx.max_object_bytes {
        return Err(ApiError::new(
            ErrorCode::PayloadTooLarge,
            format!(
                "object is {} bytes; the limit is {} bytes",
                bytes.len(),
                ctx.max_object_bytes
            ),
        ));
    }
    validate_object_name(name)?;
    let content_type = normalize_content_type(content_type)?;

    match ctx
        .storage
        .put_object(name, &content_type, bytes)
        .await
        .map_err(internal)?
    {
        PutOutcome::Created(summary) => {
            info!(object_name = name, size_bytes = summary.size_bytes, "stored object");
            Ok(ObjectUploadResponse {
                url: object_url(&ctx.public_url, &summary.object_name),
                object_name: summary.object_name,
                size_bytes: summary.size_bytes,
            })
        }
        PutOutcome::AlreadyExists => {
            warn!(object_name = name, "rejected upload over existing object");
            Err(ApiError::new(
                ErrorCode::Conflict,
                format!("object '{name}' already exists"),
            ))
        }
    }
}

pub async fn fetch_object(ctx: &ApiContext, name: &str) -> Result<StoredObject, ApiError> {
    validate_object_name(name).map_err(|_| not_found(name))?;
    ctx.storage
        .load_object(name)
        .await
        .map_err(internal)?
        .ok_or_else(|| not_found(name))
}

pub async fn list_objects(
    ctx: &ApiContext,
    limit: Option<u32>,
) -> Result<Vec<ObjectSummary>, ApiError> {
    let limit = limit.unwrap_or(50).clamp(1, MAX_LIST_LIMIT);
    ctx.storage.list_objects(limit).await.map_err(internal)
}

pub async fn delete_object(ctx: &ApiContext, name: &str) -> Result<(), ApiError> {
    validate_object_name(name)?;
    let removed = ctx.storage.delete_object(name).await.map_err(internal)?;
    if !removed {
        return Err(not_found(name));
    }
    info!(object_name = name, "deleted object");
    Ok(())
}

fn not_found(name: &str) -> ApiError {
    ApiError::new(ErrorCode::NotFound, format!("object '{name}' not found"))
}

fn internal(err: anyhow::Error) -> ApiError {
    ApiError::new(ErrorCode::Internal, format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup() -> ApiContext {
        let storage = Storage::new("sqlite::memory:").await.expect("db");
        ApiContext::new(storage, "http://files.test/").with_max_object_bytes(16)
    }

    #[test]
    fn accepts_nested_relative_names() {
        validate_object_name("recipes/recipe-1f2e.pdf").expect("valid");
        validate_object_name("a_b.c").expect("valid");
    }

    #[test]
    fn rejects_traversal_and_odd_names() {
        for name in [
            "",
            "/etc/passwd",
            "../secret.pdf",
            "recipes/../../x.pdf",
            "recipes//x.pdf",
            "recipes/./x.pdf",
            "dir\\x.pdf",
            "has space.pdf",
            "trailing/",
        ] {
            let err = validate_object_name(name).expect_err(name);
            assert_eq!(err.code, ErrorCode::Validation, "{name}");
        }
        let long = "a".repeat(MAX_OBJECT_NAME_LEN + 1);
        assert!(validate_object_name(&long).is_err());
    }

    #[test]
    fn content_type_defaults_to_octet_stream() {
        assert_eq!(
            normalize_content_type(None).expect("default"),
            DEFAULT_CONTENT_TYPE
        );
        assert_eq!(
            normalize_content_type(Some(" application/pdf ")).expect("trimmed"),
            "application/pdf"
        );
        assert!(normalize_content_type(Some("pdf")).is_err());
    }

    #[tokio::test]
    async fn store_returns_public_url() {
        let ctx = setup().await;
        let stored = store_object(&ctx, "recipes/a.pdf", Some("application/pdf"), b"%PDF")
            .await
            .expect("store");
        assert_eq!(stored.url, "http://files.test/objects/recipes/a.pdf");
        assert_eq!(stored.size_bytes, 4);

        let fetched = fetch_object(&ctx, "recipes/a.pdf").await.expect("fetch");
        assert_eq!(fetched.bytes, b"%PDF");
        assert_eq!(fetched.content_type, "application/pdf");
    }

    #[tokio::test]
    async fn store_rejects_empty_oversized_and_duplicate_bodies() {
        let ctx = setup().await;
        let empty = store_object(&ctx, "a.pdf", None, b"").await.expect_err("empty");
        assert_eq!(empty.code, ErrorCode::Validation);

        let big = store_object(&ctx, "a.pdf", None, &[0u8; 17])
            .await
            .expect_err("too large");
        assert_eq!(big.code, ErrorCode::PayloadTooLarge);

        store_object(&ctx, "a.pdf", None, b"one").await.expect("first");
        let dup = store_object(&ctx, "a.pdf", None, b"two")
            .await
            .expect_err("duplicate");
        assert_eq!(dup.code, ErrorCode::Conflict);
    }

    #[tokio::test]
    async fn fetch_and_delete_missing_objects_are_not_found() {
        let ctx = setup().await;
        let err = fetch_object(&ctx, "missing.pdf").await.expect_err("missing");
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = fetch_object(&ctx, "../x").await.expect_err("traversal");
        assert_eq!(err.code, ErrorCode::NotFound);
        let err = delete_object(&ctx, "missing.pdf").await.expect_err("missing");
        assert_eq!(err.code, ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn list_clamps_the_limit() {
        let ctx = setup().await;
        for name in ["a.pdf", "b.pdf"] {
            store_object(&ctx, name, None, b"x").await.expect("store");
        }
        assert_eq!(list_objects(&ctx, Some(0)).await.expect("list").len(), 1);
        assert_eq!(list_objects(&ctx, None).await.expect("list").len(), 2);
    }
}
