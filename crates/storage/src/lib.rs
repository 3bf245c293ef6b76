use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    Pool, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::protocol::ObjectSummary;

const MEMORY_DATABASE_URL: &str = "sqlite::memory:";

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct StoredObject {
    pub object_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub created_at: DateTime<Utc>,
}

impl StoredObject {
    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PutOutcome {
    Created(ObjectSummary),
    AlreadyExists,
}

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // Every connection to an in-memory database opens a fresh, empty one.
        let pool_options = if database_url == MEMORY_DATABASE_URL {
            SqlitePoolOptions::new()
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };
        let pool = pool_options
            .connect_with(connect_options)
            .await
            .with_context(|| format!("failed to open database '{database_url}'"))?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("failed to run storage migrations")?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    /// Objects are write-once: an existing name is never overwritten.
    pub async fn put_object(
        &self,
        object_name: &str,
        content_type: &str,
        bytes: &[u8],
    ) -> Result<PutOutcome> {
        let size_bytes = i64::try_from(bytes.len()).unwrap_or(i64::MAX);
        let created_at = Utc::now();
        let result = sqlx::query(
            "INSERT INTO objects (name, content_type, bytes, size_bytes, created_at) VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(name) DO NOTHING",
        )
        .bind(object_name)
        .bind(content_type)
        .bind(bytes)
        .bind(size_bytes)
        .bind(created_at)
        .execute(&self.pool)
        .await
        .with_context(|| format!("failed to store object '{object_name}'"))?;

        if result.rows_affected() == 0 {
            debug!(object_name, "object name already taken");
            return Ok(PutOutcome::AlreadyExists);
        }
        Ok(PutOutcome::Created(ObjectSummary {
            object_name: object_name.to_string(),
            content_type: content_type.to_string(),
            size_bytes: bytes.len() as u64,
            created_at,
        }))
    }

    pub async fn load_object(&self, object_name: &str) -> Result<Option<StoredObject>> {
        let row = sqlx::query(
            "SELECT name, content_type, bytes, created_at FROM objects WHERE name = ?",
        )
        .bind(object_name)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| StoredObject {
            object_name: r.get::<String, _>(0),
            content_type: r.get::<String, _>(1),
            bytes: r.get::<Vec<u8>, _>(2),
            created_at: r.get::<DateTime<Utc>, _>(3),
        }))
    }

    /// Newest first.
    pub async fn list_objects(&self, limit: u32) -> Result<Vec<ObjectSummary>> {
        let rows = sqlx::query(
            "SELECT name, content_type, size_bytes, created_at FROM objects
             ORDER BY created_at DESC, rowid DESC LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|r| ObjectSummary {
                object_name: r.get::<String, _>(0),
                content_type: r.get::<String, _>(1),
                size_bytes: r.get::<i64, _>(2).max(0) as u64,
                created_at: r.get::<DateTime<Utc>, _>(3),
            })
            .collect())
    }

    /// Returns whether an object was removed.
    pub async fn delete_object(&self, object_name: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM objects WHERE name = ?")
            .bind(object_name)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == MEMORY_DATABASE_URL || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
