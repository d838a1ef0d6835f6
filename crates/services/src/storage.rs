//! Object storage for avatars, chat attachments and documents.
//!
//! Objects are addressed by a relative key; the URL handed to clients is
//! derived from the key and served back by the API.

use std::path::PathBuf;

use async_trait::async_trait;
use peopledesk_db::models::DocumentCategory;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::debug;

use crate::chat::ConversationId;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
    #[error("Object not found: {0}")]
    NotFound(String),
    #[error("Object exceeds the {limit} byte upload limit")]
    TooLarge { limit: u64 },
    #[error("Object is empty")]
    Empty,
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StoredObject {
    pub key: String,
    pub url: String,
    pub size: u64,
    pub checksum: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<StoredObject, StorageError>;
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;
    async fn size(&self, key: &str) -> Result<u64, StorageError>;
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

pub fn download_url(key: &str) -> String {
    format!("/api/storage/{}", key)
}

pub fn avatar_key(owner: &str, file_name: &str) -> String {
    format!("avatars/{}/{}", owner, unique_name(file_name))
}

pub fn chat_key(conversation: &ConversationId, file_name: &str) -> String {
    format!("chat/{}/{}", conversation, unique_name(file_name))
}

pub fn document_key(category: DocumentCategory, file_name: &str) -> String {
    format!("documents/{}/{}", category.as_str(), unique_name(file_name))
}

fn unique_name(file_name: &str) -> String {
    format!("{}-{}", uuid::Uuid::new_v4().simple(), sanitize_file_name(file_name))
}

pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(100)
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

pub fn validate_key(key: &str) -> Result<(), StorageError> {
    let bad = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|part| part.is_empty() || part == "." || part == "..");
    if bad {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}

pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit('.').next().unwrap_or("").to_ascii_lowercase();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        _ => "application/octet-stream",
    }
}

/// Stores objects as files under a root directory.
pub struct LocalObjectStore {
    root: PathBuf,
    max_bytes: u64,
}

impl LocalObjectStore {
    pub fn new(root: impl Into<PathBuf>, max_bytes: u64) -> Self {
        Self {
            root: root.into(),
            max_bytes,
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.root.join(key))
    }
}

fn not_found(key: &str, err: std::io::Error) -> StorageError {
    if err.kind() == std::io::ErrorKind::NotFound {
        StorageError::NotFound(key.to_string())
    } else {
        StorageError::Io(err)
    }
}

#[async_trait]
impl ObjectStore for LocalObjectStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<StoredObject, StorageError> {
        if bytes.is_empty() {
            return Err(StorageError::Empty);
        }
        if bytes.len() as u64 > self.max_bytes {
            return Err(StorageError::TooLarge {
                limit: self.max_bytes,
            });
        }
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;

        let checksum = hex::encode(Sha256::digest(bytes));
        debug!(key, size = bytes.len(), "Stored object");

        Ok(StoredObject {
            key: key.to_string(),
            url: download_url(key),
            size: bytes.len() as u64,
            checksum,
        })
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path).await.map_err(|e| not_found(key, e))
    }

    async fn size(&self, key: &str) -> Result<u64, StorageError> {
        let path = self.path_for(key)?;
        let meta = tokio::fs::metadata(&path).await.map_err(|e| not_found(key, e))?;
        Ok(meta.len())
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path).await.map_err(|e| not_found(key, e))?;
        debug!(key, "Deleted object");
        Ok(())
    }
}
