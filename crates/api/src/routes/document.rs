use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use peopledesk_db::models::{DocumentCategory, DocumentMetadata};
use peopledesk_services::{
    storage::{StorageError, StoredObject, document_key, download_url},
    validation::DocumentForm,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{hex, parse_id, rfc3339, stored_id, upload::UploadForm};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, form::ValidForm},
    state::AppState,
    ws::dispatcher::{ChangeOp, publish_change},
};

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    pub id: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    pub category: DocumentCategory,
    pub description: Option<String>,
    pub storage_key: String,
    pub download_url: String,
    pub checksum: Option<String>,
    pub uploaded_by: String,
    pub uploader_name: String,
    pub uploaded_at: String,
}

fn to_response(d: DocumentMetadata) -> DocumentResponse {
    DocumentResponse {
        id: hex(d.id),
        file_name: d.file_name,
        file_type: d.file_type,
        file_size: d.file_size,
        category: d.category,
        description: d.description,
        storage_key: d.storage_key,
        download_url: d.download_url,
        checksum: d.checksum,
        uploaded_by: d.uploaded_by.to_hex(),
        uploader_name: d.uploader_name,
        uploaded_at: rfc3339(d.uploaded_at),
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub file_name: String,
    pub content_type: String,
    pub category: DocumentCategory,
    #[serde(flatten)]
    pub stored: StoredObject,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub category: Option<DocumentCategory>,
}

fn parse_category(raw: Option<&String>) -> Result<DocumentCategory, ApiError> {
    match raw.map(|c| c.trim()).filter(|c| !c.is_empty()) {
        None => Ok(DocumentCategory::default()),
        Some(value) => serde_json::from_value(serde_json::Value::String(value.to_string()))
            .map_err(|_| ApiError::field("category", "Unknown document category")),
    }
}

/// The recorded size must match the stored object and stay within the upload limit.
fn check_file_size(claimed: u64, stored: u64, limit: u64) -> Result<(), ApiError> {
    if claimed > limit {
        return Err(ApiError::field(
            "file_size",
            format!("Files cannot exceed {} bytes", limit),
        ));
    }
    if claimed != stored {
        return Err(ApiError::field(
            "file_size",
            "File size does not match the uploaded file",
        ));
    }
    Ok(())
}

/// Upload a file via multipart form data.
/// Fields: `file` (binary), `category` (text, optional)
pub async fn upload(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let (file, fields) = UploadForm::read(multipart).await?.require_file()?;
    let category = parse_category(fields.get("category"))?;

    let key = document_key(category, &file.file_name);
    let stored = state.store.put(&key, &file.bytes).await?;
    info!(key = %stored.key, size = stored.size, by = %auth.user_id, "Document uploaded");

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            file_name: file.file_name,
            content_type: file.content_type,
            category,
            stored,
        }),
    ))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidForm(form): ValidForm<DocumentForm>,
) -> Result<(StatusCode, Json<DocumentResponse>), ApiError> {
    let stored_size = match state.store.size(&form.storage_key).await {
        Ok(size) => size,
        Err(StorageError::NotFound(_) | StorageError::InvalidKey(_)) => {
            return Err(ApiError::field(
                "storage_key",
                "Upload the file before saving its details",
            ));
        }
        Err(e) => return Err(e.into()),
    };
    check_file_size(form.file_size, stored_size, state.settings.storage.max_upload_bytes)?;

    let url = download_url(&form.storage_key);
    let document = state
        .documents
        .create(auth.user_id, auth.name.clone(), url, form)
        .await?;
    let id = stored_id(document.id)?;

    let response = to_response(document);
    publish(&state, ChangeOp::Created, &id, Some(&response)).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let documents = state
        .documents
        .list(query.category, state.fetch_limit())
        .await?;
    let items: Vec<DocumentResponse> = documents.into_iter().map(to_response).collect();
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(document_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&document_id, "document_id")?;
    let document = state.documents.base.find_by_id(id).await?;
    auth.ensure_owner_or_admin(&document.uploaded_by)?;

    state.documents.base.delete_by_id(id).await?;
    if let Err(e) = state.store.delete(&document.storage_key).await {
        warn!(key = %document.storage_key, %e, "Stored object not removed");
    }

    publish(&state, ChangeOp::Deleted, &id, None).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn publish(
    state: &AppState,
    op: ChangeOp,
    id: &ObjectId,
    response: Option<&DocumentResponse>,
) {
    publish_change(&state.ws_storage, DocumentMetadata::COLLECTION, op, id, response).await;
}
