use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::Response,
};
use peopledesk_services::{
    chat::ConversationId,
    storage::{content_type_for, validate_key},
};

use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

/// Streams a stored object back. Chat attachments are only visible to the
/// conversation's members.
pub async fn download(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(key): Path<String>,
) -> Result<Response, ApiError> {
    validate_key(&key)?;

    if let Some(rest) = key.strip_prefix("chat/") {
        let conversation = rest
            .split('/')
            .next()
            .and_then(|c| c.parse::<ConversationId>().ok())
            .ok_or_else(|| ApiError::NotFound("File not found".to_string()))?;
        if !conversation.includes(&auth.user_id) {
            return Err(ApiError::forbidden());
        }
    }

    let bytes = state.store.get(&key).await?;
    let file_name = key.rsplit('/').next().unwrap_or("download");

    Response::builder()
        .header(header::CONTENT_TYPE, content_type_for(&key))
        .header(header::CONTENT_LENGTH, bytes.len())
        .header(
            header::CONTENT_DISPOSITION,
            format!("inline; filename=\"{}\"", file_name),
        )
        .header(header::CACHE_CONTROL, "private, max-age=3600")
        .body(Body::from(bytes))
        .map_err(|e| ApiError::Internal(format!("Failed to build response: {}", e)))
}
