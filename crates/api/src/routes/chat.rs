use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use bson::{DateTime, oid::ObjectId};
use peopledesk_db::models::{ChatAttachment, ChatMessage};
use peopledesk_services::{
    chat::ConversationId,
    storage::chat_key,
    validation::ChatMessageForm,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{hex, parse_id, rfc3339, stored_id, upload::UploadForm};
use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, form::ValidForm},
    state::AppState,
    ws::dispatcher::{publish, send_to_user},
};

#[derive(Debug, Serialize)]
pub struct ChatMessageResponse {
    pub id: String,
    pub conversation_id: String,
    pub sender_id: String,
    pub sender_name: String,
    pub text: String,
    pub attachment: Option<ChatAttachment>,
    pub created_at: String,
    pub read_at: Option<String>,
    pub read_by: Vec<String>,
}

fn to_response(m: ChatMessage) -> ChatMessageResponse {
    ChatMessageResponse {
        id: hex(m.id),
        conversation_id: m.conversation_id,
        sender_id: m.sender_id.to_hex(),
        sender_name: m.sender_name,
        text: m.text,
        attachment: m.attachment,
        created_at: rfc3339(m.created_at),
        read_at: m.read_at.map(rfc3339),
        read_by: m.read_by.iter().map(|id| id.to_hex()).collect(),
    }
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// RFC 3339 timestamp; only messages strictly older are returned.
    pub before: Option<String>,
    pub limit: Option<u32>,
}

/// Parses the path segment and checks the caller belongs to the
/// conversation. Direct conversations also need the other member to exist.
pub(crate) async fn open_conversation(
    state: &AppState,
    user_id: &ObjectId,
    raw: &str,
) -> Result<ConversationId, ApiError> {
    let conversation: ConversationId = raw.parse()?;
    if !conversation.includes(user_id) {
        return Err(ApiError::Forbidden(format!(
            "{} is not part of conversation {}",
            user_id, conversation
        )));
    }
    if let Some(other) = conversation.other_participant(user_id) {
        state.users.base.find_by_id(other).await?;
    }
    Ok(conversation)
}

/// Requested page size, kept between one and the configured page limit.
fn history_limit(requested: Option<u32>, page_limit: u32) -> u32 {
    let page_limit = page_limit.max(1);
    requested.unwrap_or(page_limit).clamp(1, page_limit)
}

pub async fn unread(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let counts = state.chat.unread_counts(auth.user_id).await?;
    let total: u64 = counts.iter().map(|c| c.count).sum();
    Ok(Json(serde_json::json!({ "items": counts, "total": total })))
}

pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conversation = open_conversation(&state, &auth.user_id, &conversation).await?;

    let before = match query.before.as_deref() {
        Some(raw) => Some(
            DateTime::parse_rfc3339_str(raw)
                .map_err(|_| ApiError::BadRequest("Invalid 'before' timestamp".to_string()))?,
        ),
        None => None,
    };
    let limit = history_limit(query.limit, state.settings.chat.page_limit);

    let messages = state.chat.list(&conversation, before, limit).await?;
    let items: Vec<ChatMessageResponse> = messages.into_iter().map(to_response).collect();

    Ok(Json(serde_json::json!({
        "conversation_id": conversation.to_string(),
        "items": items,
    })))
}

pub async fn send(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation): Path<String>,
    ValidForm(form): ValidForm<ChatMessageForm>,
) -> Result<(StatusCode, Json<ChatMessageResponse>), ApiError> {
    let conversation = open_conversation(&state, &auth.user_id, &conversation).await?;

    if let Some(attachment) = &form.attachment {
        let prefix = format!("/api/storage/chat/{}/", conversation);
        if !attachment.url.starts_with(&prefix) {
            return Err(ApiError::field(
                "attachment",
                "Attachments must be uploaded to this conversation",
            ));
        }
    }

    let message = state
        .chat
        .send(&conversation, auth.user_id, auth.name.clone(), form)
        .await?;
    let message_id = stored_id(message.id)?;
    debug!(%conversation, message = %message_id, "Chat message sent");

    let response = to_response(message);
    let event = serde_json::json!({ "type": "chat:message", "data": &response });
    publish(&state.ws_storage, &conversation.topic(), &event, None).await;

    notify_recipients(&state, &conversation, &auth, message_id, &response).await?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// Desktop notification for everyone but the sender who opted in, at most
/// once per message per recipient.
async fn notify_recipients(
    state: &AppState,
    conversation: &ConversationId,
    sender: &AuthUser,
    message_id: ObjectId,
    message: &ChatMessageResponse,
) -> Result<(), ApiError> {
    let candidates: Vec<ObjectId> = match conversation {
        ConversationId::General => state.users.all_ids().await?,
        ConversationId::Direct(..) => conversation.participants(),
    }
    .into_iter()
    .filter(|id| id != &sender.user_id)
    .collect();

    let recipients = state.users.notifiable_among(&candidates).await?;

    let preview: String = if message.text.is_empty() {
        message
            .attachment
            .as_ref()
            .map(|a| format!("Sent {}", a.name))
            .unwrap_or_default()
    } else {
        message.text.chars().take(120).collect()
    };

    for user_id in recipients {
        if !state.notifications.should_notify(user_id, message_id) {
            continue;
        }
        let event = serde_json::json!({
            "type": "notification",
            "data": {
                "conversation_id": message.conversation_id,
                "message_id": message.id,
                "title": message.sender_name,
                "body": preview,
            }
        });
        send_to_user(&state.ws_storage, &user_id, &event).await;
    }
    Ok(())
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((conversation, message_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let conversation = open_conversation(&state, &auth.user_id, &conversation).await?;
    let message_id = parse_id(&message_id, "message_id")?;

    state
        .chat
        .delete_own(&conversation, message_id, auth.user_id)
        .await?;

    let event = serde_json::json!({
        "type": "chat:delete",
        "data": {
            "conversation_id": conversation.to_string(),
            "message_id": message_id.to_hex(),
        }
    });
    publish(&state.ws_storage, &conversation.topic(), &event, None).await;
    Ok(StatusCode::NO_CONTENT)
}

/// Upload a chat attachment via multipart form data.
/// Fields: `file` (binary)
pub async fn upload_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation): Path<String>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<ChatAttachment>), ApiError> {
    let conversation = open_conversation(&state, &auth.user_id, &conversation).await?;
    let (file, _) = UploadForm::read(multipart).await?.require_file()?;

    let stored = state
        .store
        .put(&chat_key(&conversation, &file.file_name), &file.bytes)
        .await?;
    info!(key = %stored.key, size = stored.size, "Chat attachment stored");

    Ok((
        StatusCode::CREATED,
        Json(ChatAttachment {
            url: stored.url,
            name: file.file_name,
            content_type: file.content_type,
            size: stored.size,
        }),
    ))
}

pub async fn mark_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(conversation): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let conversation = open_conversation(&state, &auth.user_id, &conversation).await?;
    let updated = record_read(&state, &conversation, auth.user_id).await?;
    Ok(Json(serde_json::json!({ "updated": updated })))
}

/// Marks incoming messages read and tells the conversation.
pub(crate) async fn record_read(
    state: &AppState,
    conversation: &ConversationId,
    reader: ObjectId,
) -> Result<u64, ApiError> {
    let updated = state.chat.mark_read(conversation, reader).await?;
    if updated > 0 {
        let event = serde_json::json!({
            "type": "chat:read",
            "data": {
                "conversation_id": conversation.to_string(),
                "reader_id": reader.to_hex(),
                "count": updated,
                "read_at": rfc3339(DateTime::now()),
            }
        });
        publish(&state.ws_storage, &conversation.topic(), &event, None).await;
    }
    Ok(updated)
}
