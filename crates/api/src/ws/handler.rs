use axum::{
    extract::{
        Query, State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bson::oid::ObjectId;
use futures::StreamExt;
use peopledesk_db::models::{
    Announcement, DocumentMetadata, Employee, LeaveRequest, Resignation, Team, WifiBill,
};
use peopledesk_services::chat::ConversationId;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::dispatcher::{publish, send_to_connection};
use crate::{routes::chat::record_read, state::AppState};

/// Collections whose changes are published under their own name.
const COLLECTION_TOPICS: &[&str] = &[
    Employee::COLLECTION,
    LeaveRequest::COLLECTION,
    Resignation::COLLECTION,
    Team::COLLECTION,
    DocumentMetadata::COLLECTION,
    WifiBill::COLLECTION,
    Announcement::COLLECTION,
];

#[derive(Debug, Deserialize)]
pub struct WsParams {
    pub token: String,
}

pub async fn ws_upgrade(
    State(state): State<AppState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    // Verify JWT before accepting the WebSocket
    let claims = match state.auth.verify_access_token(&params.token) {
        Ok(c) => c,
        Err(_) => return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response(),
    };

    let user_id = match ObjectId::parse_str(&claims.sub) {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid user ID").into_response(),
    };

    ws.on_upgrade(move |socket| handle_socket(socket, state, user_id))
}

/// Which conversation a `chat:<id>` topic names, if the user may join it.
pub(crate) fn topic_conversation(topic: &str, user_id: &ObjectId) -> Option<ConversationId> {
    let conversation: ConversationId = topic.strip_prefix("chat:")?.parse().ok()?;
    conversation.includes(user_id).then_some(conversation)
}

pub(crate) fn topic_allowed(topic: &str, user_id: &ObjectId) -> bool {
    COLLECTION_TOPICS.contains(&topic) || topic_conversation(topic, user_id).is_some()
}

async fn handle_socket(socket: WebSocket, state: AppState, user_id: ObjectId) {
    let connection_id = Uuid::new_v4().to_string();
    info!(?user_id, %connection_id, "WebSocket connected");

    let (sender, mut receiver) = socket.split();
    let sender = Arc::new(Mutex::new(sender));

    state
        .ws_storage
        .add(user_id, connection_id.clone(), sender.clone());

    let connected = serde_json::json!({
        "type": "connected",
        "data": {
            "user_id": user_id.to_hex(),
            "connection_id": connection_id,
        }
    });
    send_to_connection(&state.ws_storage, &connection_id, &connected).await;

    if let Err(e) = state.users.touch(user_id).await {
        warn!(?user_id, %e, "Failed to record activity");
    }

    while let Some(msg) = receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => {
                handle_client_message(&state, &user_id, &connection_id, text.as_str()).await;
            }
            Ok(Message::Close(_)) => break,
            Err(e) => {
                warn!(?user_id, %connection_id, %e, "WebSocket error");
                break;
            }
            _ => {}
        }
    }

    state.ws_storage.remove(&connection_id);
    info!(?user_id, %connection_id, "WebSocket disconnected");
}

async fn reply_error(state: &AppState, connection_id: &str, message: &str) {
    let event = serde_json::json!({ "type": "error", "data": { "message": message } });
    send_to_connection(&state.ws_storage, connection_id, &event).await;
}

async fn handle_client_message(
    state: &AppState,
    user_id: &ObjectId,
    connection_id: &str,
    text: &str,
) {
    let parsed: serde_json::Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(_) => {
            reply_error(state, connection_id, "Messages must be JSON").await;
            return;
        }
    };

    let msg_type = parsed.get("type").and_then(|t| t.as_str()).unwrap_or("");
    let data = parsed.get("data");
    let field = |name: &str| {
        data.and_then(|d| d.get(name))
            .and_then(|v| v.as_str())
            .map(str::to_string)
    };

    debug!(?user_id, %connection_id, msg_type, "WS message received");

    match msg_type {
        "ping" => {
            let pong = serde_json::json!({ "type": "pong" });
            send_to_connection(&state.ws_storage, connection_id, &pong).await;
        }
        "subscribe" => {
            let Some(topic) = field("topic") else {
                return reply_error(state, connection_id, "subscribe needs a topic").await;
            };
            if !topic_allowed(&topic, user_id) {
                return reply_error(state, connection_id, "Unknown or forbidden topic").await;
            }
            state
                .ws_storage
                .subscriptions()
                .subscribe(connection_id, &topic);
            let ack = serde_json::json!({ "type": "subscribed", "data": { "topic": topic } });
            send_to_connection(&state.ws_storage, connection_id, &ack).await;
        }
        "unsubscribe" => {
            if let Some(topic) = field("topic") {
                state
                    .ws_storage
                    .subscriptions()
                    .unsubscribe(connection_id, &topic);
            }
        }
        "typing:start" | "typing:stop" => {
            let Some(conversation) = field("conversation_id")
                .and_then(|c| topic_conversation(&format!("chat:{}", c), user_id))
            else {
                return;
            };
            let event = serde_json::json!({
                "type": msg_type,
                "data": {
                    "conversation_id": conversation.to_string(),
                    "user_id": user_id.to_hex(),
                }
            });
            publish(&state.ws_storage, &conversation.topic(), &event, Some(user_id)).await;
        }
        "chat:read" => {
            let Some(conversation) = field("conversation_id")
                .and_then(|c| topic_conversation(&format!("chat:{}", c), user_id))
            else {
                return reply_error(state, connection_id, "Unknown conversation").await;
            };
            if let Err(e) = record_read(state, &conversation, *user_id).await {
                warn!(?user_id, ?e, "Failed to mark messages read");
                reply_error(state, connection_id, "Could not mark messages read").await;
            }
        }
        _ => {
            debug!(?user_id, msg_type, "Unknown WS message type");
        }
    }
}
