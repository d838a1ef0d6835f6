use axum::extract::ws::Message;
use bson::oid::ObjectId;
use futures::SinkExt;
use serde::Serialize;
use tracing::{debug, warn};

use super::storage::{WsSender, WsStorage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeOp {
    Created,
    Updated,
    Deleted,
}

async fn send(sender: &WsSender, text: &str) -> bool {
    let mut guard = sender.lock().await;
    match guard.send(Message::text(text.to_string())).await {
        Ok(()) => true,
        Err(e) => {
            warn!(%e, "Failed to send WS message");
            false
        }
    }
}

/// Broadcasts a JSON message to all connections of the specified users.
pub async fn broadcast(ws_storage: &WsStorage, user_ids: &[ObjectId], message: &serde_json::Value) {
    let text = message.to_string();

    for user_id in user_ids {
        for sender in ws_storage.get_senders(user_id) {
            if send(&sender, &text).await {
                debug!(?user_id, "WS message sent");
            }
        }
    }
}

/// Sends a JSON message to a specific user's connections.
pub async fn send_to_user(ws_storage: &WsStorage, user_id: &ObjectId, message: &serde_json::Value) {
    broadcast(ws_storage, &[*user_id], message).await;
}

pub async fn send_to_connection(
    ws_storage: &WsStorage,
    connection_id: &str,
    message: &serde_json::Value,
) {
    if let Some(sender) = ws_storage.get_sender(connection_id) {
        send(&sender, &message.to_string()).await;
    }
}

/// Sends to every connection subscribed to `topic`, skipping `except`'s
/// own connections when given.
pub async fn publish(
    ws_storage: &WsStorage,
    topic: &str,
    message: &serde_json::Value,
    except: Option<&ObjectId>,
) {
    let text = message.to_string();
    let mut delivered = 0usize;

    for (user_id, sender) in ws_storage.topic_senders(topic) {
        if except == Some(&user_id) {
            continue;
        }
        if send(&sender, &text).await {
            delivered += 1;
        }
    }

    debug!(topic, delivered, "Published WS event");
}

pub fn change_event(
    collection: &str,
    op: ChangeOp,
    id: &ObjectId,
    document: Option<serde_json::Value>,
) -> serde_json::Value {
    let mut data = serde_json::json!({
        "collection": collection,
        "op": op,
        "id": id.to_hex(),
    });
    if let Some(document) = document {
        data["document"] = document;
    }
    serde_json::json!({ "type": "collection:changed", "data": data })
}

/// Tells everyone watching `collection` that a record changed.
pub async fn publish_change<T: Serialize>(
    ws_storage: &WsStorage,
    collection: &str,
    op: ChangeOp,
    id: &ObjectId,
    document: Option<&T>,
) {
    let document = document.and_then(|d| serde_json::to_value(d).ok());
    let event = change_event(collection, op, id, document);
    publish(ws_storage, collection, &event, None).await;
}
