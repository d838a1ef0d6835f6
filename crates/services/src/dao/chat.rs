use bson::{doc, oid::ObjectId, Bson, DateTime, Document};
use futures::TryStreamExt;
use mongodb::Database;
use peopledesk_db::models::{ChatAttachment, ChatMessage};
use serde::Serialize;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::chat::ConversationId;
use crate::validation::ChatMessageForm;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnreadCount {
    pub conversation_id: String,
    pub count: u64,
}

pub struct ChatDao {
    pub base: BaseDao<ChatMessage>,
}

impl ChatDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, ChatMessage::COLLECTION),
        }
    }

    pub async fn send(
        &self,
        conversation: &ConversationId,
        sender_id: ObjectId,
        sender_name: String,
        form: ChatMessageForm,
    ) -> DaoResult<ChatMessage> {
        let message = ChatMessage {
            id: None,
            conversation_id: conversation.to_string(),
            participants: conversation.participants(),
            sender_id,
            sender_name,
            text: form.text.trim().to_string(),
            attachment: form.attachment.map(|a| ChatAttachment {
                url: a.url,
                name: a.name,
                content_type: a.content_type,
                size: a.size,
            }),
            created_at: DateTime::now(),
            read_at: None,
            read_by: Vec::new(),
        };

        let id = self.base.insert_one(&message).await?;
        self.base.find_by_id(id).await
    }

    /// The newest `limit` messages older than `before`, oldest first.
    pub async fn list(
        &self,
        conversation: &ConversationId,
        before: Option<DateTime>,
        limit: u32,
    ) -> DaoResult<Vec<ChatMessage>> {
        let mut filter = doc! { "conversation_id": conversation.to_string() };
        if let Some(before) = before {
            filter.insert("created_at", doc! { "$lt": before });
        }

        let mut messages = self
            .base
            .find_limited(filter, doc! { "created_at": -1, "_id": -1 }, limit)
            .await?;
        messages.reverse();
        Ok(messages)
    }

    /// Marks every message in the conversation not sent by `reader` as read
    /// by them. Returns how many messages changed.
    pub async fn mark_read(
        &self,
        conversation: &ConversationId,
        reader: ObjectId,
    ) -> DaoResult<u64> {
        let conversation_id = conversation.to_string();
        let unread = doc! {
            "conversation_id": &conversation_id,
            "sender_id": { "$ne": reader },
            "read_by": { "$ne": reader },
        };

        self.base
            .collection()
            .update_many(
                doc! {
                    "conversation_id": &conversation_id,
                    "sender_id": { "$ne": reader },
                    "read_at": Bson::Null,
                },
                doc! { "$set": { "read_at": DateTime::now() } },
            )
            .await?;

        let result = self
            .base
            .collection()
            .update_many(unread, doc! { "$addToSet": { "read_by": reader } })
            .await?;
        Ok(result.modified_count)
    }

    /// Unread message counts per conversation visible to `user_id`.
    pub async fn unread_counts(&self, user_id: ObjectId) -> DaoResult<Vec<UnreadCount>> {
        let pipeline = vec![
            doc! {
                "$match": {
                    "sender_id": { "$ne": user_id },
                    "read_by": { "$ne": user_id },
                    "$or": [
                        { "conversation_id": ConversationId::GENERAL },
                        { "participants": user_id },
                    ],
                }
            },
            doc! { "$group": { "_id": "$conversation_id", "count": { "$sum": 1 } } },
            doc! { "$sort": { "_id": 1 } },
        ];

        let cursor = self.base.collection().aggregate(pipeline).await?;
        let rows: Vec<Document> = cursor.try_collect().await?;

        Ok(rows
            .iter()
            .filter_map(|row| {
                let conversation_id = row.get_str("_id").ok()?.to_string();
                let count = match row.get("count")? {
                    Bson::Int32(n) => *n as u64,
                    Bson::Int64(n) => *n as u64,
                    _ => return None,
                };
                Some(UnreadCount {
                    conversation_id,
                    count,
                })
            })
            .collect())
    }

    /// Deletes a message the caller sent in this conversation.
    pub async fn delete_own(
        &self,
        conversation: &ConversationId,
        message_id: ObjectId,
        sender_id: ObjectId,
    ) -> DaoResult<ChatMessage> {
        let message = self.base.find_by_id(message_id).await?;
        if message.conversation_id != conversation.to_string() {
            return Err(DaoError::NotFound);
        }
        if message.sender_id != sender_id {
            return Err(DaoError::Forbidden(
                "Only the sender can delete a message".to_string(),
            ));
        }
        self.base.delete_by_id(message_id).await?;
        Ok(message)
    }
}
