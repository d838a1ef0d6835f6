use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// `general` or the pairwise id of a direct conversation.
    pub conversation_id: String,
    /// Both members of a direct conversation; empty for `general`.
    #[serde(default)]
    pub participants: Vec<ObjectId>,
    pub sender_id: ObjectId,
    pub sender_name: String,
    #[serde(default)]
    pub text: String,
    pub attachment: Option<ChatAttachment>,
    pub created_at: DateTime,
    /// First time someone other than the sender read the message.
    pub read_at: Option<DateTime>,
    #[serde(default)]
    pub read_by: Vec<ObjectId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatAttachment {
    pub url: String,
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

impl ChatMessage {
    pub const COLLECTION: &'static str = "chat_messages";
}
