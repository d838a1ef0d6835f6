use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub content: String,
    pub author_id: ObjectId,
    pub author_name: String,
    pub published_at: DateTime,
}

impl Announcement {
    pub const COLLECTION: &'static str = "announcements";
}
