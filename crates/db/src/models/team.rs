use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub member_ids: Vec<ObjectId>,
    /// Display names in the same order as `member_ids`, copied when the
    /// team is written.
    #[serde(default)]
    pub member_names: Vec<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

impl Team {
    pub const COLLECTION: &'static str = "teams";
}
