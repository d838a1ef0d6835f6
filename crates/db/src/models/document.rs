use bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub file_name: String,
    pub file_type: String,
    pub file_size: u64,
    #[serde(default)]
    pub category: DocumentCategory,
    pub description: Option<String>,
    pub storage_key: String,
    pub download_url: String,
    pub checksum: Option<String>,
    pub uploaded_by: ObjectId,
    pub uploader_name: String,
    pub uploaded_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DocumentCategory {
    Policy,
    Contract,
    Payslip,
    Identification,
    Certificate,
    #[default]
    Other,
}

impl DocumentCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentCategory::Policy => "policy",
            DocumentCategory::Contract => "contract",
            DocumentCategory::Payslip => "payslip",
            DocumentCategory::Identification => "identification",
            DocumentCategory::Certificate => "certificate",
            DocumentCategory::Other => "other",
        }
    }
}

impl DocumentMetadata {
    pub const COLLECTION: &'static str = "documents";
}
