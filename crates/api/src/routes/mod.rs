pub mod announcement;
pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod document;
pub mod employee;
pub mod feedback;
pub mod leave_request;
pub mod resignation;
pub mod storage;
pub mod team;
pub mod upload;
pub mod wifi_bill;

use bson::{DateTime, oid::ObjectId};

use crate::error::ApiError;

pub(crate) fn parse_id(value: &str, what: &str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(value).map_err(|_| ApiError::BadRequest(format!("Invalid {}", what)))
}

pub(crate) fn rfc3339(value: DateTime) -> String {
    value.try_to_rfc3339_string().unwrap_or_default()
}

pub(crate) fn hex(id: Option<ObjectId>) -> String {
    id.map(|id| id.to_hex()).unwrap_or_default()
}

/// The `_id` of a record just read back from the database.
pub(crate) fn stored_id(id: Option<ObjectId>) -> Result<ObjectId, ApiError> {
    id.ok_or_else(|| ApiError::Internal("Stored record has no _id".to_string()))
}
