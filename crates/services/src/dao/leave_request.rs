use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Database;
use peopledesk_db::models::{LeaveRequest, LeaveStatus};
use serde::Deserialize;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::validation::{LeaveDecisionForm, LeaveRequestForm};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LeaveFilter {
    pub status: Option<LeaveStatus>,
    pub employee_id: Option<String>,
}

impl LeaveFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(eid) = self
            .employee_id
            .as_deref()
            .and_then(|id| ObjectId::parse_str(id).ok())
        {
            filter.insert("employee_id", eid);
        }
        filter
    }
}

pub struct LeaveRequestDao {
    pub base: BaseDao<LeaveRequest>,
}

impl LeaveRequestDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, LeaveRequest::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        employee_id: ObjectId,
        employee_name: String,
        requested_by: ObjectId,
        form: LeaveRequestForm,
    ) -> DaoResult<LeaveRequest> {
        let now = DateTime::now();
        let request = LeaveRequest {
            id: None,
            employee_id,
            employee_name,
            leave_type: form.leave_type,
            start_date: form.start_date,
            end_date: form.end_date,
            reason: form.reason,
            status: LeaveStatus::Pending,
            rejection_reason: None,
            requested_by,
            requested_at: now,
            processed_at: None,
            processed_by: None,
            updated_at: now,
        };

        let id = self.base.insert_one(&request).await?;
        self.base.find_by_id(id).await
    }

    /// Edits dates/reason while the request is still pending.
    pub async fn update(
        &self,
        id: ObjectId,
        employee_id: ObjectId,
        employee_name: String,
        form: LeaveRequestForm,
    ) -> DaoResult<LeaveRequest> {
        let matched = self
            .base
            .update_one(
                doc! { "_id": id, "status": LeaveStatus::Pending.as_str() },
                doc! {
                    "$set": {
                        "employee_id": employee_id,
                        "employee_name": employee_name,
                        "leave_type": bson::to_bson(&form.leave_type)?,
                        "start_date": form.start_date.to_string(),
                        "end_date": form.end_date.to_string(),
                        "reason": form.reason,
                    }
                },
            )
            .await?;
        if !matched {
            // Missing entirely is NotFound; otherwise it was already decided.
            self.base.find_by_id(id).await?;
            return Err(DaoError::Conflict(
                "Only pending leave requests can be edited".to_string(),
            ));
        }
        self.base.find_by_id(id).await
    }

    pub async fn decide(
        &self,
        id: ObjectId,
        processed_by: ObjectId,
        form: LeaveDecisionForm,
    ) -> DaoResult<LeaveRequest> {
        let rejection_reason = match form.status {
            LeaveStatus::Rejected => form.rejection_reason.map(|r| r.trim().to_string()),
            _ => None,
        };

        let matched = self
            .base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "status": form.status.as_str(),
                        "rejection_reason": rejection_reason,
                        "processed_at": DateTime::now(),
                        "processed_by": processed_by,
                    }
                },
            )
            .await?;
        if !matched {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    pub async fn list(&self, filter: &LeaveFilter, limit: u32) -> DaoResult<Vec<LeaveRequest>> {
        self.base
            .find_limited(filter.to_document(), doc! { "requested_at": -1 }, limit)
            .await
    }

    pub async fn count_pending(&self) -> DaoResult<u64> {
        self.base
            .count(doc! { "status": LeaveStatus::Pending.as_str() })
            .await
    }

    /// Approved leave overlapping `day`.
    pub async fn on_leave(&self, day: chrono::NaiveDate) -> DaoResult<Vec<LeaveRequest>> {
        let day = day.to_string();
        self.base
            .find_many(
                doc! {
                    "status": LeaveStatus::Approved.as_str(),
                    "start_date": { "$lte": &day },
                    "end_date": { "$gte": &day },
                },
                Some(doc! { "end_date": 1 }),
            )
            .await
    }
}
