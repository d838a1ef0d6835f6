use bson::{oid::ObjectId, DateTime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WifiBill {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub provider: String,
    pub account_number: String,
    pub amount: f64,
    /// `YYYY-MM`
    pub billing_month: String,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: BillStatus,
    pub notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    #[default]
    Pending,
    Paid,
    Overdue,
}

impl WifiBill {
    pub const COLLECTION: &'static str = "wifi_bills";

    /// Stored status, except that an unpaid bill past its due date reads as
    /// overdue.
    pub fn effective_status(&self, today: NaiveDate) -> BillStatus {
        match self.status {
            BillStatus::Pending if self.due_date < today => BillStatus::Overdue,
            status => status,
        }
    }
}
