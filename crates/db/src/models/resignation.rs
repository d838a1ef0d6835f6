use bson::{oid::ObjectId, DateTime};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resignation {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub employee_id: ObjectId,
    pub employee_name: String,
    /// Day the notice was handed in.
    pub notice_date: NaiveDate,
    /// Last working day.
    pub resignation_date: NaiveDate,
    #[serde(default)]
    pub rehire_eligibility: RehireEligibility,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RehireEligibility {
    #[default]
    Eligible,
    NotEligible,
    Conditional,
}

impl Resignation {
    pub const COLLECTION: &'static str = "resignations";

    pub fn notice_period_days(&self) -> i64 {
        (self.resignation_date - self.notice_date).num_days()
    }
}
