use bson::{doc, oid::ObjectId, DateTime};
use chrono::NaiveDate;
use mongodb::Database;
use peopledesk_db::models::Resignation;

use super::base::{BaseDao, DaoError, DaoResult};
use crate::validation::ResignationForm;

pub struct ResignationDao {
    pub base: BaseDao<Resignation>,
}

impl ResignationDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Resignation::COLLECTION),
        }
    }

    pub async fn create(
        &self,
        employee_id: ObjectId,
        employee_name: String,
        form: ResignationForm,
    ) -> DaoResult<Resignation> {
        let now = DateTime::now();
        let resignation = Resignation {
            id: None,
            employee_id,
            employee_name,
            notice_date: form.notice_date,
            resignation_date: form.resignation_date,
            rehire_eligibility: form.rehire_eligibility,
            reason: form.reason,
            notes: form.notes,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&resignation).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update(
        &self,
        id: ObjectId,
        employee_id: ObjectId,
        employee_name: String,
        form: ResignationForm,
    ) -> DaoResult<Resignation> {
        let matched = self
            .base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "employee_id": employee_id,
                        "employee_name": employee_name,
                        "notice_date": form.notice_date.to_string(),
                        "resignation_date": form.resignation_date.to_string(),
                        "rehire_eligibility": bson::to_bson(&form.rehire_eligibility)?,
                        "reason": form.reason,
                        "notes": form.notes,
                    }
                },
            )
            .await?;
        if !matched {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    pub async fn list(&self, limit: u32) -> DaoResult<Vec<Resignation>> {
        self.base
            .find_limited(doc! {}, doc! { "resignation_date": -1 }, limit)
            .await
    }

    /// Resignations whose last working day is on or after `from`, soonest first.
    pub async fn upcoming(&self, from: NaiveDate, limit: u32) -> DaoResult<Vec<Resignation>> {
        self.base
            .find_limited(
                doc! { "resignation_date": { "$gte": from.to_string() } },
                doc! { "resignation_date": 1 },
                limit,
            )
            .await
    }
}
