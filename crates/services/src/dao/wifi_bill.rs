use bson::{doc, oid::ObjectId, DateTime};
use chrono::NaiveDate;
use mongodb::Database;
use peopledesk_db::models::{BillStatus, WifiBill};

use super::base::{BaseDao, DaoError, DaoResult};
use crate::validation::WifiBillForm;

pub struct WifiBillDao {
    pub base: BaseDao<WifiBill>,
}

impl WifiBillDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, WifiBill::COLLECTION),
        }
    }

    pub async fn create(&self, form: WifiBillForm) -> DaoResult<WifiBill> {
        let now = DateTime::now();
        let bill = WifiBill {
            id: None,
            provider: form.provider,
            account_number: form.account_number,
            amount: form.amount,
            billing_month: form.billing_month,
            due_date: form.due_date,
            payment_date: form.payment_date,
            status: form.status,
            notes: form.notes,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&bill).await?;
        self.base.find_by_id(id).await
    }

    pub async fn update(&self, id: ObjectId, form: WifiBillForm) -> DaoResult<WifiBill> {
        let matched = self
            .base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "provider": form.provider,
                        "account_number": form.account_number,
                        "amount": form.amount,
                        "billing_month": form.billing_month,
                        "due_date": form.due_date.to_string(),
                        "payment_date": form.payment_date.map(|d| d.to_string()),
                        "status": bson::to_bson(&form.status)?,
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

    pub async fn mark_paid(&self, id: ObjectId, paid_on: NaiveDate) -> DaoResult<WifiBill> {
        let matched = self
            .base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "status": bson::to_bson(&BillStatus::Paid)?,
                        "payment_date": paid_on.to_string(),
                    }
                },
            )
            .await?;
        if !matched {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    pub async fn list(&self, limit: u32) -> DaoResult<Vec<WifiBill>> {
        self.base
            .find_limited(doc! {}, doc! { "due_date": -1 }, limit)
            .await
    }
}
