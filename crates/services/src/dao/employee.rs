use bson::{doc, oid::ObjectId, DateTime, Document};
use mongodb::Database;
use peopledesk_db::models::{Employee, EmployeeStatus};
use serde::Deserialize;

use super::base::{BaseDao, DaoError, DaoResult, PaginatedResult, PaginationParams};
use crate::validation::{EmployeeForm, FieldErrors};

/// Query-string filters for the directory listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeFilter {
    pub status: Option<EmployeeStatus>,
    pub department: Option<String>,
    /// Case-insensitive match on first name, last name or email.
    pub q: Option<String>,
}

impl EmployeeFilter {
    pub fn to_document(&self) -> Document {
        let mut filter = Document::new();
        if let Some(status) = self.status {
            filter.insert("status", status.as_str());
        }
        if let Some(department) = self.department.as_deref().filter(|d| !d.is_empty()) {
            filter.insert("department", department);
        }
        if let Some(q) = self.q.as_deref().map(str::trim).filter(|q| !q.is_empty()) {
            let pattern = escape_regex(q);
            filter.insert(
                "$or",
                vec![
                    doc! { "first_name": { "$regex": &pattern, "$options": "i" } },
                    doc! { "last_name": { "$regex": &pattern, "$options": "i" } },
                    doc! { "email": { "$regex": &pattern, "$options": "i" } },
                ],
            );
        }
        filter
    }
}

fn escape_regex(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub struct EmployeeDao {
    pub base: BaseDao<Employee>,
}

impl EmployeeDao {
    pub fn new(db: &Database) -> Self {
        Self {
            base: BaseDao::new(db, Employee::COLLECTION),
        }
    }

    pub async fn create(&self, form: EmployeeForm) -> DaoResult<Employee> {
        let now = DateTime::now();
        let employee = Employee {
            id: None,
            first_name: form.first_name.trim().to_string(),
            last_name: form.last_name.trim().to_string(),
            email: form.email.to_lowercase(),
            phone: form.phone,
            position: form.position,
            department: form.department,
            hire_date: form.hire_date,
            salary: form.salary,
            avatar_url: None,
            status: form.status,
            created_at: now,
            updated_at: now,
        };

        let id = self.base.insert_one(&employee).await.map_err(email_taken)?;
        self.base.find_by_id(id).await
    }

    pub async fn update(&self, id: ObjectId, form: EmployeeForm) -> DaoResult<Employee> {
        let matched = self
            .base
            .update_by_id(
                id,
                doc! {
                    "$set": {
                        "first_name": form.first_name.trim(),
                        "last_name": form.last_name.trim(),
                        "email": form.email.to_lowercase(),
                        "phone": form.phone,
                        "position": form.position,
                        "department": form.department,
                        "hire_date": form.hire_date.to_string(),
                        "salary": form.salary,
                        "status": form.status.as_str(),
                    }
                },
            )
            .await
            .map_err(email_taken)?;
        if !matched {
            return Err(DaoError::NotFound);
        }
        self.base.find_by_id(id).await
    }

    pub async fn set_avatar(&self, id: ObjectId, avatar_url: &str) -> DaoResult<bool> {
        self.base
            .update_by_id(id, doc! { "$set": { "avatar_url": avatar_url } })
            .await
    }

    pub async fn list(
        &self,
        filter: &EmployeeFilter,
        params: &PaginationParams,
    ) -> DaoResult<PaginatedResult<Employee>> {
        self.base
            .find_paginated(
                filter.to_document(),
                Some(doc! { "last_name": 1, "first_name": 1 }),
                params,
            )
            .await
    }

    /// Display names for `ids`, in the same order. Fails on the first id
    /// that has no employee record.
    pub async fn find_names(&self, ids: &[ObjectId]) -> DaoResult<Vec<String>> {
        let found = self
            .base
            .find_many(doc! { "_id": { "$in": ids } }, None)
            .await?;

        ids.iter()
            .map(|id| {
                found
                    .iter()
                    .find(|e| e.id.as_ref() == Some(id))
                    .map(Employee::full_name)
                    .ok_or_else(|| {
                        DaoError::Validation(FieldErrors::single(
                            "member_ids",
                            format!("No employee with id {}", id.to_hex()),
                        ))
                    })
            })
            .collect()
    }

    pub async fn count_by_status(&self, status: EmployeeStatus) -> DaoResult<u64> {
        self.base.count(doc! { "status": status.as_str() }).await
    }
}

fn email_taken(err: DaoError) -> DaoError {
    match err {
        DaoError::DuplicateKey(_) => DaoError::Validation(FieldErrors::single(
            "email",
            "An employee with this email already exists",
        )),
        other => other,
    }
}
