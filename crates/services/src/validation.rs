//! Form schemas shared by every mutation handler.
//!
//! Each form derives its per-field rules with `validator` and adds the
//! cross-field rules (date ordering, conditional requirements) in
//! [`FormSchema::cross_field`]. Every failure is reported under the field
//! the client should highlight.

use std::collections::{BTreeMap, HashSet};

use bson::oid::ObjectId;
use chrono::{Duration, NaiveDate, Utc};
use peopledesk_db::models::{
    BillStatus, DocumentCategory, EmployeeStatus, LeaveStatus, LeaveType, RehireEligibility,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// Validation failures keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Error)]
#[serde(transparent)]
#[error("{}", summarize(.0))]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

fn summarize(errors: &BTreeMap<String, Vec<String>>) -> String {
    errors
        .iter()
        .map(|(field, messages)| format!("{}: {}", field, messages.join(", ")))
        .collect::<Vec<_>>()
        .join("; ")
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        flatten("", &errors, &mut out);
        out
    }
}

fn flatten(prefix: &str, errors: &ValidationErrors, out: &mut FieldErrors) {
    for (field, kind) in errors.errors() {
        let name = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{}.{}", prefix, field)
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let message = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| default_message(&err.code));
                    out.add(&name, message);
                }
            }
            ValidationErrorsKind::Struct(inner) => flatten(&name, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    flatten(&format!("{}[{}]", name, index), inner, out);
                }
            }
        }
    }
}

fn default_message(code: &str) -> String {
    match code {
        "length" => "Has an invalid length".to_string(),
        "email" => "Must be a valid email address".to_string(),
        "range" => "Is out of range".to_string(),
        other => format!("Failed the {} check", other),
    }
}

/// A validated form. `check` is what handlers call before any write.
pub trait FormSchema: Validate {
    fn cross_field(&self, _today: NaiveDate, _errors: &mut FieldErrors) {}

    fn check_on(&self, today: NaiveDate) -> Result<(), FieldErrors> {
        let mut errors = match self.validate() {
            Ok(()) => FieldErrors::new(),
            Err(e) => FieldErrors::from(e),
        };
        self.cross_field(today, &mut errors);
        errors.into_result()
    }

    fn check(&self) -> Result<(), FieldErrors> {
        self.check_on(Utc::now().date_naive())
    }
}

pub fn parse_object_id(value: &str) -> Option<ObjectId> {
    ObjectId::parse_str(value.trim()).ok()
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).unwrap_or("").is_empty()
}

// ---------------------------------------------------------------------------
// Auth & profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterForm {
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 2, max = 80, message = "Name must be 2 to 80 characters"))]
    pub display_name: String,
    #[validate(length(min = 8, max = 128, message = "Password must be 8 to 128 characters"))]
    pub password: String,
}

impl FormSchema for RegisterForm {}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

impl FormSchema for LoginForm {}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProfileForm {
    #[validate(length(min = 2, max = 80, message = "Name must be 2 to 80 characters"))]
    pub display_name: Option<String>,
    pub desktop_notifications: Option<bool>,
}

impl FormSchema for ProfileForm {}

// ---------------------------------------------------------------------------
// Employees
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EmployeeForm {
    #[validate(length(min = 1, max = 50, message = "First name must be 1 to 50 characters"))]
    pub first_name: String,
    #[validate(length(min = 1, max = 50, message = "Last name must be 1 to 50 characters"))]
    pub last_name: String,
    #[validate(email(message = "Must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 7, max = 20, message = "Phone must be 7 to 20 characters"))]
    pub phone: Option<String>,
    #[validate(length(min = 1, max = 100, message = "Position is required"))]
    pub position: String,
    #[validate(length(min = 1, max = 100, message = "Department is required"))]
    pub department: String,
    pub hire_date: NaiveDate,
    #[validate(range(min = 0.0, message = "Salary cannot be negative"))]
    pub salary: Option<f64>,
    #[serde(default)]
    pub status: EmployeeStatus,
}

impl FormSchema for EmployeeForm {
    fn cross_field(&self, today: NaiveDate, errors: &mut FieldErrors) {
        if self.hire_date > today {
            errors.add("hire_date", "Hire date cannot be in the future");
        }
        if let Some(phone) = &self.phone {
            let allowed = |c: char| c.is_ascii_digit() || "+-() ".contains(c);
            if !phone.chars().all(allowed) {
                errors.add("phone", "Phone may only contain digits, spaces and + - ( )");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Leave requests
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeaveRequestForm {
    pub employee_id: String,
    #[serde(default)]
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(length(min = 5, max = 500, message = "Reason must be 5 to 500 characters"))]
    pub reason: String,
}

impl FormSchema for LeaveRequestForm {
    fn cross_field(&self, today: NaiveDate, errors: &mut FieldErrors) {
        if parse_object_id(&self.employee_id).is_none() {
            errors.add("employee_id", "Select an employee");
        }
        if self.end_date < self.start_date {
            errors.add("end_date", "End date must be on or after the start date");
        }
        if self.start_date > today + Duration::days(365) {
            errors.add("start_date", "Leave cannot start more than a year ahead");
        } else if self.start_date < today - Duration::days(365) {
            errors.add("start_date", "Leave cannot start more than a year ago");
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LeaveDecisionForm {
    pub status: LeaveStatus,
    #[validate(length(min = 5, max = 500, message = "Reason must be 5 to 500 characters"))]
    pub rejection_reason: Option<String>,
}

impl FormSchema for LeaveDecisionForm {
    fn cross_field(&self, _today: NaiveDate, errors: &mut FieldErrors) {
        match self.status {
            LeaveStatus::Pending => errors.add("status", "Choose approve or reject"),
            LeaveStatus::Rejected if is_blank(&self.rejection_reason) => {
                errors.add("rejection_reason", "A reason is required when rejecting")
            }
            _ => {}
        }
    }
}

// ---------------------------------------------------------------------------
// Resignations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ResignationForm {
    pub employee_id: String,
    pub notice_date: NaiveDate,
    pub resignation_date: NaiveDate,
    #[serde(default)]
    pub rehire_eligibility: RehireEligibility,
    #[validate(length(min = 5, max = 1000, message = "Reason must be 5 to 1000 characters"))]
    pub reason: String,
    #[validate(length(max = 2000, message = "Notes cannot exceed 2000 characters"))]
    pub notes: Option<String>,
}

impl FormSchema for ResignationForm {
    fn cross_field(&self, _today: NaiveDate, errors: &mut FieldErrors) {
        if parse_object_id(&self.employee_id).is_none() {
            errors.add("employee_id", "Select an employee");
        }
        if self.resignation_date < self.notice_date {
            errors.add(
                "resignation_date",
                "Last working day must be on or after the notice date",
            );
        }
    }
}

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TeamForm {
    #[validate(length(min = 2, max = 100, message = "Team name must be 2 to 100 characters"))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: String,
    #[serde(default)]
    pub member_ids: Vec<String>,
}

impl TeamForm {
    /// Member ids in submission order. Only meaningful after `check`.
    pub fn member_object_ids(&self) -> Vec<ObjectId> {
        self.member_ids
            .iter()
            .filter_map(|id| parse_object_id(id))
            .collect()
    }
}

impl FormSchema for TeamForm {
    fn cross_field(&self, _today: NaiveDate, errors: &mut FieldErrors) {
        let mut seen = HashSet::new();
        for id in &self.member_ids {
            match parse_object_id(id) {
                None => errors.add("member_ids", format!("'{}' is not a valid member id", id)),
                Some(oid) if !seen.insert(oid) => {
                    errors.add("member_ids", "A member was selected twice")
                }
                Some(_) => {}
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Documents
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct DocumentForm {
    #[validate(length(min = 1, max = 255, message = "File name must be 1 to 255 characters"))]
    pub file_name: String,
    #[validate(length(min = 1, max = 100, message = "File type is required"))]
    pub file_type: String,
    #[validate(range(min = 1, message = "File cannot be empty"))]
    pub file_size: u64,
    #[serde(default)]
    pub category: DocumentCategory,
    #[validate(length(max = 500, message = "Description cannot exceed 500 characters"))]
    pub description: Option<String>,
    pub storage_key: String,
    pub checksum: Option<String>,
}

impl FormSchema for DocumentForm {
    fn cross_field(&self, _today: NaiveDate, errors: &mut FieldErrors) {
        if !self.storage_key.starts_with("documents/") || self.storage_key.contains("..") {
            errors.add("storage_key", "Upload the file before saving its details");
        }
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct ChatAttachmentForm {
    pub url: String,
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub content_type: String,
    pub size: u64,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatMessageForm {
    #[serde(default)]
    #[validate(length(max = 2000, message = "Messages cannot exceed 2000 characters"))]
    pub text: String,
    #[validate(nested)]
    pub attachment: Option<ChatAttachmentForm>,
}

impl FormSchema for ChatMessageForm {
    fn cross_field(&self, _today: NaiveDate, errors: &mut FieldErrors) {
        if self.text.trim().is_empty() && self.attachment.is_none() {
            errors.add("text", "Message cannot be empty");
        }
        if let Some(attachment) = &self.attachment {
            if !attachment.url.starts_with("/api/storage/chat/") || attachment.url.contains("..") {
                errors.add("attachment", "Upload the attachment before sending");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// WiFi bills
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct WifiBillForm {
    #[validate(length(min = 2, max = 100, message = "Provider must be 2 to 100 characters"))]
    pub provider: String,
    #[validate(length(min = 1, max = 50, message = "Account number is required"))]
    pub account_number: String,
    pub amount: f64,
    pub billing_month: String,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    #[serde(default)]
    pub status: BillStatus,
    #[validate(length(max = 500, message = "Notes cannot exceed 500 characters"))]
    pub notes: Option<String>,
}

impl FormSchema for WifiBillForm {
    fn cross_field(&self, _today: NaiveDate, errors: &mut FieldErrors) {
        if !(self.amount > 0.0) {
            errors.add("amount", "Amount must be greater than zero");
        }
        let month_ok = self.billing_month.len() == 7
            && NaiveDate::parse_from_str(&format!("{}-01", self.billing_month), "%Y-%m-%d").is_ok();
        if !month_ok {
            errors.add("billing_month", "Billing month must look like 2024-05");
        }
        if self.status == BillStatus::Paid && self.payment_date.is_none() {
            errors.add("payment_date", "A paid bill needs a payment date");
        }
    }
}

// ---------------------------------------------------------------------------
// Announcements & feedback
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AnnouncementForm {
    #[validate(length(min = 3, max = 150, message = "Title must be 3 to 150 characters"))]
    pub title: String,
    #[validate(length(min = 1, max = 5000, message = "Content must be 1 to 5000 characters"))]
    pub content: String,
}

impl FormSchema for AnnouncementForm {}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct FeedbackForm {
    #[validate(length(min = 10, max = 5000, message = "Feedback must be 10 to 5000 characters"))]
    pub feedback: String,
}

impl FormSchema for FeedbackForm {}
