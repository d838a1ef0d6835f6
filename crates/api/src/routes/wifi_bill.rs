use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::{NaiveDate, Utc};
use peopledesk_db::models::{BillStatus, WifiBill};
use peopledesk_services::validation::WifiBillForm;
use serde::Serialize;

use super::{hex, parse_id, rfc3339, stored_id};
use crate::{
    error::ApiError,
    extractors::{
        auth::{AdminUser, AuthUser},
        form::ValidForm,
    },
    state::AppState,
    ws::dispatcher::{ChangeOp, publish_change},
};

#[derive(Debug, Serialize)]
pub struct WifiBillResponse {
    pub id: String,
    pub provider: String,
    pub account_number: String,
    pub amount: f64,
    pub billing_month: String,
    pub due_date: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    /// Stored status with overdue derived from the due date.
    pub status: BillStatus,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

fn to_response(b: WifiBill, today: NaiveDate) -> WifiBillResponse {
    WifiBillResponse {
        id: hex(b.id),
        status: b.effective_status(today),
        provider: b.provider,
        account_number: b.account_number,
        amount: b.amount,
        billing_month: b.billing_month,
        due_date: b.due_date,
        payment_date: b.payment_date,
        notes: b.notes,
        created_at: rfc3339(b.created_at),
        updated_at: rfc3339(b.updated_at),
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let today = today();
    let bills = state.wifi_bills.list(state.fetch_limit()).await?;
    let items: Vec<WifiBillResponse> = bills.into_iter().map(|b| to_response(b, today)).collect();
    let outstanding: f64 = items
        .iter()
        .filter(|b| b.status != BillStatus::Paid)
        .map(|b| b.amount)
        .sum();

    Ok(Json(serde_json::json!({
        "items": items,
        "outstanding_amount": outstanding,
    })))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidForm(form): ValidForm<WifiBillForm>,
) -> Result<(StatusCode, Json<WifiBillResponse>), ApiError> {
    let bill = state.wifi_bills.create(form).await?;
    let id = stored_id(bill.id)?;

    let response = to_response(bill, today());
    publish(&state, ChangeOp::Created, &id, Some(&response)).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(bill_id): Path<String>,
    ValidForm(form): ValidForm<WifiBillForm>,
) -> Result<Json<WifiBillResponse>, ApiError> {
    let id = parse_id(&bill_id, "bill_id")?;
    let bill = state.wifi_bills.update(id, form).await?;

    let response = to_response(bill, today());
    publish(&state, ChangeOp::Updated, &id, Some(&response)).await;
    Ok(Json(response))
}

pub async fn pay(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(bill_id): Path<String>,
) -> Result<Json<WifiBillResponse>, ApiError> {
    let id = parse_id(&bill_id, "bill_id")?;
    let today = today();
    let bill = state.wifi_bills.mark_paid(id, today).await?;

    let response = to_response(bill, today);
    publish(&state, ChangeOp::Updated, &id, Some(&response)).await;
    Ok(Json(response))
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(bill_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&bill_id, "bill_id")?;
    state.wifi_bills.base.delete_by_id(id).await?;
    publish(&state, ChangeOp::Deleted, &id, None).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn publish(
    state: &AppState,
    op: ChangeOp,
    id: &ObjectId,
    response: Option<&WifiBillResponse>,
) {
    publish_change(&state.ws_storage, WifiBill::COLLECTION, op, id, response).await;
}
