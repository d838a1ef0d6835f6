use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::NaiveDate;
use peopledesk_db::models::{RehireEligibility, Resignation};
use peopledesk_services::validation::ResignationForm;
use serde::Serialize;
use tracing::info;

use super::{employee::resolve_employee, hex, parse_id, rfc3339, stored_id};
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
pub struct ResignationResponse {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub notice_date: NaiveDate,
    pub resignation_date: NaiveDate,
    pub notice_period_days: i64,
    pub rehire_eligibility: RehireEligibility,
    pub reason: String,
    pub notes: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn to_response(r: Resignation) -> ResignationResponse {
    ResignationResponse {
        id: hex(r.id),
        notice_period_days: r.notice_period_days(),
        employee_id: r.employee_id.to_hex(),
        employee_name: r.employee_name,
        notice_date: r.notice_date,
        resignation_date: r.resignation_date,
        rehire_eligibility: r.rehire_eligibility,
        reason: r.reason,
        notes: r.notes,
        created_at: rfc3339(r.created_at),
        updated_at: rfc3339(r.updated_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let resignations = state.resignations.list(state.fetch_limit()).await?;
    let items: Vec<ResignationResponse> = resignations.into_iter().map(to_response).collect();
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidForm(form): ValidForm<ResignationForm>,
) -> Result<(StatusCode, Json<ResignationResponse>), ApiError> {
    let (employee_id, employee_name) = resolve_employee(&state, &form.employee_id).await?;
    let resignation = state
        .resignations
        .create(employee_id, employee_name, form)
        .await?;
    let id = stored_id(resignation.id)?;
    info!(resignation = %id, employee = %employee_id, by = %admin.user_id, "Resignation recorded");

    let response = to_response(resignation);
    publish(&state, ChangeOp::Created, &id, Some(&response)).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(resignation_id): Path<String>,
    ValidForm(form): ValidForm<ResignationForm>,
) -> Result<Json<ResignationResponse>, ApiError> {
    let id = parse_id(&resignation_id, "resignation_id")?;
    let (employee_id, employee_name) = resolve_employee(&state, &form.employee_id).await?;
    let resignation = state
        .resignations
        .update(id, employee_id, employee_name, form)
        .await?;

    let response = to_response(resignation);
    publish(&state, ChangeOp::Updated, &id, Some(&response)).await;
    Ok(Json(response))
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(resignation_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&resignation_id, "resignation_id")?;
    state.resignations.base.delete_by_id(id).await?;
    publish(&state, ChangeOp::Deleted, &id, None).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn publish(
    state: &AppState,
    op: ChangeOp,
    id: &ObjectId,
    response: Option<&ResignationResponse>,
) {
    publish_change(&state.ws_storage, Resignation::COLLECTION, op, id, response).await;
}
