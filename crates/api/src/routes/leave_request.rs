use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::NaiveDate;
use peopledesk_db::models::{LeaveRequest, LeaveStatus, LeaveType};
use peopledesk_services::{
    dao::leave_request::LeaveFilter,
    validation::{LeaveDecisionForm, LeaveRequestForm},
};
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
pub struct LeaveRequestResponse {
    pub id: String,
    pub employee_id: String,
    pub employee_name: String,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub duration_days: i64,
    pub reason: String,
    pub status: LeaveStatus,
    pub rejection_reason: Option<String>,
    pub requested_by: String,
    pub requested_at: String,
    pub processed_at: Option<String>,
    pub processed_by: Option<String>,
}

fn to_response(r: LeaveRequest) -> LeaveRequestResponse {
    LeaveRequestResponse {
        id: hex(r.id),
        duration_days: r.duration_days(),
        employee_id: r.employee_id.to_hex(),
        employee_name: r.employee_name,
        leave_type: r.leave_type,
        start_date: r.start_date,
        end_date: r.end_date,
        reason: r.reason,
        status: r.status,
        rejection_reason: r.rejection_reason,
        requested_by: r.requested_by.to_hex(),
        requested_at: rfc3339(r.requested_at),
        processed_at: r.processed_at.map(rfc3339),
        processed_by: r.processed_by.map(|id| id.to_hex()),
    }
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<LeaveFilter>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let requests = state
        .leave_requests
        .list(&filter, state.fetch_limit())
        .await?;
    let items: Vec<LeaveRequestResponse> = requests.into_iter().map(to_response).collect();

    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidForm(form): ValidForm<LeaveRequestForm>,
) -> Result<(StatusCode, Json<LeaveRequestResponse>), ApiError> {
    let (employee_id, employee_name) = resolve_employee(&state, &form.employee_id).await?;

    let request = state
        .leave_requests
        .create(employee_id, employee_name, auth.user_id, form)
        .await?;
    let id = stored_id(request.id)?;
    info!(leave_request = %id, employee = %employee_id, "Leave requested");

    let response = to_response(request);
    publish(&state, ChangeOp::Created, &id, Some(&response)).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
    ValidForm(form): ValidForm<LeaveRequestForm>,
) -> Result<Json<LeaveRequestResponse>, ApiError> {
    let id = parse_id(&request_id, "leave_request_id")?;
    let current = state.leave_requests.base.find_by_id(id).await?;
    auth.ensure_owner_or_admin(&current.requested_by)?;

    let (employee_id, employee_name) = resolve_employee(&state, &form.employee_id).await?;
    let request = state
        .leave_requests
        .update(id, employee_id, employee_name, form)
        .await?;

    let response = to_response(request);
    publish(&state, ChangeOp::Updated, &id, Some(&response)).await;
    Ok(Json(response))
}

pub async fn decide(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(request_id): Path<String>,
    ValidForm(form): ValidForm<LeaveDecisionForm>,
) -> Result<Json<LeaveRequestResponse>, ApiError> {
    let id = parse_id(&request_id, "leave_request_id")?;
    let status = form.status;
    let request = state.leave_requests.decide(id, admin.user_id, form).await?;
    info!(leave_request = %id, status = status.as_str(), by = %admin.user_id, "Leave decided");

    let response = to_response(request);
    publish(&state, ChangeOp::Updated, &id, Some(&response)).await;
    Ok(Json(response))
}

pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(request_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&request_id, "leave_request_id")?;
    let current = state.leave_requests.base.find_by_id(id).await?;

    if !auth.is_admin() {
        auth.ensure_owner_or_admin(&current.requested_by)?;
        if current.status != LeaveStatus::Pending {
            return Err(ApiError::Forbidden(
                "Processed leave requests can only be removed by an administrator".to_string(),
            ));
        }
    }

    state.leave_requests.base.delete_by_id(id).await?;
    publish(&state, ChangeOp::Deleted, &id, None).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn publish(
    state: &AppState,
    op: ChangeOp,
    id: &ObjectId,
    response: Option<&LeaveRequestResponse>,
) {
    publish_change(&state.ws_storage, LeaveRequest::COLLECTION, op, id, response).await;
}
