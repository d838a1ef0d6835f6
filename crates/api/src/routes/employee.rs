use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use chrono::NaiveDate;
use peopledesk_db::models::{Employee, EmployeeStatus};
use peopledesk_services::{
    dao::{
        base::{DaoError, PaginationParams},
        employee::EmployeeFilter,
    },
    storage::avatar_key,
    validation::EmployeeForm,
};
use serde::Serialize;
use tracing::info;

use super::{hex, parse_id, rfc3339, stored_id, upload::UploadForm};
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
pub struct EmployeeResponse {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub position: String,
    pub department: String,
    pub hire_date: NaiveDate,
    pub salary: Option<f64>,
    pub avatar_url: Option<String>,
    pub status: EmployeeStatus,
    pub created_at: String,
    pub updated_at: String,
}

pub(crate) fn to_response(e: Employee) -> EmployeeResponse {
    EmployeeResponse {
        id: hex(e.id),
        full_name: e.full_name(),
        first_name: e.first_name,
        last_name: e.last_name,
        email: e.email,
        phone: e.phone,
        position: e.position,
        department: e.department,
        hire_date: e.hire_date,
        salary: e.salary,
        avatar_url: e.avatar_url,
        status: e.status,
        created_at: rfc3339(e.created_at),
        updated_at: rfc3339(e.updated_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(filter): Query<EmployeeFilter>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let result = state.employees.list(&filter, &params).await?;
    let result = result.map(to_response);

    Ok(Json(serde_json::json!({
        "items": result.items,
        "total": result.total,
        "page": result.page,
        "per_page": result.per_page,
        "total_pages": result.total_pages,
    })))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(employee_id): Path<String>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let id = parse_id(&employee_id, "employee_id")?;
    let employee = state.employees.base.find_by_id(id).await?;
    Ok(Json(to_response(employee)))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidForm(form): ValidForm<EmployeeForm>,
) -> Result<(StatusCode, Json<EmployeeResponse>), ApiError> {
    let employee = state.employees.create(form).await?;
    let id = stored_id(employee.id)?;
    let response = to_response(employee);
    info!(employee = %id, by = %admin.user_id, "Employee created");

    publish(&state, ChangeOp::Created, &id, &response).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(employee_id): Path<String>,
    ValidForm(form): ValidForm<EmployeeForm>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let id = parse_id(&employee_id, "employee_id")?;
    let employee = state.employees.update(id, form).await?;
    let response = to_response(employee);

    publish(&state, ChangeOp::Updated, &id, &response).await;
    Ok(Json(response))
}

pub async fn delete(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(employee_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&employee_id, "employee_id")?;
    state.employees.base.delete_by_id(id).await?;
    info!(employee = %id, by = %admin.user_id, "Employee deleted");

    publish_change::<()>(&state.ws_storage, Employee::COLLECTION, ChangeOp::Deleted, &id, None)
        .await;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(employee_id): Path<String>,
    multipart: Multipart,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let id = parse_id(&employee_id, "employee_id")?;
    // 404 before anything is written to storage
    state.employees.base.find_by_id(id).await?;

    let (file, _) = UploadForm::read(multipart).await?.require_file()?;
    file.require_image()?;

    let stored = state
        .store
        .put(&avatar_key(&id.to_hex(), &file.file_name), &file.bytes)
        .await?;
    state.employees.set_avatar(id, &stored.url).await?;

    let response = to_response(state.employees.base.find_by_id(id).await?);
    publish(&state, ChangeOp::Updated, &id, &response).await;
    Ok(Json(response))
}

async fn publish(state: &AppState, op: ChangeOp, id: &ObjectId, response: &EmployeeResponse) {
    publish_change(&state.ws_storage, Employee::COLLECTION, op, id, Some(response)).await;
}

/// Resolves an employee id submitted in a form to its display name.
pub(crate) async fn resolve_employee(
    state: &AppState,
    raw_id: &str,
) -> Result<(ObjectId, String), ApiError> {
    let unknown = || ApiError::field("employee_id", "Select an existing employee");
    let id = ObjectId::parse_str(raw_id.trim()).map_err(|_| unknown())?;
    match state.employees.base.find_by_id(id).await {
        Ok(employee) => Ok((id, employee.full_name())),
        Err(DaoError::NotFound) => Err(unknown()),
        Err(e) => Err(e.into()),
    }
}
