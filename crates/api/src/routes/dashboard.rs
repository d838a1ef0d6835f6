use axum::{Json, extract::State};
use bson::doc;
use chrono::Utc;
use peopledesk_db::models::{BillStatus, EmployeeStatus};

use super::{announcement, resignation};
use crate::{error::ApiError, extractors::auth::AuthUser, state::AppState};

const RECENT: u32 = 5;

/// Headline numbers for the landing page.
pub async fn summary(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let today = Utc::now().date_naive();

    let active = state.employees.count_by_status(EmployeeStatus::Active).await?;
    let inactive = state.employees.count_by_status(EmployeeStatus::Inactive).await?;
    let pending_leave = state.leave_requests.count_pending().await?;
    let on_leave = state.leave_requests.on_leave(today).await?;
    let teams = state.teams.base.count(doc! {}).await?;
    let documents = state.documents.base.count(doc! {}).await?;

    let unpaid = state
        .wifi_bills
        .base
        .find_many(doc! { "status": { "$ne": "paid" } }, None)
        .await?;
    let overdue = unpaid
        .iter()
        .filter(|b| b.effective_status(today) == BillStatus::Overdue)
        .count();

    let announcements: Vec<_> = state
        .announcements
        .recent(RECENT)
        .await?
        .into_iter()
        .map(announcement::to_response)
        .collect();
    let resignations: Vec<_> = state
        .resignations
        .upcoming(today, RECENT)
        .await?
        .into_iter()
        .map(resignation::to_response)
        .collect();

    Ok(Json(serde_json::json!({
        "employees": { "active": active, "inactive": inactive },
        "leave": {
            "pending": pending_leave,
            "on_leave_today": on_leave.iter().map(|r| &r.employee_name).collect::<Vec<_>>(),
        },
        "teams": teams,
        "documents": documents,
        "wifi_bills": {
            "unpaid": unpaid.len(),
            "overdue": overdue,
            "unpaid_amount": unpaid.iter().map(|b| b.amount).sum::<f64>(),
        },
        "recent_announcements": announcements,
        "upcoming_resignations": resignations,
    })))
}
