use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use peopledesk_db::models::Announcement;
use peopledesk_services::validation::AnnouncementForm;
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
pub struct AnnouncementResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author_id: String,
    pub author_name: String,
    pub published_at: String,
}

pub(crate) fn to_response(a: Announcement) -> AnnouncementResponse {
    AnnouncementResponse {
        id: hex(a.id),
        title: a.title,
        content: a.content,
        author_id: a.author_id.to_hex(),
        author_name: a.author_name,
        published_at: rfc3339(a.published_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let announcements = state.announcements.recent(state.fetch_limit()).await?;
    let items: Vec<AnnouncementResponse> = announcements.into_iter().map(to_response).collect();
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn create(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    ValidForm(form): ValidForm<AnnouncementForm>,
) -> Result<(StatusCode, Json<AnnouncementResponse>), ApiError> {
    let announcement = state
        .announcements
        .create(admin.user_id, admin.name.clone(), form)
        .await?;
    let id = stored_id(announcement.id)?;

    let response = to_response(announcement);
    publish_change(
        &state.ws_storage,
        Announcement::COLLECTION,
        ChangeOp::Created,
        &id,
        Some(&response),
    )
    .await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(announcement_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&announcement_id, "announcement_id")?;
    state.announcements.base.delete_by_id(id).await?;
    publish_change::<()>(
        &state.ws_storage,
        Announcement::COLLECTION,
        ChangeOp::Deleted,
        &id,
        None,
    )
    .await;
    Ok(StatusCode::NO_CONTENT)
}
