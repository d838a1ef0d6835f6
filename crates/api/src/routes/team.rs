use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use bson::oid::ObjectId;
use peopledesk_db::models::Team;
use peopledesk_services::validation::TeamForm;
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
pub struct TeamMember {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: String,
    pub name: String,
    pub description: String,
    pub members: Vec<TeamMember>,
    pub member_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

fn to_response(t: Team) -> TeamResponse {
    let members: Vec<TeamMember> = t
        .member_ids
        .iter()
        .zip(t.member_names.iter())
        .map(|(id, name)| TeamMember {
            id: id.to_hex(),
            name: name.clone(),
        })
        .collect();

    TeamResponse {
        id: hex(t.id),
        name: t.name,
        description: t.description,
        member_count: members.len(),
        members,
        created_at: rfc3339(t.created_at),
        updated_at: rfc3339(t.updated_at),
    }
}

pub async fn list(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<Json<serde_json::Value>, ApiError> {
    let teams = state.teams.list().await?;
    let items: Vec<TeamResponse> = teams.into_iter().map(to_response).collect();
    Ok(Json(serde_json::json!({ "items": items })))
}

pub async fn get(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(team_id): Path<String>,
) -> Result<Json<TeamResponse>, ApiError> {
    let id = parse_id(&team_id, "team_id")?;
    Ok(Json(to_response(state.teams.base.find_by_id(id).await?)))
}

pub async fn create(
    State(state): State<AppState>,
    _admin: AdminUser,
    ValidForm(form): ValidForm<TeamForm>,
) -> Result<(StatusCode, Json<TeamResponse>), ApiError> {
    let member_ids = form.member_object_ids();
    let member_names = state.employees.find_names(&member_ids).await?;

    let team = state
        .teams
        .create(
            form.name.trim().to_string(),
            form.description.trim().to_string(),
            member_ids,
            member_names,
        )
        .await?;
    let id = stored_id(team.id)?;

    let response = to_response(team);
    publish(&state, ChangeOp::Created, &id, Some(&response)).await;
    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(team_id): Path<String>,
    ValidForm(form): ValidForm<TeamForm>,
) -> Result<Json<TeamResponse>, ApiError> {
    let id = parse_id(&team_id, "team_id")?;
    let member_ids = form.member_object_ids();
    let member_names = state.employees.find_names(&member_ids).await?;

    let team = state
        .teams
        .update(
            id,
            form.name.trim().to_string(),
            form.description.trim().to_string(),
            member_ids,
            member_names,
        )
        .await?;

    let response = to_response(team);
    publish(&state, ChangeOp::Updated, &id, Some(&response)).await;
    Ok(Json(response))
}

pub async fn delete(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(team_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = parse_id(&team_id, "team_id")?;
    state.teams.base.delete_by_id(id).await?;
    publish(&state, ChangeOp::Deleted, &id, None).await;
    Ok(StatusCode::NO_CONTENT)
}

async fn publish(state: &AppState, op: ChangeOp, id: &ObjectId, response: Option<&TeamResponse>) {
    publish_change(&state.ws_storage, Team::COLLECTION, op, id, response).await;
}
