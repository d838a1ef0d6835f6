use axum::{
    Json,
    extract::{Multipart, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
};
use peopledesk_db::models::{Role, User};
use peopledesk_services::{
    auth::{Identity, TokenPair},
    dao::base::DaoError,
    storage::avatar_key,
    validation::{LoginForm, ProfileForm, RegisterForm},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::{hex, rfc3339, upload::UploadForm};
use crate::{error::ApiError, extractors::auth::AuthUser, extractors::form::ValidForm, state::AppState};

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: u64,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: String,
    pub role: Role,
    pub avatar_url: Option<String>,
    pub employee_id: Option<String>,
    pub desktop_notifications: bool,
    pub created_at: String,
}

fn user_response(user: User) -> UserResponse {
    UserResponse {
        id: hex(user.id),
        email: user.email,
        display_name: user.display_name,
        role: user.role,
        avatar_url: user.avatar_url,
        employee_id: user.employee_id.map(|id| id.to_hex()),
        desktop_notifications: user.desktop_notifications,
        created_at: rfc3339(user.created_at),
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

fn session_cookie(value: &str, max_age: u64) -> Result<HeaderMap, ApiError> {
    let cookie = format!(
        "access_token={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        value, max_age
    );
    let mut headers = HeaderMap::new();
    headers.insert(
        header::SET_COOKIE,
        HeaderValue::from_str(&cookie).map_err(|e| ApiError::Internal(e.to_string()))?,
    );
    Ok(headers)
}

fn issue(state: &AppState, user: &User) -> Result<TokenPair, ApiError> {
    let user_id = user
        .id
        .ok_or_else(|| ApiError::Internal("User without id".to_string()))?;
    let tokens = state.auth.generate_tokens(&Identity {
        user_id,
        email: &user.email,
        name: &user.display_name,
        role: user.role,
    })?;
    Ok(tokens)
}

fn session(state: &AppState, user: User) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let tokens = issue(state, &user)?;
    let headers = session_cookie(&tokens.access_token, tokens.expires_in)?;

    Ok((
        headers,
        Json(AuthResponse {
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            expires_in: tokens.expires_in,
            user: user_response(user),
        }),
    ))
}

pub async fn register(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<RegisterForm>,
) -> Result<(StatusCode, HeaderMap, Json<AuthResponse>), ApiError> {
    let password_hash = state.auth.hash_password(&form.password)?;

    let user = state
        .users
        .create(form.email, form.display_name.trim().to_string(), password_hash)
        .await
        .map_err(|e| match e {
            DaoError::DuplicateKey(_) => {
                ApiError::Conflict("An account with this email already exists".to_string())
            }
            other => other.into(),
        })?;

    info!(email = %user.email, role = user.role.as_str(), "User registered");

    let (headers, body) = session(&state, user)?;
    Ok((StatusCode::CREATED, headers, body))
}

pub async fn login(
    State(state): State<AppState>,
    ValidForm(form): ValidForm<LoginForm>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let user = state
        .users
        .find_by_email(&form.email)
        .await
        .map_err(|_| ApiError::Unauthorized("Invalid credentials".to_string()))?;

    let password_hash = user
        .password_hash
        .as_ref()
        .ok_or_else(|| ApiError::Unauthorized("No password set".to_string()))?;

    if !state.auth.verify_password(&form.password, password_hash)? {
        return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
    }

    if let Some(id) = user.id {
        state.users.touch(id).await?;
    }

    session(&state, user)
}

pub async fn logout() -> Result<HeaderMap, ApiError> {
    session_cookie("", 0)
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(body): Json<RefreshRequest>,
) -> Result<(HeaderMap, Json<AuthResponse>), ApiError> {
    let claims = state.auth.verify_refresh_token(&body.refresh_token)?;

    let user_id = bson::oid::ObjectId::parse_str(&claims.sub)
        .map_err(|_| ApiError::Unauthorized("Invalid user ID".to_string()))?;

    // role and name come from the stored user, not the old token
    let user = state.users.base.find_by_id(user_id).await?;
    session(&state, user)
}

pub async fn me(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(user_response(user)))
}

pub async fn update_me(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidForm(form): ValidForm<ProfileForm>,
) -> Result<Json<UserResponse>, ApiError> {
    state
        .users
        .update_profile(
            auth.user_id,
            form.display_name.map(|n| n.trim().to_string()),
            form.desktop_notifications,
        )
        .await?;

    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(user_response(user)))
}

pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<UserResponse>, ApiError> {
    let (file, _) = UploadForm::read(multipart).await?.require_file()?;
    file.require_image()?;

    let key = avatar_key(&auth.user_id.to_hex(), &file.file_name);
    let stored = state.store.put(&key, &file.bytes).await?;
    state.users.set_avatar(auth.user_id, &stored.url).await?;

    let user = state.users.base.find_by_id(auth.user_id).await?;
    Ok(Json(user_response(user)))
}
