use axum::{Json, extract::State};
use peopledesk_services::{feedback::FeedbackAnalysis, validation::FeedbackForm};
use tracing::info;

use crate::{
    error::ApiError,
    extractors::{auth::AuthUser, form::ValidForm},
    state::AppState,
};

pub async fn analyze(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidForm(form): ValidForm<FeedbackForm>,
) -> Result<Json<FeedbackAnalysis>, ApiError> {
    let analysis = state.feedback.analyze(&form.feedback).await?;
    info!(
        by = %auth.user_id,
        themes = analysis.themes.len(),
        sentiment = ?analysis.sentiment,
        "Feedback analysed"
    );
    Ok(Json(analysis))
}
