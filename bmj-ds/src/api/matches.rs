//! Match endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use bmj_common::models::{CompetitionId, Match, MatchDraft, MatchId};

use super::error::ApiResult;
use crate::AppState;

/// GET /api/matches/competition/:competition_id
pub async fn matches_of_competition(
    State(state): State<AppState>,
    Path(competition_id): Path<CompetitionId>,
) -> ApiResult<Json<Vec<Match>>> {
    Ok(Json(state.store.read().await.matches_of(competition_id)?))
}

/// POST /api/matches
pub async fn create_match(
    State(state): State<AppState>,
    Json(draft): Json<MatchDraft>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.store.write().await.create_match(draft)?))
}

/// GET /api/matches/:id
pub async fn get_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.store.read().await.get_match(id)?))
}

/// PUT /api/matches/:id
pub async fn update_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
    Json(draft): Json<MatchDraft>,
) -> ApiResult<Json<Match>> {
    Ok(Json(state.store.write().await.update_match(id, draft)?))
}

/// DELETE /api/matches/:id, along with its games and their videos
pub async fn delete_match(
    State(state): State<AppState>,
    Path(id): Path<MatchId>,
) -> ApiResult<StatusCode> {
    let report = state.store.write().await.delete_match(id)?;
    state.files.delete_report(&report).await;
    Ok(StatusCode::NO_CONTENT)
}
