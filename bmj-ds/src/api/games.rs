//! Game endpoints, including video attachments

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use bmj_common::models::{Game, GameDraft, GameId, MatchId};
use bmj_common::{Error, MediaKind, MediaRef};

use super::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoQuery {
    pub video_path: MediaRef,
}

/// GET /api/games/match/:match_id
pub async fn games_of_match(
    State(state): State<AppState>,
    Path(match_id): Path<MatchId>,
) -> ApiResult<Json<Vec<Game>>> {
    Ok(Json(state.store.read().await.games_of(match_id)?))
}

/// POST /api/games
pub async fn create_game(
    State(state): State<AppState>,
    Json(draft): Json<GameDraft>,
) -> ApiResult<Json<Game>> {
    Ok(Json(state.store.write().await.create_game(draft)?))
}

/// GET /api/games/:id
pub async fn get_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> ApiResult<Json<Game>> {
    Ok(Json(state.store.read().await.get_game(id)?))
}

/// PUT /api/games/:id
pub async fn update_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
    Json(draft): Json<GameDraft>,
) -> ApiResult<Json<Game>> {
    Ok(Json(state.store.write().await.update_game(id, draft)?))
}

/// DELETE /api/games/:id
pub async fn delete_game(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
) -> ApiResult<StatusCode> {
    let report = state.store.write().await.delete_game(id)?;
    state.files.delete_report(&report).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/games/:id/video and /api/games/:id/videos (multipart, first file)
pub async fn upload_video(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
    mut multipart: Multipart,
) -> ApiResult<Json<Game>> {
    state.store.read().await.get_game(id)?;

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if let Some(file_name) = field.file_name().map(str::to_string) {
            upload = Some((file_name, field.bytes().await?));
            break;
        }
    }
    let (file_name, bytes) =
        upload.ok_or_else(|| Error::validation("video", "No file uploaded"))?;

    let video = state.files.save(MediaKind::Video, &file_name, &bytes).await?;
    let result = state.store.write().await.add_video(id, video.clone());
    match result {
        Ok(game) => {
            info!(game_id = id, video = %video, "Video uploaded");
            Ok(Json(game))
        }
        Err(e) => {
            state.files.delete(MediaKind::Video, &video).await;
            Err(e.into())
        }
    }
}

/// DELETE /api/games/:id/videos?videoPath=
pub async fn delete_video(
    State(state): State<AppState>,
    Path(id): Path<GameId>,
    Query(query): Query<VideoQuery>,
) -> ApiResult<Json<Game>> {
    let game = state
        .store
        .write()
        .await
        .remove_video(id, &query.video_path)?;
    state.files.delete(MediaKind::Video, &query.video_path).await;
    Ok(Json(game))
}
