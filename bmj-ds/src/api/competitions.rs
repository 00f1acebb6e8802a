//! Competition endpoints, including photo attachments

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;

use bmj_common::models::{Competition, CompetitionDraft, CompetitionId};
use bmj_common::pagination::DEFAULT_PAGE_SIZE;
use bmj_common::{Error, MediaKind, MediaRef, Page};

use super::error::ApiResult;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub page: u32,
    #[serde(default = "default_size")]
    pub size: u32,
}

fn default_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoQuery {
    pub photo_path: MediaRef,
}

/// GET /api/competitions?page=&size=
pub async fn list_competitions(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Json<Page<Competition>> {
    let store = state.store.read().await;
    Json(store.competitions(query.page, query.size))
}

/// POST /api/competitions
pub async fn create_competition(
    State(state): State<AppState>,
    Json(draft): Json<CompetitionDraft>,
) -> ApiResult<Json<Competition>> {
    let competition = state.store.write().await.create_competition(draft)?;
    Ok(Json(competition))
}

/// GET /api/competitions/:id
pub async fn get_competition(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
) -> ApiResult<Json<Competition>> {
    Ok(Json(state.store.read().await.get_competition(id)?))
}

/// PUT /api/competitions/:id
pub async fn update_competition(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
    Json(draft): Json<CompetitionDraft>,
) -> ApiResult<Json<Competition>> {
    Ok(Json(state.store.write().await.update_competition(id, draft)?))
}

/// DELETE /api/competitions/:id
///
/// Removes matches, games, and every stored photo and video file.
pub async fn delete_competition(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
) -> ApiResult<StatusCode> {
    let report = state.store.write().await.delete_competition(id)?;
    state.files.delete_report(&report).await;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/competitions/:id/photos (multipart field `photos`)
pub async fn upload_photos(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
    mut multipart: Multipart,
) -> ApiResult<Json<Competition>> {
    state.store.read().await.get_competition(id)?;

    let mut stored: Vec<MediaRef> = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        match state.files.save(MediaKind::Photo, &file_name, &bytes).await {
            Ok(media) => stored.push(media),
            Err(e) => {
                state
                    .files
                    .delete_all(MediaKind::Photo, &stored)
                    .await;
                return Err(e.into());
            }
        }
    }
    if stored.is_empty() {
        return Err(Error::validation("photos", "No files uploaded").into());
    }

    let count = stored.len();
    let result = state.store.write().await.add_photos(id, stored.clone());
    match result {
        Ok(competition) => {
            info!(competition_id = id, count, "Photos uploaded");
            Ok(Json(competition))
        }
        Err(e) => {
            state
                .files
                .delete_all(MediaKind::Photo, &stored)
                .await;
            Err(e.into())
        }
    }
}

/// DELETE /api/competitions/:id/photos?photoPath=
pub async fn delete_photo(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
    Query(query): Query<PhotoQuery>,
) -> ApiResult<Json<Competition>> {
    let competition = state
        .store
        .write()
        .await
        .remove_photo(id, &query.photo_path)?;
    state.files.delete(MediaKind::Photo, &query.photo_path).await;
    Ok(Json(competition))
}

/// DELETE /api/competitions/:id/photos/batch (JSON list of paths)
pub async fn delete_photos(
    State(state): State<AppState>,
    Path(id): Path<CompetitionId>,
    Json(photos): Json<Vec<MediaRef>>,
) -> ApiResult<Json<Competition>> {
    let competition = state.store.write().await.remove_photos(id, &photos)?;
    state
        .files
        .delete_all(MediaKind::Photo, &photos)
        .await;
    info!(competition_id = id, count = photos.len(), "Photos deleted");
    Ok(Json(competition))
}
