//! bmj-ds library - reference data service
//!
//! Serves the competition hierarchy over a JSON API mounted under `/api`,
//! with photo and video uploads stored on disk.

use axum::extract::DefaultBodyLimit;
use axum::Router;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use bmj_common::config::UploadConfig;
use bmj_common::Hierarchy;

pub mod api;
pub mod storage;

use storage::FileStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<RwLock<Hierarchy>>,
    pub files: Arc<FileStore>,
    pub max_upload_bytes: usize,
}

impl AppState {
    pub fn new(files: FileStore, uploads: &UploadConfig) -> Self {
        Self {
            store: Arc::new(RwLock::new(Hierarchy::new())),
            files: Arc::new(files),
            max_upload_bytes: uploads.max_upload_bytes,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use api::{competitions, games, matches};
    use axum::routing::{get, post};

    let uploads = ServeDir::new(state.files.uploads_dir());

    let routes = Router::new()
        .route(
            "/competitions",
            get(competitions::list_competitions).post(competitions::create_competition),
        )
        .route(
            "/competitions/:id",
            get(competitions::get_competition)
                .put(competitions::update_competition)
                .delete(competitions::delete_competition),
        )
        .route(
            "/competitions/:id/photos",
            post(competitions::upload_photos).delete(competitions::delete_photo),
        )
        .route(
            "/competitions/:id/photos/batch",
            axum::routing::delete(competitions::delete_photos),
        )
        .route(
            "/matches/competition/:competition_id",
            get(matches::matches_of_competition),
        )
        .route("/matches", post(matches::create_match))
        .route(
            "/matches/:id",
            get(matches::get_match)
                .put(matches::update_match)
                .delete(matches::delete_match),
        )
        .route("/games/match/:match_id", get(games::games_of_match))
        .route("/games", post(games::create_game))
        .route(
            "/games/:id",
            get(games::get_game)
                .put(games::update_game)
                .delete(games::delete_game),
        )
        .route("/games/:id/video", post(games::upload_video))
        .route(
            "/games/:id/videos",
            post(games::upload_video).delete(games::delete_video),
        )
        .nest_service("/uploads", uploads)
        .layer(DefaultBodyLimit::max(state.max_upload_bytes));

    Router::new()
        .nest("/api", routes)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
