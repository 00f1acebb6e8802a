//! Integration tests for bmj-ds API endpoints

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::util::ServiceExt; // for `oneshot`

use bmj_common::config::UploadConfig;
use bmj_ds::storage::FileStore;
use bmj_ds::{build_router, AppState};

/// Test helper: app state rooted in a temp dir
fn setup_state() -> (TempDir, AppState) {
    let dir = TempDir::new().unwrap();
    let uploads = UploadConfig::default();
    let files = FileStore::new(dir.path(), uploads.clone());
    (dir, AppState::new(files, &uploads))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn multipart_request(uri: &str, field: &str, files: &[(&str, &[u8])]) -> Request<Body> {
    let boundary = "bmjtestboundary";
    let mut body = Vec::new();
    for (name, bytes) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                boundary, field, name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn send(state: &AppState, request: Request<Body>) -> (StatusCode, Value) {
    let response = build_router(state.clone()).oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn competition_body(name: &str, start: &str) -> Value {
    json!({
        "competitionName": name,
        "startDate": start,
        "endDate": start,
        "city": "Shenzhen",
        "result": "CHAMPION"
    })
}

async fn create_competition(state: &AppState, name: &str, start: &str) -> i64 {
    let (status, body) = send(
        state,
        json_request("POST", "/api/competitions", competition_body(name, start)),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_i64().unwrap()
}

async fn create_match(state: &AppState, competition_id: i64) -> i64 {
    let (status, body) = send(
        state,
        json_request(
            "POST",
            "/api/matches",
            json!({
                "competitionId": competition_id,
                "matchType": "KNOCKOUT_2",
                "opponentName": "Liu",
                "opponentCity": "Dalian",
                "score": "2:0",
                "result": "WIN"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_dir, state) = setup_state();
    let (status, body) = send(&state, empty_request("GET", "/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "bmj-ds");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_competition_listing_is_paged_newest_first() {
    let (_dir, state) = setup_state();
    create_competition(&state, "Early", "2023-02-01").await;
    create_competition(&state, "Late", "2024-02-01").await;

    let (status, body) = send(&state, empty_request("GET", "/api/competitions?page=0&size=1")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["content"][0]["competitionName"], "Late");
    assert_eq!(body["totalElements"], 2);
    assert_eq!(body["totalPages"], 2);

    let (_, body) = send(&state, empty_request("GET", "/api/competitions")).await;
    assert_eq!(body["size"], 10);
}

#[tokio::test]
async fn test_validation_error_names_field() {
    let (_dir, state) = setup_state();
    let mut body = competition_body("Bad dates", "2024-05-02");
    body["endDate"] = json!("2024-05-01");

    let (status, body) = send(&state, json_request("POST", "/api/competitions", body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "endDate");
}

#[tokio::test]
async fn test_match_with_tied_score_rejected() {
    let (_dir, state) = setup_state();
    let id = create_competition(&state, "Cup", "2024-01-01").await;

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/matches",
            json!({
                "competitionId": id,
                "matchType": "GROUP_STAGE_1",
                "opponentName": "Ma",
                "opponentCity": "Jinan",
                "score": "1:1",
                "result": "WIN"
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "score");
}

#[tokio::test]
async fn test_unknown_parent_is_not_found() {
    let (_dir, state) = setup_state();
    let (status, _) = send(
        &state,
        json_request(
            "POST",
            "/api/games",
            json!({ "matchId": 77, "gameNumber": 1, "score": "21:3", "result": "WIN" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&state, empty_request("GET", "/api/competitions/5")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("competition 5"));
}

#[tokio::test]
async fn test_game_tie_has_no_result() {
    let (_dir, state) = setup_state();
    let c = create_competition(&state, "Cup", "2024-01-01").await;
    let m = create_match(&state, c).await;

    let (status, body) = send(
        &state,
        json_request(
            "POST",
            "/api/games",
            json!({ "matchId": m, "gameNumber": 2, "score": "20:20" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["result"].is_null());

    let (_, games) = send(&state, empty_request("GET", &format!("/api/games/match/{}", m))).await;
    assert_eq!(games.as_array().unwrap().len(), 1);
    assert_eq!(games[0]["score"], "20:20");
}

#[tokio::test]
async fn test_photo_upload_serve_and_delete() {
    let (dir, state) = setup_state();
    let c = create_competition(&state, "Cup", "2024-01-01").await;

    let (status, body) = send(
        &state,
        multipart_request(
            &format!("/api/competitions/{}/photos", c),
            "photos",
            &[("a.jpg", &b"first"[..]), ("b.png", &b"second"[..])],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let photos: Vec<String> = serde_json::from_value(body["photos"].clone()).unwrap();
    assert_eq!(photos.len(), 2);

    // Served by basename under /api/uploads
    let basename = photos[0].rsplit('/').next().unwrap().to_string();
    let response = build_router(state.clone())
        .oneshot(empty_request("GET", &format!("/api/uploads/photos/{}", basename)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"first");

    let (status, body) = send(
        &state,
        empty_request(
            "DELETE",
            &format!("/api/competitions/{}/photos?photoPath={}", c, photos[0]),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photos"].as_array().unwrap().len(), 1);
    assert!(!dir.path().join("uploads").join("photos").join(&basename).exists());
}

#[tokio::test]
async fn test_upload_rejects_disallowed_type() {
    let (_dir, state) = setup_state();
    let c = create_competition(&state, "Cup", "2024-01-01").await;

    let (status, body) = send(
        &state,
        multipart_request(
            &format!("/api/competitions/{}/photos", c),
            "photos",
            &[("evil.sh", &b"#!/bin/sh"[..])],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["field"], "file");
}

#[tokio::test]
async fn test_batch_delete_is_all_or_nothing() {
    let (_dir, state) = setup_state();
    let c = create_competition(&state, "Cup", "2024-01-01").await;
    let (_, body) = send(
        &state,
        multipart_request(
            &format!("/api/competitions/{}/photos", c),
            "photos",
            &[("a.jpg", &b"1"[..]), ("b.jpg", &b"2"[..]), ("c.jpg", &b"3"[..])],
        ),
    )
    .await;
    let photos: Vec<String> = serde_json::from_value(body["photos"].clone()).unwrap();

    let uri = format!("/api/competitions/{}/photos/batch", c);
    let (status, _) = send(
        &state,
        json_request("DELETE", &uri, json!([photos[0], "photos/missing.jpg"])),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&state, json_request("DELETE", &uri, json!([photos[0], photos[2]]))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["photos"], json!([photos[1]]));
}

#[tokio::test]
async fn test_competition_delete_cascades_and_removes_files() {
    let (dir, state) = setup_state();
    let c = create_competition(&state, "Cup", "2024-01-01").await;
    let m = create_match(&state, c).await;
    let (_, game) = send(
        &state,
        json_request(
            "POST",
            "/api/games",
            json!({ "matchId": m, "gameNumber": 1, "score": "21:9", "result": "WIN" }),
        ),
    )
    .await;
    let g = game["id"].as_i64().unwrap();

    let (status, body) = send(
        &state,
        multipart_request(&format!("/api/games/{}/videos", g), "video", &[("rally.mp4", &b"mp4"[..])]),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let video = body["videos"][0].as_str().unwrap().to_string();
    let video_file = dir
        .path()
        .join("uploads")
        .join("videos")
        .join(video.rsplit('/').next().unwrap());
    assert!(video_file.exists());

    let (status, _) = send(&state, empty_request("DELETE", &format!("/api/competitions/{}", c))).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(!video_file.exists());

    let (status, _) = send(&state, empty_request("GET", &format!("/api/matches/{}", m))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&state, empty_request("GET", &format!("/api/games/{}", g))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
