//! HTTP gateway to the data service

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

use bmj_common::config::TomlConfig;
use bmj_common::models::{
    Competition, CompetitionDraft, CompetitionId, Game, GameDraft, GameId, Match, MatchDraft,
    MatchId,
};
use bmj_common::{Error, MediaKind, MediaRef, Page, Result};

use crate::gateway::{Gateway, Upload};
use crate::session::SessionContext;

const USER_AGENT: &str = concat!("bmj-ui/", env!("CARGO_PKG_VERSION"));

/// Error body returned by the data service
#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
    #[serde(default)]
    field: Option<String>,
}

/// [`Gateway`] over the data service REST API
#[derive(Debug, Clone)]
pub struct HttpGateway {
    http_client: reqwest::Client,
    origin: String,
    session: SessionContext,
}

impl HttpGateway {
    /// Client for the service at `origin` (e.g. `http://127.0.0.1:5740`)
    pub fn new(origin: impl Into<String>, timeout: Duration, session: SessionContext) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Config(format!("HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            origin: origin.into().trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn from_config(config: &TomlConfig, session: SessionContext) -> Result<Self> {
        Self::new(config.api_base_url.clone(), config.client.timeout(), session)
    }

    pub fn origin(&self) -> &str {
        &self.origin
    }

    /// Absolute display URL for a stored photo or video
    pub fn media_url(&self, kind: MediaKind, media: &MediaRef) -> String {
        kind.display_url(&self.origin, media)
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api{}", self.origin, path)
    }

    async fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.session.token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn execute(&self, what: &str, request: RequestBuilder) -> Result<reqwest::Response> {
        let response = self
            .authorize(request)
            .await
            .send()
            .await
            .map_err(|e| Error::Persistence(format!("{}: {}", what, e)))?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, what, "Request succeeded");
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let body: Option<ErrorBody> = serde_json::from_str(&text).ok();
        warn!(%status, what, body = %text, "Request failed");

        match body {
            Some(ErrorBody {
                error,
                field: Some(field),
            }) if status == StatusCode::BAD_REQUEST => Err(Error::Validation {
                field,
                message: error,
            }),
            Some(body) => Err(Error::Persistence(format!("{}: {} {}", what, status, body.error))),
            None => Err(Error::Persistence(format!("{}: {}", what, status))),
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, what: &str, request: RequestBuilder) -> Result<T> {
        self.execute(what, request)
            .await?
            .json()
            .await
            .map_err(|e| Error::Persistence(format!("{}: invalid response: {}", what, e)))
    }

    async fn run(&self, what: &str, request: RequestBuilder) -> Result<()> {
        self.execute(what, request).await.map(|_| ())
    }
}

fn file_part(file: Upload) -> Part {
    let Upload { file_name, bytes } = file;
    Part::bytes(bytes).file_name(file_name)
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn list_competitions(&self, page: u32, size: u32) -> Result<Page<Competition>> {
        let request = self
            .http_client
            .get(self.url("/competitions"))
            .query(&[("page", page), ("size", size)]);
        self.fetch("list competitions", request).await
    }

    async fn create_competition(&self, draft: CompetitionDraft) -> Result<Competition> {
        let request = self.http_client.post(self.url("/competitions")).json(&draft);
        self.fetch("create competition", request).await
    }

    async fn get_competition(&self, id: CompetitionId) -> Result<Competition> {
        let request = self.http_client.get(self.url(&format!("/competitions/{}", id)));
        self.fetch("get competition", request).await
    }

    async fn update_competition(
        &self,
        id: CompetitionId,
        draft: CompetitionDraft,
    ) -> Result<Competition> {
        let request = self
            .http_client
            .put(self.url(&format!("/competitions/{}", id)))
            .json(&draft);
        self.fetch("update competition", request).await
    }

    async fn delete_competition(&self, id: CompetitionId) -> Result<()> {
        let request = self
            .http_client
            .delete(self.url(&format!("/competitions/{}", id)));
        self.run("delete competition", request).await
    }

    async fn upload_photos(&self, id: CompetitionId, files: Vec<Upload>) -> Result<Competition> {
        let form = files
            .into_iter()
            .fold(Form::new(), |form, file| form.part("photos", file_part(file)));
        let request = self
            .http_client
            .post(self.url(&format!("/competitions/{}/photos", id)))
            .multipart(form);
        self.fetch("upload photos", request).await
    }

    async fn delete_photo(&self, id: CompetitionId, photo: &MediaRef) -> Result<Competition> {
        let request = self
            .http_client
            .delete(self.url(&format!("/competitions/{}/photos", id)))
            .query(&[("photoPath", photo.as_str())]);
        self.fetch("delete photo", request).await
    }

    async fn delete_photos(&self, id: CompetitionId, photos: &[MediaRef]) -> Result<Competition> {
        let request = self
            .http_client
            .delete(self.url(&format!("/competitions/{}/photos/batch", id)))
            .json(photos);
        self.fetch("delete photos", request).await
    }

    async fn matches_of(&self, competition_id: CompetitionId) -> Result<Vec<Match>> {
        let request = self
            .http_client
            .get(self.url(&format!("/matches/competition/{}", competition_id)));
        self.fetch("list matches", request).await
    }

    async fn create_match(&self, draft: MatchDraft) -> Result<Match> {
        let request = self.http_client.post(self.url("/matches")).json(&draft);
        self.fetch("create match", request).await
    }

    async fn update_match(&self, id: MatchId, draft: MatchDraft) -> Result<Match> {
        let request = self
            .http_client
            .put(self.url(&format!("/matches/{}", id)))
            .json(&draft);
        self.fetch("update match", request).await
    }

    async fn delete_match(&self, id: MatchId) -> Result<()> {
        let request = self.http_client.delete(self.url(&format!("/matches/{}", id)));
        self.run("delete match", request).await
    }

    async fn games_of(&self, match_id: MatchId) -> Result<Vec<Game>> {
        let request = self
            .http_client
            .get(self.url(&format!("/games/match/{}", match_id)));
        self.fetch("list games", request).await
    }

    async fn create_game(&self, draft: GameDraft) -> Result<Game> {
        let request = self.http_client.post(self.url("/games")).json(&draft);
        self.fetch("create game", request).await
    }

    async fn update_game(&self, id: GameId, draft: GameDraft) -> Result<Game> {
        let request = self
            .http_client
            .put(self.url(&format!("/games/{}", id)))
            .json(&draft);
        self.fetch("update game", request).await
    }

    async fn delete_game(&self, id: GameId) -> Result<()> {
        let request = self.http_client.delete(self.url(&format!("/games/{}", id)));
        self.run("delete game", request).await
    }

    async fn upload_video(&self, id: GameId, file: Upload) -> Result<Game> {
        let form = Form::new().part("video", file_part(file));
        let request = self
            .http_client
            .post(self.url(&format!("/games/{}/videos", id)))
            .multipart(form);
        self.fetch("upload video", request).await
    }

    async fn delete_video(&self, id: GameId, video: &MediaRef) -> Result<Game> {
        let request = self
            .http_client
            .delete(self.url(&format!("/games/{}/videos", id)))
            .query(&[("videoPath", video.as_str())]);
        self.fetch("delete video", request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls_are_mounted_under_api() {
        let gateway = HttpGateway::new(
            "http://127.0.0.1:5740/",
            Duration::from_secs(5),
            SessionContext::new(),
        )
        .unwrap();
        assert_eq!(gateway.origin(), "http://127.0.0.1:5740");
        assert_eq!(gateway.url("/matches"), "http://127.0.0.1:5740/api/matches");
        assert_eq!(
            gateway.media_url(MediaKind::Photo, &MediaRef::new("photos/a.jpg")),
            "http://127.0.0.1:5740/api/uploads/photos/a.jpg"
        );
    }

    #[test]
    fn test_error_body_parses_optional_field() {
        let body: ErrorBody = serde_json::from_str(r#"{"error":"bad"}"#).unwrap();
        assert_eq!(body.error, "bad");
        assert!(body.field.is_none());
    }
}
