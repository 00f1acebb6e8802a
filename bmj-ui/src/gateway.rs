//! Persistence gateway
//!
//! The narrow contract between the client core and whatever stores the
//! hierarchy. [`HttpGateway`](crate::client::HttpGateway) talks to the data
//! service; [`InMemoryGateway`] runs the same hierarchy rules locally and is
//! what the controllers are tested against.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use bmj_common::models::{
    Competition, CompetitionDraft, CompetitionId, CompetitionTree, Game, GameDraft, GameId, Match,
    MatchDraft, MatchId, MatchNode,
};
use bmj_common::{Error, Hierarchy, MediaKind, MediaRef, Page, Result};

/// A file picked for upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
        }
    }

    /// Lowercased extension of the picked file
    pub fn extension(&self) -> Option<String> {
        MediaRef::new(self.file_name.as_str()).extension()
    }
}

/// Persistence operations used by the client core
///
/// Every failure surfaces as `Error::Persistence` or `Error::Validation`;
/// implementations convert missing references at the boundary.
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn list_competitions(&self, page: u32, size: u32) -> Result<Page<Competition>>;
    async fn create_competition(&self, draft: CompetitionDraft) -> Result<Competition>;
    async fn get_competition(&self, id: CompetitionId) -> Result<Competition>;
    async fn update_competition(
        &self,
        id: CompetitionId,
        draft: CompetitionDraft,
    ) -> Result<Competition>;
    async fn delete_competition(&self, id: CompetitionId) -> Result<()>;

    async fn upload_photos(&self, id: CompetitionId, files: Vec<Upload>) -> Result<Competition>;
    async fn delete_photo(&self, id: CompetitionId, photo: &MediaRef) -> Result<Competition>;
    async fn delete_photos(&self, id: CompetitionId, photos: &[MediaRef]) -> Result<Competition>;

    async fn matches_of(&self, competition_id: CompetitionId) -> Result<Vec<Match>>;
    async fn create_match(&self, draft: MatchDraft) -> Result<Match>;
    async fn update_match(&self, id: MatchId, draft: MatchDraft) -> Result<Match>;
    async fn delete_match(&self, id: MatchId) -> Result<()>;

    async fn games_of(&self, match_id: MatchId) -> Result<Vec<Game>>;
    async fn create_game(&self, draft: GameDraft) -> Result<Game>;
    async fn update_game(&self, id: GameId, draft: GameDraft) -> Result<Game>;
    async fn delete_game(&self, id: GameId) -> Result<()>;

    async fn upload_video(&self, id: GameId, file: Upload) -> Result<Game>;
    async fn delete_video(&self, id: GameId, video: &MediaRef) -> Result<Game>;

    /// Full authoritative state of one competition: the competition, its
    /// matches, and each match's games
    async fn fetch_tree(&self, id: CompetitionId) -> Result<CompetitionTree> {
        let competition = self.get_competition(id).await?;
        let mut matches = Vec::new();
        for record in self.matches_of(id).await? {
            let games = self.games_of(record.id).await?;
            matches.push(MatchNode { record, games });
        }
        Ok(CompetitionTree {
            competition,
            matches,
        })
    }
}

/// Gateway over a local [`Hierarchy`]
///
/// Can be switched offline to make every call fail like an unreachable
/// service would.
#[derive(Debug, Clone, Default)]
pub struct InMemoryGateway {
    store: Arc<RwLock<Hierarchy>>,
    offline: Arc<AtomicBool>,
    uploads: Arc<AtomicU64>,
}

impl InMemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_store(store: Arc<RwLock<Hierarchy>>) -> Self {
        Self {
            store,
            ..Self::default()
        }
    }

    pub fn store(&self) -> Arc<RwLock<Hierarchy>> {
        Arc::clone(&self.store)
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    fn check_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(Error::Persistence("service unavailable".to_string()));
        }
        Ok(())
    }

    fn store_ref(&self, kind: MediaKind, file: &Upload) -> MediaRef {
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        let ext = file.extension().unwrap_or_else(|| "bin".to_string());
        MediaRef::new(format!("{}/upload-{}.{}", kind.dir(), n, ext))
    }

    async fn read<T>(&self, f: impl FnOnce(&Hierarchy) -> Result<T>) -> Result<T> {
        self.check_online()?;
        let store = self.store.read().await;
        f(&store).map_err(Error::at_boundary)
    }

    async fn write<T>(&self, f: impl FnOnce(&mut Hierarchy) -> Result<T>) -> Result<T> {
        self.check_online()?;
        let mut store = self.store.write().await;
        f(&mut store).map_err(Error::at_boundary)
    }
}

#[async_trait]
impl Gateway for InMemoryGateway {
    async fn list_competitions(&self, page: u32, size: u32) -> Result<Page<Competition>> {
        self.read(|h| Ok(h.competitions(page, size))).await
    }

    async fn create_competition(&self, draft: CompetitionDraft) -> Result<Competition> {
        self.write(|h| h.create_competition(draft)).await
    }

    async fn get_competition(&self, id: CompetitionId) -> Result<Competition> {
        self.read(|h| h.get_competition(id)).await
    }

    async fn update_competition(
        &self,
        id: CompetitionId,
        draft: CompetitionDraft,
    ) -> Result<Competition> {
        self.write(|h| h.update_competition(id, draft)).await
    }

    async fn delete_competition(&self, id: CompetitionId) -> Result<()> {
        self.write(|h| h.delete_competition(id)).await.map(|_| ())
    }

    async fn upload_photos(&self, id: CompetitionId, files: Vec<Upload>) -> Result<Competition> {
        let refs: Vec<MediaRef> = files
            .iter()
            .map(|f| self.store_ref(MediaKind::Photo, f))
            .collect();
        debug!(competition_id = id, count = refs.len(), "Storing photos in memory");
        self.write(|h| h.add_photos(id, refs)).await
    }

    async fn delete_photo(&self, id: CompetitionId, photo: &MediaRef) -> Result<Competition> {
        self.write(|h| h.remove_photo(id, photo)).await
    }

    async fn delete_photos(&self, id: CompetitionId, photos: &[MediaRef]) -> Result<Competition> {
        self.write(|h| h.remove_photos(id, photos)).await
    }

    async fn matches_of(&self, competition_id: CompetitionId) -> Result<Vec<Match>> {
        self.read(|h| h.matches_of(competition_id)).await
    }

    async fn create_match(&self, draft: MatchDraft) -> Result<Match> {
        self.write(|h| h.create_match(draft)).await
    }

    async fn update_match(&self, id: MatchId, draft: MatchDraft) -> Result<Match> {
        self.write(|h| h.update_match(id, draft)).await
    }

    async fn delete_match(&self, id: MatchId) -> Result<()> {
        self.write(|h| h.delete_match(id)).await.map(|_| ())
    }

    async fn games_of(&self, match_id: MatchId) -> Result<Vec<Game>> {
        self.read(|h| h.games_of(match_id)).await
    }

    async fn create_game(&self, draft: GameDraft) -> Result<Game> {
        self.write(|h| h.create_game(draft)).await
    }

    async fn update_game(&self, id: GameId, draft: GameDraft) -> Result<Game> {
        self.write(|h| h.update_game(id, draft)).await
    }

    async fn delete_game(&self, id: GameId) -> Result<()> {
        self.write(|h| h.delete_game(id)).await.map(|_| ())
    }

    async fn upload_video(&self, id: GameId, file: Upload) -> Result<Game> {
        let video = self.store_ref(MediaKind::Video, &file);
        self.write(|h| h.add_video(id, video)).await
    }

    async fn delete_video(&self, id: GameId, video: &MediaRef) -> Result<Game> {
        self.write(|h| h.remove_video(id, video)).await
    }
}
