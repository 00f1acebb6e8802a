//! Competition page
//!
//! Owns the last authoritative [`CompetitionTree`] plus the transient media
//! interaction state (selection, photo viewer, video player, editor modals).
//!
//! Every successful mutation is followed by a full refresh of the tree; the
//! page never patches photos, counts, or results locally. A failed refresh
//! keeps the previous tree on screen and publishes `RefreshFailed`. A failed
//! mutation leaves all local state as it was and publishes `MutationFailed`.

use std::sync::Arc;
use tracing::{debug, info, warn};

use bmj_common::models::{
    Competition, CompetitionDraft, CompetitionId, CompetitionTree, GameId, MatchId, MatchNode,
};
use bmj_common::{Error, EventBus, MediaRef, Result, UiEvent};

use crate::confirm::{plural, CascadeScope, Confirmation};
use crate::forms::{GameEditor, MatchEditor};
use crate::gateway::{Gateway, Upload};
use crate::keyboard::KeyboardHub;
use crate::selection::{CheckState, MediaSelectionController};
use crate::viewer::{MediaViewerController, VideoModalController};

/// Modal surfaces; at most one is open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    MatchEditor,
    GameEditor,
    PhotoViewer,
    VideoPlayer,
}

#[derive(Debug, Clone, PartialEq)]
enum Editor {
    Match(MatchEditor),
    Game(GameEditor),
}

pub struct CompetitionPage<G: Gateway + ?Sized> {
    gateway: Arc<G>,
    events: EventBus,
    competition_id: CompetitionId,
    tree: Option<CompetitionTree>,
    selection: MediaSelectionController,
    viewer: MediaViewerController,
    video: VideoModalController,
    editor: Option<Editor>,
    deleted: bool,
}

impl<G: Gateway + ?Sized> CompetitionPage<G> {
    pub fn new(
        gateway: Arc<G>,
        events: EventBus,
        keyboard: KeyboardHub,
        competition_id: CompetitionId,
    ) -> Self {
        Self {
            gateway,
            events,
            competition_id,
            tree: None,
            selection: MediaSelectionController::new(),
            viewer: MediaViewerController::new(keyboard),
            video: VideoModalController::new(),
            editor: None,
            deleted: false,
        }
    }

    // ========================================
    // State
    // ========================================

    pub fn competition_id(&self) -> CompetitionId {
        self.competition_id
    }

    /// Last successfully fetched state
    pub fn tree(&self) -> Option<&CompetitionTree> {
        self.tree.as_ref()
    }

    pub fn competition(&self) -> Option<&Competition> {
        self.tree.as_ref().map(|t| &t.competition)
    }

    pub fn photos(&self) -> &[MediaRef] {
        self.tree.as_ref().map(|t| t.photos()).unwrap_or(&[])
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    pub fn selection(&self) -> &MediaSelectionController {
        &self.selection
    }

    pub fn viewer(&self) -> &MediaViewerController {
        &self.viewer
    }

    pub fn video(&self) -> &VideoModalController {
        &self.video
    }

    pub fn active_modal(&self) -> Option<Modal> {
        match &self.editor {
            Some(Editor::Match(_)) => Some(Modal::MatchEditor),
            Some(Editor::Game(_)) => Some(Modal::GameEditor),
            None if self.viewer.is_open() => Some(Modal::PhotoViewer),
            None if self.video.is_open() => Some(Modal::VideoPlayer),
            None => None,
        }
    }

    fn ensure_no_modal(&self) -> Result<()> {
        match self.active_modal() {
            Some(modal) => Err(Error::InvalidState(format!("{:?} is already open", modal))),
            None => Ok(()),
        }
    }

    // ========================================
    // Refresh
    // ========================================

    /// Re-fetch the competition, its matches, and their games
    pub async fn refresh(&mut self) -> Result<()> {
        match self.gateway.fetch_tree(self.competition_id).await {
            Ok(tree) => {
                debug!(
                    competition_id = self.competition_id,
                    photos = tree.photos().len(),
                    matches = tree.matches.len(),
                    "Gallery refreshed"
                );
                self.events.emit_lossy(UiEvent::GalleryRefreshed {
                    competition_id: self.competition_id,
                    photos: tree.photos().len(),
                    matches: tree.matches.len(),
                    games: tree.game_count(),
                    timestamp: chrono::Utc::now(),
                });
                self.selection.retain_existing(tree.photos());
                self.viewer.clamp_to(tree.photos().len());
                self.tree = Some(tree);
                Ok(())
            }
            Err(e) => {
                warn!(competition_id = self.competition_id, error = %e, "Refresh failed, keeping last state");
                self.events.emit_lossy(UiEvent::RefreshFailed {
                    competition_id: self.competition_id,
                    message: e.to_string(),
                    timestamp: chrono::Utc::now(),
                });
                Err(e)
            }
        }
    }

    /// Refresh after a successful mutation; a refresh failure is already
    /// published and does not undo the mutation
    async fn refresh_after_mutation(&mut self) {
        let _ = self.refresh().await;
    }

    /// Publish a failed mutation and hand the error back
    fn report<T>(&self, action: &str, result: Result<T>) -> Result<T> {
        if let Err(e) = &result {
            warn!(competition_id = self.competition_id, action, error = %e, "Mutation failed");
            self.events.emit_lossy(UiEvent::MutationFailed {
                competition_id: self.competition_id,
                action: action.to_string(),
                message: e.to_string(),
                timestamp: chrono::Utc::now(),
            });
        }
        result
    }

    fn photo_at(&self, index: usize) -> Result<MediaRef> {
        self.photos().get(index).cloned().ok_or_else(|| {
            Error::InvalidState(format!("no photo at index {}", index))
        })
    }

    // ========================================
    // Competition
    // ========================================

    pub async fn update_competition(&mut self, draft: CompetitionDraft) -> Result<()> {
        let draft = draft.normalized();
        draft.validate()?;

        let gateway = Arc::clone(&self.gateway);
        let result = gateway.update_competition(self.competition_id, draft).await;
        self.report("update competition", result)?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Confirmation naming everything a competition delete removes
    pub fn prepare_delete_competition(&self) -> Result<Confirmation<CascadeScope>> {
        let tree = self
            .tree
            .as_ref()
            .ok_or_else(|| Error::InvalidState("competition not loaded".to_string()))?;
        let scope = CascadeScope {
            competition_id: self.competition_id,
            matches: tree.matches.len(),
            games: tree.game_count(),
            photos: tree.photos().len(),
        };
        Ok(Confirmation::new(scope.prompt(), scope))
    }

    pub async fn commit_delete_competition(
        &mut self,
        confirmation: Confirmation<CascadeScope>,
    ) -> Result<()> {
        let scope = confirmation.into_target();
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.delete_competition(scope.competition_id).await;
        self.report("delete competition", result)?;

        info!(
            competition_id = scope.competition_id,
            matches = scope.matches,
            games = scope.games,
            photos = scope.photos,
            "Competition deleted"
        );
        self.selection.exit();
        self.viewer.close();
        self.video.close();
        self.editor = None;
        self.tree = None;
        self.deleted = true;
        self.events.emit_lossy(UiEvent::CompetitionDeleted {
            competition_id: scope.competition_id,
            timestamp: chrono::Utc::now(),
        });
        Ok(())
    }

    // ========================================
    // Photos
    // ========================================

    pub async fn upload_photos(&mut self, files: Vec<Upload>) -> Result<()> {
        if files.is_empty() {
            return Err(Error::validation("photos", "Choose at least one photo"));
        }
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.upload_photos(self.competition_id, files).await;
        self.report("upload photos", result)?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    /// Photo click: toggles while selecting, otherwise opens the viewer
    pub fn click_photo(&mut self, index: usize) -> Result<()> {
        let photo = self.photo_at(index)?;
        if self.selection.is_selecting() {
            self.selection.toggle(&photo)?;
            return Ok(());
        }
        self.ensure_no_modal()?;
        let len = self.photos().len();
        self.viewer.open(index, len)
    }

    pub fn enter_selection(&mut self) -> Result<()> {
        self.ensure_no_modal()?;
        self.selection.enter();
        Ok(())
    }

    pub fn exit_selection(&mut self) {
        self.selection.exit();
    }

    pub fn toggle_photo(&mut self, photo: &MediaRef) -> Result<bool> {
        self.selection.toggle(photo)
    }

    pub fn select_all(&mut self) -> Result<()> {
        let photos = self.photos().to_vec();
        self.selection.select_all(&photos)
    }

    pub fn select_all_state(&self) -> CheckState {
        self.selection.check_state(self.photos())
    }

    /// Confirmation naming the number of selected photos
    pub fn prepare_batch_delete(&self) -> Result<Confirmation<Vec<MediaRef>>> {
        if !self.selection.is_selecting() {
            return Err(Error::InvalidState("not in selection mode".to_string()));
        }
        let selected = self.selection.selected();
        if selected.is_empty() {
            return Err(Error::InvalidState("no photos selected".to_string()));
        }
        let prompt = format!(
            "Delete {} selected {}?",
            selected.len(),
            plural(selected.len(), "photo", "photos")
        );
        Ok(Confirmation::new(prompt, selected))
    }

    /// One batch request; on failure the selection is kept as it was
    pub async fn commit_batch_delete(
        &mut self,
        confirmation: Confirmation<Vec<MediaRef>>,
    ) -> Result<()> {
        if !self.selection.is_selecting() {
            return Err(Error::InvalidState("selection mode was exited".to_string()));
        }
        let photos = confirmation.into_target();
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.delete_photos(self.competition_id, &photos).await;
        self.report("delete photos", result)?;

        info!(competition_id = self.competition_id, count = photos.len(), "Photos deleted");
        self.selection.exit();
        self.refresh_after_mutation().await;
        Ok(())
    }

    // ========================================
    // Photo viewer
    // ========================================

    pub fn viewer_next(&mut self) {
        let len = self.photos().len();
        self.viewer.next(len);
    }

    pub fn viewer_prev(&mut self) {
        let len = self.photos().len();
        self.viewer.prev(len);
    }

    pub fn close_viewer(&mut self) {
        self.viewer.close();
    }

    /// Apply pending keyboard input to the viewer
    pub fn handle_keys(&mut self) -> usize {
        let len = self.photos().len();
        self.viewer.poll_keys(len)
    }

    /// Delete the photo on screen, then close the viewer
    pub async fn delete_current_photo(&mut self) -> Result<()> {
        let index = self
            .viewer
            .current()
            .ok_or_else(|| Error::InvalidState("viewer is closed".to_string()))?;
        let photo = self.photo_at(index)?;

        let gateway = Arc::clone(&self.gateway);
        let result = gateway.delete_photo(self.competition_id, &photo).await;
        self.report("delete photo", result)?;

        self.viewer.close();
        self.refresh_after_mutation().await;
        Ok(())
    }

    // ========================================
    // Match and game editors
    // ========================================

    /// Open the match editor, blank or prefilled from `match_id`
    pub fn open_match_editor(&mut self, match_id: Option<MatchId>) -> Result<()> {
        self.ensure_no_modal()?;
        let editor = match match_id {
            Some(id) => {
                let node = self.find_match(id)?;
                MatchEditor::edit(&node.record)
            }
            None => MatchEditor::new(self.competition_id),
        };
        self.editor = Some(Editor::Match(editor));
        Ok(())
    }

    /// Open the game editor for `match_id`, blank or prefilled from `game_id`
    pub fn open_game_editor(&mut self, match_id: MatchId, game_id: Option<GameId>) -> Result<()> {
        self.ensure_no_modal()?;
        let node = self.find_match(match_id)?;
        let editor = match game_id {
            Some(id) => {
                let game = node.games.iter().find(|g| g.id == id).ok_or_else(|| {
                    Error::InvalidState(format!("game {} is not in match {}", id, match_id))
                })?;
                GameEditor::edit(game)
            }
            None => GameEditor::new(match_id, &node.games),
        };
        self.editor = Some(Editor::Game(editor));
        Ok(())
    }

    pub fn match_editor_mut(&mut self) -> Option<&mut MatchEditor> {
        match &mut self.editor {
            Some(Editor::Match(editor)) => Some(editor),
            _ => None,
        }
    }

    pub fn game_editor_mut(&mut self) -> Option<&mut GameEditor> {
        match &mut self.editor {
            Some(Editor::Game(editor)) => Some(editor),
            _ => None,
        }
    }

    pub fn cancel_editor(&mut self) {
        self.editor = None;
    }

    /// Submit the open editor; it stays open if validation or the call fails
    pub async fn save_editor(&mut self) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        match &self.editor {
            Some(Editor::Match(editor)) => {
                let draft = editor.submit()?;
                let (action, result) = match editor.editing() {
                    Some(id) => ("update match", gateway.update_match(id, draft).await),
                    None => ("create match", gateway.create_match(draft).await),
                };
                self.report(action, result)?;
            }
            Some(Editor::Game(editor)) => {
                let draft = editor.submit()?;
                let (action, result) = match editor.editing() {
                    Some(id) => ("update game", gateway.update_game(id, draft).await),
                    None => ("create game", gateway.create_game(draft).await),
                };
                self.report(action, result)?;
            }
            None => return Err(Error::InvalidState("no editor is open".to_string())),
        }

        self.editor = None;
        self.refresh_after_mutation().await;
        Ok(())
    }

    pub fn prepare_delete_match(&self, match_id: MatchId) -> Result<Confirmation<MatchId>> {
        let node = self.find_match(match_id)?;
        let games = node.games.len();
        let prompt = format!(
            "Delete this match? Its {} {} will also be deleted.",
            games,
            plural(games, "game", "games")
        );
        Ok(Confirmation::new(prompt, match_id))
    }

    pub async fn commit_delete_match(&mut self, confirmation: Confirmation<MatchId>) -> Result<()> {
        let match_id = confirmation.into_target();
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.delete_match(match_id).await;
        self.report("delete match", result)?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    pub fn prepare_delete_game(&self, game_id: GameId) -> Result<Confirmation<GameId>> {
        let game = self
            .tree
            .as_ref()
            .and_then(|t| t.find_game(game_id))
            .ok_or_else(|| Error::InvalidState(format!("game {} is not loaded", game_id)))?;
        let prompt = format!("Delete {} ({})?", game.game_number, game.score);
        Ok(Confirmation::new(prompt, game_id))
    }

    pub async fn commit_delete_game(&mut self, confirmation: Confirmation<GameId>) -> Result<()> {
        let game_id = confirmation.into_target();
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.delete_game(game_id).await;
        self.report("delete game", result)?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    fn find_match(&self, match_id: MatchId) -> Result<&MatchNode> {
        self.tree
            .as_ref()
            .and_then(|t| t.find_match(match_id))
            .ok_or_else(|| Error::InvalidState(format!("match {} is not loaded", match_id)))
    }

    // ========================================
    // Videos
    // ========================================

    pub fn open_video(&mut self, video: MediaRef) -> Result<()> {
        self.ensure_no_modal()?;
        self.video.open(video);
        Ok(())
    }

    pub fn close_video(&mut self) {
        self.video.close();
    }

    pub async fn upload_video(&mut self, game_id: GameId, file: Upload) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.upload_video(game_id, file).await;
        self.report("upload video", result)?;
        self.refresh_after_mutation().await;
        Ok(())
    }

    pub async fn delete_video(&mut self, game_id: GameId, video: &MediaRef) -> Result<()> {
        let gateway = Arc::clone(&self.gateway);
        let result = gateway.delete_video(game_id, video).await;
        self.report("delete video", result)?;

        if self.video.current() == Some(video) {
            self.video.close();
        }
        self.refresh_after_mutation().await;
        Ok(())
    }
}
