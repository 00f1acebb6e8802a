//! Competition → Match → Game containment tree
//!
//! The single implementation of the hierarchy rules, shared by the data
//! service and the in-memory gateway:
//! - Children are created only under an existing parent (`NotFound` otherwise)
//! - Deleting a competition removes its matches, their games and all photos
//! - Deleting a match removes its games
//! - Edits never propagate upward: a competition's `result` is independent input
//!
//! Deletes return a [`CascadeReport`] naming every media reference that was
//! dropped, so a storage collaborator can release the files.

use std::collections::BTreeMap;

use tracing::{debug, info};

use crate::media::{MediaKind, MediaRef};
use crate::models::{
    Competition, CompetitionDraft, CompetitionId, CompetitionTree, Game, GameDraft, GameId,
    Match, MatchDraft, MatchId, MatchNode,
};
use crate::pagination::{calculate_pagination, Page};
use crate::{Error, Result};

/// Everything removed by one delete operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeReport {
    pub competitions: usize,
    pub matches: usize,
    pub games: usize,
    pub photos: Vec<MediaRef>,
    pub videos: Vec<MediaRef>,
}

impl CascadeReport {
    /// All dropped media with their kind
    pub fn media(&self) -> impl Iterator<Item = (MediaKind, &MediaRef)> {
        self.photos
            .iter()
            .map(|p| (MediaKind::Photo, p))
            .chain(self.videos.iter().map(|v| (MediaKind::Video, v)))
    }
}

/// In-memory competition hierarchy
#[derive(Debug, Default)]
pub struct Hierarchy {
    competitions: BTreeMap<CompetitionId, Competition>,
    matches: BTreeMap<MatchId, Match>,
    games: BTreeMap<GameId, Game>,
    last_competition_id: CompetitionId,
    last_match_id: MatchId,
    last_game_id: GameId,
}

impl Hierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================
    // Competitions
    // ========================================

    pub fn create_competition(&mut self, draft: CompetitionDraft) -> Result<Competition> {
        let draft = draft.normalized();
        draft.validate()?;

        self.last_competition_id += 1;
        let competition = Competition {
            id: self.last_competition_id,
            name: draft.name,
            start_date: draft.start_date,
            end_date: draft.end_date,
            city: draft.city,
            venue: draft.venue,
            result: draft.result,
            coach_comment: draft.coach_comment,
            self_summary: draft.self_summary,
            photos: Vec::new(),
            match_count: 0,
        };
        self.competitions.insert(competition.id, competition.clone());

        info!(competition_id = competition.id, name = %competition.name, "Created competition");
        Ok(competition)
    }

    /// Replace the editable fields; photos are kept
    pub fn update_competition(
        &mut self,
        id: CompetitionId,
        draft: CompetitionDraft,
    ) -> Result<Competition> {
        let draft = draft.normalized();
        draft.validate()?;

        let competition = self
            .competitions
            .get_mut(&id)
            .ok_or_else(|| competition_not_found(id))?;
        competition.name = draft.name;
        competition.start_date = draft.start_date;
        competition.end_date = draft.end_date;
        competition.city = draft.city;
        competition.venue = draft.venue;
        competition.result = draft.result;
        competition.coach_comment = draft.coach_comment;
        competition.self_summary = draft.self_summary;

        debug!(competition_id = id, "Updated competition");
        self.get_competition(id)
    }

    pub fn get_competition(&self, id: CompetitionId) -> Result<Competition> {
        let mut competition = self
            .competitions
            .get(&id)
            .cloned()
            .ok_or_else(|| competition_not_found(id))?;
        competition.match_count = self.match_ids_of(id).len() as u32;
        Ok(competition)
    }

    /// Competitions ordered by start date, newest first
    pub fn competitions(&self, page: u32, size: u32) -> Page<Competition> {
        let mut all: Vec<&Competition> = self.competitions.values().collect();
        all.sort_by(|a, b| b.start_date.cmp(&a.start_date).then(b.id.cmp(&a.id)));

        let pagination = calculate_pagination(all.len(), page, size);
        let items = all
            .into_iter()
            .filter_map(|c| self.get_competition(c.id).ok())
            .collect();
        Page::from_items(items, pagination)
    }

    pub fn delete_competition(&mut self, id: CompetitionId) -> Result<CascadeReport> {
        let competition = self
            .competitions
            .remove(&id)
            .ok_or_else(|| competition_not_found(id))?;

        let mut report = CascadeReport {
            competitions: 1,
            photos: competition.photos,
            ..CascadeReport::default()
        };
        for match_id in self.match_ids_of(id) {
            self.remove_match_into(match_id, &mut report);
        }

        info!(
            competition_id = id,
            matches = report.matches,
            games = report.games,
            photos = report.photos.len(),
            "Deleted competition"
        );
        Ok(report)
    }

    pub fn add_photos(
        &mut self,
        id: CompetitionId,
        photos: impl IntoIterator<Item = MediaRef>,
    ) -> Result<Competition> {
        let competition = self
            .competitions
            .get_mut(&id)
            .ok_or_else(|| competition_not_found(id))?;
        competition.photos.extend(photos);
        self.get_competition(id)
    }

    pub fn remove_photo(&mut self, id: CompetitionId, photo: &MediaRef) -> Result<Competition> {
        self.remove_photos(id, std::slice::from_ref(photo))
    }

    /// Remove every listed photo, or none if any is missing
    pub fn remove_photos(&mut self, id: CompetitionId, photos: &[MediaRef]) -> Result<Competition> {
        let competition = self
            .competitions
            .get_mut(&id)
            .ok_or_else(|| competition_not_found(id))?;

        if let Some(missing) = photos.iter().find(|p| !competition.photos.contains(p)) {
            return Err(Error::NotFound(format!(
                "photo {} in competition {}",
                missing, id
            )));
        }
        competition.photos.retain(|p| !photos.contains(p));

        debug!(competition_id = id, removed = photos.len(), "Removed photos");
        self.get_competition(id)
    }

    /// Competition with its matches and their games
    pub fn tree(&self, id: CompetitionId) -> Result<CompetitionTree> {
        let competition = self.get_competition(id)?;
        let matches = self
            .matches_of(id)?
            .into_iter()
            .map(|record| {
                let games = self.games_of(record.id).unwrap_or_default();
                MatchNode { record, games }
            })
            .collect();
        Ok(CompetitionTree {
            competition,
            matches,
        })
    }

    // ========================================
    // Matches
    // ========================================

    pub fn create_match(&mut self, draft: MatchDraft) -> Result<Match> {
        let draft = draft.normalized();
        draft.validate()?;
        if !self.competitions.contains_key(&draft.competition_id) {
            return Err(competition_not_found(draft.competition_id));
        }

        self.last_match_id += 1;
        let record = Match {
            id: self.last_match_id,
            competition_id: draft.competition_id,
            match_type: draft.match_type,
            opponent_name: draft.opponent_name,
            opponent_city: draft.opponent_city,
            score: draft.score,
            result: draft.result,
            coach_comment: draft.coach_comment,
            self_summary: draft.self_summary,
            game_count: 0,
        };
        self.matches.insert(record.id, record.clone());

        info!(
            match_id = record.id,
            competition_id = record.competition_id,
            "Created match"
        );
        Ok(record)
    }

    /// Replace the editable fields; the parent competition never changes
    pub fn update_match(&mut self, id: MatchId, draft: MatchDraft) -> Result<Match> {
        let draft = draft.normalized();
        draft.validate()?;

        let record = self
            .matches
            .get_mut(&id)
            .ok_or_else(|| match_not_found(id))?;
        record.match_type = draft.match_type;
        record.opponent_name = draft.opponent_name;
        record.opponent_city = draft.opponent_city;
        record.score = draft.score;
        record.result = draft.result;
        record.coach_comment = draft.coach_comment;
        record.self_summary = draft.self_summary;

        debug!(match_id = id, "Updated match");
        self.get_match(id)
    }

    pub fn get_match(&self, id: MatchId) -> Result<Match> {
        let mut record = self
            .matches
            .get(&id)
            .cloned()
            .ok_or_else(|| match_not_found(id))?;
        record.game_count = self.game_ids_of(id).len() as u32;
        Ok(record)
    }

    /// Matches of a competition in creation order
    pub fn matches_of(&self, competition_id: CompetitionId) -> Result<Vec<Match>> {
        if !self.competitions.contains_key(&competition_id) {
            return Err(competition_not_found(competition_id));
        }
        self.match_ids_of(competition_id)
            .into_iter()
            .map(|id| self.get_match(id))
            .collect()
    }

    pub fn delete_match(&mut self, id: MatchId) -> Result<CascadeReport> {
        if !self.matches.contains_key(&id) {
            return Err(match_not_found(id));
        }
        let mut report = CascadeReport::default();
        self.remove_match_into(id, &mut report);

        info!(match_id = id, games = report.games, "Deleted match");
        Ok(report)
    }

    // ========================================
    // Games
    // ========================================

    pub fn create_game(&mut self, draft: GameDraft) -> Result<Game> {
        let draft = draft.normalized();
        draft.validate()?;
        if !self.matches.contains_key(&draft.match_id) {
            return Err(match_not_found(draft.match_id));
        }

        self.last_game_id += 1;
        let game = Game {
            id: self.last_game_id,
            match_id: draft.match_id,
            game_number: draft.game_number,
            score: draft.score,
            result: draft.result,
            coach_comment: draft.coach_comment,
            self_summary: draft.self_summary,
            videos: Vec::new(),
        };
        self.games.insert(game.id, game.clone());

        info!(game_id = game.id, match_id = game.match_id, score = %game.score, "Created game");
        Ok(game)
    }

    /// Replace the editable fields; videos and parent are kept
    pub fn update_game(&mut self, id: GameId, draft: GameDraft) -> Result<Game> {
        let draft = draft.normalized();
        draft.validate()?;

        let game = self.games.get_mut(&id).ok_or_else(|| game_not_found(id))?;
        game.game_number = draft.game_number;
        game.score = draft.score;
        game.result = draft.result;
        game.coach_comment = draft.coach_comment;
        game.self_summary = draft.self_summary;

        debug!(game_id = id, "Updated game");
        Ok(game.clone())
    }

    pub fn get_game(&self, id: GameId) -> Result<Game> {
        self.games.get(&id).cloned().ok_or_else(|| game_not_found(id))
    }

    /// Games of a match ordered by game number, then creation
    pub fn games_of(&self, match_id: MatchId) -> Result<Vec<Game>> {
        if !self.matches.contains_key(&match_id) {
            return Err(match_not_found(match_id));
        }
        let mut games: Vec<Game> = self
            .games
            .values()
            .filter(|g| g.match_id == match_id)
            .cloned()
            .collect();
        games.sort_by_key(|g| (g.game_number, g.id));
        Ok(games)
    }

    pub fn delete_game(&mut self, id: GameId) -> Result<CascadeReport> {
        let game = self.games.remove(&id).ok_or_else(|| game_not_found(id))?;

        debug!(game_id = id, "Deleted game");
        Ok(CascadeReport {
            games: 1,
            videos: game.videos,
            ..CascadeReport::default()
        })
    }

    pub fn add_video(&mut self, id: GameId, video: MediaRef) -> Result<Game> {
        let game = self.games.get_mut(&id).ok_or_else(|| game_not_found(id))?;
        game.videos.push(video);
        Ok(game.clone())
    }

    pub fn remove_video(&mut self, id: GameId, video: &MediaRef) -> Result<Game> {
        let game = self.games.get_mut(&id).ok_or_else(|| game_not_found(id))?;
        let before = game.videos.len();
        game.videos.retain(|v| v != video);
        if game.videos.len() == before {
            return Err(Error::NotFound(format!("video {} in game {}", video, id)));
        }
        Ok(game.clone())
    }

    // ========================================
    // Internals
    // ========================================

    fn match_ids_of(&self, competition_id: CompetitionId) -> Vec<MatchId> {
        self.matches
            .values()
            .filter(|m| m.competition_id == competition_id)
            .map(|m| m.id)
            .collect()
    }

    fn game_ids_of(&self, match_id: MatchId) -> Vec<GameId> {
        self.games
            .values()
            .filter(|g| g.match_id == match_id)
            .map(|g| g.id)
            .collect()
    }

    fn remove_match_into(&mut self, match_id: MatchId, report: &mut CascadeReport) {
        for game_id in self.game_ids_of(match_id) {
            if let Some(game) = self.games.remove(&game_id) {
                report.games += 1;
                report.videos.extend(game.videos);
            }
        }
        if self.matches.remove(&match_id).is_some() {
            report.matches += 1;
        }
    }

    pub fn competition_count(&self) -> usize {
        self.competitions.len()
    }

    pub fn match_count(&self) -> usize {
        self.matches.len()
    }

    pub fn game_count(&self) -> usize {
        self.games.len()
    }
}

fn competition_not_found(id: CompetitionId) -> Error {
    Error::NotFound(format!("competition {}", id))
}

fn match_not_found(id: MatchId) -> Error {
    Error::NotFound(format!("match {}", id))
}

fn game_not_found(id: GameId) -> Error {
    Error::NotFound(format!("game {}", id))
}
