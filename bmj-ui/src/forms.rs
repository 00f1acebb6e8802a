//! Match and game editing forms
//!
//! Editors hold raw form input and re-derive the result on every score
//! change for the live preview badge. `submit` validates locally and yields
//! a draft; nothing reaches the gateway unless it passes.

use bmj_common::models::{
    Game, GameDraft, GameId, GameNumber, Match, MatchDraft, MatchId, MatchSlot,
};
use bmj_common::{Error, Outcome, Result, ScoreInput, TiePolicy, Verdict};

/// Match form: big score with a manual result fallback
#[derive(Debug, Clone, PartialEq)]
pub struct MatchEditor {
    editing: Option<MatchId>,
    competition_id: i64,
    pub match_type: MatchSlot,
    pub opponent_name: String,
    pub opponent_city: String,
    score_text: String,
    manual_result: Option<Verdict>,
    pub coach_comment: String,
    pub self_summary: String,
}

impl MatchEditor {
    /// Blank form for a new match in `competition_id`
    pub fn new(competition_id: i64) -> Self {
        Self {
            editing: None,
            competition_id,
            match_type: MatchSlot::GroupStage1,
            opponent_name: String::new(),
            opponent_city: String::new(),
            score_text: String::new(),
            manual_result: None,
            coach_comment: String::new(),
            self_summary: String::new(),
        }
    }

    /// Form prefilled from an existing match
    pub fn edit(record: &Match) -> Self {
        Self {
            editing: Some(record.id),
            competition_id: record.competition_id,
            match_type: record.match_type,
            opponent_name: record.opponent_name.clone(),
            opponent_city: record.opponent_city.clone(),
            score_text: record.score.map(|s| s.to_string()).unwrap_or_default(),
            manual_result: Some(record.result),
            coach_comment: record.coach_comment.clone().unwrap_or_default(),
            self_summary: record.self_summary.clone().unwrap_or_default(),
        }
    }

    pub fn editing(&self) -> Option<MatchId> {
        self.editing
    }

    pub fn competition_id(&self) -> i64 {
        self.competition_id
    }

    pub fn score_text(&self) -> &str {
        &self.score_text
    }

    /// Update the big score from text; the text is kept even when invalid
    pub fn set_score_text(&mut self, text: &str) -> Result<Outcome> {
        self.score_text = text.to_string();
        self.preview()
    }

    pub fn set_score(&mut self, score: ScoreInput) -> Result<Outcome> {
        self.score_text = match (score.mine, score.theirs) {
            (None, None) => String::new(),
            (mine, theirs) => format!(
                "{}:{}",
                mine.map(|n| n.to_string()).unwrap_or_default(),
                theirs.map(|n| n.to_string()).unwrap_or_default()
            ),
        };
        self.preview()
    }

    pub fn set_manual_result(&mut self, result: Verdict) {
        self.manual_result = Some(result);
    }

    /// Live badge: derived outcome of the big score currently in the field
    pub fn preview(&self) -> Result<Outcome> {
        ScoreInput::parse("score", &self.score_text)?.derive(TiePolicy::Reject)
    }

    /// The manual selector only matters while the score is not complete
    pub fn manual_selector_enabled(&self) -> bool {
        !matches!(ScoreInput::parse("score", &self.score_text), Ok(s) if s.is_complete())
    }

    /// Result that would be stored right now; `None` while the score text is invalid
    pub fn effective_result(&self) -> Option<Verdict> {
        match ScoreInput::parse("score", &self.score_text) {
            Ok(score) if score.is_complete() => self.preview().ok().and_then(Outcome::verdict),
            Ok(_) => self.manual_result,
            Err(_) => None,
        }
    }

    /// Validate and build the request body
    pub fn submit(&self) -> Result<MatchDraft> {
        let score = ScoreInput::parse("score", &self.score_text)?;
        if !score.is_empty() && !score.is_complete() {
            return Err(Error::validation(
                "score",
                "Enter both scores, or leave the score empty",
            ));
        }

        let result = match score.complete() {
            Some(complete) => complete.outcome(TiePolicy::Reject)?.verdict(),
            None => self.manual_result,
        }
        .ok_or_else(|| Error::validation("result", "Select a result"))?;

        let draft = MatchDraft {
            competition_id: self.competition_id,
            match_type: self.match_type,
            opponent_name: self.opponent_name.clone(),
            opponent_city: self.opponent_city.clone(),
            score: score.complete(),
            result,
            coach_comment: Some(self.coach_comment.clone()),
            self_summary: Some(self.self_summary.clone()),
        }
        .normalized();
        draft.validate()?;
        Ok(draft)
    }
}

/// Game form: point score with a derived, never chosen, result
#[derive(Debug, Clone, PartialEq)]
pub struct GameEditor {
    editing: Option<GameId>,
    match_id: MatchId,
    pub game_number: Option<GameNumber>,
    score_text: String,
    pub coach_comment: String,
    pub self_summary: String,
}

impl GameEditor {
    /// Blank form suggesting the smallest game number not used by `existing`
    pub fn new(match_id: MatchId, existing: &[Game]) -> Self {
        Self {
            editing: None,
            match_id,
            game_number: GameNumber::next_unused(existing.iter().map(|g| g.game_number)),
            score_text: String::new(),
            coach_comment: String::new(),
            self_summary: String::new(),
        }
    }

    pub fn edit(game: &Game) -> Self {
        Self {
            editing: Some(game.id),
            match_id: game.match_id,
            game_number: Some(game.game_number),
            score_text: game.score.to_string(),
            coach_comment: game.coach_comment.clone().unwrap_or_default(),
            self_summary: game.self_summary.clone().unwrap_or_default(),
        }
    }

    pub fn editing(&self) -> Option<GameId> {
        self.editing
    }

    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn score_text(&self) -> &str {
        &self.score_text
    }

    pub fn set_score_text(&mut self, text: &str) -> Result<Outcome> {
        self.score_text = text.to_string();
        self.preview()
    }

    pub fn preview(&self) -> Result<Outcome> {
        ScoreInput::parse("score", &self.score_text)?.derive(TiePolicy::Allow)
    }

    /// Derived result; `None` while incomplete or tied
    pub fn result(&self) -> Option<Verdict> {
        self.preview().ok().and_then(Outcome::verdict)
    }

    pub fn submit(&self) -> Result<GameDraft> {
        let game_number = self
            .game_number
            .ok_or_else(|| Error::validation("gameNumber", "Choose a game number"))?;
        let score = ScoreInput::parse("score", &self.score_text)?
            .complete()
            .ok_or_else(|| Error::validation("score", "The point score is required"))?;

        let draft = GameDraft {
            match_id: self.match_id,
            game_number,
            score,
            result: score.outcome(TiePolicy::Allow)?.verdict(),
            coach_comment: Some(self.coach_comment.clone()),
            self_summary: Some(self.self_summary.clone()),
        }
        .normalized();
        draft.validate()?;
        Ok(draft)
    }
}
