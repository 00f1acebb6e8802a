//! Domain models and request drafts
//!
//! Wire format follows the data service API: camelCase keys, `YYYY-MM-DD`
//! dates, `"mine:theirs"` scores and SCREAMING_SNAKE_CASE enums.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::media::MediaRef;
use crate::outcome::{Score, TiePolicy, Verdict};
use crate::{Error, Result};

pub type CompetitionId = i64;
pub type MatchId = i64;
pub type GameId = i64;

const MAX_NAME_LEN: usize = 100;
const MAX_CITY_LEN: usize = 50;
const MAX_VENUE_LEN: usize = 200;
const MAX_OPPONENT_LEN: usize = 50;

// ========================================
// Enumerations
// ========================================

/// Overall placement in a competition, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompetitionResult {
    GroupNotQualified,
    GroupQualified,
    #[serde(rename = "TOP_32")]
    Top32,
    #[serde(rename = "TOP_16")]
    Top16,
    #[serde(rename = "TOP_8")]
    Top8,
    #[serde(rename = "TOP_4")]
    Top4,
    ThirdPlace,
    SecondPlace,
    Champion,
}

impl CompetitionResult {
    pub fn label(self) -> &'static str {
        match self {
            CompetitionResult::GroupNotQualified => "Out in group stage",
            CompetitionResult::GroupQualified => "Qualified from group",
            CompetitionResult::Top32 => "Top 32",
            CompetitionResult::Top16 => "Top 16",
            CompetitionResult::Top8 => "Top 8",
            CompetitionResult::Top4 => "Top 4",
            CompetitionResult::ThirdPlace => "Third place",
            CompetitionResult::SecondPlace => "Runner-up",
            CompetitionResult::Champion => "Champion",
        }
    }
}

/// Fixed match slot within a competition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchSlot {
    #[serde(rename = "GROUP_STAGE_1")]
    GroupStage1,
    #[serde(rename = "GROUP_STAGE_2")]
    GroupStage2,
    #[serde(rename = "GROUP_STAGE_3")]
    GroupStage3,
    #[serde(rename = "KNOCKOUT_1")]
    Knockout1,
    #[serde(rename = "KNOCKOUT_2")]
    Knockout2,
    #[serde(rename = "KNOCKOUT_3")]
    Knockout3,
    #[serde(rename = "KNOCKOUT_4")]
    Knockout4,
    #[serde(rename = "KNOCKOUT_5")]
    Knockout5,
}

impl MatchSlot {
    pub const ALL: [MatchSlot; 8] = [
        MatchSlot::GroupStage1,
        MatchSlot::GroupStage2,
        MatchSlot::GroupStage3,
        MatchSlot::Knockout1,
        MatchSlot::Knockout2,
        MatchSlot::Knockout3,
        MatchSlot::Knockout4,
        MatchSlot::Knockout5,
    ];

    pub fn is_knockout(self) -> bool {
        !matches!(
            self,
            MatchSlot::GroupStage1 | MatchSlot::GroupStage2 | MatchSlot::GroupStage3
        )
    }

    /// Round number within the stage (1-based)
    pub fn round(self) -> u8 {
        match self {
            MatchSlot::GroupStage1 | MatchSlot::Knockout1 => 1,
            MatchSlot::GroupStage2 | MatchSlot::Knockout2 => 2,
            MatchSlot::GroupStage3 | MatchSlot::Knockout3 => 3,
            MatchSlot::Knockout4 => 4,
            MatchSlot::Knockout5 => 5,
        }
    }
}

impl fmt::Display for MatchSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_knockout() {
            write!(f, "Knockout {}", self.round())
        } else {
            write!(f, "Group stage {}", self.round())
        }
    }
}

/// Game number within a match, 1 to 3
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct GameNumber(u8);

impl GameNumber {
    pub const MAX: u8 = 3;

    pub fn new(n: u8) -> Result<Self> {
        if (1..=Self::MAX).contains(&n) {
            Ok(Self(n))
        } else {
            Err(Error::validation(
                "gameNumber",
                format!("Game number must be 1 to {}, got {}", Self::MAX, n),
            ))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Smallest game number not in `used`, if one is left
    pub fn next_unused(used: impl IntoIterator<Item = GameNumber>) -> Option<GameNumber> {
        let used: Vec<GameNumber> = used.into_iter().collect();
        (1..=Self::MAX)
            .map(GameNumber)
            .find(|candidate| !used.contains(candidate))
    }
}

impl TryFrom<u8> for GameNumber {
    type Error = Error;

    fn try_from(n: u8) -> Result<Self> {
        Self::new(n)
    }
}

impl From<GameNumber> for u8 {
    fn from(n: GameNumber) -> Self {
        n.0
    }
}

impl fmt::Display for GameNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Game {}", self.0)
    }
}

// ========================================
// Competition
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competition {
    pub id: CompetitionId,
    #[serde(rename = "competitionName")]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub city: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub result: Option<CompetitionResult>,
    #[serde(default)]
    pub coach_comment: Option<String>,
    #[serde(default)]
    pub self_summary: Option<String>,
    #[serde(default)]
    pub photos: Vec<MediaRef>,
    /// Computed by the service
    #[serde(default)]
    pub match_count: u32,
}

impl Competition {
    /// City plus venue when present
    pub fn location(&self) -> String {
        match &self.venue {
            Some(venue) => format!("{} {}", self.city, venue),
            None => self.city.clone(),
        }
    }
}

/// Create/update body for a competition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitionDraft {
    #[serde(rename = "competitionName")]
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub city: String,
    #[serde(default)]
    pub venue: Option<String>,
    #[serde(default)]
    pub result: Option<CompetitionResult>,
    #[serde(default)]
    pub coach_comment: Option<String>,
    #[serde(default)]
    pub self_summary: Option<String>,
}

impl CompetitionDraft {
    pub fn validate(&self) -> Result<()> {
        require_text("competitionName", &self.name, MAX_NAME_LEN)?;
        require_text("city", &self.city, MAX_CITY_LEN)?;
        if let Some(venue) = &self.venue {
            limit_text("venue", venue, MAX_VENUE_LEN)?;
        }
        if self.end_date < self.start_date {
            return Err(Error::validation(
                "endDate",
                "End date cannot be earlier than start date",
            ));
        }
        Ok(())
    }

    /// Trimmed copy with blank optional text dropped
    pub fn normalized(self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            city: self.city.trim().to_string(),
            venue: non_blank(self.venue),
            coach_comment: non_blank(self.coach_comment),
            self_summary: non_blank(self.self_summary),
            ..self
        }
    }
}

// ========================================
// Match
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: MatchId,
    pub competition_id: CompetitionId,
    pub match_type: MatchSlot,
    pub opponent_name: String,
    pub opponent_city: String,
    /// Big score (games won), absent when not entered
    #[serde(default)]
    pub score: Option<Score>,
    pub result: Verdict,
    #[serde(default)]
    pub coach_comment: Option<String>,
    #[serde(default)]
    pub self_summary: Option<String>,
    /// Computed by the service
    #[serde(default)]
    pub game_count: u32,
}

/// Create/update body for a match
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDraft {
    pub competition_id: CompetitionId,
    pub match_type: MatchSlot,
    pub opponent_name: String,
    pub opponent_city: String,
    #[serde(default)]
    pub score: Option<Score>,
    pub result: Verdict,
    #[serde(default)]
    pub coach_comment: Option<String>,
    #[serde(default)]
    pub self_summary: Option<String>,
}

impl MatchDraft {
    /// Check required fields and that a complete big score agrees with `result`
    pub fn validate(&self) -> Result<()> {
        require_text("opponentName", &self.opponent_name, MAX_OPPONENT_LEN)?;
        require_text("opponentCity", &self.opponent_city, MAX_CITY_LEN)?;

        if let Some(score) = self.score {
            let derived = score.outcome(TiePolicy::Reject)?.verdict();
            if derived != Some(self.result) {
                return Err(Error::validation(
                    "result",
                    format!("Result {} does not match score {}", self.result, score),
                ));
            }
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            opponent_name: self.opponent_name.trim().to_string(),
            opponent_city: self.opponent_city.trim().to_string(),
            coach_comment: non_blank(self.coach_comment),
            self_summary: non_blank(self.self_summary),
            ..self
        }
    }
}

// ========================================
// Game
// ========================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: GameId,
    pub match_id: MatchId,
    pub game_number: GameNumber,
    /// Point score
    pub score: Score,
    /// Absent when the point score ties
    #[serde(default)]
    pub result: Option<Verdict>,
    #[serde(default)]
    pub coach_comment: Option<String>,
    #[serde(default)]
    pub self_summary: Option<String>,
    #[serde(default)]
    pub videos: Vec<MediaRef>,
}

/// Create/update body for a game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDraft {
    pub match_id: MatchId,
    pub game_number: GameNumber,
    pub score: Score,
    #[serde(default)]
    pub result: Option<Verdict>,
    #[serde(default)]
    pub coach_comment: Option<String>,
    #[serde(default)]
    pub self_summary: Option<String>,
}

impl GameDraft {
    /// A game's result is never chosen: it must be what the point score derives
    pub fn validate(&self) -> Result<()> {
        let derived = self.score.outcome(TiePolicy::Allow)?.verdict();
        if derived != self.result {
            return Err(Error::validation(
                "result",
                format!(
                    "Result must follow the score {} (expected {})",
                    self.score,
                    derived.map(|v| v.to_string()).unwrap_or_else(|| "none".to_string())
                ),
            ));
        }
        Ok(())
    }

    pub fn normalized(self) -> Self {
        Self {
            coach_comment: non_blank(self.coach_comment),
            self_summary: non_blank(self.self_summary),
            ..self
        }
    }
}

// ========================================
// Aggregate view
// ========================================

/// A match with its games
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchNode {
    #[serde(rename = "match")]
    pub record: Match,
    pub games: Vec<Game>,
}

/// Full authoritative state of one competition as last fetched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompetitionTree {
    pub competition: Competition,
    pub matches: Vec<MatchNode>,
}

impl CompetitionTree {
    pub fn photos(&self) -> &[MediaRef] {
        &self.competition.photos
    }

    pub fn game_count(&self) -> usize {
        self.matches.iter().map(|m| m.games.len()).sum()
    }

    pub fn find_match(&self, id: MatchId) -> Option<&MatchNode> {
        self.matches.iter().find(|m| m.record.id == id)
    }

    pub fn find_game(&self, id: GameId) -> Option<&Game> {
        self.matches
            .iter()
            .flat_map(|m| m.games.iter())
            .find(|g| g.id == id)
    }
}

// ========================================
// Helpers
// ========================================

fn require_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::validation(field, "This field is required"));
    }
    limit_text(field, value, max_len)
}

fn limit_text(field: &str, value: &str, max_len: usize) -> Result<()> {
    if value.trim().chars().count() > max_len {
        return Err(Error::validation(
            field,
            format!("Must be at most {} characters", max_len),
        ));
    }
    Ok(())
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
