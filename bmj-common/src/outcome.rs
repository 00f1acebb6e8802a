//! Score-to-result derivation
//!
//! One comparison rule, applied at two granularities with different strictness:
//! - Match level (big score): equal scores are a validation failure, a match must have a winner
//! - Game level (point score): equal scores are a valid record that simply carries no result
//!
//! Everything here is pure. Editors call [`derive`] on every score change to drive the live
//! preview badge, and the hierarchy calls it again when a record is stored.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// Stored win/lose result of a match or game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Verdict {
    Win,
    Lose,
}

impl Verdict {
    /// Human-readable label
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Win => "Win",
            Verdict::Lose => "Loss",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Win => write!(f, "WIN"),
            Verdict::Lose => write!(f, "LOSE"),
        }
    }
}

/// Result of comparing a score pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Lose,
    /// A score component is missing, or the scores tie where ties are allowed
    Undetermined,
}

impl Outcome {
    /// The storable result, `None` when undetermined
    pub fn verdict(self) -> Option<Verdict> {
        match self {
            Outcome::Win => Some(Verdict::Win),
            Outcome::Lose => Some(Verdict::Lose),
            Outcome::Undetermined => None,
        }
    }

    pub fn is_determined(self) -> bool {
        self != Outcome::Undetermined
    }
}

/// How equal scores are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TiePolicy {
    /// Game level: a tie is undetermined but valid
    Allow,
    /// Match level: a tie is rejected
    Reject,
}

/// Derive an outcome from my score and the opponent's score
///
/// # Examples
///
/// ```
/// use bmj_common::outcome::{derive, Outcome, TiePolicy};
///
/// assert_eq!(derive(Some(3), Some(1), TiePolicy::Reject).unwrap(), Outcome::Win);
/// assert_eq!(derive(Some(21), Some(21), TiePolicy::Allow).unwrap(), Outcome::Undetermined);
/// assert!(derive(Some(2), Some(2), TiePolicy::Reject).is_err());
/// assert_eq!(derive(None, Some(2), TiePolicy::Reject).unwrap(), Outcome::Undetermined);
/// ```
pub fn derive(mine: Option<u32>, theirs: Option<u32>, ties: TiePolicy) -> Result<Outcome> {
    let (Some(mine), Some(theirs)) = (mine, theirs) else {
        return Ok(Outcome::Undetermined);
    };

    match mine.cmp(&theirs) {
        Ordering::Greater => Ok(Outcome::Win),
        Ordering::Less => Ok(Outcome::Lose),
        Ordering::Equal => match ties {
            TiePolicy::Allow => Ok(Outcome::Undetermined),
            TiePolicy::Reject => Err(Error::validation(
                "score",
                format!(
                    "Scores cannot be equal ({}:{}), a match must have a winner",
                    mine, theirs
                ),
            )),
        },
    }
}

/// A complete score pair, serialized as `"mine:theirs"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Score {
    pub mine: u32,
    pub theirs: u32,
}

impl Score {
    pub fn new(mine: u32, theirs: u32) -> Self {
        Self { mine, theirs }
    }

    pub fn outcome(self, ties: TiePolicy) -> Result<Outcome> {
        derive(Some(self.mine), Some(self.theirs), ties)
    }

    pub fn is_tie(self) -> bool {
        self.mine == self.theirs
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.mine, self.theirs)
    }
}

impl FromStr for Score {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ScoreInput::parse("score", s)?
            .complete()
            .ok_or_else(|| Error::validation("score", format!("Incomplete score: '{}'", s)))
    }
}

impl TryFrom<String> for Score {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<Score> for String {
    fn from(score: Score) -> Self {
        score.to_string()
    }
}

/// Score as typed into an editing form, either component may still be empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScoreInput {
    pub mine: Option<u32>,
    pub theirs: Option<u32>,
}

impl ScoreInput {
    pub fn new(mine: Option<u32>, theirs: Option<u32>) -> Self {
        Self { mine, theirs }
    }

    /// Both components present
    pub fn complete(self) -> Option<Score> {
        match (self.mine, self.theirs) {
            (Some(mine), Some(theirs)) => Some(Score::new(mine, theirs)),
            _ => None,
        }
    }

    pub fn is_complete(self) -> bool {
        self.complete().is_some()
    }

    pub fn is_empty(self) -> bool {
        self.mine.is_none() && self.theirs.is_none()
    }

    pub fn derive(self, ties: TiePolicy) -> Result<Outcome> {
        derive(self.mine, self.theirs, ties)
    }

    /// Parse `"a:b"` score text for `field`
    ///
    /// Blank text is an empty input; either side of the separator may be
    /// blank. A full-width colon is accepted as separator.
    pub fn parse(field: &str, text: &str) -> Result<Self> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::default());
        }

        let normalized = text.replace('：', ":");
        let (mine, theirs) = normalized.split_once(':').ok_or_else(|| {
            Error::validation(field, format!("Expected a score like 21:19, got '{}'", text))
        })?;

        Ok(Self {
            mine: parse_component(field, mine)?,
            theirs: parse_component(field, theirs)?,
        })
    }
}

impl From<Score> for ScoreInput {
    fn from(score: Score) -> Self {
        Self::new(Some(score.mine), Some(score.theirs))
    }
}

fn parse_component(field: &str, part: &str) -> Result<Option<u32>> {
    let part = part.trim();
    if part.is_empty() {
        return Ok(None);
    }
    part.parse::<u32>().map(Some).map_err(|_| {
        Error::validation(
            field,
            format!("'{}' is not a non-negative whole number", part),
        )
    })
}
