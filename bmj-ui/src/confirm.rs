//! Confirmation tokens for destructive operations
//!
//! A destructive commit takes a [`Confirmation`], and only the matching
//! `prepare_*` call on the competition page can build one, so every commit
//! is preceded by a prompt that names its scope.

/// Prompt text plus the exact target the user agreed to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation<T> {
    prompt: String,
    target: T,
}

impl<T> Confirmation<T> {
    pub(crate) fn new(prompt: impl Into<String>, target: T) -> Self {
        Self {
            prompt: prompt.into(),
            target,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub(crate) fn into_target(self) -> T {
        self.target
    }
}

/// What deleting a competition takes with it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeScope {
    pub competition_id: i64,
    pub matches: usize,
    pub games: usize,
    pub photos: usize,
}

impl CascadeScope {
    pub fn prompt(&self) -> String {
        format!(
            "Delete this competition? This also permanently deletes {} {}, {} {} and {} {}.",
            self.matches,
            plural(self.matches, "match", "matches"),
            self.games,
            plural(self.games, "game", "games"),
            self.photos,
            plural(self.photos, "photo", "photos"),
        )
    }
}

pub(crate) fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 {
        one
    } else {
        many
    }
}
