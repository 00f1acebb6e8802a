//! # BMJ Common Library
//!
//! Shared code for the Badminton Journey client core and data service:
//! - Domain models (competitions, matches, games) and their wire format
//! - Score-to-result derivation
//! - The competition/match/game hierarchy with cascade rules
//! - Opaque media references and display URLs
//! - UI event bus
//! - Configuration loading

pub mod config;
pub mod error;
pub mod events;
pub mod hierarchy;
pub mod media;
pub mod models;
pub mod outcome;
pub mod pagination;

pub use error::{Error, Result};
pub use events::{EventBus, UiEvent};
pub use hierarchy::{CascadeReport, Hierarchy};
pub use media::{MediaKind, MediaRef};
pub use outcome::{derive, Outcome, Score, ScoreInput, TiePolicy, Verdict};
pub use pagination::Page;
