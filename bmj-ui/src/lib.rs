//! # BMJ client core
//!
//! Everything behind the journal's screens that has rules or state:
//! - [`gateway`]: persistence contract, with [`client::HttpGateway`] for the
//!   data service and [`gateway::InMemoryGateway`] for local use and tests
//! - [`forms`]: match and game editors with live result preview
//! - [`selection`], [`viewer`], [`keyboard`]: media interaction state machines
//! - [`gallery`]: the competition page and its refresh policy
//! - [`catalog`]: the paginated competition list
//! - [`session`]: explicit login session context

pub mod catalog;
pub mod client;
pub mod confirm;
pub mod forms;
pub mod gallery;
pub mod gateway;
pub mod keyboard;
pub mod selection;
pub mod session;
pub mod viewer;

pub use catalog::CompetitionCatalog;
pub use client::HttpGateway;
pub use confirm::{CascadeScope, Confirmation};
pub use gallery::{CompetitionPage, Modal};
pub use gateway::{Gateway, InMemoryGateway, Upload};
pub use keyboard::{Key, KeyboardHub};
pub use session::{SessionContext, UserProfile};
