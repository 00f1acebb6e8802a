//! HTTP API handlers for bmj-ds

pub mod competitions;
pub mod error;
pub mod games;
pub mod health;
pub mod matches;

pub use error::{ApiError, ApiResult};
pub use health::health_routes;
