//! Session context
//!
//! Holds the bearer token and user profile established at login. The core
//! never interprets the token; the HTTP gateway only attaches it.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

/// Profile returned by the login endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
}

impl UserProfile {
    /// Nickname when set, otherwise the username
    pub fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

/// Shared, explicit session store
#[derive(Debug, Clone, Default)]
pub struct SessionContext {
    inner: Arc<RwLock<Option<Session>>>,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store the token and profile after a successful login
    pub async fn establish(&self, token: impl Into<String>, user: UserProfile) {
        info!(user = %user.username, "Session established");
        *self.inner.write().await = Some(Session {
            token: token.into(),
            user,
        });
    }

    /// Forget the session at logout
    pub async fn clear(&self) {
        if self.inner.write().await.take().is_some() {
            info!("Session cleared");
        }
    }

    pub async fn token(&self) -> Option<String> {
        self.inner.read().await.as_ref().map(|s| s.token.clone())
    }

    pub async fn current_user(&self) -> Option<UserProfile> {
        self.inner.read().await.as_ref().map(|s| s.user.clone())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.inner.read().await.is_some()
    }
}
