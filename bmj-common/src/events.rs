//! UI event types and the event bus
//!
//! The competition page publishes what happened after each refresh or
//! mutation; surfaces subscribe to show toasts and re-render.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::models::CompetitionId;

/// Events published by the client core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiEvent {
    /// Authoritative state was re-fetched and replaced the local copy
    GalleryRefreshed {
        competition_id: CompetitionId,
        photos: usize,
        matches: usize,
        games: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A refresh failed; the last good state is still shown
    RefreshFailed {
        competition_id: CompetitionId,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A create/update/delete/upload call failed
    MutationFailed {
        competition_id: CompetitionId,
        /// What was attempted, e.g. "delete photos"
        action: String,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The competition and everything under it is gone; the page should
    /// navigate back to the list
    CompetitionDeleted {
        competition_id: CompetitionId,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl UiEvent {
    /// Event type name, matching the serialized `type` tag
    pub fn event_type(&self) -> &str {
        match self {
            UiEvent::GalleryRefreshed { .. } => "GalleryRefreshed",
            UiEvent::RefreshFailed { .. } => "RefreshFailed",
            UiEvent::MutationFailed { .. } => "MutationFailed",
            UiEvent::CompetitionDeleted { .. } => "CompetitionDeleted",
        }
    }

    pub fn competition_id(&self) -> CompetitionId {
        match self {
            UiEvent::GalleryRefreshed { competition_id, .. }
            | UiEvent::RefreshFailed { competition_id, .. }
            | UiEvent::MutationFailed { competition_id, .. }
            | UiEvent::CompetitionDeleted { competition_id, .. } => *competition_id,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            UiEvent::RefreshFailed { .. } | UiEvent::MutationFailed { .. }
        )
    }
}

/// Broadcast bus for [`UiEvent`]s
///
/// Publishing never blocks: slow subscribers lag and lose old events,
/// dropped subscribers are cleaned up automatically.
///
/// # Examples
///
/// ```
/// use bmj_common::events::{EventBus, UiEvent};
///
/// let bus = EventBus::new(16);
/// let mut rx = bus.subscribe();
///
/// bus.emit_lossy(UiEvent::CompetitionDeleted {
///     competition_id: 7,
///     timestamp: chrono::Utc::now(),
/// });
///
/// let event = rx.try_recv().unwrap();
/// assert_eq!(event.competition_id(), 7);
/// ```
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<UiEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a bus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<UiEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Err` if no subscriber is listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: UiEvent) -> Result<usize, broadcast::error::SendError<UiEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: UiEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn refreshed(id: CompetitionId) -> UiEvent {
        UiEvent::GalleryRefreshed {
            competition_id: id,
            photos: 3,
            matches: 1,
            games: 2,
            timestamp: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(4);
        assert!(bus.emit(refreshed(1)).is_err());
        bus.emit_lossy(refreshed(1));
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let bus = EventBus::new(4);
        let mut a = bus.subscribe();
        let mut b = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.emit(refreshed(5)).unwrap(), 2);
        assert_eq!(a.recv().await.unwrap().competition_id(), 5);
        assert_eq!(b.recv().await.unwrap().event_type(), "GalleryRefreshed");
    }

    #[test]
    fn test_event_tag_serialization() {
        let event = UiEvent::MutationFailed {
            competition_id: 2,
            action: "delete photos".to_string(),
            message: "offline".to_string(),
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], event.event_type());
        assert!(event.is_failure());
        assert!(!refreshed(2).is_failure());
    }
}
