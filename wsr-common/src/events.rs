//! Event types for the WSR event system
//!
//! Provides the shared event definitions and the EventBus used to fan
//! state changes out to SSE clients.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::models::{MapOptions, Snap, SnapId, User};

/// WSR event types
///
/// Events are broadcast via EventBus and serialized for SSE transmission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum WsrEvent {
    /// A user logged in; the main screen is active
    SessionStarted {
        user: User,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The session ended; back to the login screen
    SessionEnded {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A snap was prepended to the feed
    ///
    /// Triggers:
    /// - SSE: Update the feed counter and onboarding hint
    SnapAdded {
        snap: Snap,
        /// Feed length after the append
        feed_len: usize,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A snap was selected for the preview modal
    SnapSelected {
        snap: Snap,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The preview modal was dismissed
    SelectionCleared {
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Notification banner shown
    NotificationShown {
        notification_id: u64,
        message: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Notification banner hidden (timer or user)
    NotificationDismissed {
        notification_id: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// The map boundary was initialized with these options
    MapInitialized {
        options: MapOptions,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A marker was created on the map
    MarkerPlaced {
        handle: u64,
        snap_id: SnapId,
        latitude: f64,
        longitude: f64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A marker was removed from the map
    MarkerRemoved {
        handle: u64,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Capture flow moved to a new state
    CaptureStateChanged {
        flow_id: Uuid,
        /// State name: Idle, Live, Captured, Sending, Closed, Error
        state: String,
        /// Error message (Error state only)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl WsrEvent {
    /// Event type name, used as the SSE `event:` field
    pub fn event_type(&self) -> &str {
        match self {
            WsrEvent::SessionStarted { .. } => "SessionStarted",
            WsrEvent::SessionEnded { .. } => "SessionEnded",
            WsrEvent::SnapAdded { .. } => "SnapAdded",
            WsrEvent::SnapSelected { .. } => "SnapSelected",
            WsrEvent::SelectionCleared { .. } => "SelectionCleared",
            WsrEvent::NotificationShown { .. } => "NotificationShown",
            WsrEvent::NotificationDismissed { .. } => "NotificationDismissed",
            WsrEvent::MapInitialized { .. } => "MapInitialized",
            WsrEvent::MarkerPlaced { .. } => "MarkerPlaced",
            WsrEvent::MarkerRemoved { .. } => "MarkerRemoved",
            WsrEvent::CaptureStateChanged { .. } => "CaptureStateChanged",
        }
    }
}

/// Broadcast bus for WSR events
///
/// Cloning is cheap; all clones share the same channel.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<WsrEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus with specified channel capacity
    ///
    /// `capacity` is the number of events buffered per subscriber before the
    /// oldest are dropped (lagging receivers skip ahead).
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    ///
    /// Events emitted before subscription are not received.
    pub fn subscribe(&self) -> broadcast::Receiver<WsrEvent> {
        self.tx.subscribe()
    }

    /// Emit an event to all subscribers
    ///
    /// Returns `Ok(subscriber_count)` if at least one subscriber exists.
    /// Returns `Err` if no subscribers are listening.
    #[allow(clippy::result_large_err)]
    pub fn emit(&self, event: WsrEvent) -> Result<usize, broadcast::error::SendError<WsrEvent>> {
        self.tx.send(event)
    }

    /// Emit an event, ignoring if no subscribers are listening
    ///
    /// UI events are best-effort: a page that is not connected simply
    /// resynchronizes from `/api/view` when it reconnects.
    pub fn emit_lossy(&self, event: WsrEvent) {
        let _ = self.tx.send(event);
    }

    /// Get the current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Get the configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    fn sample_snap() -> Snap {
        Snap::new(
            SnapId::new("abc"),
            "https://example.com/img.jpg",
            GeoPoint::new(35.6762, 139.6503).unwrap(),
            "Hiroshi",
            0,
        )
    }

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = WsrEvent::SnapAdded {
            snap: sample_snap(),
            feed_len: 4,
            timestamp: chrono::Utc::now(),
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "SnapAdded");
        assert_eq!(json["snap"]["id"], "abc");
        assert_eq!(json["feed_len"], 4);
        assert_eq!(event.event_type(), "SnapAdded");
    }

    #[test]
    fn test_capture_state_event_omits_empty_message() {
        let event = WsrEvent::CaptureStateChanged {
            flow_id: Uuid::nil(),
            state: "Live".to_string(),
            message: None,
            timestamp: chrono::Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_emit_without_subscribers_fails() {
        let bus = EventBus::new(10);
        let result = bus.emit(WsrEvent::SessionEnded {
            timestamp: chrono::Utc::now(),
        });
        assert!(result.is_err());
        assert_eq!(bus.subscriber_count(), 0);
        assert_eq!(bus.capacity(), 10);
    }

    #[tokio::test]
    async fn test_subscriber_receives_emitted_event() {
        let bus = EventBus::new(10);
        let mut rx = bus.subscribe();

        bus.emit_lossy(WsrEvent::MarkerRemoved {
            handle: 7,
            timestamp: chrono::Utc::now(),
        });

        match rx.recv().await.unwrap() {
            WsrEvent::MarkerRemoved { handle, .. } => assert_eq!(handle, 7),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
