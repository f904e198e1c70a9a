//! Session event publishing
//!
//! The controller reports everything it does as typed [`Event`]s pushed into an
//! [`EventSink`]. Emission is synchronous on the producing thread and must
//! never block the producer for long; fan-out to slow consumers is the job of
//! the [`EventBus`], which hands each subscriber its own channel.

use std::sync::Mutex;
use std::sync::mpsc::{Receiver, Sender, channel};

use serde::Serialize;
use uuid::Uuid;

/// Category of a session event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Controller status change (`connected`, `listening`, `processing`)
    Status,
    /// A transcript heard from the user, raw casing preserved
    UserSpeech,
    /// A reply produced by the assistant
    AiResponse,
}

/// A single event produced by the session controller
///
/// Matches the `{type, payload}` schema the original assistant broadcast to
/// its clients, with an id and timestamp added for downstream correlation.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Unique event ID (UUID v4)
    pub id: String,
    /// Event category
    #[serde(rename = "type")]
    pub kind: EventKind,
    /// Event payload text
    pub payload: String,
    /// ISO 8601 timestamp
    pub timestamp: String,
}

impl Event {
    /// Create a new event with auto-generated `id` and `timestamp`.
    #[must_use]
    pub fn new(kind: EventKind, payload: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            kind,
            payload: payload.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Build a `status` event (`connected`, `listening`, `processing`).
    #[must_use]
    pub fn status(payload: impl Into<String>) -> Self {
        Self::new(EventKind::Status, payload)
    }

    /// Build a `user_speech` event carrying a raw transcript.
    #[must_use]
    pub fn user_speech(payload: impl Into<String>) -> Self {
        Self::new(EventKind::UserSpeech, payload)
    }

    /// Build an `ai_response` event carrying a reply.
    #[must_use]
    pub fn ai_response(payload: impl Into<String>) -> Self {
        Self::new(EventKind::AiResponse, payload)
    }
}

/// Receives events from the session controller
///
/// Implementations are invoked synchronously on whichever thread produced the
/// event, possibly from several threads at once, and must return promptly.
pub trait EventSink: Send + Sync {
    /// Deliver one event.
    fn emit(&self, event: Event);
}

/// Multi-producer broadcast fan-out for session events
///
/// Producers call [`EventSink::emit`]; every registered subscriber receives a
/// clone of the event on its own unbounded channel, so a slow or stalled
/// consumer never backs up into the controller. Subscribers that drop their
/// receiver are pruned on the next emit.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Sender<Event>>>,
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a subscriber and return its receiving end.
    ///
    /// # Panics
    ///
    /// Panics if the subscriber list mutex is poisoned.
    #[must_use]
    pub fn subscribe(&self) -> Receiver<Event> {
        let (tx, rx) = channel();
        self.subscribers.lock().expect("subscriber list poisoned").push(tx);
        rx
    }

    /// Number of live subscribers.
    ///
    /// # Panics
    ///
    /// Panics if the subscriber list mutex is poisoned.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().expect("subscriber list poisoned").len()
    }
}

impl EventSink for EventBus {
    fn emit(&self, event: Event) {
        let Ok(mut subs) = self.subscribers.lock() else {
            return;
        };
        subs.retain(|tx| tx.send(event.clone()).is_ok());
        tracing::trace!(kind = ?event.kind, payload = %event.payload, "event emitted");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_serializes_with_snake_case_type() {
        let event = Event::status("listening");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "status");
        assert_eq!(json["payload"], "listening");
        assert!(json["id"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[test]
    fn bus_fans_out_to_all_subscribers() {
        let bus = EventBus::new();
        let rx_a = bus.subscribe();
        let rx_b = bus.subscribe();

        bus.emit(Event::user_speech("hello"));

        assert_eq!(rx_a.recv().unwrap().payload, "hello");
        assert_eq!(rx_b.recv().unwrap().payload, "hello");
    }

    #[test]
    fn bus_prunes_dropped_subscribers() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        drop(bus.subscribe());
        assert_eq!(bus.subscriber_count(), 2);

        bus.emit(Event::status("connected"));
        assert_eq!(bus.subscriber_count(), 1);
        assert_eq!(rx.recv().unwrap().payload, "connected");
    }

    #[test]
    fn emit_without_subscribers_is_a_noop() {
        let bus = EventBus::new();
        bus.emit(Event::ai_response("nobody listening"));
        assert_eq!(bus.subscriber_count(), 0);
    }
}
