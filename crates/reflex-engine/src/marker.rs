//! Synchronization-marker emission.
//!
//! Markers timestamp the session's lifecycle points (round start/end,
//! stimulus firings, pauses) for alignment with external physiological
//! recordings. Emission is fire-and-forget: a sink failure is a logging
//! concern, never a session error, so the trait is infallible by
//! construction and implementations swallow their own problems.

use std::sync::{Arc, Mutex};

use reflex_types::MarkerEvent;
use tracing::{info, warn};

/// Destination for synchronization markers.
///
/// The session holds one sink behind `Box<dyn MarkerSink>`; swapping it
/// is the seam for real acquisition hardware.
pub trait MarkerSink: Send {
    /// Deliver one marker. Must not fail outward.
    fn emit(&mut self, event: &MarkerEvent);
}

/// Sink that logs every marker as a structured tracing event.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl MarkerSink for TracingSink {
    fn emit(&mut self, event: &MarkerEvent) {
        info!(
            marker = %event.id,
            kind = ?event.kind,
            round = event.round,
            payload = %event.payload,
            "marker"
        );
    }
}

/// Sink that appends markers to a shared in-memory buffer.
///
/// Used by tests and by callers that want to inspect the stream after
/// the fact; the buffer handle survives the session taking ownership of
/// the sink.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    events: Arc<Mutex<Vec<MarkerEvent>>>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to the captured events.
    pub fn events(&self) -> Arc<Mutex<Vec<MarkerEvent>>> {
        Arc::clone(&self.events)
    }

    /// Snapshot of the captured events.
    pub fn snapshot(&self) -> Vec<MarkerEvent> {
        self.events
            .lock()
            .map_or_else(|poisoned| poisoned.into_inner().clone(), |guard| guard.clone())
    }
}

impl MarkerSink for MemorySink {
    fn emit(&mut self, event: &MarkerEvent) {
        if let Ok(mut guard) = self.events.lock() {
            guard.push(event.clone());
        } else {
            warn!(marker = %event.id, "marker buffer poisoned, marker dropped");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use reflex_types::{MarkerKind, SessionId};

    use super::*;

    #[test]
    fn memory_sink_captures_in_order() {
        let sink = MemorySink::new();
        let mut boxed: Box<dyn MarkerSink> = Box::new(sink.clone());
        let session = SessionId::new();
        for kind in [
            MarkerKind::SessionStart,
            MarkerKind::RoundStart,
            MarkerKind::RoundEnd,
        ] {
            boxed.emit(&MarkerEvent::new(session, kind, 1, serde_json::json!({})));
        }
        let captured = sink.snapshot();
        assert_eq!(captured.len(), 3);
        assert_eq!(captured[0].kind, MarkerKind::SessionStart);
        assert_eq!(captured[2].kind, MarkerKind::RoundEnd);
    }

    #[test]
    fn tracing_sink_is_infallible() {
        let mut sink = TracingSink;
        let event = MarkerEvent::new(
            SessionId::new(),
            MarkerKind::StimulusFired,
            3,
            serde_json::json!({"distance": 42.0}),
        );
        sink.emit(&event);
    }
}
