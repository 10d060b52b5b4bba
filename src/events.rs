//! Notifications the editor sends to its host

use serde::{Deserialize, Serialize};
use std::sync::mpsc::Sender;
use tracing::warn;

use crate::snapping::SnapGuide;
use crate::types::{ElementId, PositionSpec};

/// Events emitted by the canvas editor
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum EditorEvent {
    /// A gesture committed a new spec (exactly once per gesture)
    PositionChanged { id: ElementId, spec: PositionSpec },

    /// Guides to draw; an empty list clears them
    SnapGuidesChanged(Vec<SnapGuide>),

    /// Resolved geometry changed for these elements (measurement or commit)
    LayoutChanged { ids: Vec<ElementId> },

    /// Editor-local preview text for a line; `None` means back to the sample text
    PreviewTextChanged { id: ElementId, text: Option<String> },

    ElementAdded(ElementId),

    ElementRemoved(ElementId),
}

/// Receiver for editor events
pub trait EventSink {
    fn emit(&mut self, event: EditorEvent);
}

impl EventSink for Vec<EditorEvent> {
    fn emit(&mut self, event: EditorEvent) {
        self.push(event);
    }
}

impl EventSink for Sender<EditorEvent> {
    fn emit(&mut self, event: EditorEvent) {
        if let Err(e) = self.send(event) {
            warn!(error = %e, "Editor event receiver dropped");
        }
    }
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&mut self, _event: EditorEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;

    #[test]
    fn test_vec_sink_collects() {
        let mut sink: Vec<EditorEvent> = Vec::new();
        sink.emit(EditorEvent::ElementAdded(ElementId(3)));
        assert_eq!(sink, vec![EditorEvent::ElementAdded(ElementId(3))]);
    }

    #[test]
    fn test_channel_sink_forwards() {
        let (mut tx, rx) = mpsc::channel::<EditorEvent>();
        tx.emit(EditorEvent::SnapGuidesChanged(Vec::new()));
        assert_eq!(rx.try_recv().unwrap(), EditorEvent::SnapGuidesChanged(Vec::new()));
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (mut tx, rx) = mpsc::channel::<EditorEvent>();
        drop(rx);
        tx.emit(EditorEvent::ElementRemoved(ElementId(1)));
    }
}
