//! Drag and drop between the library and the timeline.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::library::VideoId;

/// What the operator is dragging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DragPayload {
    /// A library row that is not queued yet.
    Library(VideoId),
    /// A timeline row that is already queued.
    Timeline(VideoId),
}

impl DragPayload {
    pub fn video_id(&self) -> &str {
        match self {
            Self::Library(id) | Self::Timeline(id) => id,
        }
    }
}

/// Where the payload was released.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropTarget {
    /// The timeline area outside any row.
    Container,
    /// A specific timeline row.
    Row(VideoId),
}

/// Queue operation a drop resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropAction {
    Append(VideoId),
    Reorder { source: VideoId, target: VideoId },
    Ignore,
}

/// Resolves a drop. The payload kind picks the operation; the row only
/// matters for timeline reorders.
///
/// Library payloads always append, even when released on a row.
pub fn reconcile(payload: DragPayload, target: &DropTarget) -> DropAction {
    match (payload, target) {
        (DragPayload::Library(id), _) => DropAction::Append(id),
        (DragPayload::Timeline(_), DropTarget::Container) => DropAction::Ignore,
        (DragPayload::Timeline(id), DropTarget::Row(row)) if id == *row => DropAction::Ignore,
        (DragPayload::Timeline(id), DropTarget::Row(row)) => DropAction::Reorder {
            source: id,
            target: row.clone(),
        },
    }
}

/// The single active drag gesture of an editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DragState {
    payload: Option<DragPayload>,
}

impl DragState {
    /// Starts a gesture, replacing any gesture still in progress.
    pub fn begin(&mut self, payload: DragPayload) {
        if let Some(previous) = self.payload.replace(payload) {
            debug!(?previous, "drag replaced before drop");
        }
    }

    /// Ends the gesture and hands out its payload; the state is idle afterwards.
    pub fn release(&mut self) -> Option<DragPayload> {
        self.payload.take()
    }

    pub fn active(&self) -> Option<&DragPayload> {
        self.payload.as_ref()
    }

    pub fn is_dragging(&self) -> bool {
        self.payload.is_some()
    }
}
