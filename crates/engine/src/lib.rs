//! UI-agnostic program timeline editor.

pub mod api;
pub mod backend;
pub mod drag;
pub mod error;
pub mod library;
pub mod preview;
pub mod program;
pub mod submission;
pub mod targets;
pub mod timeline;

pub use api::{
    Command, Editor, EditorErrorEvent, EditorErrorKind, Event, LibraryEntry, PresetEntry,
    ProgramView, QueueEntry, RequestTicket,
};
pub use backend::{HttpProgramBackend, ProgramBackend};
pub use drag::{DragPayload, DragState, DropAction, DropTarget};
pub use error::{BackendError, EditorError, Result};
pub use library::{Library, VideoAsset, VideoId};
pub use preview::PreviewPointer;
pub use program::{Program, ProgramSnapshot};
pub use submission::{ProgramSubmission, Quality};
pub use targets::{Preset, TargetSet};
pub use timeline::{Direction, Queue};
