use program_engine::{
    Command, Direction, EditorErrorEvent, EditorErrorKind, Event, ProgramView, VideoId,
};
use tracing::debug;

use crate::bridge::Request;
use crate::widgets::preview::{PreviewPanel, build_preview_panel};
use crate::widgets::targets::{
    PresetButton, TargetChip, build_preset_buttons, build_target_chips,
};
use crate::widgets::timeline::{
    LibraryRow, TimelineInteraction, TimelineRow, build_library_rows, build_timeline_rows,
};

/// UI message consumed by update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Session(Event),
    Timeline(TimelineInteraction),
    PlayPauseClicked,
    TargetInputChanged(String),
    AddTargetClicked,
    RemoveTargetClicked(String),
    PresetClicked(String),
    NameChanged(String),
    BitrateChanged(String),
    ResolutionChanged(String),
    SubmitClicked,
    CancelClicked,
}

impl Message {
    /// Converts a timeline widget interaction into an app message.
    pub fn from_timeline(interaction: TimelineInteraction) -> Self {
        Self::Timeline(interaction)
    }
}

/// UI state of the program editor screen.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    view: Option<ProgramView>,
    base_url: String,
    target_input: String,
    loading: bool,
    saving: bool,
    error: Option<EditorErrorEvent>,
    left: bool,
}

impl AppState {
    /// Creates an empty app state; `base_url` resolves preview uploads.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    /// Requests issued when the screen opens; the screen shows as loading
    /// until the program arrives.
    pub fn boot(&mut self) -> Vec<Request> {
        self.loading = true;
        vec![Request::Load]
    }

    /// Applies one UI message and returns outgoing session requests.
    pub fn update(&mut self, message: Message) -> Vec<Request> {
        match message {
            Message::Session(event) => {
                self.apply_session_event(event);
                Vec::new()
            }
            Message::Timeline(interaction) => vec![Request::Command(timeline_command(interaction))],
            Message::PlayPauseClicked => vec![Request::Command(Command::TogglePlayback)],
            Message::TargetInputChanged(value) => {
                self.target_input = value;
                Vec::new()
            }
            Message::AddTargetClicked => {
                if self.target_input.trim().is_empty() {
                    return Vec::new();
                }
                let raw = std::mem::take(&mut self.target_input);
                vec![Request::Command(Command::AddTarget { raw })]
            }
            Message::RemoveTargetClicked(target) => {
                vec![Request::Command(Command::RemoveTarget { target })]
            }
            Message::PresetClicked(preset_id) => {
                vec![Request::Command(Command::AddFromPreset { preset_id })]
            }
            Message::NameChanged(name) => vec![Request::Command(Command::SetName { name })],
            Message::BitrateChanged(raw) => match raw.trim().parse::<u32>() {
                Ok(bitrate) => vec![Request::Command(Command::SetBitrate { bitrate })],
                Err(_) => {
                    debug!(raw = %raw, "bitrate input ignored: not a number");
                    Vec::new()
                }
            },
            Message::ResolutionChanged(resolution) => {
                vec![Request::Command(Command::SetResolution { resolution })]
            }
            Message::SubmitClicked => {
                if !self.can_submit() {
                    return Vec::new();
                }
                self.saving = true;
                self.error = None;
                vec![Request::Submit]
            }
            Message::CancelClicked => {
                self.left = true;
                vec![Request::Close]
            }
        }
    }

    pub fn view_model(&self) -> Option<&ProgramView> {
        self.view.as_ref()
    }

    pub fn target_input(&self) -> &str {
        &self.target_input
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Submit is enabled once a valid program is loaded and nothing is saving.
    pub fn can_submit(&self) -> bool {
        !self.saving && !self.left && self.view.as_ref().is_some_and(|view| view.can_submit)
    }

    pub fn error(&self) -> Option<&EditorErrorEvent> {
        self.error.as_ref()
    }

    /// True once the operator left the editor, by cancelling or a successful save.
    pub fn has_left(&self) -> bool {
        self.left
    }

    pub fn timeline_rows(&self) -> Vec<TimelineRow> {
        self.view.as_ref().map(build_timeline_rows).unwrap_or_default()
    }

    pub fn library_rows(&self) -> Vec<LibraryRow> {
        self.view.as_ref().map(build_library_rows).unwrap_or_default()
    }

    pub fn preview_panel(&self) -> Option<PreviewPanel> {
        self.view
            .as_ref()
            .and_then(|view| build_preview_panel(view, &self.base_url))
    }

    pub fn target_chips(&self) -> Vec<TargetChip> {
        self.view.as_ref().map(build_target_chips).unwrap_or_default()
    }

    pub fn preset_buttons(&self) -> Vec<PresetButton> {
        self.view.as_ref().map(build_preset_buttons).unwrap_or_default()
    }

    fn apply_session_event(&mut self, event: Event) {
        match event {
            Event::ProgramChanged(view) => {
                self.loading = false;
                self.saving = view.submitting;
                self.view = Some(view);
            }
            Event::SubmitStarted => self.saving = true,
            Event::ProgramApplied => {
                self.saving = false;
                self.left = true;
            }
            Event::Error(error) => {
                if error.kind == EditorErrorKind::LoadFailed {
                    self.loading = false;
                }
                if matches!(
                    error.kind,
                    EditorErrorKind::SubmitFailed
                        | EditorErrorKind::EmptyQueue
                        | EditorErrorKind::EmptyTargets
                ) {
                    self.saving = false;
                }
                self.error = Some(error);
            }
            Event::DragStarted(_) | Event::DragEnded => {}
        }
    }
}

fn timeline_command(interaction: TimelineInteraction) -> Command {
    match interaction {
        TimelineInteraction::LibraryClicked(video_id) => Command::AddToQueue { video_id },
        TimelineInteraction::RowSelected(video_id) => Command::SetPreview { video_id },
        TimelineInteraction::RemoveClicked(video_id) => Command::RemoveFromQueue { video_id },
        TimelineInteraction::MoveEarlierClicked(video_id) => {
            move_command(video_id, Direction::Earlier)
        }
        TimelineInteraction::MoveLaterClicked(video_id) => {
            move_command(video_id, Direction::Later)
        }
        TimelineInteraction::DragStarted(payload) => Command::StartDrag(payload),
        TimelineInteraction::Dropped(target) => Command::Drop(target),
        TimelineInteraction::DragCancelled => Command::CancelDrag,
    }
}

fn move_command(video_id: VideoId, direction: Direction) -> Command {
    Command::MoveWithinQueue {
        video_id,
        direction,
    }
}
