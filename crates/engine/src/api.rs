use tracing::{debug, info, warn};

use crate::backend::ProgramBackend;
use crate::drag::{DragPayload, DragState, DropAction, DropTarget, reconcile};
use crate::error::{BackendError, EditorError, Result};
use crate::library::VideoId;
use crate::preview::PreviewPointer;
use crate::program::{Program, ProgramSnapshot};
use crate::submission::{ProgramSubmission, Quality, build_submission, can_submit};
use crate::targets::mask_target;
use crate::timeline::Direction;

/// Commands accepted by an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Appends a library video to the queue.
    ///
    /// # Example
    /// ```
    /// use program_engine::{Command, Editor};
    ///
    /// let mut editor = Editor::new("stream-1");
    /// let events = editor
    ///     .handle_command(Command::AddToQueue {
    ///         video_id: "unknown".to_string(),
    ///     })
    ///     .expect("open session accepts commands");
    /// assert!(events.is_empty());
    /// ```
    AddToQueue {
        video_id: VideoId,
    },
    RemoveFromQueue {
        video_id: VideoId,
    },
    /// Swaps a queued video with its neighbour; no-op at either end.
    MoveWithinQueue {
        video_id: VideoId,
        direction: Direction,
    },
    /// Moves `source_id` to the index `target_id` held before the move.
    ReorderTo {
        source_id: VideoId,
        target_id: VideoId,
    },
    SetPreview {
        video_id: VideoId,
    },
    Play,
    Pause,
    TogglePlayback,
    StartDrag(DragPayload),
    Drop(DropTarget),
    CancelDrag,
    AddTarget {
        raw: String,
    },
    RemoveTarget {
        target: String,
    },
    /// Adds the destination a saved preset resolves to.
    AddFromPreset {
        preset_id: String,
    },
    SetName {
        name: String,
    },
    SetBitrate {
        bitrate: u32,
    },
    SetResolution {
        resolution: String,
    },
}

/// Events emitted by an editing session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    ProgramChanged(ProgramView),
    DragStarted(DragPayload),
    DragEnded,
    SubmitStarted,
    /// The backend accepted the program; the session is closed.
    ProgramApplied,
    Error(EditorErrorEvent),
}

/// User-facing error category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorErrorKind {
    EmptyQueue,
    EmptyTargets,
    LoadFailed,
    SubmitFailed,
    Other,
}

impl From<&EditorError> for EditorErrorKind {
    fn from(value: &EditorError) -> Self {
        match value {
            EditorError::EmptyQueue => Self::EmptyQueue,
            EditorError::EmptyTargets => Self::EmptyTargets,
            EditorError::Load { .. } => Self::LoadFailed,
            EditorError::Apply { .. } => Self::SubmitFailed,
            EditorError::SubmissionInFlight | EditorError::SessionClosed => Self::Other,
        }
    }
}

/// User-facing error payload emitted as an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorErrorEvent {
    pub kind: EditorErrorKind,
    pub message: String,
}

impl EditorErrorEvent {
    pub fn from_error(error: &EditorError) -> Self {
        Self {
            kind: EditorErrorKind::from(error),
            message: error.to_string(),
        }
    }
}

/// Immutable program view consumed by the UI.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramView {
    pub name: String,
    pub quality: Quality,
    pub queue: Vec<QueueEntry>,
    pub available: Vec<LibraryEntry>,
    pub targets: Vec<String>,
    pub presets: Vec<PresetEntry>,
    pub preview_id: Option<VideoId>,
    pub playing: bool,
    pub can_submit: bool,
    pub submitting: bool,
}

impl ProgramView {
    pub fn queue_ids(&self) -> Vec<&str> {
        self.queue.iter().map(|entry| entry.id.as_str()).collect()
    }

    pub fn preview_entry(&self) -> Option<&QueueEntry> {
        let id = self.preview_id.as_deref()?;
        self.queue.iter().find(|entry| entry.id == id)
    }
}

/// One queued video, in playback order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    pub id: VideoId,
    pub name: String,
    /// 1-based position in the queue.
    pub position: usize,
    /// Upload path, when the library still knows the video.
    pub playable_path: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    pub id: VideoId,
    pub name: String,
}

/// Preset listing entry; the stream key is never exposed in clear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetEntry {
    pub id: String,
    pub name: String,
    pub masked_target: String,
}

/// Identifies one outstanding backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestTicket(u64);

impl RequestTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// Editing session for one stream's program.
///
/// The session is a plain state machine: commands run to completion and
/// backend calls are split into `begin_*`/`finish_*` pairs so the caller owns
/// the asynchronous part.
#[derive(Debug)]
pub struct Editor {
    session_id: String,
    program: Program,
    preview: PreviewPointer,
    drag: DragState,
    closed: bool,
    pending_load: Option<RequestTicket>,
    pending_submit: Option<RequestTicket>,
    next_ticket: u64,
}

impl Editor {
    /// Creates an empty session bound to `session_id`.
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            program: Program::default(),
            preview: PreviewPointer::default(),
            drag: DragState::default(),
            closed: false,
            pending_load: None,
            pending_submit: None,
            next_ticket: 1,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    pub fn preview(&self) -> &PreviewPointer {
        &self.preview
    }

    pub fn drag(&self) -> &DragState {
        &self.drag
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn is_submitting(&self) -> bool {
        self.pending_submit.is_some()
    }

    /// True while a load is outstanding.
    pub fn is_loading(&self) -> bool {
        self.pending_load.is_some()
    }

    pub fn can_submit(&self) -> bool {
        !self.closed
            && self.pending_submit.is_none()
            && can_submit(&self.program.queue, &self.program.targets)
    }

    pub fn view(&self) -> ProgramView {
        self.program.view(&self.preview, self.pending_submit.is_some())
    }

    /// Applies one command and returns emitted events.
    ///
    /// Commands that change nothing return no events.
    pub fn handle_command(&mut self, command: Command) -> Result<Vec<Event>> {
        self.ensure_open()?;
        let changed = match command {
            Command::AddToQueue { video_id } => self.add_to_queue(video_id),
            Command::RemoveFromQueue { video_id } => self.remove_from_queue(&video_id),
            Command::MoveWithinQueue {
                video_id,
                direction,
            } => {
                let moved = self.program.queue.move_within(&video_id, direction);
                debug!(video_id = %video_id, ?direction, moved, "move within queue");
                moved
            }
            Command::ReorderTo {
                source_id,
                target_id,
            } => self.reorder_to(&source_id, &target_id),
            Command::SetPreview { video_id } => self.preview.select(&video_id, &self.program.queue),
            Command::Play => self.preview.play(),
            Command::Pause => self.preview.pause(),
            Command::TogglePlayback => self.preview.toggle(),
            Command::StartDrag(payload) => {
                debug!(?payload, "drag started");
                self.drag.begin(payload.clone());
                return Ok(vec![Event::DragStarted(payload)]);
            }
            Command::Drop(target) => return Ok(self.drop_on(&target)),
            Command::CancelDrag => {
                if self.drag.release().is_none() {
                    return Ok(Vec::new());
                }
                debug!("drag cancelled");
                return Ok(vec![Event::DragEnded]);
            }
            Command::AddTarget { raw } => {
                let added = self.program.targets.add(&raw);
                debug!(added, target_count = self.program.targets.len(), "add target");
                added
            }
            Command::RemoveTarget { target } => {
                let removed = self.program.targets.remove(&target);
                debug!(removed, target_count = self.program.targets.len(), "remove target");
                removed
            }
            Command::AddFromPreset { preset_id } => self.add_from_preset(&preset_id),
            Command::SetName { name } => {
                let changed = self.program.name != name;
                self.program.name = name;
                changed
            }
            Command::SetBitrate { bitrate } => {
                let changed = self.program.quality.bitrate != bitrate;
                self.program.quality.bitrate = bitrate;
                changed
            }
            Command::SetResolution { resolution } => {
                let changed = self.program.quality.resolution != resolution;
                self.program.quality.resolution = resolution;
                changed
            }
        };

        Ok(self.changed(changed))
    }

    /// Starts loading the program; a newer load supersedes this one.
    pub fn begin_load(&mut self) -> Result<RequestTicket> {
        self.ensure_open()?;
        let ticket = self.allocate_ticket();
        if let Some(previous) = self.pending_load.replace(ticket) {
            debug!(previous = previous.id(), "load superseded");
        }
        debug!(session_id = %self.session_id, ticket = ticket.id(), "load started");
        Ok(ticket)
    }

    /// Completes a load. Stale or late results are dropped without effect.
    pub fn finish_load(
        &mut self,
        ticket: RequestTicket,
        outcome: std::result::Result<ProgramSnapshot, BackendError>,
    ) -> Vec<Event> {
        if self.closed || self.pending_load != Some(ticket) {
            warn!(ticket = ticket.id(), closed = self.closed, "stale load response ignored");
            return Vec::new();
        }
        self.pending_load = None;
        self.drag = DragState::default();

        match outcome {
            Ok(snapshot) => {
                self.program = Program::from_snapshot(snapshot);
                self.preview = PreviewPointer::at_head(&self.program.queue);
                info!(
                    session_id = %self.session_id,
                    queued = self.program.queue.len(),
                    targets = self.program.targets.len(),
                    "program loaded"
                );
                vec![Event::ProgramChanged(self.view())]
            }
            Err(source) => {
                let error = EditorError::Load { source };
                warn!(session_id = %self.session_id, %error, "program load failed");
                self.program = Program::default();
                self.preview = PreviewPointer::default();
                vec![
                    Event::ProgramChanged(self.view()),
                    Event::Error(EditorErrorEvent::from_error(&error)),
                ]
            }
        }
    }

    /// Validates the program and hands out a fresh submission.
    pub fn begin_submit(&mut self) -> Result<(RequestTicket, ProgramSubmission)> {
        self.ensure_open()?;
        if self.pending_submit.is_some() {
            return Err(EditorError::SubmissionInFlight);
        }
        let submission = build_submission(
            &self.program.name,
            &self.program.queue,
            &self.program.targets,
            &self.program.quality,
        )?;
        let ticket = self.allocate_ticket();
        self.pending_submit = Some(ticket);

        let masked: Vec<String> = submission
            .targets
            .iter()
            .map(|target| self.mask_for_log(target))
            .collect();
        info!(
            session_id = %self.session_id,
            ticket = ticket.id(),
            queued = submission.queue.len(),
            targets = ?masked,
            "program submission started"
        );
        Ok((ticket, submission))
    }

    /// Completes a submission. Success closes the session.
    pub fn finish_submit(
        &mut self,
        ticket: RequestTicket,
        outcome: std::result::Result<(), BackendError>,
    ) -> Vec<Event> {
        if self.closed || self.pending_submit != Some(ticket) {
            warn!(ticket = ticket.id(), closed = self.closed, "stale submit response ignored");
            return Vec::new();
        }
        self.pending_submit = None;

        match outcome {
            Ok(()) => {
                info!(session_id = %self.session_id, "program applied");
                self.close();
                vec![Event::ProgramApplied]
            }
            Err(source) => {
                let error = EditorError::Apply { source };
                warn!(session_id = %self.session_id, %error, "program submission failed");
                vec![
                    Event::ProgramChanged(self.view()),
                    Event::Error(EditorErrorEvent::from_error(&error)),
                ]
            }
        }
    }

    /// Loads the program through `backend` in one step.
    pub async fn load<B>(&mut self, backend: &B) -> Result<Vec<Event>>
    where
        B: ProgramBackend + ?Sized,
    {
        let ticket = self.begin_load()?;
        let outcome = backend.load_program(&self.session_id).await;
        Ok(self.finish_load(ticket, outcome))
    }

    /// Submits the program through `backend` in one step.
    pub async fn submit<B>(&mut self, backend: &B) -> Result<Vec<Event>>
    where
        B: ProgramBackend + ?Sized,
    {
        let (ticket, submission) = self.begin_submit()?;
        let outcome = backend.apply_program(&self.session_id, &submission).await;
        let mut events = vec![Event::SubmitStarted];
        events.extend(self.finish_submit(ticket, outcome));
        Ok(events)
    }

    /// Ends the session. Outstanding responses become stale.
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        debug!(session_id = %self.session_id, "session closed");
        self.closed = true;
        self.pending_load = None;
        self.pending_submit = None;
        self.drag = DragState::default();
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            return Err(EditorError::SessionClosed);
        }
        Ok(())
    }

    fn add_to_queue(&mut self, video_id: VideoId) -> bool {
        if !self.program.library.contains(&video_id) {
            debug!(video_id = %video_id, "add ignored: not in library");
            return false;
        }
        if !self.program.queue.push(video_id.clone()) {
            return false;
        }
        self.preview.on_added(&video_id);
        debug!(video_id = %video_id, queued = self.program.queue.len(), "video queued");
        true
    }

    fn remove_from_queue(&mut self, video_id: &str) -> bool {
        if !self.program.queue.remove(video_id) {
            return false;
        }
        self.preview.on_removed(video_id, &self.program.queue);
        debug!(video_id, queued = self.program.queue.len(), "video removed from queue");
        true
    }

    fn reorder_to(&mut self, source_id: &str, target_id: &str) -> bool {
        let moved = self.program.queue.reorder_to(source_id, target_id);
        debug!(source_id, target_id, moved, "queue reorder");
        moved
    }

    fn drop_on(&mut self, target: &DropTarget) -> Vec<Event> {
        let Some(payload) = self.drag.release() else {
            debug!(?target, "drop ignored: no drag in progress");
            return Vec::new();
        };

        let changed = match reconcile(payload, target) {
            DropAction::Append(video_id) => self.add_to_queue(video_id),
            DropAction::Reorder { source, target } => self.reorder_to(&source, &target),
            DropAction::Ignore => false,
        };

        let mut events = vec![Event::DragEnded];
        events.extend(self.changed(changed));
        events
    }

    fn add_from_preset(&mut self, preset_id: &str) -> bool {
        let Some(preset) = self.program.preset(preset_id) else {
            debug!(preset_id, "preset ignored: unknown");
            return false;
        };
        let target = preset.resolve();
        if target.is_empty() {
            debug!(preset_id, "preset ignored: no destination");
            return false;
        }
        let masked = preset.masked_target();
        let added = self.program.targets.add(&target);
        debug!(preset_id, target = %masked, added, "target added from preset");
        added
    }

    fn changed(&self, changed: bool) -> Vec<Event> {
        if changed {
            vec![Event::ProgramChanged(self.view())]
        } else {
            Vec::new()
        }
    }

    fn mask_for_log(&self, target: &str) -> String {
        self.program
            .presets
            .iter()
            .find(|preset| {
                let key = preset.stream_key.trim();
                !key.is_empty() && target.ends_with(key)
            })
            .map_or_else(
                || target.to_string(),
                |preset| mask_target(target, &preset.stream_key),
            )
    }

    fn allocate_ticket(&mut self) -> RequestTicket {
        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;
        ticket
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use super::{Command, Editor, EditorErrorKind, Event};
    use crate::backend::ProgramBackend;
    use crate::drag::{DragPayload, DropTarget};
    use crate::error::{BackendError, EditorError};
    use crate::library::VideoAsset;
    use crate::program::ProgramSnapshot;
    use crate::submission::{ProgramSubmission, Quality};
    use crate::targets::Preset;
    use crate::timeline::Direction;

    fn asset(id: &str) -> VideoAsset {
        VideoAsset {
            id: id.to_string(),
            name: format!("{id}.mp4"),
            source: format!("{id}-stored.mp4"),
        }
    }

    fn sample_snapshot() -> ProgramSnapshot {
        ProgramSnapshot {
            name: "Evening loop".to_string(),
            queue: vec!["v1".to_string(), "v2".to_string()],
            targets: vec!["rtmp://a".to_string()],
            library: vec![asset("v1"), asset("v2"), asset("v3")],
            presets: vec![Preset {
                id: "yt".to_string(),
                name: "YouTube".to_string(),
                platform_type: "youtube".to_string(),
                custom_url: String::new(),
                stream_key: "abcd-1234-wxyz".to_string(),
                resolved: String::new(),
            }],
            quality: Quality::default(),
        }
    }

    fn loaded_editor() -> Editor {
        let mut editor = Editor::new("s1");
        let ticket = editor.begin_load().expect("open session can load");
        let events = editor.finish_load(ticket, Ok(sample_snapshot()));
        assert_eq!(events.len(), 1);
        editor
    }

    fn queue_of(editor: &Editor) -> Vec<&str> {
        editor.program().queue.ids().iter().map(String::as_str).collect()
    }

    fn run(editor: &mut Editor, command: Command) -> Vec<Event> {
        editor.handle_command(command).expect("command should succeed")
    }

    #[test]
    fn load_points_preview_at_queue_head() {
        let editor = loaded_editor();

        assert_eq!(queue_of(&editor), vec!["v1", "v2"]);
        assert_eq!(editor.preview().current(), Some("v1"));
        assert!(!editor.preview().is_playing());
        assert!(editor.can_submit());
    }

    #[test]
    fn load_is_tracked_until_it_finishes() {
        let mut editor = Editor::new("s1");
        assert!(!editor.is_loading());

        let ticket = editor.begin_load().expect("load");
        assert!(editor.is_loading());

        editor.finish_load(ticket, Err(BackendError::rejected("not found")));
        assert!(!editor.is_loading());
    }

    fn assert_queue_partitions_library(editor: &Editor) {
        let program = editor.program();
        let queued = program.queue.ids();

        let mut seen = HashSet::new();
        assert!(
            queued.iter().all(|id| seen.insert(id.as_str())),
            "duplicate queue entry in {queued:?}"
        );
        let available: Vec<&str> = program
            .library
            .available(&program.queue)
            .map(|video| video.id.as_str())
            .collect();
        assert!(available.iter().all(|id| !program.queue.contains(id)));
        assert_eq!(queued.len() + available.len(), program.library.len());
        assert!(editor.preview().is_consistent_with(&program.queue));
    }

    #[test]
    fn queue_stays_a_partition_across_edit_sequences() {
        let mut editor = Editor::new("s1");
        let ticket = editor.begin_load().expect("load");
        editor.finish_load(
            ticket,
            Ok(ProgramSnapshot {
                queue: vec!["v1".to_string()],
                library: (1..=6).map(|n| asset(&format!("v{n}"))).collect(),
                ..ProgramSnapshot::default()
            }),
        );
        assert_queue_partitions_library(&editor);

        // Fixed-seed LCG; ids cover v7, which the library does not know.
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        let mut next = move |bound: u64| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            (state >> 33) % bound
        };

        for _ in 0..2_000 {
            let id = format!("v{}", next(7) + 1);
            let command = match next(5) {
                0 | 1 => Command::AddToQueue { video_id: id },
                2 => Command::RemoveFromQueue { video_id: id },
                3 => Command::ReorderTo {
                    source_id: id,
                    target_id: format!("v{}", next(7) + 1),
                },
                _ => Command::SetPreview { video_id: id },
            };
            run(&mut editor, command);
            assert_queue_partitions_library(&editor);
        }
    }

    #[test]
    fn end_to_end_drag_reorder_and_remove() {
        let mut editor = loaded_editor();

        run(
            &mut editor,
            Command::StartDrag(DragPayload::Library("v3".to_string())),
        );
        let events = run(&mut editor, Command::Drop(DropTarget::Container));
        assert_eq!(events[0], Event::DragEnded);
        assert_eq!(queue_of(&editor), vec!["v1", "v2", "v3"]);

        run(
            &mut editor,
            Command::StartDrag(DragPayload::Timeline("v1".to_string())),
        );
        run(&mut editor, Command::Drop(DropTarget::Row("v3".to_string())));
        assert_eq!(queue_of(&editor), vec!["v2", "v3", "v1"]);

        run(
            &mut editor,
            Command::SetPreview {
                video_id: "v2".to_string(),
            },
        );
        run(
            &mut editor,
            Command::RemoveFromQueue {
                video_id: "v2".to_string(),
            },
        );
        assert_eq!(queue_of(&editor), vec!["v3", "v1"]);
        assert_eq!(editor.preview().current(), Some("v3"));
        assert!(!editor.drag().is_dragging());
    }

    #[test]
    fn library_drop_on_row_appends_at_end() {
        let mut editor = loaded_editor();

        run(
            &mut editor,
            Command::StartDrag(DragPayload::Library("v3".to_string())),
        );
        run(&mut editor, Command::Drop(DropTarget::Row("v1".to_string())));

        assert_eq!(queue_of(&editor), vec!["v1", "v2", "v3"]);
    }

    #[test]
    fn drop_without_drag_and_unknown_ids_emit_nothing() {
        let mut editor = loaded_editor();

        assert!(run(&mut editor, Command::Drop(DropTarget::Container)).is_empty());
        assert!(run(&mut editor, Command::CancelDrag).is_empty());
        assert!(
            run(
                &mut editor,
                Command::AddToQueue {
                    video_id: "v9".to_string()
                }
            )
            .is_empty()
        );
        assert!(
            run(
                &mut editor,
                Command::AddFromPreset {
                    preset_id: "missing".to_string()
                }
            )
            .is_empty()
        );
        assert!(
            run(
                &mut editor,
                Command::MoveWithinQueue {
                    video_id: "v1".to_string(),
                    direction: Direction::Earlier,
                }
            )
            .is_empty()
        );
        assert_eq!(queue_of(&editor), vec!["v1", "v2"]);
    }

    #[test]
    fn adding_to_empty_queue_adopts_preview() {
        let mut editor = Editor::new("s1");
        let ticket = editor.begin_load().expect("load");
        editor.finish_load(
            ticket,
            Ok(ProgramSnapshot {
                library: vec![asset("v1")],
                ..ProgramSnapshot::default()
            }),
        );
        assert_eq!(editor.preview().current(), None);

        let events = run(
            &mut editor,
            Command::AddToQueue {
                video_id: "v1".to_string(),
            },
        );

        let Event::ProgramChanged(view) = &events[0] else {
            panic!("add must emit ProgramChanged");
        };
        assert_eq!(view.preview_id.as_deref(), Some("v1"));
        assert!(view.available.is_empty());
    }

    #[test]
    fn preset_contributes_resolved_destination_once() {
        let mut editor = loaded_editor();

        run(
            &mut editor,
            Command::AddFromPreset {
                preset_id: "yt".to_string(),
            },
        );
        let repeated = run(
            &mut editor,
            Command::AddFromPreset {
                preset_id: "yt".to_string(),
            },
        );

        assert!(repeated.is_empty());
        assert_eq!(
            editor.program().targets.entries(),
            ["rtmp://a", "rtmp://a.rtmp.youtube.com/live2/abcd-1234-wxyz"]
        );
        let view = editor.view();
        assert_eq!(
            view.presets[0].masked_target,
            "rtmp://a.rtmp.youtube.com/live2/abc***xyz"
        );
    }

    #[test]
    fn submit_with_empty_queue_reports_queue_first() {
        let mut editor = Editor::new("s1");

        let error = editor.begin_submit().expect_err("empty program must not submit");

        assert!(matches!(error, EditorError::EmptyQueue));
        assert!(!editor.is_submitting());
    }

    #[test]
    fn second_submit_while_in_flight_is_rejected() {
        let mut editor = loaded_editor();
        let (_ticket, submission) = editor.begin_submit().expect("valid program");
        assert_eq!(submission.queue, vec!["v1", "v2"]);
        assert!(editor.view().submitting);

        let error = editor.begin_submit().expect_err("second submit must fail");
        assert!(matches!(error, EditorError::SubmissionInFlight));
    }

    #[test]
    fn failed_submit_keeps_program_for_retry() {
        let mut editor = loaded_editor();
        run(
            &mut editor,
            Command::SetName {
                name: "Renamed".to_string(),
            },
        );
        let (ticket, _) = editor.begin_submit().expect("valid program");

        let events = editor.finish_submit(ticket, Err(BackendError::rejected("stream is busy")));

        let Event::Error(error) = &events[1] else {
            panic!("failure must emit an error event");
        };
        assert_eq!(error.kind, EditorErrorKind::SubmitFailed);
        assert!(error.message.contains("stream is busy"));
        assert!(!editor.is_closed());
        assert_eq!(editor.program().name, "Renamed");
        assert_eq!(queue_of(&editor), vec!["v1", "v2"]);
        assert!(editor.begin_submit().is_ok());
    }

    #[test]
    fn successful_submit_closes_session() {
        let mut editor = loaded_editor();
        let (ticket, _) = editor.begin_submit().expect("valid program");

        let events = editor.finish_submit(ticket, Ok(()));

        assert_eq!(events, vec![Event::ProgramApplied]);
        assert!(editor.is_closed());
        assert!(matches!(
            editor.handle_command(Command::Play),
            Err(EditorError::SessionClosed)
        ));
    }

    #[test]
    fn load_failure_leaves_usable_empty_session() {
        let mut editor = Editor::new("s1");
        let ticket = editor.begin_load().expect("load");

        let events = editor.finish_load(ticket, Err(BackendError::rejected("not found")));

        assert_eq!(events.len(), 2);
        let Event::Error(error) = &events[1] else {
            panic!("failure must emit an error event");
        };
        assert_eq!(error.kind, EditorErrorKind::LoadFailed);
        assert!(editor.program().queue.is_empty());
        assert!(
            !run(
                &mut editor,
                Command::AddTarget {
                    raw: "rtmp://x/y".to_string()
                }
            )
            .is_empty()
        );
    }

    #[test]
    fn superseded_and_late_responses_are_ignored() {
        let mut editor = Editor::new("s1");
        let first = editor.begin_load().expect("first load");
        let second = editor.begin_load().expect("second load");

        assert!(editor.finish_load(first, Ok(sample_snapshot())).is_empty());
        assert!(editor.program().queue.is_empty());

        editor.close();
        assert!(editor.finish_load(second, Ok(sample_snapshot())).is_empty());
        assert!(editor.program().queue.is_empty());
    }

    #[test]
    fn submit_response_after_close_is_ignored() {
        let mut editor = loaded_editor();
        let (ticket, _) = editor.begin_submit().expect("valid program");
        editor.close();

        assert!(editor.finish_submit(ticket, Ok(())).is_empty());
        assert!(matches!(editor.begin_submit(), Err(EditorError::SessionClosed)));
    }

    #[test]
    fn play_toggles_only_with_a_preview() {
        let mut editor = Editor::new("s1");
        assert!(run(&mut editor, Command::Play).is_empty());

        let mut editor = loaded_editor();
        run(&mut editor, Command::TogglePlayback);
        assert!(editor.preview().is_playing());
        run(
            &mut editor,
            Command::SetPreview {
                video_id: "v2".to_string(),
            },
        );
        assert!(!editor.preview().is_playing());
    }

    #[tokio::test]
    async fn load_and_submit_through_backend() {
        let backend = MockBackend::new(sample_snapshot());
        let applied = backend.applied();
        let mut editor = Editor::new("s1");

        editor.load(&backend).await.expect("load should run");
        run(
            &mut editor,
            Command::MoveWithinQueue {
                video_id: "v1".to_string(),
                direction: Direction::Later,
            },
        );
        run(&mut editor, Command::SetBitrate { bitrate: 4500 });
        let events = editor.submit(&backend).await.expect("submit should run");

        assert_eq!(events, vec![Event::SubmitStarted, Event::ProgramApplied]);
        let applied = applied.lock().expect("lock applied submissions");
        assert_eq!(applied.len(), 1);
        let (session_id, submission) = &applied[0];
        assert_eq!(session_id, "s1");
        assert_eq!(submission.queue, vec!["v2", "v1"]);
        assert_eq!(submission.targets, vec!["rtmp://a"]);
        assert_eq!(submission.quality.bitrate, 4500);
        assert_eq!(submission.name, "Evening loop");
        assert!(submission.apply_live_now);
    }

    #[tokio::test]
    async fn invalid_submit_never_reaches_backend() {
        let backend = MockBackend::new(ProgramSnapshot::default());
        let applied = backend.applied();
        let mut editor = Editor::new("s1");
        editor.load(&backend).await.expect("load should run");

        let error = editor.submit(&backend).await.expect_err("empty program");

        assert!(error.is_validation());
        assert!(applied.lock().expect("lock applied submissions").is_empty());
    }

    struct MockBackend {
        snapshot: ProgramSnapshot,
        applied: Arc<Mutex<Vec<(String, ProgramSubmission)>>>,
    }

    impl MockBackend {
        fn new(snapshot: ProgramSnapshot) -> Self {
            Self {
                snapshot,
                applied: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn applied(&self) -> Arc<Mutex<Vec<(String, ProgramSubmission)>>> {
            Arc::clone(&self.applied)
        }
    }

    #[async_trait]
    impl ProgramBackend for MockBackend {
        async fn load_program(&self, _session_id: &str) -> Result<ProgramSnapshot, BackendError> {
            Ok(self.snapshot.clone())
        }

        async fn apply_program(
            &self,
            session_id: &str,
            submission: &ProgramSubmission,
        ) -> Result<(), BackendError> {
            self.applied
                .lock()
                .expect("lock applied submissions")
                .push((session_id.to_string(), submission.clone()));
            Ok(())
        }
    }
}
