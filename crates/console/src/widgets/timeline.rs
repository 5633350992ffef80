use program_engine::{DragPayload, DropTarget, ProgramView, VideoId};

/// One row of the program timeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimelineRow {
    pub id: VideoId,
    pub name: String,
    /// 1-based position shown next to the name.
    pub position: usize,
    /// The row is the one shown in the preview.
    pub selected: bool,
    pub can_move_earlier: bool,
    pub can_move_later: bool,
}

/// One row of the library list; only videos that are not queued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryRow {
    pub id: VideoId,
    pub name: String,
}

/// Interaction result emitted by the timeline and library widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineInteraction {
    LibraryClicked(VideoId),
    RowSelected(VideoId),
    RemoveClicked(VideoId),
    MoveEarlierClicked(VideoId),
    MoveLaterClicked(VideoId),
    DragStarted(DragPayload),
    Dropped(DropTarget),
    DragCancelled,
}

/// Builds timeline rows in queue order.
pub fn build_timeline_rows(view: &ProgramView) -> Vec<TimelineRow> {
    let last = view.queue.len();
    view.queue
        .iter()
        .map(|entry| TimelineRow {
            id: entry.id.clone(),
            name: entry.name.clone(),
            position: entry.position,
            selected: view.preview_id.as_deref() == Some(entry.id.as_str()),
            can_move_earlier: entry.position > 1,
            can_move_later: entry.position < last,
        })
        .collect()
}

pub fn build_library_rows(view: &ProgramView) -> Vec<LibraryRow> {
    view.available
        .iter()
        .map(|entry| LibraryRow {
            id: entry.id.clone(),
            name: entry.name.clone(),
        })
        .collect()
}

/// Starts dragging a library row.
pub fn drag_library_row(id: &str) -> TimelineInteraction {
    TimelineInteraction::DragStarted(DragPayload::Library(id.to_string()))
}

/// Starts dragging a timeline row.
pub fn drag_timeline_row(id: &str) -> TimelineInteraction {
    TimelineInteraction::DragStarted(DragPayload::Timeline(id.to_string()))
}

/// Releases the drag on a row, or on the list area when `row` is `None`.
pub fn drop_at(row: Option<&str>) -> TimelineInteraction {
    let target = match row {
        Some(id) => DropTarget::Row(id.to_string()),
        None => DropTarget::Container,
    };
    TimelineInteraction::Dropped(target)
}
