use std::fmt::{Display, Formatter};

use program_console::Request;
use program_engine::{Command, Direction, DragPayload, DropTarget};

/// Parse failure for one scripted edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    Unknown { op: String },
    MissingValue { op: String },
    Invalid { op: String, reason: &'static str },
}

impl Display for ScriptError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unknown { op } => write!(f, "unknown operation: {op}"),
            Self::MissingValue { op } => write!(f, "operation needs a value: {op}"),
            Self::Invalid { op, reason } => write!(f, "invalid operation {op}: {reason}"),
        }
    }
}

impl std::error::Error for ScriptError {}

/// Parses one `name=value` edit into a session request.
pub fn parse_op(op: &str) -> Result<Request, ScriptError> {
    let (name, value) = match op.split_once('=') {
        Some((name, value)) => (name, Some(value)),
        None => (op, None),
    };

    let command = match name {
        "apply" => return Ok(Request::Submit),
        "play" => Command::Play,
        "pause" => Command::Pause,
        "cancel-drag" => Command::CancelDrag,
        "add" => Command::AddToQueue {
            video_id: required(op, value)?,
        },
        "remove" => Command::RemoveFromQueue {
            video_id: required(op, value)?,
        },
        "earlier" => Command::MoveWithinQueue {
            video_id: required(op, value)?,
            direction: Direction::Earlier,
        },
        "later" => Command::MoveWithinQueue {
            video_id: required(op, value)?,
            direction: Direction::Later,
        },
        "reorder" => {
            let value = required(op, value)?;
            let Some((source_id, target_id)) = value.split_once(':') else {
                return Err(invalid(op, "expected SOURCE:TARGET"));
            };
            Command::ReorderTo {
                source_id: source_id.to_string(),
                target_id: target_id.to_string(),
            }
        }
        "drag" => {
            let value = required(op, value)?;
            match value.split_once(':') {
                Some(("library", id)) if !id.is_empty() => {
                    Command::StartDrag(DragPayload::Library(id.to_string()))
                }
                Some(("timeline", id)) if !id.is_empty() => {
                    Command::StartDrag(DragPayload::Timeline(id.to_string()))
                }
                _ => return Err(invalid(op, "expected library:ID or timeline:ID")),
            }
        }
        "drop" => match required(op, value)?.as_str() {
            "container" => Command::Drop(DropTarget::Container),
            row => Command::Drop(DropTarget::Row(row.to_string())),
        },
        "preview" => Command::SetPreview {
            video_id: required(op, value)?,
        },
        "target" => Command::AddTarget {
            raw: required(op, value)?,
        },
        "untarget" => Command::RemoveTarget {
            target: required(op, value)?,
        },
        "preset" => Command::AddFromPreset {
            preset_id: required(op, value)?,
        },
        "name" => Command::SetName {
            name: value.unwrap_or_default().to_string(),
        },
        "bitrate" => {
            let bitrate = required(op, value)?
                .trim()
                .parse::<u32>()
                .map_err(|_| invalid(op, "bitrate must be a whole number of kbps"))?;
            Command::SetBitrate { bitrate }
        }
        "resolution" => Command::SetResolution {
            resolution: required(op, value)?,
        },
        _ => {
            return Err(ScriptError::Unknown { op: op.to_string() });
        }
    };

    Ok(Request::Command(command))
}

fn required(op: &str, value: Option<&str>) -> Result<String, ScriptError> {
    match value {
        Some(value) if !value.is_empty() => Ok(value.to_string()),
        _ => Err(ScriptError::MissingValue { op: op.to_string() }),
    }
}

fn invalid(op: &str, reason: &'static str) -> ScriptError {
    ScriptError::Invalid {
        op: op.to_string(),
        reason,
    }
}
