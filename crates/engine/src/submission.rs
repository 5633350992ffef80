use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::library::VideoId;
use crate::targets::TargetSet;
use crate::timeline::Queue;

/// Bitrate used when a loaded program carries none, in kbps.
pub const DEFAULT_BITRATE_KBPS: u32 = 3000;

/// Resolution used when a loaded program carries none.
pub const DEFAULT_RESOLUTION: &str = "1280x720";

/// Encoding parameters of a program.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub bitrate: u32,
    pub resolution: String,
}

impl Default for Quality {
    fn default() -> Self {
        Self {
            bitrate: DEFAULT_BITRATE_KBPS,
            resolution: DEFAULT_RESOLUTION.to_string(),
        }
    }
}

impl Quality {
    /// Fills missing values from the defaults.
    pub fn or_defaults(bitrate: u32, resolution: &str) -> Self {
        let defaults = Self::default();
        Self {
            bitrate: if bitrate == 0 { defaults.bitrate } else { bitrate },
            resolution: match resolution.trim() {
                "" => defaults.resolution,
                value => value.to_string(),
            },
        }
    }
}

/// Program definition handed to the backend on submit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSubmission {
    pub name: String,
    pub queue: Vec<VideoId>,
    pub targets: Vec<String>,
    pub quality: Quality,
    pub apply_live_now: bool,
}

/// Returns true when the program has at least one video and one target.
pub fn can_submit(queue: &Queue, targets: &TargetSet) -> bool {
    validate(queue, targets).is_ok()
}

/// Checks submission preconditions; an empty queue is reported first.
pub fn validate(queue: &Queue, targets: &TargetSet) -> Result<()> {
    if queue.is_empty() {
        return Err(EditorError::EmptyQueue);
    }
    if targets.is_empty() {
        return Err(EditorError::EmptyTargets);
    }
    Ok(())
}

/// Builds a fresh submission from the current program state.
pub fn build_submission(
    name: &str,
    queue: &Queue,
    targets: &TargetSet,
    quality: &Quality,
) -> Result<ProgramSubmission> {
    validate(queue, targets)?;

    Ok(ProgramSubmission {
        name: name.trim().to_string(),
        queue: queue.ids().to_vec(),
        targets: targets.entries().to_vec(),
        quality: quality.clone(),
        apply_live_now: true,
    })
}
