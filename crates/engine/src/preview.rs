use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::library::VideoId;
use crate::timeline::Queue;

/// Which queued video the preview surface shows, and whether it plays.
///
/// The pointer only ever names a queued video. Switching to another video
/// always stops playback.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewPointer {
    current: Option<VideoId>,
    playing: bool,
}

impl PreviewPointer {
    /// Points at the head of `queue`, paused.
    pub fn at_head(queue: &Queue) -> Self {
        Self {
            current: queue.first().cloned(),
            playing: false,
        }
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    /// Shows `id` when it is queued; calls naming anything else are ignored.
    pub fn select(&mut self, id: &str, queue: &Queue) -> bool {
        if !queue.contains(id) {
            debug!(video_id = id, "preview ignored: not queued");
            return false;
        }
        if self.current.as_deref() == Some(id) {
            return false;
        }
        self.point_at(Some(id.to_string()));
        true
    }

    /// Adopts a freshly queued video when nothing is previewed yet.
    pub fn on_added(&mut self, id: &str) -> bool {
        if self.current.is_some() {
            return false;
        }
        self.point_at(Some(id.to_string()));
        true
    }

    /// Moves off `removed` to the new queue head, or clears when the queue is empty.
    pub fn on_removed(&mut self, removed: &str, queue: &Queue) -> bool {
        if self.current.as_deref() != Some(removed) {
            return false;
        }
        self.point_at(queue.first().cloned());
        true
    }

    pub fn play(&mut self) -> bool {
        if self.current.is_none() || self.playing {
            return false;
        }
        self.playing = true;
        true
    }

    pub fn pause(&mut self) -> bool {
        let was_playing = self.playing;
        self.playing = false;
        was_playing
    }

    pub fn toggle(&mut self) -> bool {
        if self.playing { self.pause() } else { self.play() }
    }

    /// Returns true when the pointer is empty or names a queued video.
    pub fn is_consistent_with(&self, queue: &Queue) -> bool {
        self.current.as_deref().is_none_or(|id| queue.contains(id))
    }

    fn point_at(&mut self, id: Option<VideoId>) {
        debug!(video_id = ?id, "preview moved");
        self.current = id;
        self.playing = false;
    }
}
