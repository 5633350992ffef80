use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::library::VideoId;

/// Direction for single-step moves inside the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Earlier,
    Later,
}

/// Ordered playback queue of the program.
///
/// Holds each video id at most once. Every operation is a no-op when its
/// preconditions do not hold and reports whether the order changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Queue {
    ids: Vec<VideoId>,
}

impl Queue {
    /// Builds a queue from a saved program, keeping the first occurrence of each id.
    pub fn from_ids(ids: impl IntoIterator<Item = VideoId>) -> Self {
        let mut queue = Self::default();
        for id in ids {
            if !id.trim().is_empty() {
                queue.push(id);
            }
        }
        queue
    }

    pub fn ids(&self) -> &[VideoId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn first(&self) -> Option<&VideoId> {
        self.ids.first()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.ids.iter().position(|queued| queued == id)
    }

    /// Appends `id` unless it is already queued.
    pub fn push(&mut self, id: VideoId) -> bool {
        if self.contains(&id) {
            debug!(video_id = %id, "append ignored: already queued");
            return false;
        }
        self.ids.push(id);
        true
    }

    /// Removes `id` if present.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.ids.remove(index);
        true
    }

    /// Swaps `id` with its neighbour in `direction`.
    pub fn move_within(&mut self, id: &str, direction: Direction) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        let neighbour = match direction {
            Direction::Earlier => index.checked_sub(1),
            Direction::Later => Some(index + 1).filter(|next| *next < self.ids.len()),
        };
        let Some(neighbour) = neighbour else {
            debug!(video_id = %id, ?direction, "move ignored: already at the end");
            return false;
        };

        self.ids.swap(index, neighbour);
        true
    }

    /// Moves `source` to the index `target` occupies, shifting the items between.
    ///
    /// # Example
    /// ```
    /// use program_engine::timeline::Queue;
    ///
    /// let mut queue = Queue::from_ids(["v1", "v2", "v3"].map(String::from));
    /// assert!(queue.reorder_to("v1", "v3"));
    /// assert_eq!(queue.ids(), ["v2", "v3", "v1"]);
    /// ```
    pub fn reorder_to(&mut self, source: &str, target: &str) -> bool {
        if source == target {
            return false;
        }
        let (Some(from), Some(to)) = (self.position(source), self.position(target)) else {
            debug!(source, target, "reorder ignored: id not queued");
            return false;
        };

        let moved = self.ids.remove(from);
        self.ids.insert(to, moved);
        debug!(source, target, from, to, "reorder accepted");
        true
    }
}
