use serde::{Deserialize, Serialize};

use crate::timeline::Queue;

/// Opaque identifier for library videos.
pub type VideoId = String;

/// Path prefix under which the backend serves uploaded videos.
pub const UPLOADS_PATH: &str = "/uploads";

/// One pre-recorded video that can be queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoAsset {
    pub id: VideoId,
    pub name: String,
    pub source: String,
}

impl VideoAsset {
    /// Returns the path the preview surface plays this video from.
    pub fn playable_path(&self) -> String {
        format!("{UPLOADS_PATH}/{}", self.source)
    }
}

/// Read-only video library loaded with the program.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    videos: Vec<VideoAsset>,
}

impl Library {
    /// Builds a library, keeping the first asset for each id.
    pub fn new(videos: impl IntoIterator<Item = VideoAsset>) -> Self {
        let mut kept: Vec<VideoAsset> = Vec::new();
        for video in videos {
            if video.id.is_empty() || kept.iter().any(|existing| existing.id == video.id) {
                continue;
            }
            kept.push(video);
        }
        Self { videos: kept }
    }

    pub fn get(&self, id: &str) -> Option<&VideoAsset> {
        self.videos.iter().find(|video| video.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.videos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &VideoAsset> {
        self.videos.iter()
    }

    /// Returns the videos not yet queued, in library order.
    ///
    /// Computed on every call so the partition never drifts from the queue.
    pub fn available<'a>(&'a self, queue: &'a Queue) -> impl Iterator<Item = &'a VideoAsset> + 'a {
        self.videos
            .iter()
            .filter(move |video| !queue.contains(&video.id))
    }
}
