use crate::api::{LibraryEntry, PresetEntry, ProgramView, QueueEntry};
use crate::library::{Library, VideoAsset, VideoId};
use crate::preview::PreviewPointer;
use crate::submission::{Quality, can_submit};
use crate::targets::{Preset, TargetSet};
use crate::timeline::Queue;

/// Program as loaded from the backend, before any edit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgramSnapshot {
    pub name: String,
    pub queue: Vec<VideoId>,
    pub targets: Vec<String>,
    pub library: Vec<VideoAsset>,
    pub presets: Vec<Preset>,
    pub quality: Quality,
}

/// Program state owned by one editing session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
    pub name: String,
    pub queue: Queue,
    pub targets: TargetSet,
    pub quality: Quality,
    pub library: Library,
    pub presets: Vec<Preset>,
}

impl Program {
    /// Builds editable state from a loaded snapshot.
    pub fn from_snapshot(snapshot: ProgramSnapshot) -> Self {
        Self {
            name: snapshot.name,
            queue: Queue::from_ids(snapshot.queue),
            targets: TargetSet::from_saved(snapshot.targets),
            quality: snapshot.quality,
            library: Library::new(snapshot.library),
            presets: snapshot.presets,
        }
    }

    pub fn preset(&self, preset_id: &str) -> Option<&Preset> {
        self.presets.iter().find(|preset| preset.id == preset_id)
    }

    /// Creates an immutable view for the UI.
    pub fn view(&self, preview: &PreviewPointer, submitting: bool) -> ProgramView {
        ProgramView {
            name: self.name.clone(),
            quality: self.quality.clone(),
            queue: self
                .queue
                .ids()
                .iter()
                .enumerate()
                .map(|(index, id)| {
                    let asset = self.library.get(id);
                    QueueEntry {
                        id: id.clone(),
                        name: asset.map_or_else(|| id.clone(), |asset| asset.name.clone()),
                        position: index + 1,
                        playable_path: asset.map(VideoAsset::playable_path),
                    }
                })
                .collect(),
            available: self
                .library
                .available(&self.queue)
                .map(|asset| LibraryEntry {
                    id: asset.id.clone(),
                    name: asset.name.clone(),
                })
                .collect(),
            targets: self.targets.entries().to_vec(),
            presets: self
                .presets
                .iter()
                .map(|preset| PresetEntry {
                    id: preset.id.clone(),
                    name: preset.name.clone(),
                    masked_target: preset.masked_target(),
                })
                .collect(),
            preview_id: preview.current().map(str::to_string),
            playing: preview.is_playing(),
            can_submit: can_submit(&self.queue, &self.targets),
            submitting,
        }
    }
}
