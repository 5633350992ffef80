use async_trait::async_trait;
use backend_http::{ApplyProgramRequest, PlatformOption, ProgramClient, Workspace};
use tracing::{debug, info};

use crate::error::BackendError;
use crate::library::VideoAsset;
use crate::program::ProgramSnapshot;
use crate::submission::{ProgramSubmission, Quality};
use crate::targets::Preset;

/// Backend operations required by an editing session.
#[async_trait]
pub trait ProgramBackend: Send + Sync {
    /// Reads the saved program together with the library and presets.
    async fn load_program(&self, session_id: &str) -> Result<ProgramSnapshot, BackendError>;

    /// Saves the program and applies it live.
    async fn apply_program(
        &self,
        session_id: &str,
        submission: &ProgramSubmission,
    ) -> Result<(), BackendError>;
}

/// HTTP backend used by production wiring.
#[derive(Debug, Clone)]
pub struct HttpProgramBackend {
    client: ProgramClient,
}

impl HttpProgramBackend {
    pub fn new(client: ProgramClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ProgramClient {
        &self.client
    }
}

#[async_trait]
impl ProgramBackend for HttpProgramBackend {
    async fn load_program(&self, session_id: &str) -> Result<ProgramSnapshot, BackendError> {
        let workspace = self.client.get_workspace(session_id).await?;
        let snapshot = snapshot_from_workspace(workspace);
        info!(
            session_id,
            queued = snapshot.queue.len(),
            library = snapshot.library.len(),
            presets = snapshot.presets.len(),
            "program workspace loaded"
        );
        Ok(snapshot)
    }

    async fn apply_program(
        &self,
        session_id: &str,
        submission: &ProgramSubmission,
    ) -> Result<(), BackendError> {
        let request = ApplyProgramRequest::from(submission);
        self.client.apply_program(session_id, &request).await?;
        info!(session_id, "program applied");
        Ok(())
    }
}

impl From<&ProgramSubmission> for ApplyProgramRequest {
    fn from(value: &ProgramSubmission) -> Self {
        Self {
            name: value.name.clone(),
            video_ids: value.queue.clone(),
            rtmp_targets: value.targets.clone(),
            bitrate: value.quality.bitrate,
            resolution: value.quality.resolution.clone(),
            apply_live_now: value.apply_live_now,
        }
    }
}

fn snapshot_from_workspace(workspace: Workspace) -> ProgramSnapshot {
    let library = workspace
        .videos
        .into_iter()
        .map(|video| VideoAsset {
            name: video
                .original_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| video.filename.clone()),
            source: video.filename,
            id: video.id,
        })
        .collect();

    let presets = workspace
        .platforms
        .into_iter()
        .filter_map(preset_from_platform)
        .collect();

    ProgramSnapshot {
        name: workspace.stream.name,
        quality: Quality::or_defaults(workspace.program.bitrate, &workspace.program.resolution),
        queue: workspace.program.video_ids,
        targets: workspace.program.rtmp_targets,
        library,
        presets,
    }
}

fn preset_from_platform(platform: PlatformOption) -> Option<Preset> {
    if platform.rtmp_url.trim().is_empty() && platform.custom_url.trim().is_empty() {
        debug!(platform_id = %platform.id, "platform skipped: no destination");
        return None;
    }

    let preset = Preset {
        id: platform.id,
        name: platform.name,
        platform_type: platform.platform_type,
        custom_url: platform.custom_url,
        stream_key: platform.stream_key,
        resolved: platform.rtmp_url.trim().to_string(),
    };
    if preset.resolve().is_empty() {
        return None;
    }
    Some(preset)
}

#[cfg(test)]
mod tests {
    use backend_http::{PlatformOption, ProgramRecord, StreamRecord, VideoRecord, Workspace};

    use super::snapshot_from_workspace;

    fn video(id: &str, filename: &str, original_name: Option<&str>) -> VideoRecord {
        VideoRecord {
            id: id.to_string(),
            filename: filename.to_string(),
            original_name: original_name.map(str::to_string),
            folder: None,
            size: 0,
            thumbnail: String::new(),
            duration: 0.0,
        }
    }

    fn platform(id: &str, platform_type: &str, rtmp_url: &str, stream_key: &str) -> PlatformOption {
        PlatformOption {
            id: id.to_string(),
            name: format!("{id} name"),
            platform_type: platform_type.to_string(),
            rtmp_url: rtmp_url.to_string(),
            enabled: true,
            stream_key: stream_key.to_string(),
            custom_url: String::new(),
        }
    }

    fn workspace() -> Workspace {
        Workspace {
            stream: StreamRecord {
                id: "s1".to_string(),
                name: "Evening loop".to_string(),
                status: "stopped".to_string(),
            },
            program: ProgramRecord {
                stream_id: "s1".to_string(),
                video_ids: vec!["v1".to_string()],
                rtmp_targets: vec!["rtmp://a".to_string(), " ".to_string()],
                bitrate: 0,
                resolution: String::new(),
            },
            videos: vec![
                video("v1", "f1.mp4", Some("intro.mp4")),
                video("v2", "f2.mp4", None),
            ],
            platforms: vec![
                platform("p1", "youtube", "rtmp://a.rtmp.youtube.com/live2/abc123", "abc123"),
                platform("p2", "custom", "", "key"),
                platform("p3", "custom", "rtmp://ingest.example/live/key", "key"),
                platform("p4", "custom", "rtmp://x/live//k1", "k1"),
            ],
        }
    }

    #[test]
    fn snapshot_uses_original_names_and_stored_filenames() {
        let snapshot = snapshot_from_workspace(workspace());

        assert_eq!(snapshot.name, "Evening loop");
        assert_eq!(snapshot.library[0].name, "intro.mp4");
        assert_eq!(snapshot.library[0].source, "f1.mp4");
        assert_eq!(snapshot.library[1].name, "f2.mp4");
        assert_eq!(snapshot.quality.bitrate, 3000);
        assert_eq!(snapshot.quality.resolution, "1280x720");
    }

    #[test]
    fn presets_without_destination_are_skipped_and_others_resolve_to_backend_url() {
        let snapshot = snapshot_from_workspace(workspace());

        let ids: Vec<&str> = snapshot.presets.iter().map(|preset| preset.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "p3", "p4"]);
        assert_eq!(
            snapshot.presets[0].resolve(),
            "rtmp://a.rtmp.youtube.com/live2/abc123"
        );
        assert_eq!(snapshot.presets[1].resolve(), "rtmp://ingest.example/live/key");
        assert_eq!(snapshot.presets[2].resolve(), "rtmp://x/live//k1");
    }
}
