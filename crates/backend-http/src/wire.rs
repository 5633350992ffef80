use serde::{Deserialize, Deserializer, Serialize};

/// Editing workspace returned by `GET /api/streams/{id}/workspace`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    pub stream: StreamRecord,
    pub program: ProgramRecord,
    #[serde(default, deserialize_with = "null_as_default")]
    pub videos: Vec<VideoRecord>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub platforms: Vec<PlatformOption>,
}

/// Stream the program belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
}

/// Saved program of a stream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramRecord {
    #[serde(default)]
    pub stream_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub video_ids: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub rtmp_targets: Vec<String>,
    #[serde(default)]
    pub bitrate: u32,
    #[serde(default)]
    pub resolution: String,
}

/// One uploaded video of the library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRecord {
    pub id: String,
    pub filename: String,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub folder: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub duration: f64,
}

/// Destination profile offered to the editor.
///
/// `rtmp_url` is already resolved by the backend (base plus stream key).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformOption {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub platform_type: String,
    #[serde(default)]
    pub rtmp_url: String,
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub stream_key: String,
    #[serde(default)]
    pub custom_url: String,
}

/// Body of `POST /api/streams/{id}/program/apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyProgramRequest {
    pub name: String,
    pub video_ids: Vec<String>,
    pub rtmp_targets: Vec<String>,
    pub bitrate: u32,
    pub resolution: String,
    pub apply_live_now: bool,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub error: String,
}

// The backend encodes empty slices as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
