use serde::{Deserialize, Serialize};

/// Ordered, duplicate-free set of output destinations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSet {
    entries: Vec<String>,
}

impl TargetSet {
    /// Builds a set from a saved program; blank and repeated entries are dropped.
    pub fn from_saved(entries: impl IntoIterator<Item = String>) -> Self {
        let mut set = Self::default();
        for entry in entries {
            set.add(&entry);
        }
        set
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, target: &str) -> bool {
        self.entries.iter().any(|entry| entry == target)
    }

    /// Adds a trimmed destination unless it is blank or already present.
    pub fn add(&mut self, raw: &str) -> bool {
        let target = raw.trim();
        if target.is_empty() || self.contains(target) {
            return false;
        }
        self.entries.push(target.to_string());
        true
    }

    /// Removes the entry equal to `target`.
    pub fn remove(&mut self, target: &str) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry != target);
        self.entries.len() != before
    }
}

/// Streaming platforms with a well-known ingest base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Youtube,
    Twitch,
    Facebook,
    Tiktok,
    Custom,
}

impl PlatformKind {
    /// Parses a backend platform type; unknown types are custom.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "youtube" => Self::Youtube,
            "twitch" => Self::Twitch,
            "facebook" => Self::Facebook,
            "tiktok" => Self::Tiktok,
            _ => Self::Custom,
        }
    }

    /// Ingest base used when a preset has no custom URL.
    pub fn default_base(self) -> Option<&'static str> {
        match self {
            Self::Youtube => Some("rtmp://a.rtmp.youtube.com/live2"),
            Self::Twitch => Some("rtmp://live.twitch.tv/app"),
            Self::Facebook => Some("rtmps://live-api-s.facebook.com:443/rtmp"),
            Self::Tiktok => Some("rtmp://push-rtmp-global.tiktok.com/live"),
            Self::Custom => None,
        }
    }
}

/// Saved destination profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    pub platform_type: String,
    pub custom_url: String,
    pub stream_key: String,
    /// Destination the backend already resolved; empty when it sent none.
    #[serde(default)]
    pub resolved: String,
}

impl Preset {
    /// Destination this preset contributes, or `""` when no base resolves.
    ///
    /// A backend-resolved destination is used as sent.
    pub fn resolve(&self) -> String {
        let resolved = self.resolved.trim();
        if !resolved.is_empty() {
            return resolved.to_string();
        }
        resolve_target(&self.platform_type, &self.custom_url, &self.stream_key)
    }

    /// Destination with the stream key masked, for listings and logs.
    pub fn masked_target(&self) -> String {
        mask_target(&self.resolve(), &self.stream_key)
    }
}

/// Resolves a destination from platform type, optional custom URL and stream key.
///
/// # Example
/// ```
/// use program_engine::targets::resolve_target;
///
/// assert_eq!(
///     resolve_target("youtube", "", "abc123"),
///     "rtmp://a.rtmp.youtube.com/live2/abc123"
/// );
/// assert_eq!(resolve_target("custom", "", "abc123"), "");
/// ```
pub fn resolve_target(platform_type: &str, custom_url: &str, stream_key: &str) -> String {
    let key = stream_key.trim();
    let custom = custom_url.trim();
    let base = if custom.is_empty() {
        PlatformKind::parse(platform_type).default_base().unwrap_or("")
    } else {
        custom
    };

    if base.is_empty() {
        return String::new();
    }
    if key.is_empty() {
        return base.to_string();
    }
    if base.ends_with('/') {
        format!("{base}{key}")
    } else {
        format!("{base}/{key}")
    }
}

/// Masks the trailing stream key segment of `target`.
pub fn mask_target(target: &str, stream_key: &str) -> String {
    let key = stream_key.trim();
    if key.is_empty() {
        return target.to_string();
    }
    match target.strip_suffix(key) {
        Some(prefix) => format!("{prefix}{}", mask_key(key)),
        None => target.to_string(),
    }
}

fn mask_key(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() <= 6 {
        return "***".to_string();
    }
    let head: String = chars[..3].iter().collect();
    let tail: String = chars[chars.len() - 3..].iter().collect();
    format!("{head}***{tail}")
}
