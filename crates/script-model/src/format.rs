//! Export output formats and social-media presets.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Container format of the exported clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Webm,
    Mp4,
}

impl ContainerFormat {
    /// File extension without the dot.
    pub fn file_extension(&self) -> &'static str {
        match self {
            Self::Webm => "webm",
            Self::Mp4 => "mp4",
        }
    }
}

impl fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_extension())
    }
}

/// Output geometry and container for one export.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFormat {
    /// Human-readable name (e.g. "Instagram Story (9:16)").
    pub name: String,

    /// Output width in pixels.
    pub width: u32,

    /// Output height in pixels.
    pub height: u32,

    /// Container the clip is muxed into.
    #[serde(rename = "containerFormat")]
    pub container: ContainerFormat,
}

/// Preset used when no format is specified.
pub const DEFAULT_PRESET: &str = "instagram-story";

/// Keys of every built-in format preset, in listing order.
pub const PRESET_KEYS: &[&str] = &[
    "instagram-story",
    "instagram-post",
    "tiktok",
    "youtube-shorts",
    "facebook-story",
    "twitter",
];

impl ExportFormat {
    pub fn new(name: impl Into<String>, width: u32, height: u32, container: ContainerFormat) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            container,
        }
    }

    /// A caller-defined format with explicit dimensions.
    pub fn custom(width: u32, height: u32, container: ContainerFormat) -> Self {
        Self::new(format!("Custom ({width}x{height})"), width, height, container)
    }

    /// Look up a built-in preset by key.
    pub fn preset(key: &str) -> Option<Self> {
        match key {
            "instagram-story" => Some(Self::new("Instagram Story (9:16)", 1080, 1920, ContainerFormat::Webm)),
            "instagram-post" => Some(Self::new("Instagram Post (1:1)", 1080, 1080, ContainerFormat::Webm)),
            "tiktok" => Some(Self::new("TikTok (9:16)", 1080, 1920, ContainerFormat::Webm)),
            "youtube-shorts" => Some(Self::new("YouTube Shorts (9:16)", 1080, 1920, ContainerFormat::Webm)),
            "facebook-story" => Some(Self::new("Facebook Story (9:16)", 1080, 1920, ContainerFormat::Webm)),
            "twitter" => Some(Self::new("Twitter/X (16:9)", 1280, 720, ContainerFormat::Webm)),
            _ => None,
        }
    }

    /// All built-in presets, in listing order.
    pub fn presets() -> Vec<(&'static str, Self)> {
        PRESET_KEYS
            .iter()
            .filter_map(|key| Self::preset(key).map(|f| (*key, f)))
            .collect()
    }

    /// Whether the geometry is usable for encoding.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}
