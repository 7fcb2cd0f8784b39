/// Shared data structures for the library state
///
/// These structs represent the data model that flows between
/// the catalog, the import path and the playback controller.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a media item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(pub Uuid);

impl MediaId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MediaId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for MediaId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

/// Process-local handle to live bytes (a media file or a caption file).
///
/// Locators are only meaningful inside the process that issued them.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocator(pub String);

impl SourceLocator {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Encoded preview frame, stored inline as a `data:` URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PreviewImage(pub String);

/// Intrinsic properties of a media file
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MediaMetadata {
    /// Duration in seconds (0 when unknown)
    pub duration: f64,
    pub width: u32,
    pub height: u32,
    /// MIME type or lowercase extension (e.g. "video/mp4", "mkv")
    pub format: String,
    /// File size in bytes
    pub size: u64,
}

/// Represents a single media file in the library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaItem {
    pub id: MediaId,
    /// Display title (file name without extension)
    pub title: String,
    /// Live source; never written to storage, so loaded items start without one
    #[serde(skip)]
    pub source: Option<SourceLocator>,
    #[serde(default)]
    pub thumbnail: Option<PreviewImage>,
    /// External caption file attached at import time; process-local like `source`
    #[serde(skip)]
    pub caption: Option<SourceLocator>,
    #[serde(default)]
    pub metadata: Option<MediaMetadata>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_played: Option<DateTime<Utc>>,
    /// Saved playback position in seconds
    #[serde(default)]
    pub progress: Option<f64>,
    #[serde(default)]
    pub favorite: bool,
}

impl MediaItem {
    /// Create a fresh item with a new identifier
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: MediaId::new(),
            title: title.into(),
            source: None,
            thumbnail: None,
            caption: None,
            metadata: None,
            created_at: Utc::now(),
            last_played: None,
            progress: None,
            favorite: false,
        }
    }

    /// Whether the item has live bytes behind it
    pub fn is_playable(&self) -> bool {
        self.source.is_some()
    }

    /// Saved position worth resuming from
    pub fn resume_position(&self) -> Option<f64> {
        self.progress.filter(|p| p.is_finite() && *p > 0.0)
    }

    /// Format tag used by the search projection
    pub fn format(&self) -> Option<&str> {
        self.metadata.as_ref().map(|m| m.format.as_str())
    }
}
