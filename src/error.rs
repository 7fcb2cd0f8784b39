/// Error types for the media library
///
/// Only `PlaybackError` is ever shown to the user (as the fallback screen of an
/// errored playback session). Everything else is recovered locally and logged.

use thiserror::Error;

/// Result type for catalog and storage operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while opening or writing the durable catalog
#[derive(Error, Debug)]
pub enum Error {
    /// SQLite failure in the storage backend
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// The persisted record could not be encoded or decoded
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem failure (creating the data directory, reading file metadata)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration could not be resolved
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Failures inside the thumbnail pipeline.
///
/// These never escape `ThumbnailPipeline::extract`; they are logged and turned
/// into a degraded thumbnail.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("could not open decode session: {0}")]
    Open(String),

    #[error("metadata unavailable: {0}")]
    Metadata(String),

    #[error("seek to {position:.2}s failed: {reason}")]
    Seek { position: f64, reason: String },

    #[error("frame capture failed: {0}")]
    Capture(String),

    #[error("preview encoding failed: {0}")]
    Encode(#[from] image::ImageError),

    #[error("timed out waiting for {0}")]
    Timeout(&'static str),
}

/// Failures reported by a playback resource or its host
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResourceError {
    #[error("resource could not be attached: {0}")]
    Attach(String),

    #[error("play request rejected: {0}")]
    PlayRejected(String),
}

/// Optional platform features that are missing or refused
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CapabilityError {
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    #[error("{0} was denied")]
    Denied(&'static str),
}

/// The fault that put a playback session into the errored state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PlaybackError {
    /// The resource could not decode the bound media
    #[error("media could not be decoded: {0}")]
    Decode(String),

    /// The item was loaded from storage and has no live source yet
    #[error("media source is no longer available; re-import the file to play it")]
    SourceUnavailable,

    /// The host refused to create a resource for the source
    #[error(transparent)]
    Attach(#[from] ResourceError),
}
