//! A local personal media library.
//!
//! Files are imported through the thumbnail pipeline into a bounded, persisted
//! catalog; a playback controller binds one catalog item at a time to a live
//! resource supplied by the host and writes progress back into the catalog.

pub mod config;
pub mod error;
pub mod logging;
pub mod media;
pub mod playback;
pub mod state;

pub use config::LibraryConfig;
pub use error::{Error, PlaybackError, Result};
pub use media::file::MediaFile;
pub use media::import::{import_files, ImportReport};
pub use media::thumbnail::{Thumbnail, ThumbnailPipeline};
pub use playback::controller::{PlaybackController, PlaybackPhase};
pub use state::data::{MediaId, MediaItem, MediaMetadata, SourceLocator};
pub use state::library::{Catalog, CatalogState};
pub use state::preferences::{PlaybackPreferences, PlaybackRate, PreferencesPatch};
