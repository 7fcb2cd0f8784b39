/// Library configuration
///
/// Resolves where the catalog database lives and holds the few tunables the
/// host may want to override.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};

/// Environment variable that overrides the database location
pub const DB_PATH_ENV: &str = "MEDIA_LIBRARY_DB";

/// Fixed key of the durable catalog record
pub const STORAGE_KEY: &str = "media-library-storage";

/// How long the thumbnail pipeline waits on a single decode step
pub const DEFAULT_DECODE_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq)]
pub struct LibraryConfig {
    /// SQLite file holding the catalog record
    pub db_path: PathBuf,
    /// Key the catalog record is stored under
    pub storage_key: String,
    /// Upper bound for the metadata and seek waits of thumbnail extraction
    pub decode_timeout: Duration,
}

impl LibraryConfig {
    /// Resolve the default configuration.
    ///
    /// The database file is created in the user's data directory unless
    /// `MEDIA_LIBRARY_DB` points somewhere else:
    /// - Linux: ~/.local/share/media-library/library.db
    /// - macOS: ~/Library/Application Support/media-library/library.db
    /// - Windows: %APPDATA%\media-library\library.db
    pub fn resolve() -> Result<Self> {
        let db_path = match std::env::var_os(DB_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => Self::default_db_path()?,
        };

        Ok(Self::with_db_path(db_path))
    }

    /// Configuration with every default except the database location
    pub fn with_db_path(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            storage_key: STORAGE_KEY.to_string(),
            decode_timeout: DEFAULT_DECODE_TIMEOUT,
        }
    }

    fn default_db_path() -> Result<PathBuf> {
        let mut path = dirs::data_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| Error::Config("could not determine user data directory".into()))?;

        path.push("media-library");
        path.push("library.db");
        Ok(path)
    }
}
