use std::path::{Path, PathBuf};

/// A local file handed to the library by the host (picked, dropped or discovered)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub path: PathBuf,
    /// File name including extension (e.g. "holiday.mp4")
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type reported by the host, if it knows one
    pub mime: Option<String>,
}

impl MediaFile {
    pub fn new(path: impl Into<PathBuf>, size: u64, mime: Option<String>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();

        Self { path, name, size, mime }
    }

    /// Build a handle from a path on disk, reading its size
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        Ok(Self::new(path, metadata.len(), None))
    }

    /// Lowercase extension without the dot
    pub fn extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// Display title: the file name without its extension
    pub fn title(&self) -> String {
        self.path
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.clone())
    }

    /// Format tag stored in the item metadata: the MIME type when known,
    /// otherwise the extension
    pub fn format_tag(&self) -> String {
        match &self.mime {
            Some(mime) if !mime.is_empty() => mime.clone(),
            _ => self.extension().unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_and_tags() {
        let file = MediaFile::new("/videos/Holiday.Trip.MP4", 1024, None);
        assert_eq!(file.name, "Holiday.Trip.MP4");
        assert_eq!(file.title(), "Holiday.Trip");
        assert_eq!(file.extension().as_deref(), Some("mp4"));
        assert_eq!(file.format_tag(), "mp4");

        let typed = MediaFile::new("/music/song", 10, Some("audio/ogg".into()));
        assert_eq!(typed.extension(), None);
        assert_eq!(typed.format_tag(), "audio/ogg");
    }

    #[tokio::test]
    async fn test_from_path_reads_size() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.webm");
        std::fs::write(&path, b"12345").unwrap();

        let file = MediaFile::from_path(&path).await.unwrap();
        assert_eq!(file.size, 5);
        assert_eq!(file.name, "clip.webm");
    }
}
