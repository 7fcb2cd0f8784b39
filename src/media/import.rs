/// Media import
///
/// Turns files picked or discovered by the host into catalog items:
/// allow-list filter → thumbnail pipeline → source locator → `Catalog::add`.
/// Files are processed one at a time, in the order given.

use std::path::Path;
use walkdir::WalkDir;

use super::file::MediaFile;
use super::locator::LocatorRegistry;
use super::thumbnail::{FrameDecoder, Thumbnail, ThumbnailPipeline};
use crate::state::data::{MediaId, MediaItem, MediaMetadata, SourceLocator};
use crate::state::library::Catalog;

/// Supported media extensions (lowercase)
pub const SUPPORTED_EXTENSIONS: [&str; 8] =
    ["mp4", "mkv", "webm", "mov", "avi", "mp3", "ogg", "wav"];

/// Result of an import batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImportReport {
    /// Ids of the new items, in import order
    pub imported: Vec<MediaId>,
    /// Files rejected by the allow-list
    pub skipped: usize,
    /// Imported files whose preview could not be extracted
    pub without_preview: usize,
    /// Older entries pushed out of the catalog by this batch
    pub evicted: usize,
}

/// Whether a file looks like audio or video, by extension or MIME type
pub fn is_supported(file: &MediaFile) -> bool {
    if let Some(mime) = &file.mime {
        if mime.starts_with("video/") || mime.starts_with("audio/") {
            return true;
        }
    }

    file.extension()
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false)
}

/// Walk `folder` recursively and collect every supported media file
pub fn discover(folder: &Path) -> Vec<MediaFile> {
    tracing::info!("🔍 Scanning folder: {}", folder.display());

    let mut files = Vec::new();
    for entry in WalkDir::new(folder)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        // Only process files (not directories)
        if !entry.file_type().is_file() {
            continue;
        }

        let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
        let file = MediaFile::new(entry.path(), size, None);
        if is_supported(&file) {
            files.push(file);
        }
    }

    tracing::info!("Found {} media files in {}", files.len(), folder.display());
    files
}

/// Build a catalog item from an imported file and its extracted thumbnail
pub fn build_item(file: &MediaFile, thumbnail: Thumbnail, source: SourceLocator) -> MediaItem {
    let mut item = MediaItem::new(file.title());
    item.source = Some(source);
    item.thumbnail = thumbnail.preview;
    item.metadata = Some(MediaMetadata {
        duration: thumbnail.duration,
        width: thumbnail.width,
        height: thumbnail.height,
        format: file.format_tag(),
        size: file.size,
    });
    item
}

/// Import `files` sequentially into `catalog`.
///
/// A file whose preview cannot be extracted is still imported; the rest of
/// the batch is never affected by one bad file. Locators of entries evicted
/// to make room are revoked.
pub async fn import_files<D: FrameDecoder>(
    files: impl IntoIterator<Item = MediaFile>,
    pipeline: &ThumbnailPipeline<D>,
    locators: &dyn LocatorRegistry,
    catalog: &mut Catalog,
) -> ImportReport {
    let mut report = ImportReport::default();

    for file in files {
        if !is_supported(&file) {
            tracing::debug!("Skipping unsupported file {}", file.name);
            report.skipped += 1;
            continue;
        }

        let thumbnail = pipeline.extract(&file).await;
        if thumbnail.preview.is_none() {
            report.without_preview += 1;
        }

        let source = locators.create(&file);
        let item = build_item(&file, thumbnail, source);
        report.imported.push(item.id);

        let evicted = catalog.add(item);
        locators.release(&evicted);
        report.evicted += evicted.len();
    }

    tracing::info!(
        "✅ Import complete: {} new, {} skipped, {} without preview",
        report.imported.len(),
        report.skipped,
        report.without_preview
    );
    report
}
