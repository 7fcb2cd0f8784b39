use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::{imageops::FilterType, DynamicImage, RgbaImage};
use std::time::Duration;

use super::file::MediaFile;
use crate::config::{LibraryConfig, DEFAULT_DECODE_TIMEOUT};
use crate::error::ThumbnailError;
use crate::state::data::PreviewImage;

/// Width of generated previews; height follows the source aspect ratio
pub const PREVIEW_WIDTH: u32 = 640;

/// JPEG quality of generated previews
pub const PREVIEW_QUALITY: u8 = 80;

/// Tallest preview produced; taller frames keep only their top part
pub const MAX_PREVIEW_HEIGHT: u32 = PREVIEW_WIDTH * 4;

/// Never seek further than this into the file for the preview frame
const MAX_SEEK_SECS: f64 = 1.0;

/// Fraction of the duration to seek to for short files
const SEEK_FRACTION: f64 = 0.1;

/// Intrinsic properties reported by a decode session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StreamInfo {
    /// Seconds; may be NaN or infinite when the container does not say
    pub duration: f64,
    /// Native frame size; zero for audio-only streams
    pub width: u32,
    pub height: u32,
}

/// Derived fields for a newly imported item
#[derive(Debug, Clone, PartialEq)]
pub struct Thumbnail {
    pub preview: Option<PreviewImage>,
    pub duration: f64,
    pub width: u32,
    pub height: u32,
}

impl Thumbnail {
    /// Result used when the file could not be decoded.
    /// The import still goes ahead, just without a preview.
    pub fn degraded() -> Self {
        Self {
            preview: None,
            duration: 0.0,
            width: 0,
            height: 0,
        }
    }

    pub fn is_degraded(&self) -> bool {
        *self == Self::degraded()
    }
}

/// Opens short-lived decode sessions against local files
pub trait FrameDecoder {
    type Session: DecodeSession;

    fn open(&self, file: &MediaFile) -> Result<Self::Session, ThumbnailError>;
}

/// One decode session. `release` frees the underlying resource handle and
/// is called exactly once, whatever the outcome of the extraction.
#[allow(async_fn_in_trait)]
pub trait DecodeSession {
    /// Wait until duration and native dimensions are known
    async fn metadata(&mut self) -> Result<StreamInfo, ThumbnailError>;

    /// Seek and wait until the frame at `position` seconds is rendered
    async fn seek(&mut self, position: f64) -> Result<(), ThumbnailError>;

    /// Copy out the currently rendered frame
    fn capture(&mut self) -> Result<RgbaImage, ThumbnailError>;

    fn release(&mut self);
}

/// Releases the session when extraction finishes, fails or is dropped
struct SessionGuard<S: DecodeSession> {
    session: S,
}

impl<S: DecodeSession> Drop for SessionGuard<S> {
    fn drop(&mut self) {
        self.session.release();
    }
}

/// Produces a preview frame and intrinsic metadata for a file
#[derive(Debug)]
pub struct ThumbnailPipeline<D> {
    decoder: D,
    timeout: Duration,
}

impl<D: FrameDecoder> ThumbnailPipeline<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            timeout: DEFAULT_DECODE_TIMEOUT,
        }
    }

    /// Pipeline using the decode timeout configured for the library
    pub fn from_config(decoder: D, config: &LibraryConfig) -> Self {
        Self::new(decoder).with_timeout(config.decode_timeout)
    }

    /// Bound each wait (metadata, seek) by `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    /// Extract the preview and metadata for `file`.
    ///
    /// Always resolves: any failure is logged and yields `Thumbnail::degraded()`.
    pub async fn extract(&self, file: &MediaFile) -> Thumbnail {
        match self.try_extract(file).await {
            Ok(thumbnail) => {
                tracing::debug!(
                    "📸 Extracted preview for {} ({}x{}, {:.1}s)",
                    file.name,
                    thumbnail.width,
                    thumbnail.height,
                    thumbnail.duration
                );
                thumbnail
            }
            Err(e) => {
                tracing::warn!("⚠️  No preview for {}: {}", file.name, e);
                Thumbnail::degraded()
            }
        }
    }

    async fn try_extract(&self, file: &MediaFile) -> Result<Thumbnail, ThumbnailError> {
        let mut guard = SessionGuard {
            session: self.decoder.open(file)?,
        };

        let info = tokio::time::timeout(self.timeout, guard.session.metadata())
            .await
            .map_err(|_| ThumbnailError::Timeout("metadata"))??;
        let duration = known_duration(info.duration);

        // Audio-only: nothing to capture, but the duration is still useful
        if info.width == 0 || info.height == 0 {
            return Ok(Thumbnail {
                preview: None,
                duration,
                width: 0,
                height: 0,
            });
        }

        let position = seek_position(duration);
        tokio::time::timeout(self.timeout, guard.session.seek(position))
            .await
            .map_err(|_| ThumbnailError::Timeout("seek"))??;

        let frame = guard.session.capture()?;
        let preview = encode_preview(&frame)?;

        Ok(Thumbnail {
            preview: Some(preview),
            duration,
            width: info.width,
            height: info.height,
        })
    }
}

fn known_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}

/// Where to grab the preview frame: 10% in, capped at one second, so the
/// black leading frame of most videos is skipped
pub fn seek_position(duration: f64) -> f64 {
    (known_duration(duration) * SEEK_FRACTION).min(MAX_SEEK_SECS)
}

/// Height of a `width` x `height` frame scaled to preview width, uncapped
fn scaled_height(width: u32, height: u32) -> u32 {
    if width == 0 {
        return 1;
    }
    let scaled = (PREVIEW_WIDTH as f64 * height as f64 / width as f64).round();
    // `as` saturates, so absurd ratios land on u32::MAX and get clamped below
    (scaled as u32).max(1)
}

/// Preview dimensions for a frame of `width` x `height`.
/// The height follows the aspect ratio up to `MAX_PREVIEW_HEIGHT`.
pub fn preview_size(width: u32, height: u32) -> (u32, u32) {
    (PREVIEW_WIDTH, scaled_height(width, height).min(MAX_PREVIEW_HEIGHT))
}

/// Scale a captured frame to preview width and encode it as a JPEG data URL
pub fn encode_preview(frame: &RgbaImage) -> Result<PreviewImage, ThumbnailError> {
    if frame.width() == 0 || frame.height() == 0 {
        return Err(ThumbnailError::Capture("empty frame".into()));
    }

    let (width, height) = preview_size(frame.width(), frame.height());

    let scaled = if scaled_height(frame.width(), frame.height()) > MAX_PREVIEW_HEIGHT {
        // Keep the top of the frame rather than squashing it
        let rows = frame.width() as u64 * MAX_PREVIEW_HEIGHT as u64 / PREVIEW_WIDTH as u64;
        let rows = (rows.max(1) as u32).min(frame.height());
        let top = image::imageops::crop_imm(frame, 0, 0, frame.width(), rows).to_image();
        image::imageops::resize(&top, width, height, FilterType::Lanczos3)
    } else {
        image::imageops::resize(frame, width, height, FilterType::Lanczos3)
    };

    // JPEG has no alpha channel
    let rgb = DynamicImage::ImageRgba8(scaled).to_rgb8();

    let mut jpeg = Vec::new();
    JpegEncoder::new_with_quality(&mut jpeg, PREVIEW_QUALITY).encode_image(&rgb)?;

    Ok(PreviewImage(format!(
        "data:image/jpeg;base64,{}",
        STANDARD.encode(&jpeg)
    )))
}
