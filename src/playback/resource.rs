/// The live playback resource and the events it reports
///
/// The host owns the actual decoder/renderer. The controller drives it through
/// `PlaybackResource` and receives its callbacks as `ResourceEvent`s tagged
/// with the epoch of the binding they belong to.

use crate::error::ResourceError;
use crate::state::data::SourceLocator;

/// Identity of one binding. Every rebind gets a strictly larger epoch, so an
/// event carrying an older epoch belongs to an abandoned resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Epoch(u64);

impl Epoch {
    pub fn next(self) -> Self {
        Epoch(self.0 + 1)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Epoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Callbacks delivered by a playback resource
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceEvent {
    /// Duration and dimensions are known; always precedes `TimeUpdate`
    MetadataLoaded { duration: f64 },
    Playing,
    Paused,
    /// Periodic position report while playing (also sent after seeks)
    TimeUpdate { position: f64, buffered: f64 },
    Ended,
    /// The media cannot be decoded
    DecodeError { message: String },
}

/// An external caption file installed on a resource
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionTrack {
    pub locator: SourceLocator,
    pub label: String,
}

/// A live, platform-provided media element
pub trait PlaybackResource {
    /// Ask the resource to start; the outcome arrives as a `Playing` event
    fn play(&mut self) -> Result<(), ResourceError>;

    /// Ask the resource to pause; the outcome arrives as a `Paused` event
    fn pause(&mut self);

    /// Seek to `position` seconds; the resource clamps to its valid range
    fn seek_to(&mut self, position: f64);

    fn current_time(&self) -> f64;

    fn set_volume(&mut self, volume: f32);

    fn set_muted(&mut self, muted: bool);

    fn set_rate(&mut self, rate: f32);

    /// Replace the active text track (`None` removes it)
    fn set_text_track(&mut self, track: Option<&CaptionTrack>);

    /// Drop every event subscription and let go of the underlying media
    fn detach(&mut self);
}

/// Creates playback resources for source locators
pub trait ResourceHost {
    /// Attach a fresh resource whose events will be tagged with `epoch`
    fn attach(
        &mut self,
        source: &SourceLocator,
        epoch: Epoch,
    ) -> Result<Box<dyn PlaybackResource>, ResourceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epochs_increase() {
        let first = Epoch::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
        assert_eq!(second.to_string(), "#1");
    }
}
