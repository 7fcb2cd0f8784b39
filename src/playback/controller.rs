use std::rc::Rc;
use std::time::{Duration, Instant};

use super::gesture::{Gesture, Side, TapTracker};
use super::keyboard::{command_for, Key, KeyCommand, KeyOutcome, SEEK_STEP_SECS};
use super::platform::{Capability, Platform, Support};
use super::resource::{CaptionTrack, Epoch, PlaybackResource, ResourceEvent, ResourceHost};
use crate::error::PlaybackError;
use crate::media::file::MediaFile;
use crate::media::locator::LocatorRegistry;
use crate::state::data::{MediaId, MediaItem, SourceLocator};
use crate::state::library::Catalog;
use crate::state::preferences::{PlaybackPreferences, PlaybackRate, PreferencesPatch};

/// How long the seek arrow stays on screen after the latest seek
pub const SEEK_CUE_DURATION: Duration = Duration::from_millis(500);

/// How long the revealed controls stay visible while playing
pub const CONTROLS_HIDE_DELAY: Duration = Duration::from_secs(3);

/// Lifecycle of a playback session
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackPhase {
    /// Nothing bound
    Idle,
    /// Bound, waiting for metadata
    Loading,
    /// Ready and not playing
    Paused,
    Playing,
    /// Terminal until the next bind
    Errored(PlaybackError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekDirection {
    Backward,
    Forward,
}

/// Transient arrow shown after a seek
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeekCue {
    pub direction: SeekDirection,
    expires_at: Instant,
}

/// One catalog item attached to one live resource
struct Binding {
    epoch: Epoch,
    item_id: MediaId,
    resume_at: Option<f64>,
    resource: Box<dyn PlaybackResource>,
    /// Caption locator created by this session (revoked when replaced or unbound)
    caption: Option<SourceLocator>,
}

/// Binds catalog items to live playback resources and keeps the visible
/// player state in step with them.
///
/// Play/pause and position flow from the resource into the controller (and
/// position on into the catalog). Volume, rate and mute flow the other way:
/// they are written to the catalog preferences first and then applied.
pub struct PlaybackController {
    host: Box<dyn ResourceHost>,
    platform: Box<dyn Platform>,
    locators: Rc<dyn LocatorRegistry>,
    epoch: Epoch,
    binding: Option<Binding>,
    phase: PlaybackPhase,
    position: f64,
    duration: f64,
    buffered: f64,
    taps: TapTracker,
    seek_cue: Option<SeekCue>,
    controls_visible: bool,
    controls_hide_at: Option<Instant>,
    /// Capabilities we already told the user about
    noticed: Vec<Capability>,
}

impl PlaybackController {
    pub fn new(
        host: Box<dyn ResourceHost>,
        platform: Box<dyn Platform>,
        locators: Rc<dyn LocatorRegistry>,
    ) -> Self {
        Self {
            host,
            platform,
            locators,
            epoch: Epoch::default(),
            binding: None,
            phase: PlaybackPhase::Idle,
            position: 0.0,
            duration: 0.0,
            buffered: 0.0,
            taps: TapTracker::new(),
            seek_cue: None,
            controls_visible: true,
            controls_hide_at: None,
            noticed: Vec::new(),
        }
    }

    // ========== Queries ==========

    pub fn phase(&self) -> &PlaybackPhase {
        &self.phase
    }

    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    pub fn bound_item(&self) -> Option<MediaId> {
        self.binding.as_ref().map(|binding| binding.item_id)
    }

    pub fn is_playing(&self) -> bool {
        self.phase == PlaybackPhase::Playing
    }

    /// Error to show on the fallback screen, if the session failed
    pub fn error(&self) -> Option<&PlaybackError> {
        match &self.phase {
            PlaybackPhase::Errored(error) => Some(error),
            _ => None,
        }
    }

    pub fn position(&self) -> f64 {
        self.position
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// End of the buffered range, in seconds
    pub fn buffered(&self) -> f64 {
        self.buffered
    }

    pub fn seek_cue(&self) -> Option<SeekDirection> {
        self.seek_cue.map(|cue| cue.direction)
    }

    pub fn controls_visible(&self) -> bool {
        self.controls_visible
    }

    /// Caption locator attached during this session
    pub fn caption(&self) -> Option<&SourceLocator> {
        self.binding.as_ref().and_then(|binding| binding.caption.as_ref())
    }

    fn is_ready(&self) -> bool {
        phase_is_ready(&self.phase)
    }

    // ========== Binding ==========

    /// Attach `item` to a fresh resource and return the new binding's epoch.
    ///
    /// The previous resource is detached first, so none of its listeners
    /// survive; events it still delivers carry an older epoch and are dropped.
    pub fn bind(&mut self, item: &MediaItem, preferences: &PlaybackPreferences) -> Epoch {
        self.release_binding();
        self.epoch = self.epoch.next();
        self.reset_session_state();
        self.duration = item.metadata.as_ref().map(|m| m.duration).unwrap_or(0.0);

        let Some(source) = item.source.as_ref() else {
            tracing::warn!("'{}' has no live source; it must be re-imported", item.title);
            self.phase = PlaybackPhase::Errored(PlaybackError::SourceUnavailable);
            return self.epoch;
        };

        let mut resource = match self.host.attach(source, self.epoch) {
            Ok(resource) => resource,
            Err(e) => {
                tracing::warn!("⚠️  Could not attach '{}': {}", item.title, e);
                self.phase = PlaybackPhase::Errored(e.into());
                return self.epoch;
            }
        };

        apply_preferences(resource.as_mut(), preferences);
        if let Some(caption) = &item.caption {
            resource.set_text_track(Some(&CaptionTrack {
                locator: caption.clone(),
                label: "Captions".to_string(),
            }));
        }

        self.binding = Some(Binding {
            epoch: self.epoch,
            item_id: item.id,
            resume_at: item.resume_position(),
            resource,
            caption: None,
        });
        self.phase = PlaybackPhase::Loading;

        tracing::info!("▶️  Bound '{}' (epoch {})", item.title, self.epoch);
        self.epoch
    }

    /// Detach the current resource and return to idle
    pub fn unbind(&mut self) {
        self.release_binding();
        self.reset_session_state();
        self.duration = 0.0;
        self.phase = PlaybackPhase::Idle;
    }

    fn release_binding(&mut self) {
        if let Some(mut binding) = self.binding.take() {
            binding.resource.detach();
            if let Some(caption) = binding.caption.take() {
                self.locators.revoke(&caption);
            }
            tracing::debug!("Released binding {}", binding.epoch);
        }
    }

    fn reset_session_state(&mut self) {
        self.position = 0.0;
        self.buffered = 0.0;
        self.taps.reset();
        self.seek_cue = None;
        self.controls_visible = true;
        self.controls_hide_at = None;
    }

    // ========== Resource events ==========

    /// Apply an event from the resource bound under `epoch`.
    /// Events from any other binding are ignored.
    pub fn handle_event(&mut self, catalog: &mut Catalog, epoch: Epoch, event: ResourceEvent) {
        let Some(binding) = self.binding.as_mut() else {
            tracing::debug!("Ignoring {:?}: nothing bound", event);
            return;
        };
        if epoch != binding.epoch {
            tracing::debug!("Ignoring stale {:?} from epoch {}", event, epoch);
            return;
        }
        if matches!(self.phase, PlaybackPhase::Errored(_)) {
            return;
        }

        match event {
            ResourceEvent::MetadataLoaded { duration } => {
                if self.phase != PlaybackPhase::Loading {
                    return;
                }
                self.duration = duration;
                self.phase = PlaybackPhase::Paused;

                if let Some(position) = binding.resume_at {
                    binding.resource.seek_to(position);
                    self.position = binding.resource.current_time();
                    tracing::debug!("Resuming at {:.1}s", position);
                }
            }
            ResourceEvent::Playing => {
                if phase_is_ready(&self.phase) {
                    self.phase = PlaybackPhase::Playing;
                }
            }
            ResourceEvent::Paused | ResourceEvent::Ended => {
                if phase_is_ready(&self.phase) {
                    self.phase = PlaybackPhase::Paused;
                    self.controls_visible = true;
                    self.controls_hide_at = None;
                }
            }
            ResourceEvent::TimeUpdate { position, buffered } => {
                if !phase_is_ready(&self.phase) {
                    return;
                }
                self.position = position;
                self.buffered = buffered;
                catalog.update_progress(&binding.item_id, position);
            }
            ResourceEvent::DecodeError { message } => {
                tracing::warn!("❌ Playback failed: {}", message);
                self.phase = PlaybackPhase::Errored(PlaybackError::Decode(message));
            }
        }
    }

    // ========== Transport ==========

    /// Request play when paused, pause when playing.
    /// The phase only changes once the resource reports back.
    pub fn toggle_play(&mut self) {
        let Some(binding) = self.binding.as_mut() else {
            return;
        };

        match self.phase {
            PlaybackPhase::Loading | PlaybackPhase::Paused => {
                if let Err(e) = binding.resource.play() {
                    tracing::warn!("Play request rejected: {}", e);
                }
            }
            PlaybackPhase::Playing => binding.resource.pause(),
            PlaybackPhase::Idle | PlaybackPhase::Errored(_) => {}
        }
    }

    /// Move the playhead by `delta` seconds and show the seek cue
    pub fn seek(&mut self, delta: f64, now: Instant) {
        if !self.is_ready() {
            return;
        }
        let Some(binding) = self.binding.as_mut() else {
            return;
        };

        let target = binding.resource.current_time() + delta;
        binding.resource.seek_to(target);
        self.position = binding.resource.current_time();

        // A newer seek replaces the cue and restarts its window
        self.seek_cue = Some(SeekCue {
            direction: if delta < 0.0 {
                SeekDirection::Backward
            } else {
                SeekDirection::Forward
            },
            expires_at: now + SEEK_CUE_DURATION,
        });
    }

    // ========== Gestures ==========

    /// A tap at `x` on a surface `width` wide
    pub fn tap(&mut self, x: f32, width: f32, now: Instant) {
        if let Some(gesture) = self.taps.poll(now) {
            self.apply_gesture(gesture, now);
        }
        if let Some(gesture) = self.taps.tap(Side::of(x, width), now) {
            self.apply_gesture(gesture, now);
        }
    }

    /// Advance timers: resolve a lone tap, expire the seek cue, hide controls
    pub fn tick(&mut self, now: Instant) {
        if let Some(gesture) = self.taps.poll(now) {
            self.apply_gesture(gesture, now);
        }

        if matches!(self.seek_cue, Some(cue) if now >= cue.expires_at) {
            self.seek_cue = None;
        }

        if let Some(hide_at) = self.controls_hide_at {
            if now >= hide_at {
                self.controls_hide_at = None;
                if self.is_playing() {
                    self.controls_visible = false;
                }
            }
        }
    }

    fn apply_gesture(&mut self, gesture: Gesture, now: Instant) {
        match gesture {
            Gesture::DoubleTap(Side::Left) => self.seek(-SEEK_STEP_SECS, now),
            Gesture::DoubleTap(Side::Right) => self.seek(SEEK_STEP_SECS, now),
            Gesture::SingleTap => {
                if self.is_playing() {
                    self.reveal_controls(now);
                } else {
                    self.toggle_play();
                }
            }
        }
    }

    /// Show the control overlay; it hides again after a while if playing
    pub fn reveal_controls(&mut self, now: Instant) {
        self.controls_visible = true;
        self.controls_hide_at = Some(now + CONTROLS_HIDE_DELAY);
    }

    // ========== Keyboard ==========

    /// Handle a shortcut key. Keys typed into a text input are left alone.
    pub fn handle_key(
        &mut self,
        catalog: &mut Catalog,
        key: Key,
        in_text_input: bool,
        now: Instant,
    ) -> KeyOutcome {
        if in_text_input {
            return KeyOutcome::Ignored;
        }
        let Some(command) = command_for(key) else {
            return KeyOutcome::Ignored;
        };

        match command {
            KeyCommand::TogglePlay => self.toggle_play(),
            KeyCommand::Seek(delta) => self.seek(delta, now),
            KeyCommand::AdjustVolume(step) => {
                let volume = catalog.preferences().volume + step;
                self.set_volume(catalog, volume);
            }
            KeyCommand::ToggleFullscreen => self.toggle_fullscreen(),
            KeyCommand::ToggleMute => self.toggle_mute(catalog),
        }
        KeyOutcome::Consumed
    }

    // ========== Preferences ==========

    /// Set the volume (clamped to [0, 1])
    pub fn set_volume(&mut self, catalog: &mut Catalog, volume: f32) {
        self.update_preferences(catalog, PreferencesPatch::volume(volume));
    }

    pub fn set_rate(&mut self, catalog: &mut Catalog, rate: PlaybackRate) {
        self.update_preferences(catalog, PreferencesPatch::playback_rate(rate));
    }

    pub fn toggle_mute(&mut self, catalog: &mut Catalog) {
        let muted = !catalog.preferences().muted;
        self.update_preferences(catalog, PreferencesPatch::muted(muted));
    }

    fn update_preferences(&mut self, catalog: &mut Catalog, patch: PreferencesPatch) {
        catalog.update_preferences(patch);
        if let Some(binding) = self.binding.as_mut() {
            apply_preferences(binding.resource.as_mut(), catalog.preferences());
        }
    }

    // ========== Platform capabilities ==========

    pub fn toggle_fullscreen(&mut self) {
        self.toggle_capability(Capability::Fullscreen);
    }

    pub fn toggle_picture_in_picture(&mut self) {
        self.toggle_capability(Capability::PictureInPicture);
    }

    fn toggle_capability(&mut self, capability: Capability) {
        match self.platform.probe(capability) {
            Support::Supported => {
                let active = !self.platform.is_active(capability);
                if let Err(e) = self.platform.set_active(capability, active) {
                    tracing::warn!("{} request failed: {}", capability.name(), e);
                }
            }
            support => {
                if self.noticed.contains(&capability) {
                    tracing::debug!("{} unavailable ({:?})", capability.name(), support);
                } else {
                    tracing::warn!("⚠️  {} is unavailable here ({:?})", capability.name(), support);
                    self.noticed.push(capability);
                }
            }
        }
    }

    // ========== Captions ==========

    /// Install `file` as the only caption track of the current session,
    /// replacing (and releasing) any caption attached earlier
    pub fn attach_caption(&mut self, file: &MediaFile) {
        let Some(binding) = self.binding.as_mut() else {
            tracing::warn!("Ignoring caption {}: nothing is playing", file.name);
            return;
        };

        let locator = self.locators.create(file);
        binding.resource.set_text_track(Some(&CaptionTrack {
            locator: locator.clone(),
            label: file.title(),
        }));

        if let Some(previous) = binding.caption.replace(locator) {
            self.locators.revoke(&previous);
        }
        tracing::info!("💬 Captions loaded from {}", file.name);
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        self.release_binding();
    }
}

impl std::fmt::Debug for PlaybackController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackController")
            .field("epoch", &self.epoch)
            .field("phase", &self.phase)
            .field("bound_item", &self.bound_item())
            .field("position", &self.position)
            .field("duration", &self.duration)
            .finish()
    }
}

fn phase_is_ready(phase: &PlaybackPhase) -> bool {
    matches!(phase, PlaybackPhase::Paused | PlaybackPhase::Playing)
}

fn apply_preferences(resource: &mut dyn PlaybackResource, preferences: &PlaybackPreferences) {
    resource.set_rate(preferences.playback_rate.value());
    resource.set_volume(preferences.volume);
    resource.set_muted(preferences.muted);
}
