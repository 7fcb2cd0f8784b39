/// Playback preferences shared by every session
///
/// This struct stores the user's transport settings.
/// It is serialized to JSON alongside the catalog items and merged
/// field by field whenever a control changes one of them.

use serde::{Deserialize, Serialize};

/// Playback speeds offered by the rate menu
pub const PLAYBACK_RATES: [f32; 10] = [0.25, 0.5, 0.75, 1.0, 1.25, 1.5, 1.75, 2.0, 2.5, 3.0];

/// A playback rate from the fixed `PLAYBACK_RATES` set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f32", into = "f32")]
pub struct PlaybackRate(f32);

impl PlaybackRate {
    pub const NORMAL: PlaybackRate = PlaybackRate(1.0);

    pub fn value(self) -> f32 {
        self.0
    }
}

impl Default for PlaybackRate {
    fn default() -> Self {
        Self::NORMAL
    }
}

impl TryFrom<f32> for PlaybackRate {
    type Error = String;

    fn try_from(value: f32) -> Result<Self, Self::Error> {
        PLAYBACK_RATES
            .iter()
            .find(|rate| (**rate - value).abs() < f32::EPSILON)
            .map(|rate| PlaybackRate(*rate))
            .ok_or_else(|| format!("unsupported playback rate {value}"))
    }
}

impl From<PlaybackRate> for f32 {
    fn from(rate: PlaybackRate) -> Self {
        rate.0
    }
}

/// Preferred rendition. Stored only; nothing reads it yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityHint {
    #[default]
    Auto,
    Low,
    Medium,
    High,
}

/// All transport preferences
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct PlaybackPreferences {
    /// Output volume (0.0 to 1.0)
    pub volume: f32,

    /// Playback speed
    pub playback_rate: PlaybackRate,

    pub muted: bool,

    /// Reserved for a theater layout; persisted but unused
    pub theater_mode: bool,

    /// Reserved; persisted but unused
    pub quality: QualityHint,
}

impl Default for PlaybackPreferences {
    fn default() -> Self {
        Self {
            volume: 1.0,
            playback_rate: PlaybackRate::NORMAL,
            muted: false,
            theater_mode: false,
            quality: QualityHint::Auto,
        }
    }
}

/// Partial update for `PlaybackPreferences`; `None` fields are left alone
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PreferencesPatch {
    pub volume: Option<f32>,
    pub playback_rate: Option<PlaybackRate>,
    pub muted: Option<bool>,
    pub theater_mode: Option<bool>,
    pub quality: Option<QualityHint>,
}

impl PreferencesPatch {
    pub fn volume(volume: f32) -> Self {
        Self { volume: Some(volume), ..Self::default() }
    }

    pub fn playback_rate(rate: PlaybackRate) -> Self {
        Self { playback_rate: Some(rate), ..Self::default() }
    }

    pub fn muted(muted: bool) -> Self {
        Self { muted: Some(muted), ..Self::default() }
    }
}

impl PlaybackPreferences {
    /// Shallow merge of a partial update. Volume is clamped to [0, 1].
    pub fn merge(&mut self, patch: PreferencesPatch) {
        if let Some(volume) = patch.volume {
            self.volume = clamp_volume(volume);
        }
        if let Some(rate) = patch.playback_rate {
            self.playback_rate = rate;
        }
        if let Some(muted) = patch.muted {
            self.muted = muted;
        }
        if let Some(theater_mode) = patch.theater_mode {
            self.theater_mode = theater_mode;
        }
        if let Some(quality) = patch.quality {
            self.quality = quality;
        }
    }
}

/// Clamp a volume into [0, 1]; NaN becomes silence
pub fn clamp_volume(volume: f32) -> f32 {
    if volume.is_nan() {
        0.0
    } else {
        volume.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let prefs = PlaybackPreferences::default();
        assert_eq!(prefs.volume, 1.0);
        assert_eq!(prefs.playback_rate.value(), 1.0);
        assert!(!prefs.muted);
        assert!(!prefs.theater_mode);
        assert_eq!(prefs.quality, QualityHint::Auto);
    }

    #[test]
    fn test_merge_only_touches_given_fields() {
        let mut prefs = PlaybackPreferences::default();
        prefs.merge(PreferencesPatch::muted(true));

        assert!(prefs.muted);
        assert_eq!(prefs.volume, 1.0);
        assert_eq!(prefs.playback_rate, PlaybackRate::NORMAL);
    }

    #[test]
    fn test_merge_clamps_volume() {
        let mut prefs = PlaybackPreferences::default();
        prefs.merge(PreferencesPatch::volume(1.05));
        assert_eq!(prefs.volume, 1.0);
        prefs.merge(PreferencesPatch::volume(-0.2));
        assert_eq!(prefs.volume, 0.0);
    }

    #[test]
    fn test_rate_must_be_in_set() {
        assert!(PlaybackRate::try_from(1.5_f32).is_ok());
        assert!(PlaybackRate::try_from(3.0_f32).is_ok());
        assert!(PlaybackRate::try_from(1.1_f32).is_err());
        assert!(serde_json::from_str::<PlaybackRate>("4.0").is_err());
    }

    #[test]
    fn test_serialization() {
        let mut prefs = PlaybackPreferences::default();
        prefs.volume = 0.4;
        prefs.playback_rate = PlaybackRate::try_from(2.0_f32).unwrap();
        prefs.quality = QualityHint::High;

        let json = serde_json::to_string(&prefs).unwrap();
        assert!(json.contains("\"playbackRate\":2.0"));

        let restored: PlaybackPreferences = serde_json::from_str(&json).unwrap();
        assert_eq!(prefs, restored);
    }

    #[test]
    fn test_partial_record_fills_defaults() {
        let restored: PlaybackPreferences = serde_json::from_str(r#"{"muted":true}"#).unwrap();
        assert!(restored.muted);
        assert_eq!(restored.volume, 1.0);
    }
}
