/// Tap disambiguation for the video surface
///
/// A second tap on the same half within `DOUBLE_TAP_WINDOW` is a double tap.
/// A tap left alone for the whole window is a single tap; it is only known
/// to be single once the window has passed, so `poll` must be called with the
/// current time to resolve it.

use std::time::{Duration, Instant};

pub const DOUBLE_TAP_WINDOW: Duration = Duration::from_millis(300);

/// Horizontal half of the surface a tap landed on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn of(x: f32, width: f32) -> Self {
        if x < width / 2.0 {
            Side::Left
        } else {
            Side::Right
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    SingleTap,
    DoubleTap(Side),
}

#[derive(Debug, Clone, Copy)]
struct PendingTap {
    at: Instant,
    side: Side,
}

#[derive(Debug, Default)]
pub struct TapTracker {
    pending: Option<PendingTap>,
}

impl TapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tap. Returns a double tap if this tap completes one;
    /// otherwise the tap becomes the pending one, replacing any earlier tap.
    pub fn tap(&mut self, side: Side, now: Instant) -> Option<Gesture> {
        if let Some(pending) = self.pending {
            let elapsed = now.saturating_duration_since(pending.at);
            if pending.side == side && elapsed < DOUBLE_TAP_WINDOW {
                self.pending = None;
                return Some(Gesture::DoubleTap(side));
            }
        }

        self.pending = Some(PendingTap { at: now, side });
        None
    }

    /// Resolve the pending tap as a single tap once its window has passed
    pub fn poll(&mut self, now: Instant) -> Option<Gesture> {
        match self.pending {
            Some(pending) if now.saturating_duration_since(pending.at) >= DOUBLE_TAP_WINDOW => {
                self.pending = None;
                Some(Gesture::SingleTap)
            }
            _ => None,
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn reset(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_side_of() {
        assert_eq!(Side::of(10.0, 100.0), Side::Left);
        assert_eq!(Side::of(50.0, 100.0), Side::Right);
        assert_eq!(Side::of(99.0, 100.0), Side::Right);
    }

    #[test]
    fn test_double_tap_same_side() {
        let t0 = Instant::now();
        let mut taps = TapTracker::new();

        assert_eq!(taps.tap(Side::Left, t0), None);
        assert_eq!(taps.tap(Side::Left, t0 + ms(200)), Some(Gesture::DoubleTap(Side::Left)));
        assert!(!taps.has_pending());
        assert_eq!(taps.poll(t0 + ms(1000)), None);
    }

    #[test]
    fn test_single_tap_after_window() {
        let t0 = Instant::now();
        let mut taps = TapTracker::new();

        taps.tap(Side::Right, t0);
        assert_eq!(taps.poll(t0 + ms(299)), None);
        assert_eq!(taps.poll(t0 + ms(400)), Some(Gesture::SingleTap));
        assert_eq!(taps.poll(t0 + ms(500)), None);
    }

    #[test]
    fn test_other_side_replaces_pending() {
        let t0 = Instant::now();
        let mut taps = TapTracker::new();

        taps.tap(Side::Left, t0);
        assert_eq!(taps.tap(Side::Right, t0 + ms(100)), None);
        // Only the newer tap is still pending
        assert_eq!(taps.poll(t0 + ms(350)), None);
        assert_eq!(taps.poll(t0 + ms(400)), Some(Gesture::SingleTap));
    }

    #[test]
    fn test_slow_second_tap_is_not_double() {
        let t0 = Instant::now();
        let mut taps = TapTracker::new();

        taps.tap(Side::Left, t0);
        assert_eq!(taps.tap(Side::Left, t0 + ms(300)), None);
        assert!(taps.has_pending());
    }
}
