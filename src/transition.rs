//! Timed linear interpolation of a single scalar value.
//!
//! A [`Transition`] moves one `u16` from a start to a target over a fixed
//! duration. Restarting a transition mid-flight captures the current
//! interpolated value as the new start, so retargeting never jumps.
//! All operations take `now` explicitly, which keeps timing deterministic
//! in tests and leaves clock ownership to the caller.

use embassy_time::{Duration, Instant};

/// State for one interpolated scalar.
///
/// A freshly constructed transition is the valid "unstarted" state:
/// inactive with start, target and current all zero. When inactive,
/// `current == target` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    active: bool,
    start_time: Instant,
    duration: Duration,
    start_value: u16,
    target_value: u16,
    current_value: u16,
}

impl Transition {
    pub const fn new() -> Self {
        Self {
            active: false,
            start_time: Instant::from_millis(0),
            duration: Duration::from_millis(0),
            start_value: 0,
            target_value: 0,
            current_value: 0,
        }
    }

    /// Start or retarget the transition.
    ///
    /// A zero duration snaps to the target instantly, cancelling any
    /// in-flight motion. Otherwise the new interpolation begins from the
    /// current interpolated value, not the previous start or target.
    pub fn start(&mut self, target: u16, duration_ms: u32, now: Instant) {
        if duration_ms == 0 {
            self.seed(target);
            return;
        }

        self.start_value = self.current_value;
        self.target_value = target;
        self.duration = Duration::from_micros(u64::from(duration_ms) * 1000);
        self.start_time = now;
        self.active = true;
    }

    /// Set start, target and current to `value` without animating.
    pub fn seed(&mut self, value: u16) {
        self.start_value = value;
        self.target_value = value;
        self.current_value = value;
        self.active = false;
    }

    /// Advance the interpolation to `now`.
    ///
    /// No-op when inactive. Completion snaps exactly to the target and
    /// deactivates, so repeated ticks past the deadline are stable.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn tick(&mut self, now: Instant) {
        if !self.active {
            return;
        }

        // Clock skew guard: a start time in the future counts as zero elapsed.
        let elapsed = now.saturating_duration_since(self.start_time);

        if elapsed >= self.duration {
            self.current_value = self.target_value;
            self.active = false;
            return;
        }

        // range is at most +-65535, so the product stays inside i64 for any
        // realistic duration.
        let range = i64::from(self.target_value) - i64::from(self.start_value);
        let elapsed_us = elapsed.as_micros() as i64;
        let duration_us = self.duration.as_micros() as i64;
        let value = i64::from(self.start_value) + (range * elapsed_us) / duration_us;

        self.current_value = value as u16;
    }

    /// Current interpolated value. Equals the target when inactive.
    pub const fn value(&self) -> u16 {
        self.current_value
    }

    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Freeze at the current interpolated value. Does not snap to the
    /// target; that is what distinguishes cancel from a zero-duration start.
    pub fn cancel(&mut self) {
        self.active = false;
        self.target_value = self.current_value;
    }
}

impl Default for Transition {
    fn default() -> Self {
        Self::new()
    }
}
