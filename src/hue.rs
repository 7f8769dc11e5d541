//! Shortest-arc hue handling.
//!
//! Hue lives on a 360 degree circle, so a naive interpolation between two
//! values can take the long way around. These helpers adjust the target of
//! a hue transition so it always traverses at most 180 degrees, and cope
//! with values a previous arc-adjusted transition left outside [0, 360).

use embassy_time::Instant;

use crate::transition::Transition;

/// Normalize a raw hue value into [0, 360).
///
/// Raw values may carry a wrapped negative (for example -60 stored as
/// 65476), so the bit pattern is reinterpreted as signed before reduction.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
pub fn normalize_hue(raw: u16) -> u16 {
    (raw as i16).rem_euclid(360) as u16
}

/// Adjust `target` so the path from `current` spans at most 180 degrees.
///
/// Both inputs must already be normalized into [0, 360). The result may be
/// negative or above 360; it normalizes back to `target`.
#[allow(clippy::cast_possible_wrap)]
pub fn shortest_arc(current: u16, target: u16) -> i16 {
    let diff = target as i16 - current as i16;
    if diff > 180 {
        // e.g. 10 -> 300 becomes 10 -> -60, a 70 degree arc through zero
        target as i16 - 360
    } else if diff < -180 {
        // e.g. 300 -> 10 becomes 300 -> 370, a 70 degree arc through 360
        target as i16 + 360
    } else {
        target as i16
    }
}

/// Start a hue transition along the shortest arc.
///
/// The transition's current value is renormalized first: a prior
/// arc-adjusted transition may have completed outside [0, 360), and
/// computing the arc from the raw value would pick the wrong direction.
/// When the adjusted target is negative, both endpoints are shifted up by
/// one full turn so the interpolation runs over a contiguous positive
/// window; every intermediate value still normalizes to the correct hue.
#[allow(clippy::cast_sign_loss)]
pub fn start_hue_transition(
    transition: &mut Transition,
    target_hue: u16,
    duration_ms: u32,
    now: Instant,
) {
    let current = normalize_hue(transition.value());
    let adjusted = shortest_arc(current, normalize_hue(target_hue));

    let (from, to) = if adjusted < 0 {
        (current + 360, (adjusted + 360) as u16)
    } else {
        (current, adjusted as u16)
    };

    transition.seed(from);
    transition.start(to, duration_ms, now);
}
