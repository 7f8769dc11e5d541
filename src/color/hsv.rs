//! HSV to RGB conversion on the Zigbee value scales.

use crate::color::Rgb;
use crate::hue::normalize_hue;

/// Convert HSV to RGB.
///
/// `hue` is in degrees and may carry an out-of-range wrap value from an
/// arc-adjusted transition; it is normalized exactly like the hue module
/// does. `sat` uses the Zigbee 0-254 scale, `value` the full 0-255 range.
#[allow(clippy::cast_possible_truncation)]
pub fn hsv_to_rgb(hue: u16, sat: u8, value: u8) -> Rgb {
    let h = normalize_hue(hue);

    if sat == 0 {
        return Rgb {
            r: value,
            g: value,
            b: value,
        };
    }

    let region = h / 60;
    // Scaled remainder tops out at 59 * 6 = 354, no overflow in u32 terms.
    let remainder = u32::from(h - region * 60) * 6;

    let v = u32::from(value);
    let s = u32::from(sat.min(254));

    let p = (v * (254 - s) / 254) as u8;
    let q = (v * (254 - (s * remainder) / 360) / 254) as u8;
    let t = (v * (254 - (s * (360 - remainder)) / 360) / 254) as u8;

    let (r, g, b) = match region {
        0 => (value, t, p),
        1 => (q, value, p),
        2 => (p, value, t),
        3 => (p, q, value),
        4 => (t, p, value),
        _ => (value, p, q),
    };

    Rgb { r, g, b }
}

/// Rescale a ZCL hue (0-254) to degrees (0-360).
#[allow(clippy::cast_possible_truncation)]
pub fn zcl_hue_to_degrees(zcl_hue: u8) -> u16 {
    (u32::from(zcl_hue) * 360 / 254) as u16
}

/// Rescale degrees (0-360) to the 16-bit enhanced hue unit (0-65535).
#[allow(clippy::cast_possible_truncation)]
pub fn degrees_to_enhanced_hue(degrees: u16) -> u16 {
    (u32::from(degrees) * 65535 / 360) as u16
}
