//! CIE 1931 xy chromaticity conversion.
//!
//! Standard sRGB <-> XYZ <-> xy round trip with the D65 white point.
//! Chromaticity coordinates are 16-bit fixed point: value / 65535 maps to
//! a float in [0, 1].

use crate::color::Rgb;

const D65_X: f32 = 0.31271;
const D65_Y: f32 = 0.32902;

/// sRGB gamma linearization.
fn linearize(value: u8) -> f32 {
    let v = f32::from(value) / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        libm::powf((v + 0.055) / 1.055, 2.4)
    }
}

/// Inverse sRGB gamma, clamped to the 8-bit channel range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn delinearize(value: f32) -> u8 {
    if value <= 0.0 {
        return 0;
    }
    if value >= 1.0 {
        return 255;
    }

    let v = if value <= 0.003_130_8 {
        value * 12.92
    } else {
        1.055 * libm::powf(value, 1.0 / 2.4) - 0.055
    };

    (v * 255.0 + 0.5) as u8
}

/// Convert RGB to xy chromaticity.
///
/// Near-black input has no meaningful chromaticity and falls back to the
/// D65 white point instead of dividing by zero.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn rgb_to_xy(rgb: Rgb) -> (u16, u16) {
    let r = linearize(rgb.r);
    let g = linearize(rgb.g);
    let b = linearize(rgb.b);

    // sRGB -> XYZ matrix, D65 illuminant
    let x = r * 0.412_456_4 + g * 0.357_576_1 + b * 0.180_437_5;
    let y = r * 0.212_672_9 + g * 0.715_152_2 + b * 0.072_175;
    let z = r * 0.019_333_9 + g * 0.119_192 + b * 0.950_304_1;

    let sum = x + y + z;
    if sum < 0.00001 {
        return (
            (D65_X * 65535.0) as u16,
            (D65_Y * 65535.0) as u16,
        );
    }

    let x_chroma = (x / sum).clamp(0.0, 1.0);
    let y_chroma = (y / sum).clamp(0.0, 1.0);

    (
        (x_chroma * 65535.0 + 0.5) as u16,
        (y_chroma * 65535.0 + 0.5) as u16,
    )
}

/// Convert xy chromaticity plus a brightness level to RGB.
pub fn xy_to_rgb(x: u16, y: u16, level: u8) -> Rgb {
    let x_chroma = f32::from(x) / 65535.0;
    let mut y_chroma = f32::from(y) / 65535.0;

    if y_chroma < 0.00001 {
        y_chroma = 0.00001;
    }

    let z_chroma = 1.0 - x_chroma - y_chroma;

    // Brightness drives the Y (luminance) component.
    let big_y = f32::from(level) / 255.0;
    let big_x = (big_y / y_chroma) * x_chroma;
    let big_z = (big_y / y_chroma) * z_chroma;

    // XYZ -> sRGB matrix, D65 illuminant
    let r = big_x * 3.240_454_2 + big_y * -1.537_138_5 + big_z * -0.498_531_4;
    let g = big_x * -0.969_266 + big_y * 1.876_010_8 + big_z * 0.041_556;
    let b = big_x * 0.055_643_4 + big_y * -0.204_025_9 + big_z * 1.057_225_2;

    Rgb {
        r: delinearize(r.clamp(0.0, 1.0)),
        g: delinearize(g.clamp(0.0, 1.0)),
        b: delinearize(b.clamp(0.0, 1.0)),
    }
}
