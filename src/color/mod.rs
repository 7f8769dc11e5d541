//! Stateless color conversions.

mod cie;
mod hsv;

pub use cie::{rgb_to_xy, xy_to_rgb};
pub use hsv::{degrees_to_enhanced_hue, hsv_to_rgb, zcl_hue_to_degrees};

pub type Rgb = smart_leds::RGB8;

/// One RGBW pixel as written to a physical strip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgbw {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub w: u8,
}
