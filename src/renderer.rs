//! Segment compositing onto physical pixel buffers.
//!
//! One render pass clears every strip buffer, applies segments in index
//! order and triggers a single hardware refresh. Later segments overwrite
//! earlier ones where their ranges overlap: segment 0 is the base layer,
//! higher indices are overlays. Segments that are off or have zero count
//! contribute no writes at all, so they are transparent rather than black.

use crate::color::{Rgbw, hsv_to_rgb};
use crate::registry::TransitionPool;
use crate::segment::{ColorMode, SegmentLight, SegmentStore};

/// Physical transmission boundary.
///
/// `clear` and `set_pixel` only touch an in-memory buffer; `refresh` is the
/// one operation that performs actual transmission, for every strip at
/// once. Implementations may treat `refresh` as fire-and-forget; the
/// render loop never waits on it.
pub trait PixelSink {
    /// Number of physical strips behind this sink.
    ///
    /// The renderer never calls `strip_len` or `set_pixel` with a strip
    /// id at or above this count, so implementations may index backing
    /// arrays directly.
    fn strip_count(&self) -> u8;

    /// Actual pixel count of one strip. Segment ranges are clamped to
    /// this, so stale geometry can never write out of bounds.
    fn strip_len(&self, strip: u8) -> u16;

    /// Zero every channel of one strip's buffer.
    fn clear(&mut self, strip: u8);

    fn set_pixel(&mut self, strip: u8, index: u16, r: u8, g: u8, b: u8, w: u8);

    /// Transmit all buffers to the hardware.
    fn refresh(&mut self);
}

/// Channel values one segment drives, read from its transitions.
///
/// Only the interpolated values ever reach the hardware; the committed
/// target fields are used for status reporting, not for rendering.
#[allow(clippy::cast_possible_truncation)]
pub fn segment_output<const POOL: usize>(
    light: &SegmentLight,
    pool: &TransitionPool<POOL>,
) -> Rgbw {
    let level = pool.value(light.fades.level).min(254) as u8;

    match light.color_mode {
        ColorMode::ColorTemp => Rgbw {
            r: 0,
            g: 0,
            b: 0,
            w: level,
        },
        ColorMode::HueSat => {
            let hue = pool.value(light.fades.hue);
            let sat = pool.value(light.fades.saturation).min(254) as u8;
            let rgb = hsv_to_rgb(hue, sat, 255);
            let scale = |c: u8| (u32::from(c) * u32::from(level) / 254) as u8;
            Rgbw {
                r: scale(rgb.r),
                g: scale(rgb.g),
                b: scale(rgb.b),
                w: 0,
            }
        }
    }
}

/// Composite every segment into the sink's buffers and refresh once.
pub fn render<const SEGS: usize, const POOL: usize, S: PixelSink>(
    store: &SegmentStore<SEGS>,
    pool: &TransitionPool<POOL>,
    sink: &mut S,
) {
    for strip in 0..sink.strip_count() {
        sink.clear(strip);
    }

    let strip_count = sink.strip_count();
    for n in 0..SEGS {
        let geom = store.geometry()[n];
        let light = &store.light()[n];
        // A stale geometry blob can name a strip this sink does not have.
        if geom.count == 0 || !light.on || geom.strip >= strip_count {
            continue;
        }

        let out = segment_output(light, pool);

        let strip_len = u32::from(sink.strip_len(geom.strip));
        let start = u32::from(geom.start);
        let end = (start + u32::from(geom.count)).min(strip_len);
        for i in start..end {
            #[allow(clippy::cast_possible_truncation)]
            sink.set_pixel(geom.strip, i as u16, out.r, out.g, out.b, out.w);
        }
    }

    sink.refresh();
}
