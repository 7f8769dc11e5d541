//! External attribute synchronization.
//!
//! Outbound: committed segment state is pushed to an [`AttributeSink`]
//! after boot and after bulk changes, so the network layer republishes
//! what the device will actually do. Inbound: the attribute layer delivers
//! some changes without callbacks, so the caller snapshots its externally
//! visible fields once per tick and [`diff_snapshot`] turns the changes
//! into queue commands. The diff is pure; nothing here touches the store.

use heapless::Vec;

use crate::color::degrees_to_enhanced_hue;
use crate::command::{LightChange, SegmentCommand};
use crate::segment::{ColorMode, PowerOnBehavior, SegmentStore};

/// Committed (target) state of one segment as reported outward.
///
/// Reports carry the committed fields, not mid-transition interpolated
/// values, so a report taken during a fade already names the end state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentReport {
    pub on: bool,
    pub power_on: PowerOnBehavior,
    /// Brightness, 0-254.
    pub level: u8,
    /// Hue rescaled to the 16-bit enhanced hue unit.
    pub enhanced_hue: u16,
    /// Saturation, 0-254.
    pub saturation: u8,
    pub color_mode: ColorMode,
    /// Color temperature in mireds.
    pub color_temp: u16,
}

/// Outbound boundary to the network attribute layer.
pub trait AttributeSink {
    fn publish(&mut self, segment: u8, report: &SegmentReport);
}

/// Push every segment's committed state through the sink.
#[allow(clippy::cast_possible_truncation)]
pub fn sync_all<const SEGS: usize, A: AttributeSink>(store: &SegmentStore<SEGS>, sink: &mut A) {
    for (n, light) in store.light().iter().enumerate() {
        let report = SegmentReport {
            on: light.on,
            power_on: light.power_on,
            level: light.level,
            enhanced_hue: degrees_to_enhanced_hue(light.hue),
            saturation: light.saturation,
            color_mode: light.color_mode,
            color_temp: light.color_temp,
        };
        sink.publish(n as u8, &report);
    }
}

/// Externally visible fields of one segment, as polled from the attribute
/// layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExternalSnapshot {
    /// Brightness, 0-254.
    pub level: u8,
    pub color_mode: ColorMode,
    /// Hue in the 16-bit enhanced hue unit.
    pub enhanced_hue: u16,
    /// Saturation, 0-254.
    pub saturation: u8,
    /// Color temperature in mireds.
    pub color_temp: u16,
}

/// Convert enhanced hue (0-65535) to degrees (0-360).
#[allow(clippy::cast_possible_truncation)]
fn enhanced_hue_to_degrees(enhanced: u16) -> u16 {
    (u32::from(enhanced) * 360 / 65535) as u16
}

/// Map changed external fields to segment commands.
///
/// Identical snapshots produce nothing. Color fields are compared per the
/// active mode in `next`: hue and saturation only matter in hue/sat mode,
/// color temperature only in color-temperature mode. Commands carry no
/// duration, so the engine's default transition applies. When `MAX` is
/// reached, remaining deltas are left for the next poll.
#[allow(clippy::cast_possible_truncation)]
pub fn diff_snapshot<const SEGS: usize, const MAX: usize>(
    prev: &[ExternalSnapshot; SEGS],
    next: &[ExternalSnapshot; SEGS],
) -> Vec<SegmentCommand, MAX> {
    let mut commands = Vec::new();

    for n in 0..SEGS {
        let segment = n as u8;
        let before = &prev[n];
        let after = &next[n];

        if after.level != before.level
            && commands
                .push(SegmentCommand::new(segment, LightChange::Level(after.level)))
                .is_err()
        {
            return commands;
        }

        match after.color_mode {
            ColorMode::HueSat => {
                if after.enhanced_hue != before.enhanced_hue {
                    let degrees = enhanced_hue_to_degrees(after.enhanced_hue);
                    if commands
                        .push(SegmentCommand::new(segment, LightChange::Hue(degrees)))
                        .is_err()
                    {
                        return commands;
                    }
                }
                if after.saturation != before.saturation
                    && commands
                        .push(SegmentCommand::new(
                            segment,
                            LightChange::Saturation(after.saturation),
                        ))
                        .is_err()
                {
                    return commands;
                }
            }
            ColorMode::ColorTemp => {
                if after.color_temp != before.color_temp
                    && commands
                        .push(SegmentCommand::new(
                            segment,
                            LightChange::ColorTemp(after.color_temp),
                        ))
                        .is_err()
                {
                    return commands;
                }
            }
        }
    }

    commands
}
