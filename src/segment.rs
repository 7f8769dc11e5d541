//! Virtual segments: geometry, light state and boot behavior.
//!
//! A segment is an independently controllable region of LEDs mapped onto a
//! contiguous range of one physical strip. Each of its four animated values
//! (level, hue, saturation, color temperature) is backed by one pool-owned
//! transition; the raw fields here hold the committed targets.

use crate::registry::{RegistryFull, TransitionId, TransitionPool};

/// Default segment capacity, matching eight external endpoints.
pub const DEFAULT_SEGMENTS: usize = 8;

/// Default light level at first boot (50% of the 0-254 scale).
pub const DEFAULT_LEVEL: u8 = 128;

/// Default color temperature in mireds (about 4000 K, neutral white).
pub const DEFAULT_COLOR_TEMP: u16 = 250;

/// Placement of a segment on a physical strip.
///
/// `count == 0` disables the segment entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SegmentGeometry {
    pub start: u16,
    pub count: u16,
    pub strip: u8,
}

/// Selects which output a segment drives: RGB from hue/saturation, or the
/// white channel from the color temperature level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorMode {
    #[default]
    HueSat,
    ColorTemp,
}

impl ColorMode {
    /// External wire encoding (ZCL color mode values).
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::HueSat => 0x00,
            Self::ColorTemp => 0x02,
        }
    }

    /// Decode, treating unknown values as the default mode.
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x02 => Self::ColorTemp,
            _ => Self::HueSat,
        }
    }
}

/// What a segment does with its power state after a reboot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PowerOnBehavior {
    Off,
    On,
    Toggle,
    #[default]
    Restore,
}

impl PowerOnBehavior {
    /// External wire encoding (ZCL StartUpOnOff values).
    pub const fn to_byte(self) -> u8 {
        match self {
            Self::Off => 0x00,
            Self::On => 0x01,
            Self::Toggle => 0x02,
            Self::Restore => 0xFF,
        }
    }

    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x00 => Self::Off,
            0x01 => Self::On,
            0x02 => Self::Toggle,
            _ => Self::Restore,
        }
    }
}

/// Transition handles for the four animated values of one segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentFades {
    pub level: TransitionId,
    pub hue: TransitionId,
    pub saturation: TransitionId,
    pub color_temp: TransitionId,
}

/// Committed light state of one segment.
#[derive(Debug, Clone, Copy)]
pub struct SegmentLight {
    pub on: bool,
    /// Brightness, 0-254.
    pub level: u8,
    /// Hue in degrees, 0-360.
    pub hue: u16,
    /// Saturation, 0-254.
    pub saturation: u8,
    pub color_mode: ColorMode,
    /// Color temperature in mireds.
    pub color_temp: u16,
    pub power_on: PowerOnBehavior,
    pub fades: SegmentFades,
}

impl SegmentLight {
    const fn with_fades(fades: SegmentFades) -> Self {
        Self {
            on: false,
            level: DEFAULT_LEVEL,
            hue: 0,
            saturation: 0,
            color_mode: ColorMode::HueSat,
            color_temp: DEFAULT_COLOR_TEMP,
            power_on: PowerOnBehavior::Restore,
            fades,
        }
    }
}

/// Fixed-capacity array of segments.
#[derive(Debug)]
pub struct SegmentStore<const SEGS: usize> {
    geometry: [SegmentGeometry; SEGS],
    light: [SegmentLight; SEGS],
}

impl<const SEGS: usize> SegmentStore<SEGS> {
    /// Create the store with compiled-in defaults.
    ///
    /// Allocates four transitions per segment from `pool`. Segment 0
    /// defaults to the full length of strip 0 as the base layer; every
    /// other segment starts disabled.
    pub fn new<const POOL: usize>(
        pool: &mut TransitionPool<POOL>,
        strip0_len: u16,
    ) -> Result<Self, RegistryFull> {
        let mut geometry = [SegmentGeometry::default(); SEGS];
        if SEGS > 0 {
            geometry[0] = SegmentGeometry {
                start: 0,
                count: strip0_len,
                strip: 0,
            };
        }

        let mut light = [SegmentLight::with_fades(SegmentFades {
            level: TransitionId::INVALID,
            hue: TransitionId::INVALID,
            saturation: TransitionId::INVALID,
            color_temp: TransitionId::INVALID,
        }); SEGS];
        for slot in &mut light {
            slot.fades = SegmentFades {
                level: pool.alloc()?,
                hue: pool.alloc()?,
                saturation: pool.alloc()?,
                color_temp: pool.alloc()?,
            };
        }

        Ok(Self { geometry, light })
    }

    pub fn geometry(&self) -> &[SegmentGeometry; SEGS] {
        &self.geometry
    }

    pub fn geometry_mut(&mut self) -> &mut [SegmentGeometry; SEGS] {
        &mut self.geometry
    }

    pub fn light(&self) -> &[SegmentLight; SEGS] {
        &self.light
    }

    pub fn light_mut(&mut self) -> &mut [SegmentLight; SEGS] {
        &mut self.light
    }

    /// Seed every segment's transitions from its committed fields.
    ///
    /// Called after a state load so the first render shows the persisted
    /// values instead of fading everything up from zero.
    pub fn seed_transitions<const POOL: usize>(&self, pool: &mut TransitionPool<POOL>) {
        for slot in &self.light {
            pool.seed(slot.fades.level, u16::from(slot.level));
            pool.seed(slot.fades.hue, slot.hue);
            pool.seed(slot.fades.saturation, u16::from(slot.saturation));
            pool.seed(slot.fades.color_temp, slot.color_temp);
        }
    }

    /// Apply each segment's power-on behavior to the loaded state.
    ///
    /// Runs once at boot, before the first render.
    pub fn apply_power_on(&mut self) {
        for slot in &mut self.light {
            match slot.power_on {
                PowerOnBehavior::Off => slot.on = false,
                PowerOnBehavior::On => slot.on = true,
                PowerOnBehavior::Toggle => slot.on = !slot.on,
                PowerOnBehavior::Restore => {}
            }
        }
    }
}
