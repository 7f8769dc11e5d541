//! Named presets of segment light state.
//!
//! A preset is a snapshot of every segment's committed light state under a
//! short name, persisted per slot through the same [`StateStore`] boundary
//! as the live state. Recall never touches the store directly: it emits
//! the commands that move the engine from its current state to the
//! snapshot, so recalled values fade in like any other change and the
//! caller can republish attributes once the tick has applied them.
//! Power-on behavior is not part of a snapshot; recall leaves it alone.

use heapless::{String, Vec};

use crate::command::{LightChange, SegmentCommand};
use crate::hue::normalize_hue;
use crate::persist::{BLOB_MAX, FORMAT_VERSION, StateStore, StoreError, check_version};
use crate::segment::{ColorMode, SegmentStore};

/// Number of preset slots.
pub const MAX_PRESETS: usize = 8;

/// Longest preset name, in bytes.
pub const PRESET_NAME_MAX: usize = 16;

/// Storage keys, one per slot.
const PRESET_KEYS: [&str; MAX_PRESETS] = [
    "prst_0", "prst_1", "prst_2", "prst_3", "prst_4", "prst_5", "prst_6", "prst_7",
];

const NAME_OFFSET: usize = 2;
const STATES_OFFSET: usize = NAME_OFFSET + PRESET_NAME_MAX;
const PRESET_RECORD: usize = 8;

/// Errors from preset operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresetError {
    EmptyName,
    NameTooLong,
    /// Every slot holds a preset under a different name.
    Full,
    NotFound,
    Store(StoreError),
}

/// Snapshot of one segment's committed light state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct PresetLight {
    on: bool,
    level: u8,
    hue: u16,
    saturation: u8,
    color_mode: ColorMode,
    color_temp: u16,
}

impl PresetLight {
    const EMPTY: Self = Self {
        on: false,
        level: 0,
        hue: 0,
        saturation: 0,
        color_mode: ColorMode::HueSat,
        color_temp: 0,
    };
}

/// One slot. An empty name marks the slot as free.
#[derive(Debug, Clone)]
struct PresetSlot<const SEGS: usize> {
    name: String<PRESET_NAME_MAX>,
    states: [PresetLight; SEGS],
}

impl<const SEGS: usize> PresetSlot<SEGS> {
    const fn empty() -> Self {
        Self {
            name: String::new(),
            states: [PresetLight::EMPTY; SEGS],
        }
    }
}

/// Fixed set of named presets.
#[derive(Debug)]
pub struct PresetStore<const SEGS: usize> {
    slots: [PresetSlot<SEGS>; MAX_PRESETS],
    active: Option<usize>,
}

impl<const SEGS: usize> PresetStore<SEGS> {
    pub fn new() -> Self {
        Self {
            slots: core::array::from_fn(|_| PresetSlot::empty()),
            active: None,
        }
    }

    /// Load every slot from the backend. Missing or unreadable slots stay
    /// empty; a preset load failure never fails the boot.
    pub fn load_all<S: StateStore>(&mut self, backend: &mut S) {
        let mut buf = [0u8; BLOB_MAX];
        for (slot, key) in self.slots.iter_mut().zip(PRESET_KEYS) {
            if let Ok(len) = backend.load(key, &mut buf) {
                *slot = decode_slot(&buf[..len.min(BLOB_MAX)]);
            }
        }
    }

    /// Number of occupied slots.
    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| !s.name.is_empty()).count()
    }

    /// Name of the most recently recalled preset, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.map(|slot| self.slots[slot].name.as_str())
    }

    /// Name stored in `slot`, or `None` for a free slot.
    pub fn slot_name(&self, slot: usize) -> Option<&str> {
        let name = &self.slots.get(slot)?.name;
        if name.is_empty() {
            None
        } else {
            Some(name.as_str())
        }
    }

    /// Snapshot the store's committed light state under `name`.
    ///
    /// An existing preset with the same name is overwritten; otherwise the
    /// first free slot is used. The slot is persisted immediately, with no
    /// debounce, since saves are rare and user-initiated.
    pub fn save<S: StateStore>(
        &mut self,
        name: &str,
        store: &SegmentStore<SEGS>,
        backend: &mut S,
    ) -> Result<usize, PresetError> {
        if name.is_empty() {
            return Err(PresetError::EmptyName);
        }
        if name.len() > PRESET_NAME_MAX {
            return Err(PresetError::NameTooLong);
        }

        let slot = match self.find(name) {
            Some(slot) => slot,
            None => self
                .slots
                .iter()
                .position(|s| s.name.is_empty())
                .ok_or(PresetError::Full)?,
        };

        let entry = &mut self.slots[slot];
        entry.name.clear();
        entry.name.push_str(name).map_err(|()| PresetError::NameTooLong)?;
        for (snapshot, light) in entry.states.iter_mut().zip(store.light()) {
            *snapshot = PresetLight {
                on: light.on,
                level: light.level,
                hue: light.hue,
                saturation: light.saturation,
                color_mode: light.color_mode,
                color_temp: light.color_temp,
            };
        }

        let mut buf = [0u8; BLOB_MAX];
        let len = encode_slot(entry, &mut buf).ok_or(PresetError::Store(StoreError::Io))?;
        backend
            .save(PRESET_KEYS[slot], &buf[..len])
            .map_err(PresetError::Store)?;

        Ok(slot)
    }

    /// Turn the named snapshot into the commands that reach it.
    ///
    /// Only fields that differ from the store's committed state produce a
    /// command, so an already matching segment emits nothing. Commands
    /// carry no duration; the engine's default transition applies. Size
    /// `MAX` for six commands per segment to be sure nothing is dropped.
    #[allow(clippy::cast_possible_truncation)]
    pub fn recall<const MAX: usize>(
        &mut self,
        name: &str,
        store: &SegmentStore<SEGS>,
    ) -> Result<Vec<SegmentCommand, MAX>, PresetError> {
        let slot = self.find(name).ok_or(PresetError::NotFound)?;
        let mut commands = Vec::new();

        for (n, (saved, light)) in self.slots[slot]
            .states
            .iter()
            .zip(store.light())
            .enumerate()
        {
            let segment = n as u8;
            let mut push = |change: LightChange| commands.push(SegmentCommand::new(segment, change));

            if saved.on != light.on && push(LightChange::Power(saved.on)).is_err() {
                break;
            }
            if saved.level != light.level && push(LightChange::Level(saved.level)).is_err() {
                break;
            }
            if saved.color_mode != light.color_mode
                && push(LightChange::ColorMode(saved.color_mode)).is_err()
            {
                break;
            }
            if saved.hue != light.hue && push(LightChange::Hue(saved.hue)).is_err() {
                break;
            }
            if saved.saturation != light.saturation
                && push(LightChange::Saturation(saved.saturation)).is_err()
            {
                break;
            }
            if saved.color_temp != light.color_temp
                && push(LightChange::ColorTemp(saved.color_temp)).is_err()
            {
                break;
            }
        }

        self.active = Some(slot);
        Ok(commands)
    }

    /// Remove the named preset from memory and storage.
    pub fn delete<S: StateStore>(
        &mut self,
        name: &str,
        backend: &mut S,
    ) -> Result<(), PresetError> {
        let slot = self.find(name).ok_or(PresetError::NotFound)?;
        self.slots[slot] = PresetSlot::empty();
        if self.active == Some(slot) {
            self.active = None;
        }

        // The store boundary has no erase; an empty-name blob reads back
        // as a free slot.
        backend
            .save(PRESET_KEYS[slot], &[FORMAT_VERSION, 0])
            .map_err(PresetError::Store)
    }

    fn find(&self, name: &str) -> Option<usize> {
        if name.is_empty() {
            return None;
        }
        self.slots
            .iter()
            .position(|s| !s.name.is_empty() && s.name.as_str() == name)
    }
}

impl<const SEGS: usize> Default for PresetStore<SEGS> {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialize one slot, returning the encoded length.
#[allow(clippy::cast_possible_truncation)]
fn encode_slot<const SEGS: usize>(slot: &PresetSlot<SEGS>, buf: &mut [u8]) -> Option<usize> {
    let len = STATES_OFFSET + SEGS * PRESET_RECORD;
    if buf.len() < len {
        return None;
    }

    buf[0] = FORMAT_VERSION;
    buf[1] = slot.name.len() as u8;
    buf[NAME_OFFSET..STATES_OFFSET].fill(0);
    buf[NAME_OFFSET..NAME_OFFSET + slot.name.len()].copy_from_slice(slot.name.as_bytes());

    for (n, state) in slot.states.iter().enumerate() {
        let rec = &mut buf[STATES_OFFSET + n * PRESET_RECORD..STATES_OFFSET + (n + 1) * PRESET_RECORD];
        rec[0] = u8::from(state.on);
        rec[1] = state.level;
        rec[2..4].copy_from_slice(&state.hue.to_le_bytes());
        rec[4] = state.saturation;
        rec[5] = state.color_mode.to_byte();
        rec[6..8].copy_from_slice(&state.color_temp.to_le_bytes());
    }
    Some(len)
}

/// Decode one slot blob. Anything malformed reads as a free slot.
fn decode_slot<const SEGS: usize>(blob: &[u8]) -> PresetSlot<SEGS> {
    let mut slot = PresetSlot::empty();

    let Some(rest) = check_version(blob) else {
        return slot;
    };
    let Some((&name_len, rest)) = rest.split_first() else {
        return slot;
    };
    let name_len = usize::from(name_len);
    if name_len == 0 || name_len > PRESET_NAME_MAX {
        return slot;
    }
    let Some(name_bytes) = rest.get(..name_len) else {
        return slot;
    };
    let Ok(name) = core::str::from_utf8(name_bytes) else {
        return slot;
    };
    if slot.name.push_str(name).is_err() {
        return slot;
    }

    let records = rest.get(PRESET_NAME_MAX..).unwrap_or(&[]);
    for (n, state) in slot.states.iter_mut().enumerate() {
        let Some(rec) = records.get(n * PRESET_RECORD..(n + 1) * PRESET_RECORD) else {
            break;
        };
        *state = PresetLight {
            on: rec[0] != 0,
            level: rec[1].min(254),
            hue: normalize_hue(u16::from_le_bytes([rec[2], rec[3]])),
            saturation: rec[4].min(254),
            color_mode: ColorMode::from_byte(rec[5]),
            color_temp: u16::from_le_bytes([rec[6], rec[7]]),
        };
    }

    slot
}
