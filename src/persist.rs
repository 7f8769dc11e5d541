//! Persistence of segment geometry and light state.
//!
//! The storage backend is an external collaborator behind [`StateStore`];
//! this module only defines the blob format. Blobs are version-tagged:
//! one format byte, then fixed-width little-endian records per segment.
//! Decoding is tolerant by design: an unknown version or a short blob
//! degrades to compiled-in defaults for the segments it cannot cover, and
//! never fails the boot.

use embassy_time::{Duration, Instant};

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::hue::normalize_hue;
use crate::segment::{ColorMode, PowerOnBehavior, SegmentGeometry, SegmentStore};

/// Storage key for the geometry blob.
pub const GEOMETRY_KEY: &str = "seg_geom";

/// Storage key for the light state blob.
pub const LIGHT_KEY: &str = "seg_state";

/// Current blob format version.
pub const FORMAT_VERSION: u8 = 1;

/// Largest blob either codec produces; backing buffers of this size
/// always suffice. Supports stores of up to 32 segments.
pub const BLOB_MAX: usize = 1 + 32 * LIGHT_RECORD;

const GEOMETRY_RECORD: usize = 5;
const LIGHT_RECORD: usize = 9;

/// Errors at the storage boundary.
///
/// `NotFound` is the normal first-boot signal, not a failure; the caller
/// keeps its defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreError {
    NotFound,
    Io,
}

/// Opaque blob storage boundary (NVS or equivalent).
pub trait StateStore {
    /// Read the blob under `key` into `buf`, returning the stored length.
    fn load(&mut self, key: &str, buf: &mut [u8]) -> Result<usize, StoreError>;

    fn save(&mut self, key: &str, data: &[u8]) -> Result<(), StoreError>;
}

/// Serialize geometry into `buf`, returning the encoded length.
pub fn encode_geometry<const SEGS: usize>(
    store: &SegmentStore<SEGS>,
    buf: &mut [u8],
) -> Option<usize> {
    let len = 1 + SEGS * GEOMETRY_RECORD;
    if buf.len() < len {
        return None;
    }

    buf[0] = FORMAT_VERSION;
    for (n, geom) in store.geometry().iter().enumerate() {
        let rec = &mut buf[1 + n * GEOMETRY_RECORD..1 + (n + 1) * GEOMETRY_RECORD];
        rec[0..2].copy_from_slice(&geom.start.to_le_bytes());
        rec[2..4].copy_from_slice(&geom.count.to_le_bytes());
        rec[4] = geom.strip;
    }
    Some(len)
}

/// Apply a geometry blob to the store.
///
/// Segments beyond the blob's valid records keep their current values.
pub fn decode_geometry<const SEGS: usize>(store: &mut SegmentStore<SEGS>, blob: &[u8]) {
    let Some(records) = check_version(blob) else {
        return;
    };

    for (n, geom) in store.geometry_mut().iter_mut().enumerate() {
        let Some(rec) = records.get(n * GEOMETRY_RECORD..(n + 1) * GEOMETRY_RECORD) else {
            break;
        };
        *geom = SegmentGeometry {
            start: u16::from_le_bytes([rec[0], rec[1]]),
            count: u16::from_le_bytes([rec[2], rec[3]]),
            strip: rec[4],
        };
    }
}

/// Serialize light state into `buf`, returning the encoded length.
pub fn encode_light<const SEGS: usize>(
    store: &SegmentStore<SEGS>,
    buf: &mut [u8],
) -> Option<usize> {
    let len = 1 + SEGS * LIGHT_RECORD;
    if buf.len() < len {
        return None;
    }

    buf[0] = FORMAT_VERSION;
    for (n, light) in store.light().iter().enumerate() {
        let rec = &mut buf[1 + n * LIGHT_RECORD..1 + (n + 1) * LIGHT_RECORD];
        rec[0] = u8::from(light.on);
        rec[1] = light.level;
        rec[2..4].copy_from_slice(&light.hue.to_le_bytes());
        rec[4] = light.saturation;
        rec[5] = light.color_mode.to_byte();
        rec[6..8].copy_from_slice(&light.color_temp.to_le_bytes());
        rec[8] = light.power_on.to_byte();
    }
    Some(len)
}

/// Apply a light state blob to the store.
///
/// Transition handles are untouched; only committed fields change.
/// Segments beyond the blob's valid records keep their defaults.
pub fn decode_light<const SEGS: usize>(store: &mut SegmentStore<SEGS>, blob: &[u8]) {
    let Some(records) = check_version(blob) else {
        return;
    };

    for (n, light) in store.light_mut().iter_mut().enumerate() {
        let Some(rec) = records.get(n * LIGHT_RECORD..(n + 1) * LIGHT_RECORD) else {
            break;
        };
        light.on = rec[0] != 0;
        light.level = rec[1].min(254);
        light.hue = normalize_hue(u16::from_le_bytes([rec[2], rec[3]]));
        light.saturation = rec[4].min(254);
        light.color_mode = ColorMode::from_byte(rec[5]);
        light.color_temp = u16::from_le_bytes([rec[6], rec[7]]);
        light.power_on = PowerOnBehavior::from_byte(rec[8]);
    }
}

/// Version gate shared by the blob decoders.
pub(crate) fn check_version(blob: &[u8]) -> Option<&[u8]> {
    match blob.split_first() {
        Some((&FORMAT_VERSION, records)) => Some(records),
        Some((_version, _)) => {
            #[cfg(feature = "esp32-log")]
            println!("stored blob version {_version} unknown, keeping defaults");
            None
        }
        None => None,
    }
}

/// Load both blobs into the store. Missing blobs keep defaults.
pub fn load_all<const SEGS: usize, S: StateStore>(
    store: &mut SegmentStore<SEGS>,
    backend: &mut S,
) {
    let mut buf = [0u8; BLOB_MAX];

    match backend.load(GEOMETRY_KEY, &mut buf) {
        Ok(len) => decode_geometry(store, &buf[..len.min(BLOB_MAX)]),
        Err(StoreError::NotFound) => {}
        Err(StoreError::Io) => {
            #[cfg(feature = "esp32-log")]
            println!("geometry load failed, keeping defaults");
        }
    }

    match backend.load(LIGHT_KEY, &mut buf) {
        Ok(len) => decode_light(store, &buf[..len.min(BLOB_MAX)]),
        Err(StoreError::NotFound) => {}
        Err(StoreError::Io) => {
            #[cfg(feature = "esp32-log")]
            println!("light state load failed, keeping defaults");
        }
    }
}

/// Save both blobs. Errors are reported but state stays usable.
pub fn save_all<const SEGS: usize, S: StateStore>(
    store: &SegmentStore<SEGS>,
    backend: &mut S,
) -> Result<(), StoreError> {
    let mut buf = [0u8; BLOB_MAX];

    let len = encode_geometry(store, &mut buf).ok_or(StoreError::Io)?;
    backend.save(GEOMETRY_KEY, &buf[..len])?;

    let len = encode_light(store, &mut buf).ok_or(StoreError::Io)?;
    backend.save(LIGHT_KEY, &buf[..len])?;

    Ok(())
}

/// Delay between the last mutation and the actual save.
pub const SAVE_DELAY: Duration = Duration::from_millis(500);

/// Debounce timer for persisting mutated state.
///
/// Every mutation re-arms the timer; the save fires once, [`SAVE_DELAY`]
/// after the last change, when the tick loop polls [`SaveDebounce::due`].
#[derive(Debug, Default)]
pub struct SaveDebounce {
    deadline: Option<Instant>,
}

impl SaveDebounce {
    pub const fn new() -> Self {
        Self { deadline: None }
    }

    /// Re-arm the timer at `now + SAVE_DELAY`.
    pub fn mark(&mut self, now: Instant) {
        self.deadline = Some(now + SAVE_DELAY);
    }

    /// True exactly once after the armed delay has elapsed.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub const fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }
}
