//! Inbound command surface.
//!
//! External callers (network attribute layer, CLI, presets) never touch
//! the segment store directly. They enqueue [`SegmentCommand`]s into a
//! bounded critical-section queue, and the tick loop drains and applies
//! them before advancing transitions. This gives the renderer a torn-free
//! view of each logical change without locking the hot path.

use core::cell::RefCell;

use critical_section::Mutex;
use embassy_time::Instant;
use heapless::Deque;

#[cfg(feature = "esp32-log")]
use esp_println::println;

use crate::hue::{normalize_hue, start_hue_transition};
use crate::registry::TransitionPool;
use crate::segment::{ColorMode, PowerOnBehavior, SegmentGeometry, SegmentStore};

/// A change to one field of one segment's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightChange {
    Power(bool),
    /// Brightness, 0-254.
    Level(u8),
    /// Hue in degrees, 0-360.
    Hue(u16),
    /// Saturation, 0-254.
    Saturation(u8),
    /// Color temperature in mireds.
    ColorTemp(u16),
    ColorMode(ColorMode),
    PowerOn(PowerOnBehavior),
    Geometry(SegmentGeometry),
}

/// One queued command against one segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentCommand {
    pub segment: u8,
    pub change: LightChange,
    /// Transition duration override; `None` uses the engine's default.
    pub duration_ms: Option<u32>,
}

impl SegmentCommand {
    pub const fn new(segment: u8, change: LightChange) -> Self {
        Self {
            segment,
            change,
            duration_ms: None,
        }
    }

    pub const fn with_duration(segment: u8, change: LightChange, duration_ms: u32) -> Self {
        Self {
            segment,
            change,
            duration_ms: Some(duration_ms),
        }
    }
}

/// Error returned when the queue is full; carries the rejected command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFull(pub SegmentCommand);

/// Error returned when the queue is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueEmpty;

/// Bounded command queue, safe across threads and interrupt contexts.
///
/// Backed by a fixed-size `heapless::Deque` behind a critical section.
/// Senders are cheap copyable handles; the engine holds the receiver.
pub struct CommandQueue<const N: usize> {
    inner: Mutex<RefCell<Deque<SegmentCommand, N>>>,
}

impl<const N: usize> CommandQueue<N> {
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    pub const fn sender(&self) -> CommandSender<'_, N> {
        CommandSender { queue: self }
    }

    pub const fn receiver(&self) -> CommandReceiver<'_, N> {
        CommandReceiver { queue: self }
    }

    /// Enqueue a command, returning it on overflow.
    ///
    /// Overflow never disturbs commands already queued.
    pub fn try_send(&self, command: SegmentCommand) -> Result<(), QueueFull> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.push_back(command).map_err(QueueFull)
        })
    }

    pub fn try_receive(&self) -> Result<SegmentCommand, QueueEmpty> {
        critical_section::with(|cs| {
            let mut queue = self.inner.borrow(cs).borrow_mut();
            queue.pop_front().ok_or(QueueEmpty)
        })
    }
}

impl<const N: usize> Default for CommandQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Sender handle for a [`CommandQueue`].
#[derive(Clone, Copy)]
pub struct CommandSender<'a, const N: usize> {
    queue: &'a CommandQueue<N>,
}

impl<const N: usize> CommandSender<'_, N> {
    pub fn try_send(&self, command: SegmentCommand) -> Result<(), QueueFull> {
        self.queue.try_send(command)
    }
}

/// Receiver handle for a [`CommandQueue`].
#[derive(Clone, Copy)]
pub struct CommandReceiver<'a, const N: usize> {
    queue: &'a CommandQueue<N>,
}

impl<const N: usize> CommandReceiver<'_, N> {
    pub fn try_receive(&self) -> Result<SegmentCommand, QueueEmpty> {
        self.queue.try_receive()
    }
}

/// Apply one command to the store and start the matching transition.
///
/// Returns whether persistent state changed. A command against a segment
/// index the store does not have is dropped; a bad command must never stop
/// the render loop for the other segments.
pub(crate) fn apply_command<const SEGS: usize, const POOL: usize>(
    command: &SegmentCommand,
    store: &mut SegmentStore<SEGS>,
    pool: &mut TransitionPool<POOL>,
    default_duration_ms: u32,
    now: Instant,
) -> bool {
    let Some(light) = store.light_mut().get_mut(usize::from(command.segment)) else {
        #[cfg(feature = "esp32-log")]
        println!("dropping command for unknown segment {}", command.segment);
        return false;
    };
    let fades = light.fades;
    let duration_ms = command.duration_ms.unwrap_or(default_duration_ms);

    match command.change {
        LightChange::Power(on) => {
            light.on = on;
        }
        LightChange::Level(level) => {
            let level = level.min(254);
            light.level = level;
            pool.start(fades.level, u16::from(level), duration_ms, now);
        }
        LightChange::Hue(hue) => {
            let hue = normalize_hue(hue);
            light.hue = hue;
            light.color_mode = ColorMode::HueSat;
            if let Some(t) = pool.get_mut(fades.hue) {
                start_hue_transition(t, hue, duration_ms, now);
            }
        }
        LightChange::Saturation(saturation) => {
            let saturation = saturation.min(254);
            light.saturation = saturation;
            pool.start(fades.saturation, u16::from(saturation), duration_ms, now);
        }
        LightChange::ColorTemp(mireds) => {
            light.color_temp = mireds;
            light.color_mode = ColorMode::ColorTemp;
            pool.start(fades.color_temp, mireds, duration_ms, now);
        }
        LightChange::ColorMode(mode) => {
            light.color_mode = mode;
        }
        LightChange::PowerOn(behavior) => {
            light.power_on = behavior;
        }
        LightChange::Geometry(geometry) => {
            store.geometry_mut()[usize::from(command.segment)] = geometry;
        }
    }

    true
}
