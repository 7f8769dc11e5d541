#![no_std]

pub mod color;
pub mod command;
pub mod engine;
pub mod hue;
pub mod persist;
pub mod preset;
pub mod registry;
pub mod renderer;
pub mod scheduler;
pub mod segment;
pub mod sync;
pub mod transition;

pub use color::{Rgb, Rgbw, hsv_to_rgb, rgb_to_xy, xy_to_rgb, zcl_hue_to_degrees};
pub use command::{
    CommandQueue, CommandReceiver, CommandSender, LightChange, QueueFull, SegmentCommand,
};
pub use engine::LightEngine;
pub use hue::{normalize_hue, shortest_arc, start_hue_transition};
pub use persist::{SaveDebounce, StateStore, StoreError};
pub use preset::{PresetError, PresetStore};
pub use registry::{RegistryFull, TransitionId, TransitionPool};
pub use renderer::{PixelSink, render};
pub use scheduler::{TickResult, TickScheduler};
pub use segment::{ColorMode, PowerOnBehavior, SegmentGeometry, SegmentLight, SegmentStore};
pub use sync::{AttributeSink, ExternalSnapshot, SegmentReport, diff_snapshot, sync_all};
pub use transition::Transition;

pub use embassy_time::{Duration, Instant};
