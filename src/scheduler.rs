//! Tick pacing for the periodic driver.
//!
//! Drives the engine at a fixed rate without async or platform timers; the
//! caller owns the actual sleep between ticks. Interpolation is based on
//! elapsed wall-clock time, so jitter in the period slows nothing down --
//! a late tick simply lands further along every transition.

use embassy_time::{Duration, Instant};

use crate::engine::LightEngine;
use crate::persist::StateStore;
use crate::renderer::PixelSink;

/// Default tick rate.
pub const DEFAULT_TICK_HZ: u32 = 200;

/// Default tick period (5 ms at 200 Hz).
pub const DEFAULT_TICK_PERIOD: Duration = Duration::from_micros(1_000_000 / DEFAULT_TICK_HZ as u64);

/// Result of one scheduled tick.
#[derive(Debug, Clone, Copy)]
pub struct TickResult {
    /// Deadline for the next tick.
    pub next_deadline: Instant,
    /// How long to wait before the next tick; zero when behind schedule.
    pub sleep: Duration,
}

/// Fixed-rate driver around a [`LightEngine`].
///
/// # Usage
///
/// ```ignore
/// let mut scheduler = TickScheduler::new(engine);
///
/// loop {
///     let result = scheduler.tick(Instant::now(), &mut sink, &mut nvs);
///     // Platform-specific sleep
///     sleep_until(result.next_deadline);
/// }
/// ```
pub struct TickScheduler<'a, const SEGS: usize, const POOL: usize, const QUEUE: usize> {
    engine: LightEngine<'a, SEGS, POOL, QUEUE>,
    next_tick: Instant,
    period: Duration,
}

impl<'a, const SEGS: usize, const POOL: usize, const QUEUE: usize>
    TickScheduler<'a, SEGS, POOL, QUEUE>
{
    /// Create a scheduler at the default 200 Hz rate.
    pub fn new(engine: LightEngine<'a, SEGS, POOL, QUEUE>) -> Self {
        Self::with_period(engine, DEFAULT_TICK_PERIOD)
    }

    pub fn with_period(engine: LightEngine<'a, SEGS, POOL, QUEUE>, period: Duration) -> Self {
        Self {
            engine,
            next_tick: Instant::from_millis(0),
            period,
        }
    }

    /// Run one tick and compute the pacing for the next one.
    ///
    /// Falling more than two periods behind resets the schedule to `now`
    /// instead of bursting through the backlog; stale frames are dropped,
    /// never queued.
    pub fn tick<P: PixelSink, S: StateStore>(
        &mut self,
        now: Instant,
        sink: &mut P,
        backend: &mut S,
    ) -> TickResult {
        let max_drift = self.period * 2;
        if now.as_micros() > self.next_tick.as_micros() + max_drift.as_micros() {
            self.next_tick = now;
        }

        self.engine.service(now, sink);
        self.engine.poll_save(now, backend);

        self.next_tick += self.period;

        let sleep = if self.next_tick.as_micros() > now.as_micros() {
            Duration::from_micros(self.next_tick.as_micros() - now.as_micros())
        } else {
            Duration::from_micros(0)
        };

        TickResult {
            next_deadline: self.next_tick,
            sleep,
        }
    }

    pub fn engine(&self) -> &LightEngine<'a, SEGS, POOL, QUEUE> {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut LightEngine<'a, SEGS, POOL, QUEUE> {
        &mut self.engine
    }
}
