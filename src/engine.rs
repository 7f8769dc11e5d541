//! Runtime orchestrator.
//!
//! [`LightEngine`] owns the transition pool, the segment store and the
//! command receiver, and runs the per-tick pipeline in a fixed order:
//! drain inbound commands, advance every transition, composite into the
//! pixel sink. Within one tick all transitions are advanced before the
//! renderer reads any of them.

use embassy_time::Instant;

use crate::command::{CommandReceiver, apply_command};
use crate::persist::{self, SaveDebounce, StateStore};
use crate::registry::{RegistryFull, TransitionPool};
use crate::renderer::{PixelSink, render};
use crate::segment::SegmentStore;
use crate::sync::{AttributeSink, sync_all};

/// Default transition duration for commands that carry none, in
/// milliseconds. Acts as a smoothing filter between discrete external
/// updates; fast enough to feel instant without visible stepping.
pub const DEFAULT_TRANSITION_MS: u32 = 100;

/// The process-wide light runtime.
///
/// `SEGS` is the segment capacity, `POOL` the transition pool capacity
/// (use at least `4 * SEGS`), `QUEUE` the inbound command queue depth.
pub struct LightEngine<'a, const SEGS: usize, const POOL: usize, const QUEUE: usize> {
    pool: TransitionPool<POOL>,
    store: SegmentStore<SEGS>,
    commands: CommandReceiver<'a, QUEUE>,
    default_transition_ms: u32,
    save: SaveDebounce,
}

impl<'a, const SEGS: usize, const POOL: usize, const QUEUE: usize>
    LightEngine<'a, SEGS, POOL, QUEUE>
{
    /// Build the engine with default state.
    ///
    /// Fails only if `POOL` cannot hold the four transitions every
    /// segment needs.
    pub fn new(
        commands: CommandReceiver<'a, QUEUE>,
        strip0_len: u16,
    ) -> Result<Self, RegistryFull> {
        let mut pool = TransitionPool::new();
        let store = SegmentStore::new(&mut pool, strip0_len)?;
        // Without this an unbooted engine would fade each value up from
        // zero instead of from its committed default.
        store.seed_transitions(&mut pool);
        Ok(Self {
            pool,
            store,
            commands,
            default_transition_ms: DEFAULT_TRANSITION_MS,
            save: SaveDebounce::new(),
        })
    }

    /// Boot sequence: load persisted state, seed transitions from it,
    /// apply power-on behavior, republish the result outward.
    ///
    /// Must run before the first [`Self::service`] call so the first
    /// rendered frame already shows the restored state.
    pub fn boot<S: StateStore, A: AttributeSink>(&mut self, backend: &mut S, attributes: &mut A) {
        persist::load_all(&mut self.store, backend);
        self.store.apply_power_on();
        self.store.seed_transitions(&mut self.pool);
        sync_all(&self.store, attributes);
    }

    /// Run one tick: drain commands, advance transitions, render.
    ///
    /// Returns whether any command mutated persistent state; mutation also
    /// arms the debounced save polled by [`Self::poll_save`].
    pub fn service<S: PixelSink>(&mut self, now: Instant, sink: &mut S) -> bool {
        let mut dirty = false;
        while let Ok(command) = self.commands.try_receive() {
            dirty |= apply_command(
                &command,
                &mut self.store,
                &mut self.pool,
                self.default_transition_ms,
                now,
            );
        }
        if dirty {
            self.save.mark(now);
        }

        self.pool.tick_all(now);
        render(&self.store, &self.pool, sink);

        dirty
    }

    /// Persist state if the debounce delay has expired.
    pub fn poll_save<S: StateStore>(&mut self, now: Instant, backend: &mut S) {
        if self.save.due(now) {
            let _ = persist::save_all(&self.store, backend);
        }
    }

    /// Push every segment's committed state to the attribute layer.
    ///
    /// Call after bulk changes (preset recall) in addition to the boot
    /// sync.
    pub fn sync_attributes<A: AttributeSink>(&self, attributes: &mut A) {
        sync_all(&self.store, attributes);
    }

    pub fn store(&self) -> &SegmentStore<SEGS> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut SegmentStore<SEGS> {
        &mut self.store
    }

    pub fn pool(&self) -> &TransitionPool<POOL> {
        &self.pool
    }

    pub const fn default_transition_ms(&self) -> u32 {
        self.default_transition_ms
    }

    pub fn set_default_transition_ms(&mut self, ms: u32) {
        self.default_transition_ms = ms;
    }

    /// Whether a debounced save is pending.
    pub const fn save_pending(&self) -> bool {
        self.save.is_armed()
    }
}
