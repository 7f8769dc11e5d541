//! Fixed-capacity pool of transitions.
//!
//! The pool owns every [`Transition`] in the system and hands out copyable
//! [`TransitionId`] handles at setup time. Allocation is append-only; the
//! periodic driver advances the whole pool with [`TransitionPool::tick_all`].
//! Recommended capacity is four transitions per segment (level, hue,
//! saturation, color temperature).

use embassy_time::Instant;
use heapless::Vec;

use crate::transition::Transition;

/// Error returned when the pool has no free slots left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryFull;

/// Handle to one pool-owned transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionId(u16);

impl TransitionId {
    /// Handle that no pool resolves; reads through it yield 0.
    pub(crate) const INVALID: Self = Self(u16::MAX);
}

/// Arena of transitions, sized at compile time.
#[derive(Debug, Default)]
pub struct TransitionPool<const N: usize> {
    entries: Vec<Transition, N>,
}

impl<const N: usize> TransitionPool<N> {
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Allocate a new transition in the unstarted state.
    ///
    /// Failure leaves previously allocated entries untouched; the caller
    /// may skip animation for the affected value and fall back to snapping.
    #[allow(clippy::cast_possible_truncation)]
    pub fn alloc(&mut self) -> Result<TransitionId, RegistryFull> {
        let id = self.entries.len() as u16;
        self.entries
            .push(Transition::new())
            .map_err(|_| RegistryFull)?;
        Ok(TransitionId(id))
    }

    /// Number of allocated transitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Advance every active transition. O(allocated count), never blocks.
    pub fn tick_all(&mut self, now: Instant) {
        for t in &mut self.entries {
            t.tick(now);
        }
    }

    pub fn start(&mut self, id: TransitionId, target: u16, duration_ms: u32, now: Instant) {
        if let Some(t) = self.get_mut(id) {
            t.start(target, duration_ms, now);
        }
    }

    /// Set a transition to `value` without animating.
    pub fn seed(&mut self, id: TransitionId, value: u16) {
        if let Some(t) = self.get_mut(id) {
            t.seed(value);
        }
    }

    pub fn cancel(&mut self, id: TransitionId) {
        if let Some(t) = self.get_mut(id) {
            t.cancel();
        }
    }

    /// Current interpolated value, or 0 for a handle this pool never issued.
    pub fn value(&self, id: TransitionId) -> u16 {
        self.get(id).map_or(0, Transition::value)
    }

    pub fn is_active(&self, id: TransitionId) -> bool {
        self.get(id).is_some_and(Transition::is_active)
    }

    pub fn get(&self, id: TransitionId) -> Option<&Transition> {
        self.entries.get(usize::from(id.0))
    }

    pub fn get_mut(&mut self, id: TransitionId) -> Option<&mut Transition> {
        self.entries.get_mut(usize::from(id.0))
    }
}
