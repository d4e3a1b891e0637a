//! Per-area cache slot and its recompute state machine.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::area::PlantingArea;
use crate::cache::Generation;
use crate::placement::PlacementResult;

/// Generation stored in the abort flag of a removed area; never equals a real one.
pub(crate) const REMOVED: Generation = Generation::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SlotState {
    /// Nothing scheduled; the published result matches the latest request.
    Idle,
    /// A recompute job is in the queue and has not started.
    Queued,
    /// A worker is sampling the configuration it snapshotted.
    Running,
    /// A worker is sampling, and the configuration changed since it started.
    RunningDirty,
}

/// What the caller must do after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Schedule {
    /// Push a recompute job for the area.
    Enqueue,
    /// A job is already queued or will be re-queued by the running worker.
    Coalesced,
}

pub(crate) struct AreaSlot {
    pub(crate) area: Arc<PlantingArea>,
    pub(crate) requested: Generation,
    /// Mirror of `requested`, readable by workers without the slot lock.
    pub(crate) latest: Arc<AtomicU64>,
    pub(crate) published: Arc<PlacementResult>,
    pub(crate) published_generation: Generation,
    pub(crate) state: SlotState,
}

impl AreaSlot {
    pub(crate) fn new(area: PlantingArea) -> Self {
        Self {
            area: Arc::new(area),
            requested: 0,
            latest: Arc::new(AtomicU64::new(0)),
            published: Arc::new(PlacementResult::new()),
            published_generation: 0,
            state: SlotState::Idle,
        }
    }

    /// Bumps the requested generation and moves the state machine forward.
    pub(crate) fn invalidate(&mut self) -> (Generation, Schedule) {
        self.requested += 1;
        self.latest.store(self.requested, Ordering::Release);
        let schedule = match self.state {
            SlotState::Idle => {
                self.state = SlotState::Queued;
                Schedule::Enqueue
            }
            SlotState::Running => {
                self.state = SlotState::RunningDirty;
                Schedule::Coalesced
            }
            SlotState::Queued | SlotState::RunningDirty => Schedule::Coalesced,
        };
        (self.requested, schedule)
    }

    /// Claims a queued job. Returns the snapshot to sample, or `None` if the job is stale.
    pub(crate) fn begin(&mut self) -> Option<(Arc<PlantingArea>, Generation)> {
        if self.state != SlotState::Queued {
            return None;
        }
        self.state = SlotState::Running;
        Some((self.area.clone(), self.requested))
    }

    /// Records the outcome of a run started at `generation`.
    ///
    /// Returns whether the result was published and whether the area must be re-queued.
    pub(crate) fn finish(
        &mut self,
        generation: Generation,
        result: Option<PlacementResult>,
    ) -> (bool, Schedule) {
        let published = match result {
            Some(result) if generation > self.published_generation => {
                self.published = Arc::new(result);
                self.published_generation = generation;
                true
            }
            _ => false,
        };
        let schedule = if self.state == SlotState::RunningDirty {
            self.state = SlotState::Queued;
            Schedule::Enqueue
        } else {
            self.state = SlotState::Idle;
            Schedule::Coalesced
        };
        (published, schedule)
    }

    pub(crate) fn mark_removed(&self) {
        self.latest.store(REMOVED, Ordering::Release);
    }

    pub(crate) fn is_converged(&self) -> bool {
        self.published_generation >= self.requested
    }
}
