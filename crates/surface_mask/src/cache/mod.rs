//! Asynchronous placement cache.
//!
//! The cache owns planting areas and the surface tag store, and keeps the last
//! completed [`PlacementResult`] of every area. Configuration changes only bump the
//! area's requested [`Generation`] and schedule a background recompute; queries read
//! whatever was published last and never block on a recompute.
//!
//! Callers that need a converged answer wait with a timeout, either for a generation
//! ([`PlacementCache::wait_for_generation`]) or for an expected count
//! ([`PlacementCache::wait_for_instance_count`]).
//!
//! Recomputes of different areas run in parallel. For a single area, invalidations
//! arriving while a job is queued are coalesced, and a run whose configuration became
//! stale is abandoned at the next grid row and started again.
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender, TrySendError};
use tracing::{debug, info, warn};

use crate::area::PlantingArea;
use crate::error::{Error, Result};
use crate::placement::PlacementResult;
use crate::sampling::GridSampling;
use crate::shape::Shape;
use crate::surface::SurfaceTagStore;

mod slot;
mod worker;

use slot::{AreaSlot, Schedule};

/// Handle of a planting area owned by a [`PlacementCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AreaId(pub u64);

/// Monotonic configuration version of an area. Generation 0 is the empty initial result.
pub type Generation = u64;

/// Notifications published by the cache when events are enabled.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A recompute was requested for the area.
    Scheduled { area: AreaId, generation: Generation },
    /// A new result became visible to queries.
    Published {
        area: AreaId,
        generation: Generation,
        placements: usize,
    },
    /// A recompute was abandoned because its configuration went stale or sampling failed.
    Aborted { area: AreaId, generation: Generation },
    /// The area and its result were dropped.
    Removed { area: AreaId },
}

/// Default number of undelivered [`CacheEvent`]s kept before the oldest is dropped.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Configuration for a [`PlacementCache`].
#[non_exhaustive]
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Number of background recompute threads.
    pub worker_threads: usize,
    /// Grid used to sample every area.
    pub grid: GridSampling,
    /// Whether [`CacheEvent`]s are published on [`PlacementCache::events`].
    pub emit_events: bool,
    /// Capacity of the event channel. When it is full the oldest event is dropped.
    pub event_capacity: usize,
    /// Whether a running recompute is abandoned once its configuration is superseded.
    /// When off, superseded runs finish and are published before the rerun.
    pub abort_stale: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let worker_threads = std::thread::available_parallelism()
            .map(|n| n.get().min(4))
            .unwrap_or(1);
        Self {
            worker_threads,
            grid: GridSampling::default(),
            emit_events: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
            abort_stale: true,
        }
    }
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the number of worker threads.
    pub fn with_worker_threads(mut self, worker_threads: usize) -> Self {
        self.worker_threads = worker_threads;
        self
    }

    /// Sets the sampling grid.
    pub fn with_grid(mut self, grid: GridSampling) -> Self {
        self.grid = grid;
        self
    }

    /// Enables or disables the event channel.
    pub fn with_events(mut self, emit_events: bool) -> Self {
        self.emit_events = emit_events;
        self
    }

    /// Sets the event channel capacity.
    pub fn with_event_capacity(mut self, event_capacity: usize) -> Self {
        self.event_capacity = event_capacity;
        self
    }

    /// Enables or disables abandoning superseded recomputes.
    pub fn with_abort_stale(mut self, abort_stale: bool) -> Self {
        self.abort_stale = abort_stale;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.worker_threads == 0 {
            return Err(Error::InvalidConfig("worker_threads must be > 0".into()));
        }
        if self.event_capacity == 0 {
            return Err(Error::InvalidConfig("event_capacity must be > 0".into()));
        }
        self.grid.validate()
    }
}

pub(crate) enum Job {
    Recompute(AreaId),
    Shutdown,
}

pub(crate) struct Shared {
    slots: Mutex<HashMap<AreaId, AreaSlot>>,
    /// Signalled whenever a slot publishes, aborts or is removed.
    published: Condvar,
    store: RwLock<SurfaceTagStore>,
    grid: GridSampling,
    abort_stale: bool,
    jobs: Sender<Job>,
    /// The cache keeps a receiver so that a full channel can drop its oldest event.
    events: Option<(Sender<CacheEvent>, Receiver<CacheEvent>)>,
    shutdown: AtomicBool,
}

impl Shared {
    fn lock_slots(&self) -> MutexGuard<'_, HashMap<AreaId, AreaSlot>> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_store(&self) -> RwLockReadGuard<'_, SurfaceTagStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn enqueue(&self, id: AreaId) {
        if self.jobs.send(Job::Recompute(id)).is_err() {
            warn!("Placement workers are gone; area {:?} will not be recomputed.", id);
        }
    }

    fn emit(&self, event: CacheEvent) {
        let Some((tx, rx)) = &self.events else {
            return;
        };
        let mut event = event;
        loop {
            match tx.try_send(event) {
                Ok(()) | Err(TrySendError::Disconnected(_)) => return,
                Err(TrySendError::Full(back)) => {
                    let _ = rx.try_recv();
                    event = back;
                }
            }
        }
    }

    /// Invalidates a slot under the caller's lock.
    fn invalidate_slot(&self, id: AreaId, slot: &mut AreaSlot) -> Generation {
        let (generation, schedule) = slot.invalidate();
        if schedule == Schedule::Enqueue {
            self.enqueue(id);
        }
        debug!("Area {:?} invalidated at generation {}.", id, generation);
        self.emit(CacheEvent::Scheduled {
            area: id,
            generation,
        });
        generation
    }
}

/// Background-recomputed placement results for a set of planting areas.
pub struct PlacementCache {
    shared: Arc<Shared>,
    workers: Vec<JoinHandle<()>>,
    next_area: AtomicU64,
}

impl PlacementCache {
    /// Creates a cache with an empty surface tag store.
    pub fn new(config: CacheConfig) -> Result<Self> {
        Self::with_store(config, SurfaceTagStore::new())
    }

    /// Creates a cache that samples against `store`.
    pub fn with_store(config: CacheConfig, store: SurfaceTagStore) -> Result<Self> {
        config.validate()?;

        let (jobs_tx, jobs_rx) = crossbeam_channel::unbounded();
        let events = config
            .emit_events
            .then(|| crossbeam_channel::bounded(config.event_capacity));

        let shared = Arc::new(Shared {
            slots: Mutex::new(HashMap::new()),
            published: Condvar::new(),
            store: RwLock::new(store),
            grid: config.grid.clone(),
            abort_stale: config.abort_stale,
            jobs: jobs_tx,
            events,
            shutdown: AtomicBool::new(false),
        });

        let mut cache = Self {
            shared,
            workers: Vec::with_capacity(config.worker_threads),
            next_area: AtomicU64::new(0),
        };
        for i in 0..config.worker_threads {
            let shared = cache.shared.clone();
            let jobs = jobs_rx.clone();
            let handle = std::thread::Builder::new()
                .name(format!("surface-mask-{i}"))
                .spawn(move || worker::run(shared, jobs))
                .map_err(Error::WorkerSpawn)?;
            cache.workers.push(handle);
        }
        info!(
            "Placement cache started with {} worker(s), grid spacing {}.",
            config.worker_threads, config.grid.spacing
        );
        Ok(cache)
    }

    /// Adds an area and schedules its first computation.
    pub fn insert_area(&self, area: PlantingArea) -> AreaId {
        let id = AreaId(self.next_area.fetch_add(1, Ordering::Relaxed));
        let mut slots = self.shared.lock_slots();
        let slot = slots.entry(id).or_insert_with(|| AreaSlot::new(area));
        self.shared.invalidate_slot(id, slot);
        id
    }

    /// Removes an area together with its result, returning its configuration.
    pub fn remove_area(&self, id: AreaId) -> Option<PlantingArea> {
        let slot = self.shared.lock_slots().remove(&id)?;
        slot.mark_removed();
        self.shared.published.notify_all();
        self.shared.emit(CacheEvent::Removed { area: id });
        debug!("Area {:?} removed.", id);
        Some(Arc::unwrap_or_clone(slot.area))
    }

    /// Marks the area's result stale and schedules a recompute.
    ///
    /// Returns the generation the area must reach to reflect the current configuration.
    pub fn invalidate(&self, id: AreaId) -> Result<Generation> {
        let mut slots = self.shared.lock_slots();
        let slot = slots.get_mut(&id).ok_or(Error::UnknownArea { id })?;
        Ok(self.shared.invalidate_slot(id, slot))
    }

    /// Invalidates every area, e.g. after the surfaces changed.
    pub fn invalidate_all(&self) -> usize {
        let mut slots = self.shared.lock_slots();
        for (id, slot) in slots.iter_mut() {
            self.shared.invalidate_slot(*id, slot);
        }
        slots.len()
    }

    /// Applies a typed mutation to an area and invalidates it.
    ///
    /// If `f` fails, the area keeps its previous configuration and nothing is scheduled.
    pub fn update_area<F>(&self, id: AreaId, f: F) -> Result<Generation>
    where
        F: FnOnce(&mut PlantingArea) -> Result<()>,
    {
        let mut slots = self.shared.lock_slots();
        let slot = slots.get_mut(&id).ok_or(Error::UnknownArea { id })?;
        let mut area = PlantingArea::clone(&slot.area);
        f(&mut area)?;
        slot.area = Arc::new(area);
        Ok(self.shared.invalidate_slot(id, slot))
    }

    /// Mutates the surface tag store and invalidates every area.
    pub fn update_surfaces<R>(&self, f: impl FnOnce(&mut SurfaceTagStore) -> R) -> R {
        let out = {
            let mut store = self
                .shared
                .store
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            f(&mut store)
        };
        self.invalidate_all();
        out
    }

    /// Read access to the surface tag store.
    pub fn with_surfaces<R>(&self, f: impl FnOnce(&SurfaceTagStore) -> R) -> R {
        f(&self.shared.read_store())
    }

    /// Current configuration of an area.
    pub fn area(&self, id: AreaId) -> Option<Arc<PlantingArea>> {
        self.shared.lock_slots().get(&id).map(|s| s.area.clone())
    }

    pub fn area_ids(&self) -> Vec<AreaId> {
        let mut ids: Vec<_> = self.shared.lock_slots().keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Last published result of an area.
    pub fn result(&self, id: AreaId) -> Option<Arc<PlacementResult>> {
        self.shared.lock_slots().get(&id).map(|s| s.published.clone())
    }

    /// Number of published placements of the area inside `query_shape`.
    ///
    /// Reads the last completed recompute, which may lag recent changes. Unknown areas
    /// count as empty.
    pub fn get_instance_count(&self, id: AreaId, query_shape: &Shape) -> usize {
        match self.result(id) {
            Some(result) => result.count_in(query_shape),
            None => {
                debug!("Instance count requested for unknown area {:?}.", id);
                0
            }
        }
    }

    pub fn requested_generation(&self, id: AreaId) -> Option<Generation> {
        self.shared.lock_slots().get(&id).map(|s| s.requested)
    }

    pub fn completed_generation(&self, id: AreaId) -> Option<Generation> {
        self.shared
            .lock_slots()
            .get(&id)
            .map(|s| s.published_generation)
    }

    /// Whether the published result reflects the latest configuration.
    pub fn is_converged(&self, id: AreaId) -> bool {
        self.shared
            .lock_slots()
            .get(&id)
            .is_some_and(|s| s.is_converged())
    }

    /// Waits until the area has published `generation` or later.
    ///
    /// Returns `false` on timeout or if the area is removed.
    pub fn wait_for_generation(&self, id: AreaId, generation: Generation, timeout: Duration) -> bool {
        self.wait_until(id, timeout, |slot| slot.published_generation >= generation)
    }

    /// Waits until the area's result reflects its latest configuration.
    pub fn wait_until_converged(&self, id: AreaId, timeout: Duration) -> bool {
        self.wait_until(id, timeout, |slot| slot.is_converged())
    }

    /// Waits until the published count inside `query_shape` equals `expected`.
    pub fn wait_for_instance_count(
        &self,
        id: AreaId,
        query_shape: &Shape,
        expected: usize,
        timeout: Duration,
    ) -> bool {
        self.wait_until(id, timeout, |slot| {
            slot.published.count_in(query_shape) == expected
        })
    }

    fn wait_until(
        &self,
        id: AreaId,
        timeout: Duration,
        mut done: impl FnMut(&AreaSlot) -> bool,
    ) -> bool {
        let deadline = Instant::now() + timeout;
        let mut slots = self.shared.lock_slots();
        loop {
            match slots.get(&id) {
                None => return false,
                Some(slot) if done(slot) => return true,
                Some(_) => {}
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            let (guard, _) = self
                .shared
                .published
                .wait_timeout(slots, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            slots = guard;
        }
    }

    /// Receiver for [`CacheEvent`]s, if enabled in [`CacheConfig`].
    /// Receiver of [`CacheEvent`]s, if enabled.
    ///
    /// The channel holds at most [`CacheConfig::event_capacity`] events; when nobody
    /// drains it, older events are dropped in favour of newer ones.
    pub fn events(&self) -> Option<Receiver<CacheEvent>> {
        self.shared.events.as_ref().map(|(_, rx)| rx.clone())
    }

    pub fn grid(&self) -> &GridSampling {
        &self.shared.grid
    }
}

impl Drop for PlacementCache {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        for _ in &self.workers {
            let _ = self.shared.jobs.send(Job::Shutdown);
        }
        for handle in self.workers.drain(..) {
            if handle.join().is_err() {
                warn!("Placement worker panicked during shutdown.");
            }
        }
    }
}

impl std::fmt::Debug for PlacementCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlacementCache")
            .field("areas", &self.area_ids())
            .field("workers", &self.workers.len())
            .finish()
    }
}
