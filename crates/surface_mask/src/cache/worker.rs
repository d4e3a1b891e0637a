//! Background recompute workers.
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::Ordering;
use std::sync::Arc;

use crossbeam_channel::Receiver;
use tracing::{debug, trace, warn};

use crate::cache::slot::{Schedule, REMOVED};
use crate::cache::{AreaId, CacheEvent, Job, Shared};
use crate::placement::sampler::sample_cancellable;

pub(crate) fn run(shared: Arc<Shared>, jobs: Receiver<Job>) {
    while let Ok(job) = jobs.recv() {
        match job {
            Job::Shutdown => break,
            Job::Recompute(id) => {
                if shared.shutdown.load(Ordering::Acquire) {
                    break;
                }
                recompute(&shared, id);
            }
        }
    }
    trace!("Placement worker exiting.");
}

fn recompute(shared: &Shared, id: AreaId) {
    let (area, generation, latest) = {
        let mut slots = shared.lock_slots();
        let Some(slot) = slots.get_mut(&id) else {
            trace!("Area {:?} removed before recompute started.", id);
            return;
        };
        let Some((area, generation)) = slot.begin() else {
            return;
        };
        (area, generation, slot.latest.clone())
    };

    // A panicking provider must not leave the slot stuck in `Running`: the run
    // finishes as aborted and the slot waits for the next invalidation.
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
        let store = shared.read_store();
        sample_cancellable(&area, &store, &shared.grid, &mut (), &|| {
            let current = latest.load(Ordering::Acquire);
            shared.shutdown.load(Ordering::Acquire)
                || current == REMOVED
                || (shared.abort_stale && current != generation)
        })
    }))
    .unwrap_or_else(|payload| {
        warn!(
            "Recompute of area {:?} generation {} panicked: {}",
            id,
            generation,
            panic_message(payload.as_ref())
        );
        None
    });
    let placements = outcome.as_ref().map(|r| r.len());

    let mut slots = shared.lock_slots();
    let Some(slot) = slots.get_mut(&id) else {
        drop(slots);
        shared.published.notify_all();
        return;
    };
    let (published, schedule) = slot.finish(generation, outcome);
    if schedule == Schedule::Enqueue {
        shared.enqueue(id);
    }
    drop(slots);

    match (published, placements) {
        (true, Some(placements)) => {
            debug!(
                "Published area {:?} generation {}: {} placements.",
                id, generation, placements
            );
            shared.emit(CacheEvent::Published {
                area: id,
                generation,
                placements,
            });
        }
        (_, None) => {
            debug!("Recompute of area {:?} generation {} aborted.", id, generation);
            shared.emit(CacheEvent::Aborted {
                area: id,
                generation,
            });
        }
        _ => {}
    }
    shared.published.notify_all();
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}
