//! Deferred release of native resources whose owners went away without destroying them.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use smallvec::SmallVec;

use super::backends::Backend;
use super::errors::*;
use super::handle::{NativeId, NONE_ID};
use super::kind::ResourceKind;

struct Pending {
    // Physical storage. Only `ids[..len]` is meaningful.
    ids: Vec<NativeId>,
    len: usize,
}

impl Pending {
    fn with_capacity(capacity: usize) -> Self {
        Pending {
            ids: vec![NONE_ID; capacity.max(1)],
            len: 0,
        }
    }

    fn push(&mut self, id: NativeId) {
        if self.len == self.ids.len() {
            let mut grown = vec![NONE_ID; self.ids.len() * 2];
            grown[..self.len].copy_from_slice(&self.ids[..self.len]);
            self.ids = grown;
        }

        self.ids[self.len] = id;
        self.len += 1;
    }
}

/// A growable queue of ids pending release, for one `ResourceKind`.
///
/// `enqueue` may be called from any thread, including `Drop` implementations, and
/// never calls into the backend. `drain` must only be called from the render thread
/// which owns the backend context.
pub struct ReclamationQueue {
    kind: ResourceKind,
    pending: Mutex<Pending>,
}

impl ReclamationQueue {
    pub fn new(kind: ResourceKind, capacity: usize) -> Self {
        ReclamationQueue {
            kind,
            pending: Mutex::new(Pending::with_capacity(capacity)),
        }
    }

    #[inline]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Pushes an orphaned id. The null id is ignored.
    pub fn enqueue(&self, id: NativeId) {
        if id == NONE_ID {
            return;
        }

        self.lock().push(id);
    }

    /// Returns the number of ids waiting for the next drain.
    #[inline]
    pub fn len(&self) -> usize {
        self.lock().len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the physical capacity of the queue, which only ever grows.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.lock().ids.len()
    }

    /// Returns a copy of the pending ids, in enqueue order.
    pub fn snapshot(&self) -> Vec<NativeId> {
        let pending = self.lock();
        pending.ids[..pending.len].to_vec()
    }

    /// Releases every pending id with a single batched backend call, and resets the
    /// queue. Returns the number of ids taken off the queue.
    ///
    /// The ids are taken off the queue even if the backend reports a failure; the
    /// error names the ids which leaked.
    pub fn drain(&self, backend: &mut dyn Backend) -> Result<usize> {
        let ids = self.take();
        self.release(backend, &ids)?;
        Ok(ids.len())
    }

    /// Returns true if `id` is waiting for the next drain.
    pub fn contains(&self, id: NativeId) -> bool {
        let pending = self.lock();
        pending.ids[..pending.len].contains(&id)
    }

    fn take(&self) -> Vec<NativeId> {
        let mut pending = self.lock();
        let ids = pending.ids[..pending.len].to_vec();
        pending.len = 0;
        ids
    }

    fn release(&self, backend: &mut dyn Backend, ids: &[NativeId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        match backend.release(self.kind, ids) {
            Ok(()) => Ok(()),
            Err(err @ Error::BackendReleaseFailed { .. }) => Err(err),
            Err(_) => Err(Error::release_failed(self.kind, ids)),
        }
    }

    fn lock(&self) -> MutexGuard<Pending> {
        // A panic while holding the lock can not leave `Pending` half updated in a way
        // that loses ids, so keep going with the inner value.
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// The outcome of draining every reclamation queue once.
#[derive(Debug, Default)]
pub struct Sweep {
    /// Number of ids successfully released, indexed by `ResourceKind::index`.
    pub reclaimed: [usize; ResourceKind::COUNT],
    /// Release failures collected during the sweep.
    pub leaks: SmallVec<[Error; 2]>,
}

impl Sweep {
    /// Total number of ids released during this sweep.
    pub fn total(&self) -> usize {
        self.reclaimed.iter().sum()
    }

    #[inline]
    pub fn reclaimed(&self, kind: ResourceKind) -> usize {
        self.reclaimed[kind.index()]
    }
}

struct ReclaimerShared {
    queues: Vec<ReclamationQueue>,
    alive: Vec<AtomicUsize>,
}

/// The set of reclamation queues, one per `ResourceKind`, plus the bookkeeping of live
/// handles. Cheap to clone; every clone refers to the same queues.
#[derive(Clone)]
pub struct Reclaimer {
    shared: Arc<ReclaimerShared>,
}

impl Reclaimer {
    /// Creates queues for every kind, each with `capacity` initial slots.
    pub fn new(capacity: usize) -> Self {
        let queues = ResourceKind::ALL
            .iter()
            .map(|&kind| ReclamationQueue::new(kind, capacity))
            .collect();

        let alive = ResourceKind::ALL
            .iter()
            .map(|_| AtomicUsize::new(0))
            .collect();

        Reclaimer {
            shared: Arc::new(ReclaimerShared { queues, alive }),
        }
    }

    #[inline]
    pub fn queue(&self, kind: ResourceKind) -> &ReclamationQueue {
        &self.shared.queues[kind.index()]
    }

    #[inline]
    pub fn enqueue(&self, kind: ResourceKind, id: NativeId) {
        self.queue(kind).enqueue(id);
    }

    /// Returns the number of ids of `kind` waiting for release.
    #[inline]
    pub fn pending(&self, kind: ResourceKind) -> usize {
        self.queue(kind).len()
    }

    /// Returns the number of allocated handles of `kind` that are still owned.
    #[inline]
    pub fn alive(&self, kind: ResourceKind) -> usize {
        self.shared.alive[kind.index()].load(Ordering::Acquire)
    }

    /// Drains every queue in `ResourceKind::ALL` order. A failure in one queue does not
    /// prevent the remaining queues from being drained.
    pub fn sweep(&self, backend: &mut dyn Backend) -> Sweep {
        let mut sweep = Sweep::default();

        for queue in &self.shared.queues {
            // Ids enqueued from now on are left for the next sweep.
            let ids = queue.take();
            let index = queue.kind().index();

            match queue.release(backend, &ids) {
                Ok(()) => sweep.reclaimed[index] += ids.len(),
                Err(err) => {
                    let leaked = match err {
                        Error::BackendReleaseFailed { ids: ref failed, .. } => failed.len(),
                        _ => ids.len(),
                    };

                    error!("Reclamation of {} failed: {}", queue.kind(), err);
                    sweep.reclaimed[index] += ids.len().saturating_sub(leaked);
                    sweep.leaks.push(err);
                }
            }
        }

        if sweep.total() > 0 {
            debug!("Reclaimed {} orphaned native resources.", sweep.total());
        }

        sweep
    }

    pub(crate) fn on_allocated(&self, kind: ResourceKind) {
        self.shared.alive[kind.index()].fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn on_released(&self, kind: ResourceKind) {
        self.shared.alive[kind.index()].fetch_sub(1, Ordering::AcqRel);
    }
}
