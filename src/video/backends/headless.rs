use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use super::super::command::DrawCall;
use super::super::errors::*;
use super::super::handle::NativeId;
use super::super::kind::ResourceKind;
use super::super::scope::Scope;
use super::Backend;

/// A backend call, as seen by `HeadlessBackend`.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Allocate(ResourceKind, NativeId),
    Release(ResourceKind, Vec<NativeId>),
    Draw(DrawCall),
    BeginScope(Scope, NativeId),
    EndScope(Scope),
    Advance,
    Flush,
}

#[derive(Default)]
struct JournalState {
    calls: Vec<Call>,
    next_id: NativeId,
    live: HashSet<(ResourceKind, NativeId)>,
    failing_allocations: HashSet<ResourceKind>,
    failing_releases: HashSet<NativeId>,
}

impl JournalState {
    fn next(&mut self, kind: ResourceKind) -> NativeId {
        self.next_id += 1;
        self.live.insert((kind, self.next_id));
        self.next_id
    }
}

/// The shared record of everything a `HeadlessBackend` has been asked to do. It stays
/// readable after the backend has been handed over to an orchestrator.
#[derive(Clone, Default)]
pub struct Journal {
    state: Arc<Mutex<JournalState>>,
}

impl Journal {
    /// Returns a copy of all calls so far.
    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    /// Returns every id of `kind` released so far, in release order.
    pub fn released(&self, kind: ResourceKind) -> Vec<NativeId> {
        self.lock()
            .calls
            .iter()
            .filter_map(|v| match *v {
                Call::Release(k, ref ids) if k == kind => Some(ids.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Returns the number of release calls issued for `kind`.
    pub fn release_calls(&self, kind: ResourceKind) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|v| match **v {
                Call::Release(k, _) => k == kind,
                _ => false,
            })
            .count()
    }

    /// Returns the number of ids allocated so far, of any kind.
    pub fn allocations(&self) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|v| match **v {
                Call::Allocate(..) => true,
                _ => false,
            })
            .count()
    }

    /// Returns true if `id` has been allocated as `kind` and not released yet.
    pub fn is_live(&self, kind: ResourceKind, id: NativeId) -> bool {
        self.lock().live.contains(&(kind, id))
    }

    /// Allocates an id directly, without going through a handle.
    pub fn preallocate(&self, kind: ResourceKind) -> NativeId {
        self.lock().next(kind)
    }

    /// Makes every allocation of `kind` fail (or succeed again).
    pub fn fail_allocations(&self, kind: ResourceKind, fail: bool) {
        let mut state = self.lock();
        if fail {
            state.failing_allocations.insert(kind);
        } else {
            state.failing_allocations.remove(&kind);
        }
    }

    /// Makes any release of `id` fail.
    pub fn fail_release(&self, id: NativeId) {
        self.lock().failing_releases.insert(id);
    }

    /// Forgets recorded calls, keeping live ids and injected failures.
    pub fn clear(&self) {
        self.lock().calls.clear();
    }

    fn lock(&self) -> MutexGuard<JournalState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// A backend without any native context. Ids are handed out sequentially, and every
/// call is recorded into a `Journal`.
#[derive(Default)]
pub struct HeadlessBackend {
    journal: Journal,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        HeadlessBackend::default()
    }

    /// Returns a handle to the journal of this backend.
    pub fn journal(&self) -> Journal {
        self.journal.clone()
    }
}

impl Backend for HeadlessBackend {
    fn allocate(&mut self, kind: ResourceKind) -> Result<NativeId> {
        let mut state = self.journal.lock();
        if state.failing_allocations.contains(&kind) {
            return Err(Error::BackendAllocationFailed(
                kind,
                "injected failure".to_owned(),
            ));
        }

        let id = state.next(kind);
        state.calls.push(Call::Allocate(kind, id));
        Ok(id)
    }

    fn release(&mut self, kind: ResourceKind, ids: &[NativeId]) -> Result<()> {
        let mut state = self.journal.lock();
        state.calls.push(Call::Release(kind, ids.to_vec()));

        let mut failed = Vec::new();
        for &id in ids {
            if state.failing_releases.contains(&id) || !state.live.remove(&(kind, id)) {
                failed.push(id);
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(Error::release_failed(kind, &failed))
        }
    }

    fn submit_draw(&mut self, dc: &DrawCall) -> Result<u32> {
        let mut state = self.journal.lock();

        if !state.live.contains(&(ResourceKind::Shader, dc.program)) {
            return Err(Error::HandleInvalid(format!("shader ({})", dc.program)));
        }

        if !state.live.contains(&(ResourceKind::Buffer, dc.buffer)) {
            return Err(Error::HandleInvalid(format!("buffer ({})", dc.buffer)));
        }

        state.calls.push(Call::Draw(*dc));
        Ok(dc.primitive.polygons(dc.count))
    }

    fn begin_scope(&mut self, scope: Scope, id: NativeId) -> Result<()> {
        self.journal.lock().calls.push(Call::BeginScope(scope, id));
        Ok(())
    }

    fn end_scope(&mut self, scope: Scope) -> Result<()> {
        self.journal.lock().calls.push(Call::EndScope(scope));
        Ok(())
    }

    fn advance(&mut self) -> Result<()> {
        self.journal.lock().calls.push(Call::Advance);
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.journal.lock().calls.push(Call::Flush);
        Ok(())
    }
}
