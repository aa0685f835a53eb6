use std::fmt;

use super::backends::Backend;
use super::errors::*;
use super::handle::{NativeId, ResourceHandle};
use super::kind::ResourceKind;

/// Exclusive recording scopes. At most one scope of each kind can be active at any time.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Scope {
    Query,
    DisplayList,
}

impl Scope {
    /// The kind of resource a scope records into.
    #[inline]
    pub fn kind(self) -> ResourceKind {
        match self {
            Scope::Query => ResourceKind::Query,
            Scope::DisplayList => ResourceKind::DisplayList,
        }
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            Scope::Query => "query",
            Scope::DisplayList => "display list",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Tracks the currently active query and display list.
#[derive(Debug, Default)]
pub struct ScopeTracker {
    query: Option<NativeId>,
    list: Option<NativeId>,
}

impl ScopeTracker {
    pub fn new() -> Self {
        ScopeTracker::default()
    }

    /// Returns the id recording into `scope`, if any.
    #[inline]
    pub fn active(&self, scope: Scope) -> Option<NativeId> {
        match scope {
            Scope::Query => self.query,
            Scope::DisplayList => self.list,
        }
    }

    /// Returns the scopes which have been begun but not ended yet.
    pub fn open(&self) -> impl Iterator<Item = (Scope, NativeId)> {
        let query = self.query.map(|id| (Scope::Query, id));
        let list = self.list.map(|id| (Scope::DisplayList, id));
        query.into_iter().chain(list)
    }

    pub fn begin(
        &mut self,
        backend: &mut dyn Backend,
        scope: Scope,
        handle: &ResourceHandle,
    ) -> Result<()> {
        if handle.kind() != scope.kind() {
            return Err(Error::KindMismatch(scope.kind(), handle.kind()));
        }

        if !handle.is_allocated() {
            return Err(Error::HandleInvalid(handle.to_string()));
        }

        if let Some(active) = self.active(scope) {
            return Err(Error::DoubleEndOperation(
                scope.name(),
                format!("can not begin {} while {} is still active", handle.id(), active),
            ));
        }

        backend.begin_scope(scope, handle.id())?;
        *self.slot(scope) = Some(handle.id());
        Ok(())
    }

    /// Ends the active scope, returning the id which was recorded into.
    pub fn end(&mut self, backend: &mut dyn Backend, scope: Scope) -> Result<NativeId> {
        let id = self.slot(scope).take().ok_or_else(|| {
            Error::DoubleEndOperation(scope.name(), "ended without being begun".to_owned())
        })?;

        backend.end_scope(scope)?;
        Ok(id)
    }

    /// Ends the scope recording into `handle`, if any, returning it.
    ///
    /// The scope is forgotten even if the backend fails to end it.
    pub fn end_recording(
        &mut self,
        backend: &mut dyn Backend,
        handle: &ResourceHandle,
    ) -> Result<Option<Scope>> {
        if !handle.is_allocated() {
            return Ok(None);
        }

        for &scope in &[Scope::Query, Scope::DisplayList] {
            if scope.kind() == handle.kind() && self.active(scope) == Some(handle.id()) {
                self.end(backend, scope)?;
                return Ok(Some(scope));
            }
        }

        Ok(None)
    }

    fn slot(&mut self, scope: Scope) -> &mut Option<NativeId> {
        match scope {
            Scope::Query => &mut self.query,
            Scope::DisplayList => &mut self.list,
        }
    }
}
