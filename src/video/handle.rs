use std::fmt;

use super::backends::Backend;
use super::errors::*;
use super::kind::ResourceKind;
use super::reclaim::Reclaimer;

/// The opaque name of a native resource, as produced by the backend.
pub type NativeId = u32;

/// The reserved id which never names a native resource.
pub const NONE_ID: NativeId = 0;

/// The observable lifecycle state of a `ResourceHandle`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HandleState {
    Unallocated,
    Allocated,
}

/// `ResourceHandle` owns exactly one native resource id of a given kind.
///
/// A handle is born allocated and stays so until `destroy` succeeds, at which point
/// the id is forgotten. Dropping a handle that is still allocated never touches the
/// backend: the id is pushed onto the reclamation queue of its kind instead, and will
/// be released by the next sweep on the render thread.
pub struct ResourceHandle {
    kind: ResourceKind,
    id: NativeId,
    reclaimer: Reclaimer,
}

impl ResourceHandle {
    /// Allocates a new native resource of `kind`.
    pub fn allocate(
        kind: ResourceKind,
        backend: &mut dyn Backend,
        reclaimer: &Reclaimer,
    ) -> Result<Self> {
        let id = backend.allocate(kind).map_err(|err| match err {
            Error::BackendAllocationFailed(..) => err,
            other => Error::BackendAllocationFailed(kind, other.to_string()),
        })?;

        if id == NONE_ID {
            return Err(Error::BackendAllocationFailed(
                kind,
                "backend produced the reserved null id".to_owned(),
            ));
        }

        reclaimer.on_allocated(kind);
        trace!("Allocated {} {}.", kind, id);

        Ok(ResourceHandle {
            kind,
            id,
            reclaimer: reclaimer.clone(),
        })
    }

    /// Releases the native resource right away. Calling this on a handle which has
    /// already been destroyed is a no-op.
    ///
    /// The id is forgotten even if the backend reports a failure, since a second
    /// release of the same name is never safe. The failure is returned as
    /// `BackendReleaseFailed` and the resource should be considered leaked.
    pub fn destroy(&mut self, backend: &mut dyn Backend) -> Result<()> {
        if self.id == NONE_ID {
            return Ok(());
        }

        let id = self.id;
        self.id = NONE_ID;
        self.reclaimer.on_released(self.kind);

        match backend.release(self.kind, &[id]) {
            Ok(()) => Ok(()),
            Err(err) => {
                error!("Failed to release {} {}: {}", self.kind, id, err);
                match err {
                    Error::BackendReleaseFailed { .. } => Err(err),
                    _ => Err(Error::release_failed(self.kind, &[id])),
                }
            }
        }
    }

    #[inline]
    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Returns the native id, or `NONE_ID` once destroyed.
    #[inline]
    pub fn id(&self) -> NativeId {
        self.id
    }

    #[inline]
    pub fn is_allocated(&self) -> bool {
        self.id != NONE_ID
    }

    #[inline]
    pub fn state(&self) -> HandleState {
        if self.is_allocated() {
            HandleState::Allocated
        } else {
            HandleState::Unallocated
        }
    }
}

impl Drop for ResourceHandle {
    fn drop(&mut self) {
        if self.id != NONE_ID {
            self.reclaimer.on_released(self.kind);
            self.reclaimer.enqueue(self.kind, self.id);
            self.id = NONE_ID;
        }
    }
}

impl fmt::Debug for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("ResourceHandle")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

impl fmt::Display for ResourceHandle {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.id)
    }
}
