//! Native resource lifecycle management.
//!
//! # Handles
//!
//! A `ResourceHandle` owns exactly one native id of some `ResourceKind`. It is created
//! already allocated, and `destroy` releases the id immediately:
//!
//! ```rust,ignore
//! let mut texture = ResourceHandle::allocate(ResourceKind::Texture, backend, &reclaimer)?;
//! assert!(texture.is_allocated());
//!
//! texture.destroy(backend)?;
//! texture.destroy(backend)?; // No-op.
//! ```
//!
//! # Reclamation
//!
//! The backend may only be touched from the render thread, while handles are free to be
//! dropped anywhere. Dropping a handle which is still allocated pushes its id onto the
//! `ReclamationQueue` of its kind, and the next `Reclaimer::sweep` releases every queued
//! id of a kind with one batched backend call. The `Orchestrator` sweeps once per frame.
//!
//! # Backends
//!
//! The `Backend` trait is the only way native calls are issued. `HeadlessBackend` records
//! everything into a `Journal` and never fails unless asked to, and `GLBackend` talks to
//! the current OpenGL context.

pub mod backends;
pub mod command;
pub mod errors;
pub mod handle;
pub mod kind;
pub mod reclaim;
pub mod scope;

pub use self::handle::{NativeId, NONE_ID};

pub mod prelude {
    pub use super::backends::headless::{Call, HeadlessBackend, Journal};
    pub use super::backends::Backend;
    pub use super::command::{DrawCall, Primitive};
    pub use super::handle::{HandleState, NativeId, ResourceHandle, NONE_ID};
    pub use super::kind::ResourceKind;
    pub use super::reclaim::{ReclamationQueue, Reclaimer, Sweep};
    pub use super::scope::{Scope, ScopeTracker};
}
