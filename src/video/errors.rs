use smallvec::SmallVec;

use failure::Fail;

use super::kind::ResourceKind;
use super::NativeId;

#[derive(Debug, Fail)]
pub enum Error {
    #[fail(display = "Backend failed to allocate {}: {}", _0, _1)]
    BackendAllocationFailed(ResourceKind, String),
    #[fail(display = "Backend failed to release {} {:?}, resources leaked.", kind, ids)]
    BackendReleaseFailed {
        kind: ResourceKind,
        ids: SmallVec<[NativeId; 4]>,
    },
    #[fail(display = "Unbalanced begin/end of {}: {}", _0, _1)]
    DoubleEndOperation(&'static str, String),
    #[fail(display = "Expected a {} handle, found a {} one.", _0, _1)]
    KindMismatch(ResourceKind, ResourceKind),
    #[fail(display = "{} is invalid.", _0)]
    HandleInvalid(String),
    #[fail(display = "Native implementation doesn\'t support {}.", _0)]
    Requirement(String),
    #[fail(display = "Failed to create backend context: {}", _0)]
    ContextCreationFailure(String),
    #[fail(display = "Backend: {}", _0)]
    Backend(String),
}

pub type Result<T> = ::std::result::Result<T, Error>;

impl Error {
    /// Builds a `BackendReleaseFailed` for the given ids.
    pub fn release_failed(kind: ResourceKind, ids: &[NativeId]) -> Self {
        Error::BackendReleaseFailed {
            kind,
            ids: ids.iter().cloned().collect(),
        }
    }

    /// Returns true if this error means native resources have been leaked.
    pub fn is_leak(&self) -> bool {
        match *self {
            Error::BackendReleaseFailed { .. } => true,
            _ => false,
        }
    }
}
