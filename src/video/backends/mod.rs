//! The backend of the video layer, which should be responsible for only one thing:
//! talking to the native graphics API on the render thread.

pub mod headless;

use super::command::DrawCall;
use super::errors::*;
use super::handle::NativeId;
use super::kind::ResourceKind;
use super::scope::Scope;

/// The native resource capabilities the core relies on.
///
/// All methods are called from the render thread which owns the native context.
pub trait Backend {
    /// Produces a fresh native id of `kind`. Must never return `NONE_ID` on success.
    fn allocate(&mut self, kind: ResourceKind) -> Result<NativeId>;

    /// Releases a batch of ids of the same kind. Bad ids must not prevent the rest of
    /// the batch from being released; they are reported through `BackendReleaseFailed`.
    fn release(&mut self, kind: ResourceKind, ids: &[NativeId]) -> Result<()>;

    /// Submits a draw call, returning the number of polygons it rendered.
    fn submit_draw(&mut self, dc: &DrawCall) -> Result<u32>;

    /// Starts recording into the query or display list named by `id`.
    fn begin_scope(&mut self, scope: Scope, id: NativeId) -> Result<()>;

    /// Stops recording into the active `scope`.
    fn end_scope(&mut self, scope: Scope) -> Result<()>;

    /// Advance one frame, it will be called at the start of every frame.
    fn advance(&mut self) -> Result<()> {
        Ok(())
    }

    /// Flushes submitted commands, called after the pipeline has been drawn.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub mod gl;

/// Creates the OpenGL backend.
///
/// The windowing driver must have made its context current on this thread and loaded
/// the function pointers with `gl::load_with` before the first frame.
#[cfg(not(target_arch = "wasm32"))]
pub fn new() -> Result<Box<dyn Backend>> {
    let backend = unsafe { self::gl::backend::GLBackend::new()? };
    Ok(Box::new(backend))
}

#[cfg(target_arch = "wasm32")]
pub fn new() -> Result<Box<dyn Backend>> {
    Err(Error::Requirement("OpenGL on this target".to_owned()))
}

pub fn new_headless() -> Box<dyn Backend> {
    Box::new(self::headless::HeadlessBackend::new())
}
