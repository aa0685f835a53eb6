use crate::math::Vector2;
use crate::video::backends::Backend;
use crate::video::command::DrawCall;
use crate::video::errors::Result;
use crate::video::handle::{NativeId, ResourceHandle};
use crate::video::kind::ResourceKind;
use crate::video::reclaim::Reclaimer;
use crate::video::scope::{Scope, ScopeTracker};

use super::clock::FrameClock;

/// Everything a node can reach while it is being displayed. Only ever lives on the
/// render thread, for the duration of a single `Pipeline::draw_all`.
pub struct RenderContext<'a> {
    backend: &'a mut dyn Backend,
    reclaimer: &'a Reclaimer,
    scopes: &'a mut ScopeTracker,
    clock: &'a FrameClock,
    dimensions: Vector2<u32>,
    drawcalls: u32,
    polygons: u32,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        backend: &'a mut dyn Backend,
        reclaimer: &'a Reclaimer,
        scopes: &'a mut ScopeTracker,
        clock: &'a FrameClock,
        dimensions: Vector2<u32>,
    ) -> Self {
        RenderContext {
            backend,
            reclaimer,
            scopes,
            clock,
            dimensions,
            drawcalls: 0,
            polygons: 0,
        }
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        self.clock
    }

    /// The size of the canvas in pixels.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    #[inline]
    pub fn reclaimer(&self) -> &Reclaimer {
        self.reclaimer
    }

    #[inline]
    pub fn backend(&mut self) -> &mut dyn Backend {
        &mut *self.backend
    }

    /// Allocates a native resource whose orphaned id will be reclaimed by this
    /// orchestrator.
    pub fn allocate(&mut self, kind: ResourceKind) -> Result<ResourceHandle> {
        ResourceHandle::allocate(kind, &mut *self.backend, self.reclaimer)
    }

    /// Releases `handle` immediately. A query or display list which is still recording
    /// is ended first.
    pub fn destroy(&mut self, handle: &mut ResourceHandle) -> Result<()> {
        match self.scopes.end_recording(&mut *self.backend, handle) {
            Ok(Some(scope)) => warn!("{} {} was destroyed while active.", scope, handle.id()),
            Ok(None) => {}
            Err(err) => warn!("Failed to end the scope of {}: {}", handle, err),
        }

        handle.destroy(&mut *self.backend)
    }

    /// Submits a draw call, returning the number of polygons rendered.
    pub fn draw(&mut self, dc: &DrawCall) -> Result<u32> {
        let polygons = self.backend.submit_draw(dc)?;
        self.drawcalls = self.drawcalls.saturating_add(1);
        self.polygons = self.polygons.saturating_add(polygons);
        Ok(polygons)
    }

    pub fn begin_query(&mut self, query: &ResourceHandle) -> Result<()> {
        self.scopes.begin(&mut *self.backend, Scope::Query, query)
    }

    pub fn end_query(&mut self) -> Result<NativeId> {
        self.scopes.end(&mut *self.backend, Scope::Query)
    }

    pub fn begin_list(&mut self, list: &ResourceHandle) -> Result<()> {
        self.scopes.begin(&mut *self.backend, Scope::DisplayList, list)
    }

    pub fn end_list(&mut self) -> Result<NativeId> {
        self.scopes.end(&mut *self.backend, Scope::DisplayList)
    }

    /// Number of draw calls submitted through this context so far.
    #[inline]
    pub fn drawcalls(&self) -> u32 {
        self.drawcalls
    }

    /// Number of polygons submitted through this context so far.
    #[inline]
    pub fn polygons(&self) -> u32 {
        self.polygons
    }
}
