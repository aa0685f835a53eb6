use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::errors::*;
use crate::math::Vector2;
use crate::video::backends::{self, Backend};
use crate::video::errors::Error as VideoError;
use crate::video::handle::ResourceHandle;
use crate::video::kind::ResourceKind;
use crate::video::reclaim::{Reclaimer, Sweep};
use crate::video::scope::ScopeTracker;

use super::clock::FrameClock;
use super::context::RenderContext;
use super::events::InputEvent;
use super::pipeline::Pipeline;
use super::settings::Settings;

type BackendFactory = Box<dyn FnMut() -> crate::video::errors::Result<Box<dyn Backend>>>;

/// The information of the last rendered frame.
#[derive(Debug, Default)]
pub struct FrameInfo {
    /// Index of the frame, starting from 1.
    pub index: u64,
    /// Wall-clock time spent in `render_frame`. This is what fps is derived from.
    pub duration: Duration,
    /// Time between the start of the previous frame and the start of this one.
    pub step: Duration,
    /// Sum of the render time reported by the nodes, for diagnostics.
    pub node_time: Duration,
    /// Sum of the polygons reported by the nodes.
    pub polygons: u32,
    /// Draw calls submitted through the render context.
    pub drawcalls: u32,
    /// Orphaned ids released by the reclamation sweep.
    pub reclaimed: usize,
    /// Live handles per kind after the sweep, indexed by `ResourceKind::index`.
    pub alive: [usize; ResourceKind::COUNT],
    /// Smoothed frames per second.
    pub fps: u32,
    /// Resources leaked during the sweep.
    pub leaks: Vec<VideoError>,
}

/// The lifecycle of an `Orchestrator`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OrchestratorState {
    /// The backend has not been created yet. It will be on the first frame.
    Uninitialized,
    Ready,
    /// `dispose` has been called, no more frames can be rendered.
    Disposed,
}

/// `Orchestrator` drives one display cycle at a time: lazy backend creation, frame
/// timing, pipeline drawing and the reclamation sweep, in that order. It also forwards
/// input to the pipeline.
///
/// The render loop itself belongs to the windowing driver, which calls `render_frame`
/// at whatever cadence it likes. Every method must be called from that same thread.
pub struct Orchestrator {
    settings: Settings,
    factory: BackendFactory,
    backend: Option<Box<dyn Backend>>,
    disposed: bool,

    clock: FrameClock,
    pipeline: Pipeline,
    reclaimer: Reclaimer,
    scopes: ScopeTracker,

    mouse_position: Option<Vector2<i32>>,
    previous_timesteps: VecDeque<Duration>,
}

impl Orchestrator {
    /// Setup orchestrator with specified settings. The backend is chosen by
    /// `Settings::headless`.
    pub fn new(settings: Settings) -> Self {
        if settings.headless {
            Self::headless(settings)
        } else {
            Self::with_backend(settings, backends::new)
        }
    }

    /// Setup orchestrator with a `HeadlessBackend`.
    pub fn headless(settings: Settings) -> Self {
        Self::with_backend(settings, || Ok(backends::new_headless()))
    }

    /// Setup orchestrator with a custom backend factory. The factory is called on the
    /// first frame, and again on the next one if it failed.
    pub fn with_backend<F>(settings: Settings, factory: F) -> Self
    where
        F: FnMut() -> crate::video::errors::Result<Box<dyn Backend>> + 'static,
    {
        let capacity = settings.reclaim_capacity.max(1);

        Orchestrator {
            pipeline: Pipeline::new(settings.dimensions),
            reclaimer: Reclaimer::new(capacity),
            factory: Box::new(factory),
            backend: None,
            disposed: false,
            clock: FrameClock::new(),
            scopes: ScopeTracker::new(),
            mouse_position: None,
            previous_timesteps: VecDeque::new(),
            settings,
        }
    }

    pub fn state(&self) -> OrchestratorState {
        if self.disposed {
            OrchestratorState::Disposed
        } else if self.backend.is_some() {
            OrchestratorState::Ready
        } else {
            OrchestratorState::Uninitialized
        }
    }

    /// Creates the backend if it does not exist yet. `render_frame` calls this lazily.
    pub fn initialize(&mut self) -> Result<()> {
        if self.disposed {
            bail!("Orchestrator has been disposed.");
        }

        if self.backend.is_none() {
            let backend = (self.factory)().map_err(|err| match err {
                VideoError::ContextCreationFailure(..) => err,
                other => VideoError::ContextCreationFailure(other.to_string()),
            })?;

            info!("Backend attached, {:?}.", self.settings);
            self.backend = Some(backend);
        }

        Ok(())
    }

    /// Renders one frame, returning its statistics.
    ///
    /// Leaked resources are reported in `FrameInfo::leaks`. If a node fails to display,
    /// the sweep still runs before the error is returned.
    pub fn render_frame(&mut self) -> Result<FrameInfo> {
        let ts = Instant::now();
        self.initialize()?;

        self.clock.advance();
        let step = self.clock.step();
        if self.clock.frame_index() > 1 {
            self.record_timestep(step);
        }

        let backend = match self.backend.as_mut() {
            Some(backend) => backend,
            None => bail!("Backend is missing after initialization."),
        };

        backend.advance()?;

        let (drawn, drawcalls) = {
            let mut ctx = RenderContext::new(
                backend.as_mut(),
                &self.reclaimer,
                &mut self.scopes,
                &self.clock,
                self.pipeline.dimensions(),
            );

            let drawn = self.pipeline.draw_all(&mut ctx);
            (drawn, ctx.drawcalls())
        };

        end_orphaned_scopes(&mut self.scopes, &self.reclaimer, backend.as_mut());

        let flushed = backend.flush();
        let sweep = self.reclaimer.sweep(backend.as_mut());

        drawn?;
        flushed?;

        let mut info = FrameInfo {
            index: self.clock.frame_index(),
            step,
            node_time: Duration::from_nanos(self.pipeline.render_time_nanos()),
            polygons: self.pipeline.polygons_rendered(),
            drawcalls,
            reclaimed: sweep.total(),
            fps: self.fps(),
            leaks: sweep.leaks.into_iter().collect(),
            ..FrameInfo::default()
        };

        for kind in ResourceKind::ALL.iter() {
            info.alive[kind.index()] = self.reclaimer.alive(*kind);
        }

        info.duration = ts.elapsed();
        Ok(info)
    }

    /// Drains every reclamation queue outside of a frame.
    pub fn reclaim(&mut self) -> Result<Sweep> {
        self.initialize()?;
        match self.backend.as_mut() {
            Some(backend) => {
                end_orphaned_scopes(&mut self.scopes, &self.reclaimer, backend.as_mut());
                Ok(self.reclaimer.sweep(backend.as_mut()))
            }
            None => bail!("Backend is missing after initialization."),
        }
    }

    /// Performs a last sweep and drops the backend. Later frames fail.
    pub fn dispose(&mut self) -> Result<Sweep> {
        // Nodes may own handles, drop them before the final sweep.
        self.pipeline.clear();

        let sweep = match self.backend.take() {
            Some(mut backend) => {
                end_orphaned_scopes(&mut self.scopes, &self.reclaimer, backend.as_mut());
                self.reclaimer.sweep(backend.as_mut())
            }
            None => Sweep::default(),
        };

        if !self.disposed {
            info!("Orchestrator disposed after {} frames.", self.clock.frame_index());
        }

        self.disposed = true;
        Ok(sweep)
    }

    /// Allocates a native resource, creating the backend first if needed.
    pub fn allocate(&mut self, kind: ResourceKind) -> Result<ResourceHandle> {
        self.initialize()?;
        match self.backend.as_mut() {
            Some(backend) => Ok(ResourceHandle::allocate(
                kind,
                backend.as_mut(),
                &self.reclaimer,
            )?),
            None => bail!("Backend is missing after initialization."),
        }
    }

    /// Releases `handle` immediately.
    pub fn destroy(&mut self, handle: &mut ResourceHandle) -> Result<()> {
        if !handle.is_allocated() {
            return Ok(());
        }

        match self.backend.as_mut() {
            Some(backend) => {
                match self.scopes.end_recording(backend.as_mut(), handle) {
                    Ok(Some(scope)) => {
                        warn!("{} {} was destroyed while active.", scope, handle.id())
                    }
                    Ok(None) => {}
                    Err(err) => warn!("Failed to end the scope of {}: {}", handle, err),
                }

                Ok(handle.destroy(backend.as_mut())?)
            }
            None => bail!("{} can not be destroyed without a backend.", handle),
        }
    }

    /// Forwards an input event to the pipeline. Returns true if a node consumed it.
    ///
    /// Cursor movements are broadcasted together with the movement since the previous
    /// known position, which is zero for the very first one.
    pub fn dispatch(&mut self, event: InputEvent) -> bool {
        match event {
            InputEvent::MouseMoved { position } => {
                let last = self.mouse_position.unwrap_or(position);
                self.mouse_position = Some(position);

                let delta = Vector2::new(
                    position.x.saturating_sub(last.x),
                    position.y.saturating_sub(last.y),
                );
                self.pipeline
                    .mouse_moved(delta.x, position.x, delta.y, position.y);
                false
            }
            _ => self.pipeline.dispatch_input(&event),
        }
    }

    /// Called by the windowing driver when the canvas changes size.
    pub fn on_resize(&mut self, width: u32, height: u32) {
        self.pipeline.resize(width, height);
    }

    /// The last known cursor position.
    #[inline]
    pub fn mouse_position(&self) -> Option<Vector2<i32>> {
        self.mouse_position
    }

    #[inline]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[inline]
    pub fn pipeline_mut(&mut self) -> &mut Pipeline {
        &mut self.pipeline
    }

    #[inline]
    pub fn reclaimer(&self) -> &Reclaimer {
        &self.reclaimer
    }

    #[inline]
    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Gets the fps averaged over the last `time_smooth_step` frames.
    pub fn fps(&self) -> u32 {
        let total: Duration = self.previous_timesteps.iter().sum();
        let nanos = total.as_nanos();
        if nanos == 0 {
            0
        } else {
            (self.previous_timesteps.len() as u128 * 1_000_000_000 / nanos) as u32
        }
    }

    fn record_timestep(&mut self, step: Duration) {
        let smoothing = self.settings.time_smooth_step.max(1) as usize;
        self.previous_timesteps.push_front(step);
        self.previous_timesteps.truncate(smoothing);
    }
}

/// Ends every scope whose resource has been dropped while still recording, so that
/// the sweep never releases an active name and later scopes can begin again.
fn end_orphaned_scopes(
    scopes: &mut ScopeTracker,
    reclaimer: &Reclaimer,
    backend: &mut dyn Backend,
) {
    let open: Vec<_> = scopes.open().collect();

    for (scope, id) in open {
        if !reclaimer.queue(scope.kind()).contains(id) {
            warn!("{} {} is still active at the end of frame.", scope, id);
            continue;
        }

        warn!("{} {} was dropped while active, ending it.", scope, id);
        if let Err(err) = scopes.end(backend, scope) {
            warn!("Failed to end {} {}: {}", scope, id, err);
        }
    }
}

impl Drop for Orchestrator {
    fn drop(&mut self) {
        if self.backend.is_some() {
            if let Ok(sweep) = self.dispose() {
                for err in &sweep.leaks {
                    error!("{}", err);
                }
            }
        }
    }
}
