//! # Kiln
//!
//! Kiln keeps native GPU resources and the render loop that owns them in step. Wrapper
//! values hold exactly one native id each, and every native release happens on the
//! render thread, once per frame, even when the wrapper itself was dropped somewhere
//! else.
//!
//! The crate is split into two layers:
//!
//! * [`video`](video/index.html) contains the resource handles, the per-kind reclamation
//!   queues and the backend abstraction (a recording headless backend and an OpenGL one).
//! * [`application`](application/index.html) contains the node pipeline and the frame
//!   `Orchestrator` which ties timing, drawing, input and reclamation together.
//!
//! ```rust,ignore
//! use kiln::prelude::*;
//!
//! let mut orchestrator = Orchestrator::headless(Settings::default());
//! orchestrator.pipeline_mut().add(Rc::new(RefCell::new(MyNode::default())));
//!
//! loop {
//!     let info = orchestrator.render_frame()?;
//!     println!("{} fps", info.fps);
//! }
//! ```

#[macro_use]
extern crate failure;
#[macro_use]
extern crate log;

pub use cgmath as math;

pub mod errors;

pub mod application;
pub mod prelude;
pub mod video;
