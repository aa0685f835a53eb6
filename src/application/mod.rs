//! The frame loop which drives nodes and reclaims native resources.
//!
//! # Pipeline
//!
//! A `Pipeline` holds the nodes of an application in insertion order. Nodes are drawn
//! front to back in that order, while input is offered to them the other way around so
//! that the node on top gets the first chance to consume it.
//!
//! # Orchestrator
//!
//! The `Orchestrator` is what the windowing driver talks to. Every call to
//! `render_frame` does, in order:
//!
//! 1. create the backend, if this is the first frame;
//! 2. advance the `FrameClock`;
//! 3. draw every enabled node;
//! 4. sweep the reclamation queues, releasing whatever handles were dropped since the
//!    last frame.
//!
//! Input and resize notifications are forwarded to the pipeline as they arrive.

pub mod clock;
pub mod context;
pub mod events;
pub mod node;
pub mod orchestrator;
pub mod pipeline;
pub mod settings;

pub mod prelude {
    pub use super::clock::FrameClock;
    pub use super::context::RenderContext;
    pub use super::events::{AxisDirection, InputEvent, KeyCode, MouseButton};
    pub use super::node::{node, Node, NodeRef, NodeState};
    pub use super::orchestrator::{FrameInfo, Orchestrator, OrchestratorState};
    pub use super::pipeline::Pipeline;
    pub use super::settings::Settings;
}
