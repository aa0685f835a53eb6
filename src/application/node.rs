use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use crate::video::errors::Result;

use super::context::RenderContext;
use super::events::{AxisDirection, KeyCode, MouseButton};

/// A self-contained unit of rendering and input logic.
///
/// Boolean input callbacks return true to consume the event, which stops it from being
/// offered to the nodes added before this one.
pub trait Node {
    /// Renders this node. Only called while the node is enabled.
    fn display(&mut self, ctx: &mut RenderContext) -> Result<()>;

    /// Called with the canvas size when added to a pipeline and on every resize.
    fn on_resize(&mut self, _width: u32, _height: u32) {}

    fn is_enabled(&self) -> bool {
        true
    }

    /// Time spent in the last `display`, in nanoseconds.
    fn render_time_nanos(&self) -> u64 {
        0
    }

    /// Polygons rendered during the last `display`.
    fn polygons_rendered(&self) -> u32 {
        0
    }

    fn on_key_press(&mut self, _key: KeyCode) -> bool {
        false
    }

    fn on_key_release(&mut self, _key: KeyCode) -> bool {
        false
    }

    fn on_key_typed(&mut self, _character: char) -> bool {
        false
    }

    fn on_mouse_press(&mut self, _button: MouseButton) -> bool {
        false
    }

    fn on_mouse_release(&mut self, _button: MouseButton) -> bool {
        false
    }

    fn on_mouse_wheel(&mut self, _delta: f32) -> bool {
        false
    }

    fn on_mouse_move(&mut self, _dx: i32, _x: i32, _dy: i32, _y: i32) {}

    fn on_mouse_enter(&mut self) {}

    fn on_mouse_exit(&mut self) {}

    fn on_gamepad_press(&mut self, _pad: u32, _button: u32) -> bool {
        false
    }

    fn on_gamepad_release(&mut self, _pad: u32, _button: u32) -> bool {
        false
    }

    fn on_gamepad_axis_change(&mut self, _pad: u32, _axis: u32, _value: f32) -> bool {
        false
    }

    fn on_gamepad_axis_tap(&mut self, _pad: u32, _axis: u32, _direction: AxisDirection) -> bool {
        false
    }
}

/// Shared reference to a node. The pipeline identifies nodes by the address of the
/// allocation, so keep a clone around to remove it later.
pub type NodeRef = Rc<RefCell<dyn Node>>;

/// Wraps a node into a `NodeRef`.
pub fn node<T: Node + 'static>(node: T) -> NodeRef {
    Rc::new(RefCell::new(node))
}

/// Book-keeping most nodes need: the enabled flag and the metrics of the last display.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct NodeState {
    pub enabled: bool,
    pub last_render_time_nanos: u64,
    pub last_polygon_count: u32,
}

impl Default for NodeState {
    fn default() -> Self {
        NodeState {
            enabled: true,
            last_render_time_nanos: 0,
            last_polygon_count: 0,
        }
    }
}

impl NodeState {
    /// Runs `func`, recording its duration and the polygons it submitted through `ctx`.
    pub fn measure<F>(&mut self, ctx: &mut RenderContext, func: F) -> Result<()>
    where
        F: FnOnce(&mut RenderContext) -> Result<()>,
    {
        let ts = Instant::now();
        let polygons = ctx.polygons();

        let result = func(ctx);

        self.last_render_time_nanos = ts.elapsed().as_nanos() as u64;
        self.last_polygon_count = ctx.polygons().saturating_sub(polygons);
        result
    }
}
