use std::rc::Rc;

use crate::math::Vector2;
use crate::video::errors::Result;

use super::context::RenderContext;
use super::events::InputEvent;
use super::node::{Node, NodeRef};

/// An insertion-ordered collection of nodes.
///
/// Nodes are drawn in insertion order, so the node added last ends up on top. Input is
/// offered the other way around: the top-most node gets the first chance to consume an
/// event.
pub struct Pipeline {
    nodes: Vec<NodeRef>,
    dimensions: Vector2<u32>,
    render_time_nanos: u64,
    polygons: u32,
}

impl Pipeline {
    pub fn new(dimensions: Vector2<u32>) -> Self {
        Pipeline {
            nodes: Vec::new(),
            dimensions,
            render_time_nanos: 0,
            polygons: 0,
        }
    }

    /// Appends `node`, resizing it to the current canvas size right away.
    pub fn add(&mut self, node: NodeRef) {
        node.borrow_mut()
            .on_resize(self.dimensions.x, self.dimensions.y);

        self.nodes.push(node);
        debug!("Added node, {} nodes in pipeline.", self.nodes.len());
    }

    /// Removes `node`, preserving the order of the remaining nodes. Returns false if the
    /// node was not part of this pipeline.
    pub fn remove(&mut self, node: &NodeRef) -> bool {
        match self.nodes.iter().position(|v| same(v, node)) {
            Some(index) => {
                self.nodes.remove(index);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn contains(&self, node: &NodeRef) -> bool {
        self.nodes.iter().any(|v| same(v, node))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    /// The last known canvas size.
    #[inline]
    pub fn dimensions(&self) -> Vector2<u32> {
        self.dimensions
    }

    /// Sum of the render time reported by the nodes drawn during the last `draw_all`.
    #[inline]
    pub fn render_time_nanos(&self) -> u64 {
        self.render_time_nanos
    }

    /// Sum of the polygons reported by the nodes drawn during the last `draw_all`.
    #[inline]
    pub fn polygons_rendered(&self) -> u32 {
        self.polygons
    }

    /// Displays every enabled node in insertion order.
    pub fn draw_all(&mut self, ctx: &mut RenderContext) -> Result<()> {
        self.render_time_nanos = 0;
        self.polygons = 0;

        for v in &self.nodes {
            let mut node = v.borrow_mut();
            if !node.is_enabled() {
                continue;
            }

            node.display(ctx)?;
            self.render_time_nanos = self
                .render_time_nanos
                .saturating_add(node.render_time_nanos());
            self.polygons = self.polygons.saturating_add(node.polygons_rendered());
        }

        Ok(())
    }

    /// Records the new canvas size and tells every node about it, enabled or not.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.dimensions = Vector2::new(width, height);
        for v in &self.nodes {
            v.borrow_mut().on_resize(width, height);
        }
    }

    /// Dispatches `event` to the nodes. Claimable events are offered to enabled nodes
    /// in reverse insertion order until one of them consumes it, and the return value
    /// tells whether that happened.
    ///
    /// Pointer broadcasts go to every enabled node and always return false. Movement
    /// is delivered in insertion order, entering and leaving the canvas in reverse
    /// insertion order like any other input. A `MouseMoved` arriving here carries no
    /// movement; use `Orchestrator::dispatch` to have it computed.
    pub fn dispatch_input(&mut self, event: &InputEvent) -> bool {
        match *event {
            InputEvent::KeyPressed { key } => self.offer(|n| n.on_key_press(key)),
            InputEvent::KeyReleased { key } => self.offer(|n| n.on_key_release(key)),
            InputEvent::ReceivedCharacter { character } => {
                self.offer(|n| n.on_key_typed(character))
            }

            InputEvent::MousePressed { button } => self.offer(|n| n.on_mouse_press(button)),
            InputEvent::MouseReleased { button } => self.offer(|n| n.on_mouse_release(button)),
            InputEvent::MouseWheel { delta } => self.offer(|n| n.on_mouse_wheel(delta)),

            InputEvent::MouseMoved { position } => {
                self.mouse_moved(0, position.x, 0, position.y);
                false
            }
            InputEvent::MouseEntered => {
                self.broadcast_rev(|n| n.on_mouse_enter());
                false
            }
            InputEvent::MouseExited => {
                self.broadcast_rev(|n| n.on_mouse_exit());
                false
            }

            InputEvent::GamepadPressed { pad, button } => {
                self.offer(|n| n.on_gamepad_press(pad, button))
            }
            InputEvent::GamepadReleased { pad, button } => {
                self.offer(|n| n.on_gamepad_release(pad, button))
            }
            InputEvent::GamepadAxisChanged { pad, axis, value } => {
                self.offer(|n| n.on_gamepad_axis_change(pad, axis, value))
            }
            InputEvent::GamepadAxisTapped {
                pad,
                axis,
                direction,
            } => self.offer(|n| n.on_gamepad_axis_tap(pad, axis, direction)),
        }
    }

    /// Broadcasts a cursor movement to every enabled node in insertion order.
    pub fn mouse_moved(&mut self, dx: i32, x: i32, dy: i32, y: i32) {
        self.broadcast(|n| n.on_mouse_move(dx, x, dy, y));
    }

    fn offer<F>(&self, mut func: F) -> bool
    where
        F: FnMut(&mut dyn Node) -> bool,
    {
        for v in self.nodes.iter().rev() {
            let mut node = v.borrow_mut();
            if node.is_enabled() && func(&mut *node) {
                return true;
            }
        }

        false
    }

    fn broadcast<F>(&self, mut func: F)
    where
        F: FnMut(&mut dyn Node),
    {
        for v in &self.nodes {
            let mut node = v.borrow_mut();
            if node.is_enabled() {
                func(&mut *node);
            }
        }
    }

    fn broadcast_rev<F>(&self, mut func: F)
    where
        F: FnMut(&mut dyn Node),
    {
        for v in self.nodes.iter().rev() {
            let mut node = v.borrow_mut();
            if node.is_enabled() {
                func(&mut *node);
            }
        }
    }
}

#[inline]
fn same(lhs: &NodeRef, rhs: &NodeRef) -> bool {
    // Compare data addresses only, vtable pointers of the same type may differ.
    Rc::as_ptr(lhs) as *const u8 == Rc::as_ptr(rhs) as *const u8
}
