use super::handle::{NativeId, ResourceHandle};

/// The primitive topology of a draw call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Primitive {
    Points,
    Lines,
    LineStrip,
    Triangles,
    TriangleStrip,
    TriangleFan,
}

impl Primitive {
    /// Returns the number of polygons assembled from `count` vertices.
    pub fn polygons(self, count: u32) -> u32 {
        match self {
            Primitive::Points | Primitive::Lines | Primitive::LineStrip => 0,
            Primitive::Triangles => count / 3,
            Primitive::TriangleStrip | Primitive::TriangleFan => count.saturating_sub(2),
        }
    }
}

/// A single non-indexed draw submitted to the backend.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct DrawCall {
    pub program: NativeId,
    pub buffer: NativeId,
    pub primitive: Primitive,
    pub first: u32,
    pub count: u32,
}

impl DrawCall {
    pub fn new(
        program: &ResourceHandle,
        buffer: &ResourceHandle,
        primitive: Primitive,
        first: u32,
        count: u32,
    ) -> Self {
        DrawCall {
            program: program.id(),
            buffer: buffer.id(),
            primitive,
            first,
            count,
        }
    }
}
