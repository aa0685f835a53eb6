use std::fmt;

/// The distinct classes of native resources. Every kind is released through its own
/// backend call, so each one owns a separate reclamation queue.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ResourceKind {
    Buffer,
    Texture,
    DisplayList,
    Query,
    Shader,
    Framebuffer,
    Renderbuffer,
    VertexArray,
}

impl ResourceKind {
    /// The number of resource kinds.
    pub const COUNT: usize = 8;

    /// All kinds, in the order reclamation sweeps visit them.
    pub const ALL: [ResourceKind; ResourceKind::COUNT] = [
        ResourceKind::Buffer,
        ResourceKind::Texture,
        ResourceKind::DisplayList,
        ResourceKind::Query,
        ResourceKind::Shader,
        ResourceKind::Framebuffer,
        ResourceKind::Renderbuffer,
        ResourceKind::VertexArray,
    ];

    /// Returns the dense index of this kind, matching its position in `ALL`.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    #[inline]
    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::Buffer => "buffer",
            ResourceKind::Texture => "texture",
            ResourceKind::DisplayList => "display list",
            ResourceKind::Query => "query",
            ResourceKind::Shader => "shader",
            ResourceKind::Framebuffer => "framebuffer",
            ResourceKind::Renderbuffer => "renderbuffer",
            ResourceKind::VertexArray => "vertex array",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn index_matches_sweep_order() {
        for (i, kind) in ResourceKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }
}
