use gl::types::*;

use super::super::super::command::{DrawCall, Primitive};
use super::super::super::errors::*;
use super::super::super::handle::{NativeId, NONE_ID};
use super::super::super::kind::ResourceKind;
use super::super::super::scope::Scope;
use super::super::Backend;
use super::capabilities::{Capabilities, Profile};
use super::check;

#[derive(Debug, Default)]
struct GLMutableState {
    binded_program: Option<GLuint>,
    binded_buffer: Option<GLuint>,
}

impl GLMutableState {
    fn forget(&mut self, kind: ResourceKind, ids: &[NativeId]) {
        let slot = match kind {
            ResourceKind::Shader => &mut self.binded_program,
            ResourceKind::Buffer => &mut self.binded_buffer,
            _ => return,
        };

        if slot.map(|v| ids.contains(&v)).unwrap_or(false) {
            *slot = None;
        }
    }
}

/// The OpenGL backend. Resources are allocated one at a time and released with the
/// batched `glDelete*` entry points wherever OpenGL provides one.
pub struct GLBackend {
    capabilities: Capabilities,
    state: GLMutableState,
}

impl GLBackend {
    /// Creates the backend on the current context.
    ///
    /// # Unsafe
    ///
    /// The function pointers must have been loaded for a context which is current on this
    /// thread.
    pub unsafe fn new() -> Result<Self> {
        let capabilities = Capabilities::parse()
            .map_err(|err| Error::ContextCreationFailure(err.to_string()))?;

        info!("GLBackend {:#?}", capabilities);

        if !capabilities.has_objects() {
            return Err(Error::Requirement(format!(
                "framebuffer, query and vertex array objects ({:?})",
                capabilities.version
            )));
        }

        Ok(GLBackend {
            capabilities,
            state: GLMutableState::default(),
        })
    }

    #[inline]
    pub fn capabilities(&self) -> &Capabilities {
        &self.capabilities
    }

    fn display_lists(&self) -> Error {
        let profile = self.capabilities.profile.unwrap_or(Profile::Core);
        Error::Requirement(format!("display lists with {:?} profile bindings", profile))
    }
}

impl Backend for GLBackend {
    fn allocate(&mut self, kind: ResourceKind) -> Result<NativeId> {
        let mut id = NONE_ID;

        unsafe {
            match kind {
                ResourceKind::Buffer => gl::GenBuffers(1, &mut id),
                ResourceKind::Texture => gl::GenTextures(1, &mut id),
                ResourceKind::Query => gl::GenQueries(1, &mut id),
                ResourceKind::Shader => id = gl::CreateProgram(),
                ResourceKind::Framebuffer => gl::GenFramebuffers(1, &mut id),
                ResourceKind::Renderbuffer => gl::GenRenderbuffers(1, &mut id),
                ResourceKind::VertexArray => gl::GenVertexArrays(1, &mut id),
                ResourceKind::DisplayList => return Err(self.display_lists()),
            }

            check().map_err(|err| Error::BackendAllocationFailed(kind, err.to_string()))?;
        }

        if id == NONE_ID {
            return Err(Error::BackendAllocationFailed(
                kind,
                "[GL] Returned the null name.".to_owned(),
            ));
        }

        Ok(id)
    }

    fn release(&mut self, kind: ResourceKind, ids: &[NativeId]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }

        self.state.forget(kind, ids);

        let n = ids.len() as GLsizei;
        let ptr = ids.as_ptr();

        unsafe {
            match kind {
                ResourceKind::Buffer => gl::DeleteBuffers(n, ptr),
                ResourceKind::Texture => gl::DeleteTextures(n, ptr),
                ResourceKind::Query => gl::DeleteQueries(n, ptr),
                ResourceKind::Framebuffer => gl::DeleteFramebuffers(n, ptr),
                ResourceKind::Renderbuffer => gl::DeleteRenderbuffers(n, ptr),
                ResourceKind::VertexArray => gl::DeleteVertexArrays(n, ptr),
                ResourceKind::Shader => {
                    // Programs have no batched entry point.
                    let mut failed = Vec::new();
                    for &id in ids {
                        gl::DeleteProgram(id);
                        if check().is_err() {
                            failed.push(id);
                        }
                    }

                    return if failed.is_empty() {
                        Ok(())
                    } else {
                        Err(Error::release_failed(kind, &failed))
                    };
                }
                ResourceKind::DisplayList => return Err(Error::release_failed(kind, ids)),
            }

            check().map_err(|err| {
                warn!("glDelete of {} failed: {}", kind, err);
                Error::release_failed(kind, ids)
            })
        }
    }

    fn submit_draw(&mut self, dc: &DrawCall) -> Result<u32> {
        unsafe {
            if self.state.binded_program != Some(dc.program) {
                gl::UseProgram(dc.program);
                check()?;
                self.state.binded_program = Some(dc.program);
            }

            if self.state.binded_buffer != Some(dc.buffer) {
                gl::BindBuffer(gl::ARRAY_BUFFER, dc.buffer);
                check()?;
                self.state.binded_buffer = Some(dc.buffer);
            }

            gl::DrawArrays(
                primitive(dc.primitive),
                dc.first as GLint,
                dc.count as GLsizei,
            );

            check()?;
        }

        Ok(dc.primitive.polygons(dc.count))
    }

    fn begin_scope(&mut self, scope: Scope, id: NativeId) -> Result<()> {
        match scope {
            Scope::Query => unsafe {
                gl::BeginQuery(gl::SAMPLES_PASSED, id);
                check()
            },
            Scope::DisplayList => Err(self.display_lists()),
        }
    }

    fn end_scope(&mut self, scope: Scope) -> Result<()> {
        match scope {
            Scope::Query => unsafe {
                gl::EndQuery(gl::SAMPLES_PASSED);
                check()
            },
            Scope::DisplayList => Err(self.display_lists()),
        }
    }

    fn advance(&mut self) -> Result<()> {
        // Other code might have touched the bindings between two frames.
        self.state = GLMutableState::default();
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        unsafe {
            gl::Flush();
            check()
        }
    }
}

fn primitive(v: Primitive) -> GLenum {
    match v {
        Primitive::Points => gl::POINTS,
        Primitive::Lines => gl::LINES,
        Primitive::LineStrip => gl::LINE_STRIP,
        Primitive::Triangles => gl::TRIANGLES,
        Primitive::TriangleStrip => gl::TRIANGLE_STRIP,
        Primitive::TriangleFan => gl::TRIANGLE_FAN,
    }
}
