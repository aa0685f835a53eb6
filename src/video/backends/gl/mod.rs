pub mod backend;
pub mod capabilities;

use super::super::errors::*;

/// Maps the pending OpenGL error flag into an `Error`.
pub(crate) unsafe fn check() -> Result<()> {
    let msg = match gl::GetError() {
        gl::NO_ERROR => return Ok(()),
        gl::INVALID_ENUM => "An unacceptable value is specified for an enumerated argument.",
        gl::INVALID_VALUE => "A numeric argument is out of range.",
        gl::INVALID_OPERATION => "The specified operation is not allowed in the current state.",
        gl::INVALID_FRAMEBUFFER_OPERATION => {
            "The command is trying to render to or read from the framebuffer while the \
             currently bound framebuffer is not framebuffer complete."
        }
        gl::OUT_OF_MEMORY => "There is not enough memory left to execute the command.",
        _ => "Oops, Unknown OpenGL error.",
    };

    Err(Error::Backend(format!("[GL] {}", msg)))
}
