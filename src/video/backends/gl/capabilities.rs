use std::cmp;
use std::ffi;

use gl::types::*;

use super::super::super::errors::*;

/// Describes the OpenGL context profile.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Profile {
    /// The context uses only future-compatible functions and definitions.
    Core,
    /// The context includes all immediate mode functions and definitions.
    Compatibility,
}

/// Describes a version.
///
/// A version can only be compared to another version if they belong to the same API.
/// For example, both `Version::GL(3, 0) >= Version::ES(3, 0)` and `Version::ES(3, 0) >=
/// Version::GL(3, 0)` return `false`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// Regular OpenGL.
    GL(u8, u8),
    /// OpenGL embedded system.
    ES(u8, u8),
}

impl PartialOrd for Version {
    #[inline]
    fn partial_cmp(&self, other: &Version) -> Option<cmp::Ordering> {
        let (es1, major1, minor1) = match *self {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        let (es2, major2, minor2) = match *other {
            Version::GL(major, minor) => (false, major, minor),
            Version::ES(major, minor) => (true, major, minor),
        };

        if es1 != es2 {
            None
        } else {
            match major1.cmp(&major2) {
                cmp::Ordering::Equal => Some(minor1.cmp(&minor2)),
                v => Some(v),
            }
        }
    }
}

impl Version {
    /// Parses a `GL_VERSION` string, e.g. `4.5.0 NVIDIA 390.48` or `OpenGL ES 3.0 Mesa`.
    pub fn from_desc(desc: &str) -> Result<Version> {
        let malformed = || Error::Backend(format!("[GL] Malformed version string {:?}.", desc));

        let (es, desc) = if desc.starts_with("OpenGL ES ") {
            (true, &desc[10..])
        } else if desc.starts_with("OpenGL ES-") {
            (true, &desc[13..])
        } else {
            (false, desc)
        };

        let desc = desc.split(' ').next().ok_or_else(malformed)?;
        let mut iter = desc.split('.');

        let major = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        let minor = iter
            .next()
            .and_then(|v| v.parse().ok())
            .ok_or_else(malformed)?;

        if es {
            Ok(Version::ES(major, minor))
        } else {
            Ok(Version::GL(major, minor))
        }
    }

    /// Obtains the OpenGL version of the current context using the loaded functions.
    ///
    /// # Unsafe
    ///
    /// You must ensure that the functions belong to the current context, otherwise you will get
    /// an undefined behavior.
    pub unsafe fn parse() -> Result<Version> {
        Version::from_desc(&parse_str(gl::VERSION)?)
    }
}

/// Represents the capabilities of the context.
///
/// Contrary to the state, these values never change.
#[derive(Debug)]
pub struct Capabilities {
    /// Returns a version or release number.
    pub version: Version,
    /// The company responsible for this GL implementation.
    pub vendor: String,
    /// The name of the renderer.
    pub renderer: String,
    /// The OpenGL context profile if available.
    ///
    /// The context profile is available from OpenGL 3.2 onwards. `None` if not supported.
    pub profile: Option<Profile>,
}

impl Capabilities {
    pub unsafe fn parse() -> Result<Capabilities> {
        let version = Version::parse()?;

        Ok(Capabilities {
            version,
            vendor: parse_str(gl::VENDOR)?,
            renderer: parse_str(gl::RENDERER)?,
            profile: Capabilities::parse_profile(version),
        })
    }

    /// Returns true if every resource kind except display lists can be allocated.
    pub fn has_objects(&self) -> bool {
        self.version >= Version::GL(3, 0) || self.version >= Version::ES(3, 0)
    }

    #[inline]
    unsafe fn parse_profile(version: Version) -> Option<Profile> {
        if version >= Version::GL(3, 2) {
            let mut val = 0;
            gl::GetIntegerv(gl::CONTEXT_PROFILE_MASK, &mut val);
            let val = val as GLenum;
            if (val & gl::CONTEXT_COMPATIBILITY_PROFILE_BIT) != 0 {
                Some(Profile::Compatibility)
            } else if (val & gl::CONTEXT_CORE_PROFILE_BIT) != 0 {
                Some(Profile::Core)
            } else {
                None
            }
        } else {
            None
        }
    }
}

unsafe fn parse_str(id: GLenum) -> Result<String> {
    let s = gl::GetString(id);
    if s.is_null() {
        return Err(Error::Backend(format!("[GL] String of {} is null.", id)));
    }

    String::from_utf8(ffi::CStr::from_ptr(s as *const _).to_bytes().to_vec())
        .map_err(|_| Error::Backend(format!("[GL] String of {} is malformed.", id)))
}
