pub use crate::math::Vector2;

pub use crate::application::prelude::*;
pub use crate::video::prelude::*;

pub use crate::errors::Result as KResult;
pub use std::cell::RefCell;
pub use std::rc::Rc;
