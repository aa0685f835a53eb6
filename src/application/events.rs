use crate::math::Vector2;

/// Virtual key code of a physical key, as reported by the windowing driver.
pub type KeyCode = u32;

/// Describes a button of a mouse controller.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u8),
}

/// The direction of a gamepad axis tap.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AxisDirection {
    Negative,
    Positive,
}

/// The enumerations of all events that come from various kinds of user input.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum InputEvent {
    KeyPressed { key: KeyCode },
    KeyReleased { key: KeyCode },
    ReceivedCharacter { character: char },

    MousePressed { button: MouseButton },
    MouseReleased { button: MouseButton },
    MouseWheel { delta: f32 },
    /// The cursor moved to `position`, in pixels relative to the top-left corner.
    MouseMoved { position: Vector2<i32> },
    MouseEntered,
    MouseExited,

    GamepadPressed { pad: u32, button: u32 },
    GamepadReleased { pad: u32, button: u32 },
    GamepadAxisChanged { pad: u32, axis: u32, value: f32 },
    GamepadAxisTapped { pad: u32, axis: u32, direction: AxisDirection },
}

impl InputEvent {
    /// Returns true if the event is offered to nodes one by one until some node
    /// consumes it, rather than broadcasted to all of them.
    pub fn is_claimable(&self) -> bool {
        match *self {
            InputEvent::MouseMoved { .. } | InputEvent::MouseEntered | InputEvent::MouseExited => {
                false
            }
            _ => true,
        }
    }
}
