//! Keyboard bindings.
//!
//! The scene never sees raw key events, only [`InputAction`]s. Bindings are
//! case sensitive: `W` is not `w`.

use winit::keyboard::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// `w`
    CubeUp,
    /// `s`
    CubeDown,
    /// `a`
    CameraLeft,
    /// `d`
    CameraRight,
}

impl InputAction {
    pub fn from_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(c) => Self::from_name(c.as_str()),
            _ => None,
        }
    }

    pub fn from_name(key: &str) -> Option<Self> {
        match key {
            "w" => Some(InputAction::CubeUp),
            "s" => Some(InputAction::CubeDown),
            "a" => Some(InputAction::CameraLeft),
            "d" => Some(InputAction::CameraRight),
            _ => None,
        }
    }
}
