//! Gamepad state and edge detection.
//!
//! The gamepad itself is polled by the caller; this module only sees plain
//! [`GamepadState`] snapshots. [`ButtonEdges`] keeps the previous snapshot so
//! that a held button fires once, on the press.
//!
//! # Example
//!
//! ```
//! use talos::opcontrol::buttons::{Button, ButtonEdges, GamepadState};
//!
//! let mut edges = ButtonEdges::default();
//! let held = GamepadState { cross: true, ..GamepadState::default() };
//!
//! edges.capture(held);
//! assert!(edges.pressed(Button::Cross));
//! edges.capture(held);
//! assert!(!edges.pressed(Button::Cross));
//! assert!(edges.held(Button::Cross));
//! ```

use serde::{Deserialize, Serialize};

/// One snapshot of a gamepad.
///
/// Stick axes follow the usual gamepad convention: `x` is positive to the
/// right, `y` is positive when pulled toward the driver.
#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GamepadState {
    pub left_stick_x:  f64,
    pub left_stick_y:  f64,
    pub right_stick_x: f64,
    pub right_stick_y: f64,
    pub cross:         bool,
    pub circle:        bool,
    pub square:        bool,
    pub triangle:      bool,
    pub dpad_up:       bool,
    pub dpad_down:     bool,
    pub dpad_left:     bool,
    pub dpad_right:    bool,
    pub left_bumper:   bool,
    pub right_bumper:  bool,
}

impl GamepadState {
    pub fn is_down(&self, button: Button) -> bool {
        match button {
            Button::Cross => self.cross,
            Button::Circle => self.circle,
            Button::Square => self.square,
            Button::Triangle => self.triangle,
            Button::DpadUp => self.dpad_up,
            Button::DpadDown => self.dpad_down,
            Button::DpadLeft => self.dpad_left,
            Button::DpadRight => self.dpad_right,
            Button::LeftBumper => self.left_bumper,
            Button::RightBumper => self.right_bumper,
        }
    }

    /// A state with only `button` held.
    pub fn with(button: Button) -> Self {
        let mut state = Self::default();
        match button {
            Button::Cross => state.cross = true,
            Button::Circle => state.circle = true,
            Button::Square => state.square = true,
            Button::Triangle => state.triangle = true,
            Button::DpadUp => state.dpad_up = true,
            Button::DpadDown => state.dpad_down = true,
            Button::DpadLeft => state.dpad_left = true,
            Button::DpadRight => state.dpad_right = true,
            Button::LeftBumper => state.left_bumper = true,
            Button::RightBumper => state.right_bumper = true,
        }
        state
    }
}

/// Gamepad buttons that drive menus and mode changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    Cross,
    Circle,
    Square,
    Triangle,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    LeftBumper,
    RightBumper,
}

/// The last two gamepad snapshots.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ButtonEdges {
    last: GamepadState,
    now:  GamepadState,
}

impl ButtonEdges {
    /// Shifts in a new snapshot.
    pub fn capture(&mut self, state: GamepadState) {
        self.last = self.now;
        self.now = state;
    }

    /// Rising edge: down now, up in the previous snapshot.
    pub fn pressed(&self, button: Button) -> bool { self.now.is_down(button) && !self.last.is_down(button) }

    pub fn held(&self, button: Button) -> bool { self.now.is_down(button) }

    /// The newest snapshot.
    pub fn state(&self) -> &GamepadState { &self.now }
}
