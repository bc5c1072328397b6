//! Button identifiers
//!
//! The badge has a start, select, A and B button plus a four-way joystick.
//! Every input arrives as an edge event.

/// Physical buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    Start,
    Select,
    A,
    B,
    Up,
    Down,
    Left,
    Right,
}

impl Button {
    /// All buttons, in scan order
    pub const ALL: [Button; 8] = [
        Button::Start,
        Button::Select,
        Button::A,
        Button::B,
        Button::Up,
        Button::Down,
        Button::Left,
        Button::Right,
    ];

    /// Check if this is one of the joystick directions
    pub fn is_direction(&self) -> bool {
        matches!(
            self,
            Button::Up | Button::Down | Button::Left | Button::Right
        )
    }
}

/// Edge event for a single button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonEvent {
    /// Which button changed
    pub button: Button,
    /// `true` on the press edge, `false` on release
    pub pressed: bool,
}

impl ButtonEvent {
    /// Create a press event
    pub const fn pressed(button: Button) -> Self {
        Self {
            button,
            pressed: true,
        }
    }

    /// Create a release event
    pub const fn released(button: Button) -> Self {
        Self {
            button,
            pressed: false,
        }
    }
}
