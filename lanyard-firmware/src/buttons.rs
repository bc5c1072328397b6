//! Button scanning
//!
//! The buttons are active-low GPIOs. A level has to be read the same way
//! on consecutive scans before it counts, which filters contact bounce.

use embassy_rp::gpio::Input;
use heapless::Vec;
use lanyard_hal::{Button, ButtonEvent};

/// Number of buttons
pub const BUTTON_COUNT: usize = Button::ALL.len();

/// Consecutive identical scans before a level is accepted
const STABLE_SCANS: u8 = 3;

/// Debounce state for every button
pub struct Debouncer {
    pressed: [bool; BUTTON_COUNT],
    candidate: [bool; BUTTON_COUNT],
    count: [u8; BUTTON_COUNT],
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debouncer {
    /// All buttons released
    pub const fn new() -> Self {
        Self {
            pressed: [false; BUTTON_COUNT],
            candidate: [false; BUTTON_COUNT],
            count: [0; BUTTON_COUNT],
        }
    }

    /// Feed one scan (`true` = pressed), in [`Button::ALL`] order
    ///
    /// Returns the edges that became stable on this scan.
    pub fn update(&mut self, levels: [bool; BUTTON_COUNT]) -> Vec<ButtonEvent, BUTTON_COUNT> {
        let mut events = Vec::new();
        for (i, &level) in levels.iter().enumerate() {
            if level != self.candidate[i] {
                self.candidate[i] = level;
                self.count[i] = 1;
                continue;
            }
            if self.count[i] < STABLE_SCANS {
                self.count[i] += 1;
            }
            if self.count[i] >= STABLE_SCANS && self.pressed[i] != level {
                self.pressed[i] = level;
                let event = ButtonEvent {
                    button: Button::ALL[i],
                    pressed: level,
                };
                // Capacity equals the button count
                let _ = events.push(event);
            }
        }
        events
    }
}

/// GPIO button bank
pub struct Buttons<'d> {
    inputs: [Input<'d>; BUTTON_COUNT],
    debouncer: Debouncer,
}

impl<'d> Buttons<'d> {
    /// `inputs` in [`Button::ALL`] order, pulled up
    pub fn new(inputs: [Input<'d>; BUTTON_COUNT]) -> Self {
        Self {
            inputs,
            debouncer: Debouncer::new(),
        }
    }

    /// Scan every button once
    pub fn scan(&mut self) -> Vec<ButtonEvent, BUTTON_COUNT> {
        let mut levels = [false; BUTTON_COUNT];
        for (level, input) in levels.iter_mut().zip(self.inputs.iter()) {
            *level = input.is_low();
        }
        self.debouncer.update(levels)
    }
}
