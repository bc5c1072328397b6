//! Button handling on the home screen
//!
//! Only press edges do anything. Handlers touch the countdowns and return
//! an action; they never block.

use lanyard_hal::{App, Button, ButtonEvent};

use crate::countdown::{AboutCountdown, PowerCountdown};
use crate::update::UpdateDecision;

/// Result of a button press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HomeAction {
    /// Stay on the home screen
    Stay,
    /// Hand control to an app
    Launch(App),
}

/// Dispatch one button event
pub fn handle_button(
    event: ButtonEvent,
    power: &mut PowerCountdown,
    about: &mut AboutCountdown,
    update: UpdateDecision,
) -> HomeAction {
    if !event.pressed {
        return HomeAction::Stay;
    }

    match event.button {
        Button::Start => {
            debug!("Start button pressed");
            HomeAction::Launch(App::Launcher)
        }
        Button::A => {
            debug!("A button pressed");
            power.reset();
            if about.trigger() {
                HomeAction::Launch(App::EasterEgg)
            } else {
                HomeAction::Stay
            }
        }
        Button::Select => {
            debug!("Select button pressed");
            power.reset();
            if update.available {
                HomeAction::Launch(App::Update)
            } else {
                HomeAction::Stay
            }
        }
        Button::B | Button::Up | Button::Down | Button::Left | Button::Right => {
            debug!("Other button pressed");
            power.reset();
            HomeAction::Stay
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePower;

    fn drained(default: u8) -> PowerCountdown {
        let mut power = PowerCountdown::new(default);
        let mut sensor = FakePower::new(3900, 0, false);
        for _ in 0..default {
            power.trigger(&mut sensor, false);
        }
        power
    }

    const NO_UPDATE: UpdateDecision = UpdateDecision { available: false };
    const UPDATE: UpdateDecision = UpdateDecision { available: true };

    #[test]
    fn test_start_launches_launcher() {
        let mut power = drained(5);
        let mut about = AboutCountdown::new(10);
        assert_eq!(
            handle_button(ButtonEvent::pressed(Button::Start), &mut power, &mut about, NO_UPDATE),
            HomeAction::Launch(App::Launcher)
        );
    }

    #[test]
    fn test_release_edges_ignored() {
        let mut power = drained(5);
        let mut about = AboutCountdown::new(0);
        for button in Button::ALL {
            assert_eq!(
                handle_button(ButtonEvent::released(button), &mut power, &mut about, UPDATE),
                HomeAction::Stay
            );
        }
        assert_eq!(power.remaining(), 0);
        assert_eq!(about.remaining(), 0);
    }

    #[test]
    fn test_other_buttons_reset_power_only() {
        let mut about = AboutCountdown::new(3);
        for button in [Button::B, Button::Up, Button::Down, Button::Left, Button::Right] {
            let mut power = drained(5);
            assert_eq!(
                handle_button(ButtonEvent::pressed(button), &mut power, &mut about, UPDATE),
                HomeAction::Stay
            );
            assert_eq!(power.remaining(), 5);
        }
        assert_eq!(about.remaining(), 3);
    }

    #[test]
    fn test_a_counts_towards_easter_egg() {
        let mut power = drained(5);
        let mut about = AboutCountdown::new(2);
        let press = ButtonEvent::pressed(Button::A);

        assert_eq!(handle_button(press, &mut power, &mut about, NO_UPDATE), HomeAction::Stay);
        assert_eq!(power.remaining(), 5);
        assert_eq!(handle_button(press, &mut power, &mut about, NO_UPDATE), HomeAction::Stay);
        assert_eq!(
            handle_button(press, &mut power, &mut about, NO_UPDATE),
            HomeAction::Launch(App::EasterEgg)
        );
    }

    #[test]
    fn test_select_starts_update_only_when_available() {
        let mut about = AboutCountdown::new(10);
        let press = ButtonEvent::pressed(Button::Select);

        let mut power = drained(5);
        assert_eq!(handle_button(press, &mut power, &mut about, NO_UPDATE), HomeAction::Stay);
        assert_eq!(power.remaining(), 5);

        let mut power = drained(5);
        assert_eq!(
            handle_button(press, &mut power, &mut about, UPDATE),
            HomeAction::Launch(App::Update)
        );
        assert_eq!(power.remaining(), 5);
    }
}
