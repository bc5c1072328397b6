//! Countdown timers
//!
//! A countdown decrements once per trigger and expires exactly once, on the
//! first trigger that takes it below zero. Two instances drive the home
//! screen:
//!
//! - [`PowerCountdown`]: advanced once per tick, puts the badge to sleep
//!   unless external power (or a service) keeps it awake
//! - [`AboutCountdown`]: advanced per A press, opens the easter egg

use lanyard_hal::PowerSense;

use crate::battery::external_power_present;

/// Outcome of a single trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TriggerResult {
    /// Still counting (or already expired earlier)
    Continue,
    /// This trigger took the countdown below zero
    Expired,
}

/// Decrementing counter with one-shot expiry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Countdown {
    remaining: i16,
    default: i16,
    expired: bool,
}

impl Countdown {
    /// Create a countdown starting at `default`
    pub fn new(default: u8) -> Self {
        Self {
            remaining: i16::from(default),
            default: i16::from(default),
            expired: false,
        }
    }

    /// Current value
    pub fn remaining(&self) -> i16 {
        self.remaining
    }

    /// Value restored by [`Countdown::reset`]
    pub fn default_value(&self) -> i16 {
        self.default
    }

    /// Restore the default and re-arm expiry
    pub fn reset(&mut self) {
        self.remaining = self.default;
        self.expired = false;
    }

    /// Decrement by one
    pub fn trigger(&mut self) -> TriggerResult {
        self.remaining = self.remaining.saturating_sub(1);
        if self.remaining < 0 && !self.expired {
            self.expired = true;
            TriggerResult::Expired
        } else {
            TriggerResult::Continue
        }
    }
}

/// What the power countdown decided on this tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PowerOutcome {
    /// Still counting down
    Counting,
    /// Reached the end but something keeps the badge awake; reset
    KeptAwake,
    /// Time to sleep
    Sleep,
}

/// Sleep countdown
///
/// Sleeps only once the count goes negative. At zero and below, a live
/// external power reading (or a service asking to stay awake) resets the
/// count instead, so a badge on a charger never sleeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PowerCountdown {
    countdown: Countdown,
}

impl PowerCountdown {
    /// Create a power countdown of `default` ticks
    pub fn new(default: u8) -> Self {
        Self {
            countdown: Countdown::new(default),
        }
    }

    /// Ticks left before sleep
    pub fn remaining(&self) -> i16 {
        self.countdown.remaining()
    }

    /// Sleep is imminent (shown as a wake-up hint)
    pub fn sleep_imminent(&self) -> bool {
        self.countdown.remaining() < 1
    }

    /// Defer sleep after user activity
    pub fn reset(&mut self) {
        self.countdown.reset();
    }

    /// Advance by one tick
    ///
    /// `power` is only sampled once the count reaches zero.
    pub fn trigger<P: PowerSense>(&mut self, power: &mut P, stay_awake: bool) -> PowerOutcome {
        let result = self.countdown.trigger();
        let remaining = self.countdown.remaining();

        if remaining > 0 {
            debug!("Sleep in {}...", remaining);
            return PowerOutcome::Counting;
        }

        if external_power_present(power) {
            info!("External power connected, not sleeping");
            self.countdown.reset();
            return PowerOutcome::KeptAwake;
        }

        if stay_awake {
            info!("Service requested to stay awake");
            self.countdown.reset();
            return PowerOutcome::KeptAwake;
        }

        match result {
            TriggerResult::Expired => {
                info!("Going to sleep...");
                PowerOutcome::Sleep
            }
            TriggerResult::Continue => PowerOutcome::Counting,
        }
    }
}

/// Easter-egg countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AboutCountdown {
    countdown: Countdown,
}

impl AboutCountdown {
    /// Create an easter-egg countdown of `default` presses
    pub fn new(default: u8) -> Self {
        Self {
            countdown: Countdown::new(default),
        }
    }

    /// Presses left
    pub fn remaining(&self) -> i16 {
        self.countdown.remaining()
    }

    /// Start over
    pub fn reset(&mut self) {
        self.countdown.reset();
    }

    /// Count one press, `true` when the easter egg should open
    pub fn trigger(&mut self) -> bool {
        match self.countdown.trigger() {
            TriggerResult::Expired => true,
            TriggerResult::Continue => {
                debug!("Magic in {}...", self.countdown.remaining());
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakePower;
    use proptest::prelude::*;

    fn on_battery() -> FakePower {
        FakePower::new(3900, 0, false)
    }

    fn on_usb() -> FakePower {
        FakePower::new(4100, 5000, false)
    }

    proptest! {
        #[test]
        fn prop_expires_on_default_plus_one(default in 0u8..=255, extra in 0usize..32) {
            let mut countdown = Countdown::new(default);
            for _ in 0..default {
                prop_assert_eq!(countdown.trigger(), TriggerResult::Continue);
            }
            prop_assert_eq!(countdown.trigger(), TriggerResult::Expired);
            for _ in 0..extra {
                prop_assert_eq!(countdown.trigger(), TriggerResult::Continue);
            }
        }

        #[test]
        fn prop_reset_rearms(default in 0u8..=64, before in 0usize..200) {
            let mut countdown = Countdown::new(default);
            for _ in 0..before {
                countdown.trigger();
            }
            countdown.reset();
            prop_assert_eq!(countdown.remaining(), i16::from(default));
            for _ in 0..default {
                prop_assert_eq!(countdown.trigger(), TriggerResult::Continue);
            }
            prop_assert_eq!(countdown.trigger(), TriggerResult::Expired);
        }
    }

    #[test]
    fn test_remaining_strictly_decreases() {
        let mut countdown = Countdown::new(3);
        let mut last = countdown.remaining();
        for _ in 0..6 {
            countdown.trigger();
            assert_eq!(countdown.remaining(), last - 1);
            last = countdown.remaining();
        }
    }

    #[test]
    fn test_power_sleeps_only_when_negative() {
        // The zero-crossing is a warning, not a sleep
        let mut power = PowerCountdown::new(2);
        let mut sensor = on_battery();

        assert_eq!(power.trigger(&mut sensor, false), PowerOutcome::Counting);
        assert_eq!(power.remaining(), 1);
        assert!(!power.sleep_imminent());

        assert_eq!(power.trigger(&mut sensor, false), PowerOutcome::Counting);
        assert_eq!(power.remaining(), 0);
        assert!(power.sleep_imminent());

        assert_eq!(power.trigger(&mut sensor, false), PowerOutcome::Sleep);
        assert_eq!(power.remaining(), -1);
    }

    #[test]
    fn test_power_at_zero_with_external_power_resets() {
        let mut power = PowerCountdown::new(1);
        power.trigger(&mut on_battery(), false);
        assert_eq!(power.remaining(), 0);

        assert_eq!(power.trigger(&mut on_usb(), false), PowerOutcome::KeptAwake);
        assert_eq!(power.remaining(), 1);
    }

    #[test]
    fn test_power_reaching_zero_on_usb_resets_early() {
        let mut power = PowerCountdown::new(1);
        assert_eq!(power.trigger(&mut on_usb(), false), PowerOutcome::KeptAwake);
        assert_eq!(power.remaining(), 1);
    }

    #[test]
    fn test_power_samples_sensor_only_at_the_end() {
        let mut power = PowerCountdown::new(3);
        let mut sensor = on_battery();
        power.trigger(&mut sensor, false);
        power.trigger(&mut sensor, false);
        assert_eq!(sensor.external_reads, 0);
        power.trigger(&mut sensor, false);
        assert_eq!(sensor.external_reads, 1);
    }

    #[test]
    fn test_power_stay_awake_request_preempts_sleep() {
        let mut power = PowerCountdown::new(0);
        assert_eq!(
            power.trigger(&mut on_battery(), true),
            PowerOutcome::KeptAwake
        );
        assert_eq!(power.remaining(), 0);
    }

    #[test]
    fn test_power_reset_defers_sleep() {
        let mut power = PowerCountdown::new(1);
        let mut sensor = on_battery();
        power.trigger(&mut sensor, false);
        power.reset();
        assert_eq!(power.trigger(&mut sensor, false), PowerOutcome::Counting);
        assert_eq!(power.trigger(&mut sensor, false), PowerOutcome::Sleep);
    }

    #[test]
    fn test_about_opens_after_default_plus_one_presses() {
        let mut about = AboutCountdown::new(10);
        for _ in 0..10 {
            assert!(!about.trigger());
        }
        assert!(about.trigger());
        assert!(!about.trigger());
        about.reset();
        assert_eq!(about.remaining(), 10);
    }
}
