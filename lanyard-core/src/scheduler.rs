//! Tick scheduler
//!
//! A periodic driver built from a one-shot deadline. Each firing runs the
//! tick phases in a fixed order and only then re-arms, relative to the time
//! the tick finished. A slow tick therefore pushes the next one back and
//! ticks can never overlap.

use lanyard_hal::Monotonic;

use crate::countdown::PowerOutcome;

/// The work one tick performs, in call order
pub trait TickPhases {
    /// Power countdown value handed to the loop callbacks
    fn sleep_countdown(&self) -> i16;

    /// Run every service loop callback, `true` if one asked to stay awake
    fn dispatch_loop(&mut self, sleep_countdown: i16) -> bool;

    /// Full redraw of the home screen
    fn redraw(&mut self);

    /// Advance the power countdown by one
    fn advance_power(&mut self, stay_awake: bool) -> PowerOutcome;
}

/// What happened during one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickReport {
    /// A service asked the badge to stay awake
    pub stay_awake: bool,
    /// Power countdown decision
    pub power: PowerOutcome,
}

/// Self-rearming tick scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TickScheduler {
    period_ms: u32,
    deadline_ms: Option<u64>,
    ticks: u32,
}

impl TickScheduler {
    /// Create a disarmed scheduler
    pub fn new(period_ms: u16) -> Self {
        Self {
            period_ms: u32::from(period_ms),
            deadline_ms: None,
            ticks: 0,
        }
    }

    /// Tick period in milliseconds
    pub fn period_ms(&self) -> u32 {
        self.period_ms
    }

    /// Next deadline, `None` while disarmed
    pub fn deadline_ms(&self) -> Option<u64> {
        self.deadline_ms
    }

    /// Ticks fired so far
    pub fn ticks(&self) -> u32 {
        self.ticks
    }

    /// Arm the first deadline one period after `now_ms`
    pub fn arm(&mut self, now_ms: u64) {
        self.deadline_ms = Some(now_ms + u64::from(self.period_ms));
    }

    /// Stop firing
    pub fn disarm(&mut self) {
        self.deadline_ms = None;
    }

    /// Check whether the deadline has passed
    pub fn is_due(&self, now_ms: u64) -> bool {
        matches!(self.deadline_ms, Some(deadline) if now_ms >= deadline)
    }

    /// Milliseconds until the deadline (0 if overdue)
    pub fn remaining_ms(&self, now_ms: u64) -> Option<u64> {
        self.deadline_ms
            .map(|deadline| deadline.saturating_sub(now_ms))
    }

    /// Run one tick: loop dispatch, redraw, power countdown, re-arm
    ///
    /// The scheduler is re-armed from `clock` after all phases completed.
    pub fn fire<T: TickPhases, M: Monotonic>(&mut self, target: &mut T, clock: &M) -> TickReport {
        let stay_awake = target.dispatch_loop(target.sleep_countdown());
        target.redraw();
        let power = target.advance_power(stay_awake);

        self.ticks = self.ticks.wrapping_add(1);
        self.arm(clock.now_ms());

        TickReport { stay_awake, power }
    }
}
