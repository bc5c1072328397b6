//! Service lifecycle contract
//!
//! A service is a small plugin: it is set up once at discovery, then
//! optionally called on every tick (loop) and on every redraw (draw).
//! Everything a service does is fallible; faults are contained per service
//! and per phase by [`contain`].

use lanyard_hal::Canvas;

/// Fault raised by a service entry point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// Needed the network and it was not there
    Network,
    /// Storage access failed
    Storage,
    /// Drawing failed
    Display,
    /// Service reached an inconsistent state
    InvalidState,
    /// Service-specific failure
    Other(&'static str),
}

/// Lifecycle phase a fault happened in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    Setup,
    Loop,
    Draw,
}

/// Entry points a loaded code unit actually provides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct EntryPoints {
    /// Unit implements [`Service::run_loop`]
    pub run_loop: bool,
    /// Unit implements [`Service::draw`]
    pub draw: bool,
}

impl EntryPoints {
    /// Setup only
    pub const NONE: Self = Self {
        run_loop: false,
        draw: false,
    };

    /// Setup, loop and draw
    pub const ALL: Self = Self {
        run_loop: true,
        draw: true,
    };
}

/// Service lifecycle trait
///
/// `setup` is required. `run_loop` and `draw` are only called when the
/// manifest asks for them *and* [`Service::entry_points`] reports them.
pub trait Service {
    /// One-time initialisation, run during discovery
    fn setup(&mut self) -> Result<(), Fault>;

    /// Which optional entry points this unit implements
    fn entry_points(&self) -> EntryPoints {
        EntryPoints::NONE
    }

    /// Periodic work
    ///
    /// `sleep_countdown` is the number of ticks before the badge sleeps.
    /// Returns `true` to ask the badge to stay awake.
    fn run_loop(&mut self, sleep_countdown: i16) -> Result<bool, Fault> {
        let _ = sleep_countdown;
        Ok(false)
    }

    /// Draw below the home screen header
    ///
    /// Returns the vertical space consumed, in pixels.
    fn draw<C: Canvas>(&mut self, canvas: &mut C, x: i32, y: i32) -> Result<i32, Fault> {
        let _ = (canvas, x, y);
        Ok(0)
    }
}

/// Run one service entry point inside a fault boundary
///
/// The fault is logged with the service name and phase and handed back to
/// the caller, which decides what exclusion it implies. It never escapes
/// further than the scheduler.
pub fn contain<T>(
    service: &str,
    phase: Phase,
    entry: impl FnOnce() -> Result<T, Fault>,
) -> Result<T, Fault> {
    entry().inspect_err(|fault| {
        warn!("[{}] {} fault: {}", service, phase, fault);
    })
}
