//! Time and system lifecycle
//!
//! - [`Clock`]: wall-clock time, synchronised over the network
//! - [`Monotonic`]: millisecond uptime for scheduling
//! - [`System`]: reset cause, app hand-off and deep sleep

/// Errors from wall-clock synchronisation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ClockError {
    /// Time server unreachable or did not answer
    Network,
    /// Answer could not be decoded
    InvalidResponse,
    /// Clock hardware rejected the new time
    Hardware,
}

/// Wall clock
pub trait Clock {
    /// Seconds since the Unix epoch (0 if never set)
    fn unix_time(&mut self) -> u64;

    /// Set the clock from a network time source
    ///
    /// Callers must make sure the network link is up first.
    fn sync(&mut self) -> impl core::future::Future<Output = Result<(), ClockError>>;
}

/// Monotonic millisecond counter
pub trait Monotonic {
    /// Milliseconds since boot
    fn now_ms(&self) -> u64;
}

/// Why the badge last started
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ResetCause {
    /// Cold boot, reset button or watchdog
    PowerOn,
    /// Woken from low-power sleep
    SleepWake,
}

/// Applications the home screen can hand control to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum App {
    /// First-boot setup flow
    Setup = 1,
    /// Onboarding content shown on the second boot
    Onboarding = 2,
    /// Full-screen application launcher
    Launcher = 3,
    /// Easter egg behind the A button
    EasterEgg = 4,
    /// Firmware update flow
    Update = 5,
}

impl App {
    /// Get the app as a byte value
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Create an app from a byte value
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(App::Setup),
            2 => Some(App::Onboarding),
            3 => Some(App::Launcher),
            4 => Some(App::EasterEgg),
            5 => Some(App::Update),
            _ => None,
        }
    }
}

/// System lifecycle control
pub trait System {
    /// Cause of the current boot
    fn reset_cause(&self) -> ResetCause;

    /// Hand control to another application
    ///
    /// This does not return: the badge restarts into the requested app.
    fn launch(&mut self, app: App) -> !;

    /// Enter low-power sleep
    ///
    /// The badge wakes through a reset with [`ResetCause::SleepWake`].
    fn deep_sleep(&mut self) -> impl core::future::Future<Output = ()>;
}
