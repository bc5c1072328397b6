//! Reset cause, app hand-off and sleep on RP2040
//!
//! The watchdog scratch registers survive a watchdog-triggered reset, so
//! they carry two values into the next boot:
//!
//! - scratch 0: sleep marker, set right before sleeping
//! - scratch 1: app requested by [`System::launch`]
//!
//! Both are consumed when [`Rp2040System`] is created.

use embassy_rp::gpio::Input;
use embassy_rp::watchdog::Watchdog;
use lanyard_hal::{App, ResetCause, System};

const SLEEP_SCRATCH: usize = 0;
const LAUNCH_SCRATCH: usize = 1;

/// Marker written to the sleep scratch register ("SLEP")
pub const SLEEP_MAGIC: u32 = 0x534C_4550;

/// Decode the scratch registers left by the previous run
pub fn decode_scratch(sleep: u32, launch: u32) -> (ResetCause, Option<App>) {
    let cause = if sleep == SLEEP_MAGIC {
        ResetCause::SleepWake
    } else {
        ResetCause::PowerOn
    };
    let app = u8::try_from(launch).ok().and_then(App::from_u8);
    (cause, app)
}

/// Watchdog-backed [`System`]
pub struct Rp2040System<'d> {
    watchdog: Watchdog,
    wake: Input<'d>,
    reset_cause: ResetCause,
    pending: Option<App>,
}

impl<'d> Rp2040System<'d> {
    /// Read and clear the scratch registers
    ///
    /// `wake` is the shared button interrupt line; it is held low while any
    /// button is down.
    pub fn new(mut watchdog: Watchdog, wake: Input<'d>) -> Self {
        let (reset_cause, pending) = decode_scratch(
            watchdog.get_scratch(SLEEP_SCRATCH),
            watchdog.get_scratch(LAUNCH_SCRATCH),
        );
        watchdog.set_scratch(SLEEP_SCRATCH, 0);
        watchdog.set_scratch(LAUNCH_SCRATCH, 0);
        Self {
            watchdog,
            wake,
            reset_cause,
            pending,
        }
    }

    /// App requested before the last reset, if any
    pub fn take_launch_request(&mut self) -> Option<App> {
        self.pending.take()
    }

    /// Restart into the home screen
    pub fn restart(&mut self) -> ! {
        self.watchdog.trigger_reset();
        loop {
            cortex_m::asm::nop();
        }
    }
}

impl System for Rp2040System<'_> {
    fn reset_cause(&self) -> ResetCause {
        self.reset_cause
    }

    fn launch(&mut self, app: App) -> ! {
        self.watchdog
            .set_scratch(LAUNCH_SCRATCH, app.as_u8() as u32);
        self.restart()
    }

    async fn deep_sleep(&mut self) {
        self.watchdog.set_scratch(SLEEP_SCRATCH, SLEEP_MAGIC);
        // Let go of any button still held from the last interaction first
        self.wake.wait_for_high().await;
        self.wake.wait_for_low().await;
        self.restart()
    }
}
