//! Home screen task
//!
//! Runs startup once, then waits on whichever comes first: the tick
//! scheduler's deadline or a button edge. Ticks and button handling run
//! on this one task, so they never interleave.

use defmt::*;
use embassy_futures::select::{select, Either};
use embassy_time::{Instant, Timer};
use lanyard_core::countdown::PowerOutcome;
use lanyard_core::home::{BootOutcome, HomeAction, Startup};
use lanyard_hal::{Monotonic, System};
use lanyard_hal_rp2040::{AdcPowerSense, FlashConfigStore, Rp2040System};

use crate::board::{BadgeDisplay, BadgeHome};
use crate::catalog::Catalog;
use crate::channels::INPUT_CHANNEL;
use crate::net::{HttpVersionSource, SntpClock};

/// Milliseconds since boot
pub struct Uptime;

impl Monotonic for Uptime {
    fn now_ms(&self) -> u64 {
        Instant::now().as_millis()
    }
}

/// Everything the home screen owns for its lifetime
pub struct HomeContext {
    pub home: BadgeHome,
    pub display: BadgeDisplay,
    pub power: AdcPowerSense<'static>,
    pub store: FlashConfigStore<'static>,
    pub clock: SntpClock,
    pub version: HttpVersionSource,
    pub system: Rp2040System<'static>,
}

/// Home task - startup, then the tick/input loop until sleep or launch
#[embassy_executor::task]
pub async fn home_task(mut ctx: HomeContext) {
    info!("Home task started");

    let reset_cause = ctx.system.reset_cause();
    let startup = Startup {
        store: &mut ctx.store,
        power: &mut ctx.power,
        clock: &mut ctx.clock,
        version: &mut ctx.version,
        canvas: &mut ctx.display,
        reset_cause,
    };
    if let BootOutcome::Launch(app) = ctx.home.start(startup, &mut Catalog).await {
        info!("Handing over to {}", app);
        ctx.system.launch(app);
    }

    ctx.home.draw(&mut ctx.display, &mut ctx.power);

    let uptime = Uptime;
    let mut scheduler = ctx.home.scheduler();
    scheduler.arm(uptime.now_ms());

    loop {
        let wait_ms = scheduler
            .remaining_ms(uptime.now_ms())
            .unwrap_or(scheduler.period_ms() as u64);

        match select(Timer::after_millis(wait_ms), INPUT_CHANNEL.receive()).await {
            Either::First(()) => {
                let report =
                    ctx.home
                        .tick(&mut scheduler, &mut ctx.display, &mut ctx.power, &uptime);
                trace!("Tick {}: {}", scheduler.ticks(), report);

                if report.power == PowerOutcome::Sleep {
                    info!("Going to sleep");
                    if let Err(e) = ctx.display.panel_mut().sleep() {
                        warn!("Panel sleep failed: {}", e);
                    }
                    ctx.system.deep_sleep().await;
                }
            }
            Either::Second(event) => match ctx.home.handle_input(event) {
                HomeAction::Stay => {}
                HomeAction::Launch(app) => {
                    info!("Launching {}", app);
                    ctx.system.launch(app);
                }
            },
        }
    }
}
