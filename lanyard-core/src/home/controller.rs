//! Home screen controller
//!
//! Owns everything the home screen keeps between ticks: settings snapshot,
//! connectivity gate, service registry, both countdowns and the current
//! update decision. Collaborators that are only needed for a moment (store,
//! sensors, canvas, clock) are borrowed per call.

use core::fmt::Write;

use embedded_hal_async::delay::DelayNs;
use heapless::String;
use lanyard_hal::{
    App, ButtonEvent, Canvas, Clock, ConfigStore, Monotonic, PowerSense, Radio, Refresh,
    ResetCause, VersionSource,
};

use super::boot::{clock_unset, BootPhase, BootPlan, UpdateCheck};
use super::draw::{
    action_hint, draw_battery, draw_hint, draw_nickname, report_flush_error, StatusLog,
    SERVICES_ORIGIN,
};
use super::input::{handle_button, HomeAction};
use crate::battery::{calibrate, BatteryReading};
use crate::connectivity::{ConnectivityGate, MAX_SSID_LEN};
use crate::countdown::{AboutCountdown, PowerCountdown, PowerOutcome};
use crate::scheduler::{TickPhases, TickReport, TickScheduler};
use crate::services::registry::MAX_SERVICES;
use crate::services::{Registry, Service, ServiceSource};
use crate::settings::Settings;
use crate::update::{CheckError, UpdateChecker, UpdateDecision};

/// How startup ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootOutcome {
    /// Home screen is ready; start ticking
    Home,
    /// Hand control to an app instead
    Launch(App),
}

/// Collaborators borrowed for the duration of startup
pub struct Startup<'a, St, P, Ck, V, C> {
    pub store: &'a mut St,
    pub power: &'a mut P,
    pub clock: &'a mut Ck,
    pub version: &'a mut V,
    pub canvas: &'a mut C,
    pub reset_cause: ResetCause,
}

/// The home screen
pub struct HomeScreen<S, R, D, const N: usize = MAX_SERVICES> {
    settings: Settings,
    gate: ConnectivityGate<R, D>,
    checker: UpdateChecker,
    registry: Registry<S, N>,
    power: PowerCountdown,
    about: AboutCountdown,
    update: UpdateDecision,
}

impl<S, R, D, const N: usize> HomeScreen<S, R, D, N>
where
    S: Service,
    R: Radio,
    D: DelayNs,
{
    /// Create the home screen for a settings snapshot
    ///
    /// `local_build` is the build number compiled into the firmware.
    pub fn new(settings: Settings, radio: R, delay: D, local_build: u32) -> Self {
        let gate = ConnectivityGate::new(radio, delay, settings.network.clone());
        Self {
            power: PowerCountdown::new(settings.power_countdown),
            about: AboutCountdown::new(settings.about_countdown),
            gate,
            checker: UpdateChecker::new(local_build),
            registry: Registry::empty(),
            update: UpdateDecision::default(),
            settings,
        }
    }

    /// Run the startup sequence
    ///
    /// Calibrates the battery, walks the boot phase (possibly going online
    /// for the clock and an update check), switches the radio off and
    /// discovers services.
    pub async fn start<St, P, Ck, V, C, Src>(
        &mut self,
        io: Startup<'_, St, P, Ck, V, C>,
        services: &mut Src,
    ) -> BootOutcome
    where
        St: ConfigStore,
        P: PowerSense,
        Ck: Clock,
        V: VersionSource,
        C: Canvas,
        Src: ServiceSource<Service = S>,
    {
        let Startup {
            store,
            power,
            clock,
            version,
            canvas,
            reset_cause,
        } = io;

        calibrate(store, power, &mut self.settings.battery).await;

        let phase = BootPhase::load(store).await;
        let plan = BootPlan::for_phase(phase, clock_unset(clock), reset_cause);
        info!("Boot phase {}, plan {}", phase, plan);
        phase.advance(store).await;

        let mut log = StatusLog::new();
        match plan {
            BootPlan::Launch(app) => return BootOutcome::Launch(app),
            BootPlan::Refresh { sync_clock, check } => {
                let synced = !sync_clock || self.sync_clock(clock, canvas, &mut log).await;
                let fetch = match check {
                    UpdateCheck::Forced => true,
                    UpdateCheck::IfSynced => synced,
                    UpdateCheck::Skip => false,
                };
                self.update = if fetch {
                    self.check_updates(version, store, canvas, &mut log).await
                } else {
                    UpdateDecision::recall(store).await
                };
            }
            BootPlan::Recall => self.update = UpdateDecision::recall(store).await,
        }

        self.gate.disable().await;

        self.registry =
            Registry::discover(services, &mut self.gate, self.settings.wifi_timeout_ticks).await;
        info!(
            "{} services running, {} skipped",
            self.registry.len(),
            self.registry.skipped().len()
        );

        BootOutcome::Home
    }

    async fn connect<C: Canvas>(&mut self, canvas: &mut C, log: &mut StatusLog) -> bool {
        if self.gate.is_connected() {
            return true;
        }

        log.title(canvas, "Connecting to WiFi...");
        let mut ssid: String<{ MAX_SSID_LEN + 2 }> = String::new();
        let _ = write!(ssid, "({})", self.gate.identity().ssid.as_str());
        log.line(canvas, &ssid);

        if self.gate.enable(self.settings.wifi_timeout_ticks).await {
            true
        } else {
            log.line(canvas, "Timeout while connecting!");
            false
        }
    }

    async fn sync_clock<Ck: Clock, C: Canvas>(
        &mut self,
        clock: &mut Ck,
        canvas: &mut C,
        log: &mut StatusLog,
    ) -> bool {
        if !self.connect(canvas, log).await {
            return false;
        }

        log.title(canvas, "Configuring clock...");
        match clock.sync().await {
            Ok(()) => {
                log.line(canvas, "Done");
                true
            }
            Err(e) => {
                warn!("Clock sync failed: {}", e);
                log.line(canvas, "Could not set clock!");
                false
            }
        }
    }

    async fn check_updates<V: VersionSource, St: ConfigStore, C: Canvas>(
        &mut self,
        version: &mut V,
        store: &mut St,
        canvas: &mut C,
        log: &mut StatusLog,
    ) -> UpdateDecision {
        if !self.connect(canvas, log).await {
            return UpdateDecision::default();
        }

        log.title(canvas, "Checking for updates...");
        let timeout = self.settings.wifi_timeout_ticks;
        match self
            .checker
            .check_detailed(&mut self.gate, timeout, version, store)
            .await
        {
            Ok(decision) => decision,
            Err(CheckError::Fetch(_)) => {
                log.line(canvas, "Error:");
                log.line(canvas, "Could not download JSON!");
                UpdateDecision::default()
            }
            Err(CheckError::Decode) => {
                log.line(canvas, "Error:");
                log.line(canvas, "Could not decode JSON!");
                UpdateDecision::default()
            }
            Err(CheckError::Offline) => UpdateDecision::default(),
        }
    }

    /// Full draw pass: header, services, full refresh
    pub fn draw<C: Canvas, P: PowerSense>(&mut self, canvas: &mut C, power: &mut P) {
        canvas.clear();

        let reading = BatteryReading::sample(power, &self.settings.battery);
        draw_battery(canvas, &reading, self.update.available);
        draw_nickname(canvas, &self.settings.nickname);
        draw_hint(
            canvas,
            action_hint(self.power.sleep_imminent(), self.update.available),
        );

        let (x, y) = SERVICES_ORIGIN;
        self.registry.dispatch_draw(canvas, x, y);

        if let Err(e) = canvas.flush(Refresh::Full) {
            report_flush_error(e);
        }
    }

    /// Handle a button edge
    pub fn handle_input(&mut self, event: ButtonEvent) -> HomeAction {
        handle_button(event, &mut self.power, &mut self.about, self.update)
    }

    /// Run one scheduler tick
    pub fn tick<C, P, M>(
        &mut self,
        scheduler: &mut TickScheduler,
        canvas: &mut C,
        power: &mut P,
        clock: &M,
    ) -> TickReport
    where
        C: Canvas,
        P: PowerSense,
        M: Monotonic,
    {
        let mut pass = TickPass {
            home: self,
            canvas,
            power,
        };
        scheduler.fire(&mut pass, clock)
    }

    /// Scheduler for the configured tick period
    pub fn scheduler(&self) -> TickScheduler {
        TickScheduler::new(self.settings.tick_period_ms)
    }

    /// Settings snapshot
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Live services
    pub fn registry(&self) -> &Registry<S, N> {
        &self.registry
    }

    /// Connectivity gate
    pub fn gate(&self) -> &ConnectivityGate<R, D> {
        &self.gate
    }

    /// Ticks left before sleep
    pub fn sleep_countdown(&self) -> i16 {
        self.power.remaining()
    }

    /// Current update decision
    pub fn update(&self) -> UpdateDecision {
        self.update
    }
}

struct TickPass<'a, S, R, D, C, P, const N: usize> {
    home: &'a mut HomeScreen<S, R, D, N>,
    canvas: &'a mut C,
    power: &'a mut P,
}

impl<S, R, D, C, P, const N: usize> TickPhases for TickPass<'_, S, R, D, C, P, N>
where
    S: Service,
    R: Radio,
    D: DelayNs,
    C: Canvas,
    P: PowerSense,
{
    fn sleep_countdown(&self) -> i16 {
        self.home.power.remaining()
    }

    fn dispatch_loop(&mut self, sleep_countdown: i16) -> bool {
        self.home.registry.dispatch_loop(sleep_countdown)
    }

    fn redraw(&mut self) {
        self.home.draw(self.canvas, self.power);
    }

    fn advance_power(&mut self, stay_awake: bool) -> PowerOutcome {
        self.home.power.trigger(self.power, stay_awake)
    }
}
