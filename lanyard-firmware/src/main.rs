//! Lanyard - Badge Home Screen Firmware
//!
//! Main firmware binary for RP2040 (Pico W) badges with a 2.9" e-paper
//! panel. Brings up the board, then hands over to the home screen task.

#![no_std]
#![no_main]

use cyw43_pio::{PioSpi, DEFAULT_CLOCK_DIVIDER};
use defmt::*;
use embassy_executor::Spawner;
use embassy_net::StackResources;
use embassy_rp::adc::{Adc, Channel as AdcChannel};
use embassy_rp::bind_interrupts;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_rp::peripherals::PIO0;
use embassy_rp::pio::{InterruptHandler as PioInterruptHandler, Pio};
use embassy_rp::spi::{Config as SpiConfig, Spi};
use embassy_rp::watchdog::Watchdog;
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use heapless::String;
use static_cell::StaticCell;
use {defmt_rtt as _, panic_probe as _};

use lanyard_core::settings::{defaults, keys, Settings, StoreExt};
use lanyard_display::Display;
use lanyard_hal_rp2040::{AdcPowerSense, Cyw43Radio, Dividers, FlashConfigStore, Rp2040System};

use crate::buttons::Buttons;
use crate::epd::Ssd1680;
use crate::net::{HttpState, HttpVersionSource, SntpClock};
use crate::tasks::HomeContext;

mod apps;
mod board;
mod buttons;
mod catalog;
mod channels;
mod epd;
mod net;
mod tasks;

/// Build number compared against the remote descriptor
const LOCAL_BUILD: &str = env!("LANYARD_BUILD");

bind_interrupts!(struct Irqs {
    PIO0_IRQ_0 => PioInterruptHandler<PIO0>;
});

// Static cells for state that tasks borrow forever
static WIFI_STATE: StaticCell<cyw43::State> = StaticCell::new();
static NET_RESOURCES: StaticCell<StackResources<4>> = StaticCell::new();
static HTTP_STATE: StaticCell<HttpState> = StaticCell::new();

/// Main entry point
#[embassy_executor::main]
async fn main(spawner: Spawner) {
    info!("Lanyard firmware starting...");

    let p = embassy_rp::init(Default::default());
    info!("Peripherals initialized");

    // Reset cause and pending launch request
    let wake = Input::new(p.PIN_21, Pull::Up);
    let mut system = Rp2040System::new(Watchdog::new(p.WATCHDOG), wake);

    let mut store = FlashConfigStore::new(p.FLASH, p.DMA_CH1);

    // E-paper on SPI1
    let mut spi_config = SpiConfig::default();
    spi_config.frequency = board::EPD_SPI_HZ;
    let spi = Spi::new_blocking_txonly(p.SPI1, p.PIN_10, p.PIN_11, spi_config);
    let cs = Output::new(p.PIN_13, Level::High);
    let spi = ExclusiveDevice::new(spi, cs, Delay).unwrap();
    let panel = Ssd1680::new(
        spi,
        Output::new(p.PIN_14, Level::Low),
        Output::new(p.PIN_15, Level::High),
        Input::new(p.PIN_16, Pull::None),
        Delay,
    );
    let mut display = Display::new(panel);
    info!("Display initialized");

    // Buttons, in Button::ALL order
    let buttons = Buttons::new([
        Input::new(p.PIN_2, Pull::Up),
        Input::new(p.PIN_3, Pull::Up),
        Input::new(p.PIN_4, Pull::Up),
        Input::new(p.PIN_5, Pull::Up),
        Input::new(p.PIN_6, Pull::Up),
        Input::new(p.PIN_7, Pull::Up),
        Input::new(p.PIN_8, Pull::Up),
        Input::new(p.PIN_9, Pull::Up),
    ]);
    spawner.spawn(tasks::input_task(buttons)).unwrap();

    if let Some(app) = system.take_launch_request() {
        apps::run(app, &mut store, &mut display).await;
        system.restart();
    }

    let power = AdcPowerSense::new(
        Adc::new_blocking(p.ADC, Default::default()),
        AdcChannel::new_pin(p.PIN_26, Pull::None),
        AdcChannel::new_pin(p.PIN_27, Pull::None),
        Input::new(p.PIN_22, Pull::Up),
        Dividers::default(),
    );
    info!("ADC initialized");

    // CYW43 over PIO0
    let fw = include_bytes!("../firmware/43439A0.bin");
    let clm = include_bytes!("../firmware/43439A0_clm.bin");

    let pwr = Output::new(p.PIN_23, Level::Low);
    let cs = Output::new(p.PIN_25, Level::High);
    let mut pio = Pio::new(p.PIO0, Irqs);
    let wifi_spi = PioSpi::new(
        &mut pio.common,
        pio.sm0,
        DEFAULT_CLOCK_DIVIDER,
        pio.irq0,
        cs,
        p.PIN_24,
        p.PIN_29,
        p.DMA_CH0,
    );

    let state = WIFI_STATE.init(cyw43::State::new());
    let (net_device, mut control, runner) = cyw43::new(state, pwr, wifi_spi, fw).await;
    spawner.spawn(tasks::cyw43_task(runner)).unwrap();
    control.init(clm).await;
    info!("CYW43 initialized");

    let (stack, runner) = embassy_net::new(
        net_device,
        embassy_net::Config::dhcpv4(Default::default()),
        NET_RESOURCES.init(StackResources::new()),
        board::NET_SEED,
    );
    spawner.spawn(tasks::net_task(runner)).unwrap();

    // Stays idle until the connectivity gate needs it
    let radio = Cyw43Radio::new(control, stack);

    let settings = Settings::load(&mut store).await;
    let url = match store.get_str(keys::BADGE, keys::VERSION_URL).await {
        Some(url) => url,
        None => String::try_from(defaults::VERSION_URL).unwrap_or_default(),
    };
    info!("Settings loaded, version URL {}", url.as_str());

    let local_build = LOCAL_BUILD.parse().unwrap_or(0);
    let home = board::BadgeHome::new(settings, radio, Delay, local_build);

    let context = HomeContext {
        home,
        display,
        power,
        store,
        clock: SntpClock::new(stack),
        version: HttpVersionSource::new(stack, HTTP_STATE.init(HttpState::new()), url),
        system,
    };
    spawner.spawn(tasks::home_task(context)).unwrap();

    info!("All tasks spawned, firmware running");
}
