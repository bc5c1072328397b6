//! Board wiring
//!
//! Pico W on the badge carrier:
//!
//! | Function            | GPIO            |
//! |---------------------|-----------------|
//! | Buttons (active low)| 2-9: Start, Select, A, B, Up, Down, Left, Right |
//! | EPD SCK / MOSI      | 10 / 11 (SPI1)  |
//! | EPD CS / DC / RST   | 13 / 14 / 15    |
//! | EPD BUSY            | 16              |
//! | Any-button wake     | 21              |
//! | Charger status      | 22              |
//! | Battery sense       | 26 (ADC0, 3:1)  |
//! | USB sense           | 27 (ADC1, 3:1)  |
//! | CYW43 PWR/DIO/CS/CLK| 23 / 24 / 25 / 29 |

use cyw43_pio::PioSpi;
use embassy_rp::gpio::{Input, Output};
use embassy_rp::peripherals::{DMA_CH0, PIO0, SPI1};
use embassy_rp::spi::{Blocking, Spi};
use embassy_time::Delay;
use embedded_hal_bus::spi::ExclusiveDevice;
use lanyard_core::home::HomeScreen;
use lanyard_display::Display;
use lanyard_hal_rp2040::Cyw43Radio;

use crate::catalog::BuiltinService;
use crate::epd::Ssd1680;

/// E-paper SPI device
pub type EpdSpi = ExclusiveDevice<Spi<'static, SPI1, Blocking>, Output<'static>, Delay>;

/// E-paper panel
pub type EpdPanel = Ssd1680<EpdSpi, Output<'static>, Output<'static>, Input<'static>, Delay>;

/// Drawing surface
pub type BadgeDisplay = Display<EpdPanel>;

/// Home screen over the built-in services and the CYW43 radio
pub type BadgeHome = HomeScreen<BuiltinService, Cyw43Radio<'static>, Delay>;

/// CYW43 control-bus runner
pub type WifiRunner = cyw43::Runner<'static, Output<'static>, PioSpi<'static, PIO0, 0, DMA_CH0>>;

/// SPI clock for the panel
pub const EPD_SPI_HZ: u32 = 4_000_000;

/// Seed for the network stack's randomness
pub const NET_SEED: u64 = 0x4C41_4E59_4152_4421;
