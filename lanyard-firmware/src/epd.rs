//! SSD1680 e-paper driver
//!
//! Driver for the 2.9" 128x296 SSD1680 panel over SPI. The glass is
//! mounted landscape, so each gate line is one logical column of the
//! [`FrameBuffer`].
//!
//! Fast refreshes use the controller's differential waveform: the red RAM
//! holds what is currently on the glass, so it is rewritten after every
//! refresh.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;
use lanyard_display::framebuffer::{COLUMN_BYTES, WIDTH};
use lanyard_display::{FrameBuffer, Panel};
use lanyard_hal::Refresh;

/// Gate lines (logical columns)
const GATES: u16 = WIDTH as u16;

/// Longest refresh we wait for before giving up
const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Busy poll interval
const BUSY_POLL_MS: u32 = 5;

/// SSD1680 commands
#[allow(dead_code)]
mod cmd {
    pub const DRIVER_OUTPUT: u8 = 0x01;
    pub const DEEP_SLEEP: u8 = 0x10;
    pub const DATA_ENTRY_MODE: u8 = 0x11;
    pub const SW_RESET: u8 = 0x12;
    pub const TEMP_SENSOR: u8 = 0x18;
    pub const MASTER_ACTIVATION: u8 = 0x20;
    pub const UPDATE_CONTROL_1: u8 = 0x21;
    pub const UPDATE_CONTROL_2: u8 = 0x22;
    pub const WRITE_BW_RAM: u8 = 0x24;
    pub const WRITE_RED_RAM: u8 = 0x26;
    pub const BORDER: u8 = 0x3C;
    pub const RAM_X_RANGE: u8 = 0x44;
    pub const RAM_Y_RANGE: u8 = 0x45;
    pub const RAM_X_COUNTER: u8 = 0x4E;
    pub const RAM_Y_COUNTER: u8 = 0x4F;
}

/// Update sequences for `UPDATE_CONTROL_2`
const SEQUENCE_FULL: u8 = 0xF7;
const SEQUENCE_FAST: u8 = 0xFF;

/// Panel errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EpdError {
    /// SPI transfer failed
    Spi,
    /// Control pin could not be driven or read
    Pin,
    /// Controller stayed busy past the timeout
    Busy,
}

/// SSD1680 driver
pub struct Ssd1680<SPI, DC, RST, BUSY, D> {
    spi: SPI,
    dc: DC,
    rst: RST,
    busy: BUSY,
    delay: D,
    initialized: bool,
}

impl<SPI, DC, RST, BUSY, D> Ssd1680<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    /// Create a new driver; the panel is initialised on first refresh
    pub fn new(spi: SPI, dc: DC, rst: RST, busy: BUSY, delay: D) -> Self {
        Self {
            spi,
            dc,
            rst,
            busy,
            delay,
            initialized: false,
        }
    }

    /// Hardware reset and register setup
    pub fn init(&mut self) -> Result<(), EpdError> {
        self.rst.set_low().map_err(|_| EpdError::Pin)?;
        self.delay.delay_ms(10);
        self.rst.set_high().map_err(|_| EpdError::Pin)?;
        self.delay.delay_ms(10);

        self.command(cmd::SW_RESET, &[])?;
        self.wait_idle()?;

        let last_gate = (GATES - 1).to_le_bytes();
        self.command(cmd::DRIVER_OUTPUT, &[last_gate[0], last_gate[1], 0x00])?;
        // X increments, then Y
        self.command(cmd::DATA_ENTRY_MODE, &[0x03])?;
        self.command(cmd::RAM_X_RANGE, &[0x00, (COLUMN_BYTES - 1) as u8])?;
        self.command(cmd::RAM_Y_RANGE, &[0x00, 0x00, last_gate[0], last_gate[1]])?;
        self.command(cmd::BORDER, &[0x05])?;
        self.command(cmd::UPDATE_CONTROL_1, &[0x00, 0x80])?;
        // Internal temperature sensor
        self.command(cmd::TEMP_SENSOR, &[0x80])?;
        self.wait_idle()?;

        self.initialized = true;
        Ok(())
    }

    /// Put the controller into deep sleep; a reset is needed to wake it
    pub fn sleep(&mut self) -> Result<(), EpdError> {
        self.command(cmd::DEEP_SLEEP, &[0x01])?;
        self.initialized = false;
        Ok(())
    }

    fn command(&mut self, command: u8, data: &[u8]) -> Result<(), EpdError> {
        self.dc.set_low().map_err(|_| EpdError::Pin)?;
        self.spi.write(&[command]).map_err(|_| EpdError::Spi)?;
        if !data.is_empty() {
            self.dc.set_high().map_err(|_| EpdError::Pin)?;
            self.spi.write(data).map_err(|_| EpdError::Spi)?;
        }
        Ok(())
    }

    fn wait_idle(&mut self) -> Result<(), EpdError> {
        let mut waited = 0;
        while self.busy.is_high().map_err(|_| EpdError::Pin)? {
            if waited >= BUSY_TIMEOUT_MS {
                return Err(EpdError::Busy);
            }
            self.delay.delay_ms(BUSY_POLL_MS);
            waited += BUSY_POLL_MS;
        }
        Ok(())
    }

    fn write_ram(&mut self, ram: u8, frame: &FrameBuffer) -> Result<(), EpdError> {
        self.command(cmd::RAM_X_COUNTER, &[0x00])?;
        self.command(cmd::RAM_Y_COUNTER, &[0x00, 0x00])?;
        self.command(ram, &[])?;

        self.dc.set_high().map_err(|_| EpdError::Pin)?;
        for x in 0..GATES as i32 {
            let mut line = frame.column(x);
            // Controller RAM: 1 is white
            for byte in line.iter_mut() {
                *byte = !*byte;
            }
            self.spi.write(&line).map_err(|_| EpdError::Spi)?;
        }
        Ok(())
    }
}

impl<SPI, DC, RST, BUSY, D> Panel for Ssd1680<SPI, DC, RST, BUSY, D>
where
    SPI: SpiDevice,
    DC: OutputPin,
    RST: OutputPin,
    BUSY: InputPin,
    D: DelayNs,
{
    type Error = EpdError;

    fn refresh(&mut self, frame: &FrameBuffer, refresh: Refresh) -> Result<(), EpdError> {
        if !self.initialized {
            self.init()?;
        }

        // Full refresh also primes the base image fast refreshes diff against
        let sequence = match refresh {
            Refresh::Full => {
                self.write_ram(cmd::WRITE_RED_RAM, frame)?;
                SEQUENCE_FULL
            }
            Refresh::Fast => SEQUENCE_FAST,
        };

        self.write_ram(cmd::WRITE_BW_RAM, frame)?;
        self.command(cmd::UPDATE_CONTROL_2, &[sequence])?;
        self.command(cmd::MASTER_ACTIVATION, &[])?;
        self.wait_idle()?;

        if refresh == Refresh::Fast {
            self.write_ram(cmd::WRITE_RED_RAM, frame)?;
        }
        Ok(())
    }
}
