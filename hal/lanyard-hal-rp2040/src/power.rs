//! Battery and USB voltage sensing over the RP2040 ADC
//!
//! Both rails reach the ADC through resistor dividers. The charger's
//! status output is open-drain and pulled low during a charge cycle.

use embassy_rp::adc::{Adc, Blocking, Channel};
use embassy_rp::gpio::Input;
use lanyard_hal::PowerSense;

/// ADC reference voltage in millivolts
const VREF_MV: u32 = 3300;

/// 12-bit full scale
const ADC_FULL_SCALE: u32 = 4096;

/// Convert a raw sample to millivolts at the top of a `ratio`:1 divider
pub fn raw_to_millivolts(raw: u16, ratio: u16) -> u16 {
    let mv = raw as u32 * VREF_MV * ratio as u32 / ADC_FULL_SCALE;
    mv.min(u16::MAX as u32) as u16
}

/// Divider ratios for the sensed rails
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dividers {
    pub battery: u16,
    pub external: u16,
}

impl Default for Dividers {
    fn default() -> Self {
        // VSYS on the Pico W is sensed through a 3:1 divider
        Self {
            battery: 3,
            external: 3,
        }
    }
}

/// ADC-based [`PowerSense`]
pub struct AdcPowerSense<'d> {
    adc: Adc<'d, Blocking>,
    battery: Channel<'d>,
    external: Channel<'d>,
    charge_status: Input<'d>,
    dividers: Dividers,
}

impl<'d> AdcPowerSense<'d> {
    pub fn new(
        adc: Adc<'d, Blocking>,
        battery: Channel<'d>,
        external: Channel<'d>,
        charge_status: Input<'d>,
        dividers: Dividers,
    ) -> Self {
        Self {
            adc,
            battery,
            external,
            charge_status,
            dividers,
        }
    }
}

impl PowerSense for AdcPowerSense<'_> {
    fn battery_millivolts(&mut self) -> u16 {
        match self.adc.blocking_read(&mut self.battery) {
            Ok(raw) => raw_to_millivolts(raw, self.dividers.battery),
            Err(_) => 0,
        }
    }

    fn external_millivolts(&mut self) -> u16 {
        match self.adc.blocking_read(&mut self.external) {
            Ok(raw) => raw_to_millivolts(raw, self.dividers.external),
            Err(_) => 0,
        }
    }

    fn is_charging(&mut self) -> bool {
        self.charge_status.is_low()
    }
}
