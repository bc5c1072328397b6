//! Battery gauge logic
//!
//! Calibration of the sense divider drop, the gauge fill width and the
//! status text shown next to it.

use core::fmt::Write;

use heapless::String;
use lanyard_hal::{ConfigStore, PowerSense};

use crate::settings::{defaults, keys, StoreExt};

/// Gauge fill width at full charge (pixels)
pub const GAUGE_WIDTH: u32 = 38;

/// Below this the battery is considered absent (mV)
pub const NO_BATTERY_MV: i32 = 500;

/// External supply level that counts as "charging" in the status text (mV)
pub const CHARGING_EXTERNAL_MV: u16 = 4000;

/// External supply level that keeps the badge awake (mV)
pub const EXTERNAL_POWER_MV: u16 = 4500;

/// Calibration reference: drop is measured against this (mV)
const CALIBRATION_REFERENCE_MV: u16 = 5200;

/// Minimum raw battery reading for a meaningful calibration (mV)
const CALIBRATION_MIN_BATTERY_MV: u16 = 2500;

/// Status text buffer length
pub const STATUS_LEN: usize = 20;

/// Battery gauge calibration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryCalibration {
    /// Empty battery voltage (mV)
    pub min_mv: u16,
    /// Full battery voltage (mV)
    pub max_mv: u16,
    /// Correction added to every raw reading (mV)
    pub drop_mv: i32,
}

impl Default for BatteryCalibration {
    fn default() -> Self {
        Self {
            min_mv: defaults::BATTERY_MIN_MV,
            max_mv: defaults::BATTERY_MAX_MV,
            drop_mv: Self::drop_from_raw(defaults::BATTERY_DROP_RAW),
        }
    }
}

impl BatteryCalibration {
    /// Decode the stored drop (offset by 1000)
    pub fn drop_from_raw(raw: u16) -> i32 {
        i32::from(raw) - 1000
    }

    /// Apply the drop correction to a raw reading
    pub fn corrected_mv(&self, raw_mv: u16) -> i32 {
        i32::from(raw_mv) + self.drop_mv
    }

    /// Gauge fill width for a corrected voltage, clamped to `0..=GAUGE_WIDTH`
    pub fn gauge_width(&self, mv: i32) -> u32 {
        let span = i32::from(self.max_mv) - i32::from(self.min_mv);
        if span <= 0 {
            return 0;
        }
        let above = mv - i32::from(self.min_mv);
        if above <= 0 {
            return 0;
        }
        // Round to nearest
        let width = (above * GAUGE_WIDTH as i32 * 2 + span) / (span * 2);
        (width as u32).min(GAUGE_WIDTH)
    }
}

/// What the status text next to the gauge says
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatteryStatus {
    /// Battery voltage below [`NO_BATTERY_MV`]
    NoBattery,
    /// Charging from an external supply
    Charging,
    /// Corrected voltage in mV
    Voltage(i32),
}

impl BatteryStatus {
    /// Render the status as display text
    pub fn text(&self) -> String<STATUS_LEN> {
        let mut out = String::new();
        match self {
            BatteryStatus::NoBattery => {
                let _ = out.push_str("No battery");
            }
            BatteryStatus::Charging => {
                let _ = out.push_str("Charging...");
            }
            BatteryStatus::Voltage(mv) => {
                let centi = (mv + 5) / 10;
                let _ = write!(out, "{}.{:02}v", centi / 100, centi % 100);
            }
        }
        out
    }
}

/// One battery reading, ready for display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BatteryReading {
    /// Corrected battery voltage (mV)
    pub millivolts: i32,
    /// Gauge fill width (pixels)
    pub gauge: u32,
    /// Status classification
    pub status: BatteryStatus,
}

impl BatteryReading {
    /// Sample the power sensors and classify
    pub fn sample<P: PowerSense>(power: &mut P, calibration: &BatteryCalibration) -> Self {
        let millivolts = calibration.corrected_mv(power.battery_millivolts());
        let status = if millivolts > NO_BATTERY_MV {
            if power.is_charging() && power.external_millivolts() > CHARGING_EXTERNAL_MV {
                BatteryStatus::Charging
            } else {
                BatteryStatus::Voltage(millivolts)
            }
        } else {
            BatteryStatus::NoBattery
        };

        Self {
            millivolts,
            gauge: calibration.gauge_width(millivolts),
            status,
        }
    }
}

/// Check the live external power signal
pub fn external_power_present<P: PowerSense>(power: &mut P) -> bool {
    power.external_millivolts() > EXTERNAL_POWER_MV
}

/// Re-measure the sense divider drop when conditions allow
///
/// Only valid on external power with the charger idle (battery full) and a
/// battery present. Stores the new drop and updates `calibration` in place.
pub async fn calibrate<S: ConfigStore, P: PowerSense>(
    store: &mut S,
    power: &mut P,
    calibration: &mut BatteryCalibration,
) -> bool {
    let battery = power.battery_millivolts();
    if power.is_charging()
        || !external_power_present(power)
        || battery <= CALIBRATION_MIN_BATTERY_MV
    {
        return false;
    }

    let raw = CALIBRATION_REFERENCE_MV.saturating_sub(battery);
    if let Err(e) = store.set_u16(keys::SPLASH, keys::BATTERY_DROP, raw).await {
        warn!("Storing battery calibration failed: {}", e);
        return false;
    }
    calibration.drop_mv = BatteryCalibration::drop_from_raw(raw);
    info!("Battery drop calibrated to {} mV", calibration.drop_mv);
    true
}
