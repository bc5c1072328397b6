//! Battery and external power sensing

/// Power supply readings
///
/// All voltages are in millivolts. Readings are expected to be cheap
/// enough to take on every draw pass.
pub trait PowerSense {
    /// Battery voltage as seen by the sense divider (uncalibrated)
    fn battery_millivolts(&mut self) -> u16;

    /// External (USB) supply voltage
    fn external_millivolts(&mut self) -> u16;

    /// Charger reports an active charge cycle
    fn is_charging(&mut self) -> bool;
}
