//! Persisted settings
//!
//! Typed access to the namespaced configuration store plus the snapshot of
//! every setting the home screen consumes. Absent or unreadable keys fall
//! back to the defaults below, so a blank store yields a working badge.

use heapless::String;
use lanyard_hal::{ConfigStore, StoreError};

use crate::battery::BatteryCalibration;
use crate::connectivity::NetworkIdentity;

/// Maximum nickname length in bytes
pub const MAX_NICKNAME_LEN: usize = 32;

/// Store namespaces and keys
pub mod keys {
    pub const OWNER: &str = "owner";
    pub const BADGE: &str = "badge";
    pub const SPLASH: &str = "splash";

    pub const NICKNAME: &str = "name";
    pub const WIFI_SSID: &str = "wifi.ssid";
    pub const WIFI_PASSWORD: &str = "wifi.password";
    pub const WIFI_TIMEOUT: &str = "wifi.timeout";
    pub const BATTERY_MIN: &str = "bat.volt.min";
    pub const BATTERY_MAX: &str = "bat.volt.max";
    pub const BATTERY_DROP: &str = "bat.volt.drop";
    pub const POWER_AMOUNT: &str = "timer.amount";
    pub const TICK_PERIOD: &str = "timer.period";
    pub const ABOUT_AMOUNT: &str = "about.amount";
    pub const SETUP_STATE: &str = "setup.state";
    pub const UPDATE_READY: &str = "OTA.ready";
    pub const VERSION_URL: &str = "version.url";
}

/// Default values for absent keys
pub mod defaults {
    pub const NICKNAME: &str = "Jan de Boer";
    pub const WIFI_SSID: &str = "SHA2017-insecure";
    /// Connect timeout in poll ticks
    pub const WIFI_TIMEOUT: u8 = 40;
    pub const BATTERY_MIN_MV: u16 = 3600;
    pub const BATTERY_MAX_MV: u16 = 4200;
    /// Stored drop is offset by 1000 so it fits an unsigned field
    pub const BATTERY_DROP_RAW: u16 = 1000;
    pub const POWER_AMOUNT: u8 = 50;
    pub const TICK_PERIOD_MS: u16 = 250;
    pub const ABOUT_AMOUNT: u8 = 10;
    pub const VERSION_URL: &str = "http://badge.sha2017.org/version";
}

/// Typed helpers on top of [`ConfigStore`]
///
/// Integers are little-endian, strings UTF-8. Getters never fail: a missing
/// key, a storage error or a malformed value all yield the default.
#[allow(async_fn_in_trait)]
pub trait StoreExt: ConfigStore {
    /// Read a `u8`, or `default`
    async fn get_u8(&mut self, namespace: &str, key: &str, default: u8) -> u8 {
        let mut buf = [0u8; 1];
        match self.read(namespace, key, &mut buf).await {
            Ok(1) => buf[0],
            Ok(_) => {
                warn!("{}/{} has unexpected size", namespace, key);
                default
            }
            Err(e) => {
                report_read_error(namespace, key, e);
                default
            }
        }
    }

    /// Read a `u16`, or `default`
    async fn get_u16(&mut self, namespace: &str, key: &str, default: u16) -> u16 {
        let mut buf = [0u8; 2];
        match self.read(namespace, key, &mut buf).await {
            Ok(2) => u16::from_le_bytes(buf),
            Ok(_) => {
                warn!("{}/{} has unexpected size", namespace, key);
                default
            }
            Err(e) => {
                report_read_error(namespace, key, e);
                default
            }
        }
    }

    /// Read a string, or `None` if absent, empty or not valid UTF-8
    async fn get_str<const N: usize>(&mut self, namespace: &str, key: &str) -> Option<String<N>> {
        let mut buf = [0u8; N];
        let len = match self.read(namespace, key, &mut buf).await {
            Ok(len) => len,
            Err(e) => {
                report_read_error(namespace, key, e);
                return None;
            }
        };
        let text = core::str::from_utf8(&buf[..len]).ok()?;
        if text.is_empty() {
            return None;
        }
        String::try_from(text).ok()
    }

    /// Write a `u8`
    async fn set_u8(&mut self, namespace: &str, key: &str, value: u8) -> Result<(), StoreError> {
        self.write(namespace, key, &[value]).await
    }

    /// Write a `u16`
    async fn set_u16(&mut self, namespace: &str, key: &str, value: u16) -> Result<(), StoreError> {
        self.write(namespace, key, &value.to_le_bytes()).await
    }
}

impl<T: ConfigStore> StoreExt for T {}

fn report_read_error(namespace: &str, key: &str, error: StoreError) {
    if error != StoreError::NotFound {
        warn!("Reading {}/{} failed: {}, using default", namespace, key, error);
    }
}

/// Truncate `text` into a bounded string on a character boundary
pub(crate) fn bounded<const N: usize>(text: &str) -> String<N> {
    let mut out = String::new();
    for ch in text.chars() {
        if out.push(ch).is_err() {
            break;
        }
    }
    out
}

/// Snapshot of the settings consumed by the home screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Owner nickname
    pub nickname: String<MAX_NICKNAME_LEN>,
    /// Network to join
    pub network: NetworkIdentity,
    /// Connect timeout in poll ticks
    pub wifi_timeout_ticks: u8,
    /// Battery gauge calibration
    pub battery: BatteryCalibration,
    /// Power countdown reset value (ticks)
    pub power_countdown: u8,
    /// Tick period in milliseconds
    pub tick_period_ms: u16,
    /// Easter-egg countdown reset value (presses)
    pub about_countdown: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            nickname: bounded(defaults::NICKNAME),
            network: NetworkIdentity::default(),
            wifi_timeout_ticks: defaults::WIFI_TIMEOUT,
            battery: BatteryCalibration::default(),
            power_countdown: defaults::POWER_AMOUNT,
            tick_period_ms: defaults::TICK_PERIOD_MS,
            about_countdown: defaults::ABOUT_AMOUNT,
        }
    }
}

impl Settings {
    /// Load all settings from the store
    pub async fn load<S: ConfigStore>(store: &mut S) -> Self {
        let nickname = store
            .get_str(keys::OWNER, keys::NICKNAME)
            .await
            .unwrap_or_else(|| bounded(defaults::NICKNAME));

        let network = NetworkIdentity {
            ssid: store
                .get_str(keys::BADGE, keys::WIFI_SSID)
                .await
                .unwrap_or_else(|| bounded(defaults::WIFI_SSID)),
            password: store.get_str(keys::BADGE, keys::WIFI_PASSWORD).await,
        };

        let battery = BatteryCalibration {
            min_mv: store
                .get_u16(keys::SPLASH, keys::BATTERY_MIN, defaults::BATTERY_MIN_MV)
                .await,
            max_mv: store
                .get_u16(keys::SPLASH, keys::BATTERY_MAX, defaults::BATTERY_MAX_MV)
                .await,
            drop_mv: BatteryCalibration::drop_from_raw(
                store
                    .get_u16(keys::SPLASH, keys::BATTERY_DROP, defaults::BATTERY_DROP_RAW)
                    .await,
            ),
        };

        let settings = Self {
            nickname,
            network,
            wifi_timeout_ticks: store
                .get_u8(keys::BADGE, keys::WIFI_TIMEOUT, defaults::WIFI_TIMEOUT)
                .await,
            battery,
            power_countdown: store
                .get_u8(keys::SPLASH, keys::POWER_AMOUNT, defaults::POWER_AMOUNT)
                .await,
            tick_period_ms: store
                .get_u16(keys::SPLASH, keys::TICK_PERIOD, defaults::TICK_PERIOD_MS)
                .await,
            about_countdown: store
                .get_u8(keys::SPLASH, keys::ABOUT_AMOUNT, defaults::ABOUT_AMOUNT)
                .await,
        };

        debug!(
            "Settings: nick={}, ssid={}, timeout={}, power={}, period={}ms",
            settings.nickname.as_str(),
            settings.network.ssid.as_str(),
            settings.wifi_timeout_ticks,
            settings.power_countdown,
            settings.tick_period_ms
        );

        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;
    use embassy_futures::block_on;

    #[test]
    fn test_blank_store_yields_defaults() {
        let mut store = MemoryStore::new();
        let settings = block_on(Settings::load(&mut store));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.nickname.as_str(), "Jan de Boer");
        assert_eq!(settings.network.ssid.as_str(), "SHA2017-insecure");
        assert_eq!(settings.network.password, None);
        assert_eq!(settings.battery.drop_mv, 0);
    }

    #[test]
    fn test_stored_values_override_defaults() {
        let mut store = MemoryStore::new();
        store.insert(keys::OWNER, keys::NICKNAME, b"Renze");
        store.insert(keys::BADGE, keys::WIFI_SSID, b"camp");
        store.insert(keys::BADGE, keys::WIFI_PASSWORD, b"hunter22");
        store.insert(keys::SPLASH, keys::TICK_PERIOD, &500u16.to_le_bytes());
        store.insert(keys::SPLASH, keys::POWER_AMOUNT, &[7]);
        store.insert(keys::SPLASH, keys::BATTERY_DROP, &1150u16.to_le_bytes());

        let settings = block_on(Settings::load(&mut store));
        assert_eq!(settings.nickname.as_str(), "Renze");
        assert_eq!(settings.network.ssid.as_str(), "camp");
        assert_eq!(
            settings.network.password.as_ref().map(|p| p.as_str()),
            Some("hunter22")
        );
        assert_eq!(settings.tick_period_ms, 500);
        assert_eq!(settings.power_countdown, 7);
        assert_eq!(settings.battery.drop_mv, 150);
    }

    #[test]
    fn test_malformed_values_fall_back() {
        let mut store = MemoryStore::new();
        // u16 key holding a single byte
        store.insert(keys::SPLASH, keys::TICK_PERIOD, &[9]);
        // Invalid UTF-8 nickname
        store.insert(keys::OWNER, keys::NICKNAME, &[0xff, 0xfe]);
        // Empty password means open network
        store.insert(keys::BADGE, keys::WIFI_PASSWORD, b"");

        let settings = block_on(Settings::load(&mut store));
        assert_eq!(settings.tick_period_ms, defaults::TICK_PERIOD_MS);
        assert_eq!(settings.nickname.as_str(), defaults::NICKNAME);
        assert_eq!(settings.network.password, None);
    }

    #[test]
    fn test_storage_failure_falls_back() {
        let mut store = MemoryStore::new();
        store.insert(keys::SPLASH, keys::POWER_AMOUNT, &[3]);
        store.fail_reads(true);

        let settings = block_on(Settings::load(&mut store));
        assert_eq!(settings.power_countdown, defaults::POWER_AMOUNT);
    }

    #[test]
    fn test_typed_roundtrip_is_little_endian() {
        let mut store = MemoryStore::new();
        block_on(store.set_u16(keys::SPLASH, keys::BATTERY_MAX, 0x1234)).unwrap();
        assert_eq!(store.raw(keys::SPLASH, keys::BATTERY_MAX), Some(&[0x34, 0x12][..]));
    }

    #[test]
    fn test_bounded_truncates_on_char_boundary() {
        let s: String<4> = bounded("abcdé");
        assert_eq!(s.as_str(), "abcd");
        let s: String<5> = bounded("abcdé");
        // 'é' needs two bytes, does not fit in the fifth
        assert_eq!(s.as_str(), "abcd");
    }
}
