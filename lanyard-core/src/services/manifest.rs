//! Service manifest parsing
//!
//! Each service ships a small JSON manifest next to its code:
//!
//! ```json
//! {"apiVersion": 1, "wifi": {"setup": true, "loop": false},
//!  "rtc": false, "loop": true, "draw": true}
//! ```
//!
//! Every field is required. Unknown fields are ignored.

use heapless::String;
use serde::Deserialize;

use crate::settings::bounded;

/// Manifest API version this firmware understands
pub const API_VERSION: i32 = 1;

/// Largest manifest accepted (bytes)
pub const MAX_MANIFEST_LEN: usize = 1024;

/// Maximum service name length in bytes
pub const MAX_NAME_LEN: usize = 32;

/// Name of a service (its directory name)
pub type ServiceName = String<MAX_NAME_LEN>;

/// Why a manifest was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ManifestError {
    /// No manifest next to the service, or it could not be read
    Missing,
    /// Longer than [`MAX_MANIFEST_LEN`]
    TooLarge,
    /// Not JSON, or a required field is absent or mistyped
    Malformed,
    /// Written against another manifest API version
    IncompatibleApi(i32),
}

impl From<serde_json_core::de::Error> for ManifestError {
    fn from(_: serde_json_core::de::Error) -> Self {
        ManifestError::Malformed
    }
}

#[derive(Deserialize)]
struct RawWifi {
    setup: bool,
    #[serde(rename = "loop")]
    run_loop: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawManifest {
    api_version: i32,
    wifi: RawWifi,
    rtc: bool,
    #[serde(rename = "loop")]
    run_loop: bool,
    draw: bool,
}

/// Validated service manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    /// Service name
    pub name: ServiceName,
    /// Manifest API version (always [`API_VERSION`] once validated)
    pub api_version: i32,
    /// Network link needed during setup
    pub wifi_required_setup: bool,
    /// Network link needed by the loop callback
    pub wifi_required_loop: bool,
    /// Wall clock must be set
    pub rtc_required: bool,
    /// Service wants loop callbacks
    pub loop_enabled: bool,
    /// Service wants draw callbacks
    pub draw_enabled: bool,
}

impl ServiceDescriptor {
    /// Parse and validate the manifest of service `name`
    pub fn parse(name: &str, json: &[u8]) -> Result<Self, ManifestError> {
        let (raw, _) = serde_json_core::from_slice::<RawManifest>(json)?;

        if raw.api_version != API_VERSION {
            return Err(ManifestError::IncompatibleApi(raw.api_version));
        }

        Ok(Self {
            name: bounded(name),
            api_version: raw.api_version,
            wifi_required_setup: raw.wifi.setup,
            wifi_required_loop: raw.wifi.run_loop,
            rtc_required: raw.rtc,
            loop_enabled: raw.run_loop,
            draw_enabled: raw.draw,
        })
    }
}
