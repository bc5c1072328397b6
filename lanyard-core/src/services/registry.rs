//! Service registry
//!
//! Built once per boot by [`Registry::discover`], then immutable. Discovery
//! walks the service source in listing order and rejects entries one by one
//! (bad manifest, unloadable code, no network, faulting setup) without ever
//! aborting the pass. The survivors keep their listing order.

use embedded_hal_async::delay::DelayNs;
use heapless::Vec;
use lanyard_hal::{Canvas, Radio};

use super::manifest::{ManifestError, ServiceDescriptor, ServiceName, MAX_MANIFEST_LEN};
use super::service::{contain, Fault, Phase, Service};
use crate::connectivity::ConnectivityGate;

/// Maximum number of entries a source may list
pub const MAX_ENTRIES: usize = 16;

/// Default registry capacity
pub const MAX_SERVICES: usize = 8;

/// Errors from a service source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// The service root does not exist
    RootMissing,
    /// No code unit for this entry
    NotFound,
    /// Code unit exists but cannot be instantiated
    Invalid,
    /// Data does not fit the caller's buffer
    TooLarge,
    /// Underlying storage failed
    Io,
}

impl From<LoadError> for ManifestError {
    fn from(error: LoadError) -> Self {
        match error {
            LoadError::TooLarge => ManifestError::TooLarge,
            _ => ManifestError::Missing,
        }
    }
}

/// Where services come from
///
/// Lists entries, hands out their manifests and instantiates their code.
pub trait ServiceSource {
    /// The code unit type this source produces
    type Service: Service;

    /// Entry names in listing order
    fn list(&mut self) -> Result<Vec<ServiceName, MAX_ENTRIES>, LoadError>;

    /// Copy the raw manifest of `name` into `buffer`, returning its length
    ///
    /// A manifest longer than `buffer` is [`LoadError::TooLarge`].
    fn manifest(&mut self, name: &str, buffer: &mut [u8]) -> Result<usize, LoadError>;

    /// Instantiate the code unit of `name`
    fn load(&mut self, name: &str) -> Result<Self::Service, LoadError>;
}

/// Why discovery rejected an entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SkipReason {
    /// Manifest missing, malformed or incompatible
    Manifest(ManifestError),
    /// Code unit could not be loaded
    Load(LoadError),
    /// Needed the network during setup and it was not available
    WifiUnavailable,
    /// Setup faulted
    SetupFault(Fault),
    /// Registry already full
    Full,
}

/// A live service with the capabilities bound at discovery
pub struct ServiceHandle<S> {
    descriptor: ServiceDescriptor,
    service: S,
    loop_bound: bool,
    draw_bound: bool,
}

impl<S> ServiceHandle<S> {
    /// Service name
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// Manifest this service was registered with
    pub fn descriptor(&self) -> &ServiceDescriptor {
        &self.descriptor
    }

    /// Loop callback is bound
    pub fn has_loop(&self) -> bool {
        self.loop_bound
    }

    /// Draw callback is bound
    pub fn has_draw(&self) -> bool {
        self.draw_bound
    }

    /// The service itself
    pub fn service(&self) -> &S {
        &self.service
    }
}

/// Ordered, immutable set of live services
pub struct Registry<S, const N: usize = MAX_SERVICES> {
    handles: Vec<ServiceHandle<S>, N>,
    skipped: Vec<(ServiceName, SkipReason), MAX_ENTRIES>,
}

impl<S: Service, const N: usize> Registry<S, N> {
    /// Registry with no services (before discovery, or without a source)
    pub fn empty() -> Self {
        Self {
            handles: Vec::new(),
            skipped: Vec::new(),
        }
    }

    /// Discover, load and set up every service `source` lists
    ///
    /// The gate is used for services that need the network during setup.
    /// Once a connection attempt fails, later services that need it are
    /// skipped without being loaded.
    pub async fn discover<Src, R, D>(
        source: &mut Src,
        gate: &mut ConnectivityGate<R, D>,
        timeout_ticks: u8,
    ) -> Self
    where
        Src: ServiceSource<Service = S>,
        R: Radio,
        D: DelayNs,
    {
        let mut registry = Self::empty();

        let entries = match source.list() {
            Ok(entries) => entries,
            Err(LoadError::RootMissing) => {
                debug!("No service root, nothing to discover");
                return registry;
            }
            Err(e) => {
                warn!("Listing services failed: {}", e);
                return registry;
            }
        };

        let mut wifi_failed = false;

        for name in entries {
            let mut buffer = [0u8; MAX_MANIFEST_LEN];
            let descriptor = match source
                .manifest(&name, &mut buffer)
                .map_err(ManifestError::from)
                .and_then(|len| ServiceDescriptor::parse(&name, &buffer[..len]))
            {
                Ok(descriptor) => descriptor,
                Err(e) => {
                    registry.skip(name, SkipReason::Manifest(e));
                    continue;
                }
            };

            if registry.handles.is_full() {
                registry.skip(name, SkipReason::Full);
                continue;
            }

            if descriptor.wifi_required_setup && wifi_failed {
                registry.skip(name, SkipReason::WifiUnavailable);
                continue;
            }

            let mut service = match source.load(&name) {
                Ok(service) => service,
                Err(e) => {
                    registry.skip(name, SkipReason::Load(e));
                    continue;
                }
            };

            if descriptor.wifi_required_setup
                && !gate.is_connected()
                && !gate.enable(timeout_ticks).await
            {
                wifi_failed = true;
                registry.skip(name, SkipReason::WifiUnavailable);
                continue;
            }

            if let Err(fault) = contain(&name, Phase::Setup, || service.setup()) {
                registry.skip(name, SkipReason::SetupFault(fault));
                continue;
            }

            let exposed = service.entry_points();
            if descriptor.loop_enabled && !exposed.run_loop {
                warn!("[{}] Loop requested but not defined", name.as_str());
            }
            if descriptor.draw_enabled && !exposed.draw {
                warn!("[{}] Draw requested but not defined", name.as_str());
            }

            let handle = ServiceHandle {
                loop_bound: descriptor.loop_enabled && exposed.run_loop,
                draw_bound: descriptor.draw_enabled && exposed.draw,
                descriptor,
                service,
            };

            if registry.handles.push(handle).is_err() {
                registry.skip(name, SkipReason::Full);
                continue;
            }
            info!("[{}] Service registered", name.as_str());
        }

        registry
    }

    fn skip(&mut self, name: ServiceName, reason: SkipReason) {
        warn!("[{}] Skipped: {}", name.as_str(), reason);
        // The list has room for every entry a source can produce
        let _ = self.skipped.push((name, reason));
    }

    /// Call every bound loop callback
    ///
    /// Returns `true` if any service asked to stay awake. A faulting service
    /// does not stop the others.
    pub fn dispatch_loop(&mut self, sleep_countdown: i16) -> bool {
        let mut stay_awake = false;
        for handle in self.handles.iter_mut().filter(|h| h.loop_bound) {
            let service = &mut handle.service;
            if let Ok(true) = contain(&handle.descriptor.name, Phase::Loop, || {
                service.run_loop(sleep_countdown)
            }) {
                stay_awake = true;
            }
        }
        stay_awake
    }

    /// Call every bound draw callback, stacking services vertically from `y`
    ///
    /// Returns the total vertical space consumed. Negative returns and
    /// faults leave the cursor where it was.
    pub fn dispatch_draw<C: Canvas>(&mut self, canvas: &mut C, x: i32, y: i32) -> i32 {
        let mut cursor = y;
        for handle in self.handles.iter_mut().filter(|h| h.draw_bound) {
            let service = &mut handle.service;
            match contain(&handle.descriptor.name, Phase::Draw, || {
                service.draw(canvas, x, cursor)
            }) {
                Ok(used) if used > 0 => cursor = cursor.saturating_add(used),
                Ok(used) if used < 0 => {
                    debug!("[{}] Negative draw height {}", handle.name(), used);
                }
                _ => {}
            }
        }
        cursor - y
    }

    /// Number of live services
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// No live services
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Live services in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &ServiceHandle<S>> {
        self.handles.iter()
    }

    /// Rejected entries in listing order
    pub fn skipped(&self) -> &[(ServiceName, SkipReason)] {
        &self.skipped
    }
}
