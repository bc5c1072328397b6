//! Firmware update checker
//!
//! Decides whether to offer an update by comparing the remote build number
//! against the one compiled into the firmware. Only a successfully parsed
//! answer may change the persisted update-ready flag; transport and decode
//! failures are transient and leave the previous decision alone.

use embedded_hal_async::delay::DelayNs;
use lanyard_hal::{ConfigStore, FetchError, Radio, VersionSource};
use serde::Deserialize;

use crate::connectivity::ConnectivityGate;
use crate::settings::{keys, StoreExt};

/// Receive buffer for the version descriptor
pub const MAX_DESCRIPTOR_LEN: usize = 512;

/// Remote version descriptor
///
/// Other fields in the document are ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct VersionDescriptor {
    /// Build number of the newest published firmware
    pub build: u32,
}

impl VersionDescriptor {
    /// Parse a descriptor from a JSON body
    pub fn parse(body: &[u8]) -> Result<Self, CheckError> {
        serde_json_core::from_slice::<VersionDescriptor>(body)
            .map(|(descriptor, _)| descriptor)
            .map_err(|_| CheckError::Decode)
    }
}

/// Result of an update check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct UpdateDecision {
    /// A newer build than the running one exists
    pub available: bool,
}

impl UpdateDecision {
    /// Recall the last persisted decision
    pub async fn recall<S: ConfigStore>(store: &mut S) -> Self {
        Self {
            available: store.get_u8(keys::BADGE, keys::UPDATE_READY, 0).await != 0,
        }
    }

    /// Persist this decision
    async fn persist<S: ConfigStore>(&self, store: &mut S) {
        if let Err(e) = store
            .set_u8(keys::BADGE, keys::UPDATE_READY, u8::from(self.available))
            .await
        {
            warn!("Persisting update flag failed: {}", e);
        }
    }
}

/// Why an update check did not reach a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CheckError {
    /// No network link
    Offline,
    /// Descriptor could not be downloaded
    Fetch(FetchError),
    /// Descriptor is not valid JSON or lacks a build number
    Decode,
}

impl From<FetchError> for CheckError {
    fn from(e: FetchError) -> Self {
        CheckError::Fetch(e)
    }
}

/// Compares the remote build against the local one
#[derive(Debug, Clone, Copy)]
pub struct UpdateChecker {
    local_build: u32,
}

impl UpdateChecker {
    /// Create a checker for the running build
    pub const fn new(local_build: u32) -> Self {
        Self { local_build }
    }

    /// Build number of the running firmware
    pub fn local_build(&self) -> u32 {
        self.local_build
    }

    /// Check for an update, `true` if one is available
    ///
    /// Any failure before the comparison yields `false` without touching the
    /// persisted flag.
    pub async fn check<R, D, V, S>(
        &self,
        gate: &mut ConnectivityGate<R, D>,
        timeout_ticks: u8,
        source: &mut V,
        store: &mut S,
    ) -> bool
    where
        R: Radio,
        D: DelayNs,
        V: VersionSource,
        S: ConfigStore,
    {
        self.check_detailed(gate, timeout_ticks, source, store)
            .await
            .map(|decision| decision.available)
            .unwrap_or(false)
    }

    /// Check for an update, reporting why no decision was reached
    pub async fn check_detailed<R, D, V, S>(
        &self,
        gate: &mut ConnectivityGate<R, D>,
        timeout_ticks: u8,
        source: &mut V,
        store: &mut S,
    ) -> Result<UpdateDecision, CheckError>
    where
        R: Radio,
        D: DelayNs,
        V: VersionSource,
        S: ConfigStore,
    {
        if !gate.is_connected() && !gate.enable(timeout_ticks).await {
            return Err(CheckError::Offline);
        }

        let remote = self.fetch_remote(source).await.inspect_err(|e| {
            warn!("Update check failed: {}", e);
        })?;

        let decision = self.decide(remote.build);
        info!(
            "Remote build {}, local build {}, update available: {}",
            remote.build, self.local_build, decision.available
        );
        decision.persist(store).await;
        Ok(decision)
    }

    /// Compare a remote build number against the local one
    pub fn decide(&self, remote_build: u32) -> UpdateDecision {
        UpdateDecision {
            available: remote_build > self.local_build,
        }
    }

    async fn fetch_remote<V: VersionSource>(
        &self,
        source: &mut V,
    ) -> Result<VersionDescriptor, CheckError> {
        let mut body = [0u8; MAX_DESCRIPTOR_LEN];
        let len = source.fetch(&mut body).await?;
        VersionDescriptor::parse(&body[..len])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connectivity::NetworkIdentity;
    use crate::testing::{CountingDelay, FixedVersion, MemoryStore, ScriptedRadio};
    use embassy_futures::block_on;

    fn online() -> ConnectivityGate<ScriptedRadio, CountingDelay> {
        ConnectivityGate::new(
            ScriptedRadio::after_polls(0),
            CountingDelay::new(),
            NetworkIdentity::default(),
        )
    }

    fn offline() -> ConnectivityGate<ScriptedRadio, CountingDelay> {
        ConnectivityGate::new(
            ScriptedRadio::never(),
            CountingDelay::new(),
            NetworkIdentity::default(),
        )
    }

    fn ready_flag(store: &MemoryStore) -> Option<u8> {
        store.raw(keys::BADGE, keys::UPDATE_READY).map(|v| v[0])
    }

    #[test]
    fn test_newer_remote_sets_flag() {
        let checker = UpdateChecker::new(119);
        let mut store = MemoryStore::new();
        let mut source = FixedVersion::body(br#"{"build":120,"name":"Maffe Maniak"}"#);

        assert!(block_on(checker.check(&mut online(), 10, &mut source, &mut store)));
        assert_eq!(ready_flag(&store), Some(1));
    }

    #[test]
    fn test_equal_remote_clears_flag() {
        let checker = UpdateChecker::new(119);
        let mut store = MemoryStore::new();
        store.insert(keys::BADGE, keys::UPDATE_READY, &[1]);
        let mut source = FixedVersion::body(br#"{"build":119}"#);

        assert!(!block_on(checker.check(&mut online(), 10, &mut source, &mut store)));
        assert_eq!(ready_flag(&store), Some(0));
    }

    #[test]
    fn test_offline_leaves_flag_untouched() {
        let checker = UpdateChecker::new(119);
        let mut store = MemoryStore::new();
        store.insert(keys::BADGE, keys::UPDATE_READY, &[1]);
        let mut source = FixedVersion::body(br#"{"build":200}"#);

        let result = block_on(checker.check_detailed(&mut offline(), 2, &mut source, &mut store));
        assert_eq!(result, Err(CheckError::Offline));
        assert_eq!(source.fetches, 0);
        assert_eq!(ready_flag(&store), Some(1));
    }

    #[test]
    fn test_transport_failure_leaves_flag_untouched() {
        let checker = UpdateChecker::new(119);
        let mut store = MemoryStore::new();
        store.insert(keys::BADGE, keys::UPDATE_READY, &[1]);
        let mut source = FixedVersion::failing(FetchError::Connect);

        let result = block_on(checker.check_detailed(&mut online(), 10, &mut source, &mut store));
        assert_eq!(result, Err(CheckError::Fetch(FetchError::Connect)));
        assert_eq!(ready_flag(&store), Some(1));
    }

    #[test]
    fn test_malformed_body_leaves_flag_untouched() {
        let checker = UpdateChecker::new(119);
        let mut store = MemoryStore::new();
        store.insert(keys::BADGE, keys::UPDATE_READY, &[0]);

        let bodies: [&[u8]; 3] = [b"<html>502</html>", br#"{"name":"x"}"#, br#"{"build":-4}"#];
        for body in bodies {
            let mut source = FixedVersion::body(body);
            let result =
                block_on(checker.check_detailed(&mut online(), 10, &mut source, &mut store));
            assert_eq!(result, Err(CheckError::Decode));
        }
        assert_eq!(ready_flag(&store), Some(0));
    }

    #[test]
    fn test_recall_reads_persisted_flag() {
        let mut store = MemoryStore::new();
        assert!(!block_on(UpdateDecision::recall(&mut store)).available);
        store.insert(keys::BADGE, keys::UPDATE_READY, &[1]);
        assert!(block_on(UpdateDecision::recall(&mut store)).available);
    }
}
