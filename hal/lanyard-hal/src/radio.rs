//! Wireless link abstraction
//!
//! The radio is only ever driven by the connectivity gate in `lanyard-core`.
//! Connection is split into "initiate" and "poll" so the gate can bound the
//! wait with its own tick countdown.

/// Wireless station interface
pub trait Radio {
    /// Error returned when a connection attempt cannot even be started
    type Error: core::fmt::Debug;

    /// Power the radio up or down
    ///
    /// Deactivating an inactive radio must be a no-op.
    fn set_active(&mut self, active: bool) -> impl core::future::Future<Output = ()>;

    /// Check whether the radio is powered
    fn is_active(&self) -> bool;

    /// Associate with a network
    ///
    /// `password` is `None` for open networks. The future may be dropped
    /// before it completes when the caller's time budget runs out. Returning
    /// `Ok` does not mean the link is up; poll [`Radio::is_connected`] for
    /// that.
    fn connect(
        &mut self,
        ssid: &str,
        password: Option<&str>,
    ) -> impl core::future::Future<Output = Result<(), Self::Error>>;

    /// Check whether the link is up and usable
    fn is_connected(&mut self) -> bool;
}
