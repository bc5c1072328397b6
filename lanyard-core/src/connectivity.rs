//! Connectivity gate
//!
//! Mediates bounded-time acquisition of the network link. `enable` is the
//! one intentionally blocking operation on the home screen: it polls the
//! radio at a fixed interval until the link is up or the tick budget runs
//! out. Nothing else touches the radio.

use core::cell::Cell;

use embassy_futures::select::{select, Either};
use embedded_hal_async::delay::DelayNs;
use heapless::String;
use lanyard_hal::Radio;

use crate::settings::{bounded, defaults};

/// Interval between link status polls (ms)
pub const POLL_INTERVAL_MS: u32 = 100;

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Network to join
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkIdentity {
    /// Network name
    pub ssid: String<MAX_SSID_LEN>,
    /// Passphrase, `None` for open networks
    pub password: Option<String<MAX_PASSWORD_LEN>>,
}

impl Default for NetworkIdentity {
    fn default() -> Self {
        Self {
            ssid: bounded(defaults::WIFI_SSID),
            password: None,
        }
    }
}

/// Link state as tracked by the gate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectivityState {
    /// Radio off
    Disabled,
    /// Association in progress
    Connecting,
    /// Link up
    Connected,
    /// Last attempt timed out or could not start; radio off
    Failed,
}

/// Bounded-time network link acquisition
pub struct ConnectivityGate<R, D> {
    radio: R,
    delay: D,
    identity: NetworkIdentity,
    state: ConnectivityState,
}

impl<R: Radio, D: DelayNs> ConnectivityGate<R, D> {
    /// Create a gate for `identity`; the radio is assumed off
    pub fn new(radio: R, delay: D, identity: NetworkIdentity) -> Self {
        Self {
            radio,
            delay,
            identity,
            state: ConnectivityState::Disabled,
        }
    }

    /// Current link state
    pub fn state(&self) -> ConnectivityState {
        self.state
    }

    /// Check whether the link is up right now
    pub fn is_connected(&mut self) -> bool {
        self.state == ConnectivityState::Connected && self.radio.is_connected()
    }

    /// Network the gate joins
    pub fn identity(&self) -> &NetworkIdentity {
        &self.identity
    }

    /// Access the underlying radio
    pub fn radio(&self) -> &R {
        &self.radio
    }

    /// Bring the link up within `timeout_ticks` poll intervals
    ///
    /// The budget covers the join itself as well as the wait for the link:
    /// a join still in flight when it runs out is abandoned. Returns `true`
    /// immediately if the link is already up. On timeout the radio is
    /// switched off again and `false` is returned; there is no retry within
    /// the same call.
    pub async fn enable(&mut self, timeout_ticks: u8) -> bool {
        if self.radio.is_connected() {
            self.state = ConnectivityState::Connected;
            return true;
        }

        self.state = ConnectivityState::Connecting;
        self.radio.set_active(true).await;

        info!("Connecting to '{}'...", self.identity.ssid.as_str());
        let remaining = Cell::new(timeout_ticks);
        let password = self.identity.password.as_ref().map(|p| p.as_str());
        let join = self.radio.connect(&self.identity.ssid, password);
        match select(join, spend_ticks(&mut self.delay, &remaining)).await {
            Either::First(Ok(())) => {}
            Either::First(Err(e)) => {
                #[cfg(feature = "defmt")]
                warn!("Could not start connection: {}", defmt::Debug2Format(&e));
                #[cfg(not(feature = "defmt"))]
                let _ = e;
                self.fail().await;
                return false;
            }
            Either::Second(()) => {
                warn!("Timeout while joining '{}'", self.identity.ssid.as_str());
                self.fail().await;
                return false;
            }
        }

        let mut remaining = remaining.get();
        while !self.radio.is_connected() {
            if remaining == 0 {
                warn!("Timeout while connecting to '{}'", self.identity.ssid.as_str());
                self.fail().await;
                return false;
            }
            remaining -= 1;
            self.delay.delay_ms(POLL_INTERVAL_MS).await;
        }

        info!("Connected to '{}'", self.identity.ssid.as_str());
        self.state = ConnectivityState::Connected;
        true
    }

    /// Switch the radio off
    ///
    /// Always safe to call, including when already disabled.
    pub async fn disable(&mut self) {
        self.radio.set_active(false).await;
        self.state = ConnectivityState::Disabled;
    }

    async fn fail(&mut self) {
        self.radio.set_active(false).await;
        self.state = ConnectivityState::Failed;
    }
}

/// Burn poll intervals until `remaining` hits zero
///
/// Each interval is charged before it is waited out, so an abandoned wait
/// still counts against the budget.
async fn spend_ticks<D: DelayNs>(delay: &mut D, remaining: &Cell<u8>) {
    while remaining.get() > 0 {
        remaining.set(remaining.get() - 1);
        delay.delay_ms(POLL_INTERVAL_MS).await;
    }
}
