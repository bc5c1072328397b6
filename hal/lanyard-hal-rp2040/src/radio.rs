//! CYW43 station radio (Pico W)
//!
//! `connect` returns once the chip has associated; the link only counts as
//! usable after DHCP has handed out an address. The join has no timeout of
//! its own: the connectivity gate drops it when its tick budget runs out.

use cyw43::{Control, JoinOptions, PowerManagementMode};
use embassy_net::Stack;
use lanyard_hal::Radio;

/// Radio errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RadioError {
    /// Radio is powered down
    Inactive,
    /// Association was rejected
    Join,
}

/// [`Radio`] over the CYW43 control channel and the network stack
pub struct Cyw43Radio<'a> {
    control: Control<'a>,
    stack: Stack<'a>,
    active: bool,
}

impl<'a> Cyw43Radio<'a> {
    /// Wrap an initialised chip; starts powered down
    pub fn new(control: Control<'a>, stack: Stack<'a>) -> Self {
        Self {
            control,
            stack,
            active: false,
        }
    }

    /// Network stack bound to this radio
    pub fn stack(&self) -> Stack<'a> {
        self.stack
    }
}

impl Radio for Cyw43Radio<'_> {
    type Error = RadioError;

    async fn set_active(&mut self, active: bool) {
        if active == self.active {
            return;
        }
        if active {
            self.control
                .set_power_management(PowerManagementMode::PowerSave)
                .await;
        } else {
            self.control.leave().await;
            self.control
                .set_power_management(PowerManagementMode::SuperSave)
                .await;
        }
        self.active = active;
    }

    fn is_active(&self) -> bool {
        self.active
    }

    async fn connect(&mut self, ssid: &str, password: Option<&str>) -> Result<(), RadioError> {
        if !self.active {
            return Err(RadioError::Inactive);
        }
        let options = match password {
            Some(password) => JoinOptions::new(password.as_bytes()),
            None => JoinOptions::new_open(),
        };
        self.control
            .join(ssid, options)
            .await
            .map_err(|_| RadioError::Join)
    }

    fn is_connected(&mut self) -> bool {
        self.active && self.stack.is_link_up() && self.stack.config_v4().is_some()
    }
}
