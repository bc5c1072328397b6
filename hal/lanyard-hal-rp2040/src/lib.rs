//! RP2040 / Pico W HAL for the Lanyard badge
//!
//! This crate provides RP2040-specific implementations of the shared
//! `lanyard-hal` traits:
//!
//! - Flash configuration store (implements `lanyard_hal::ConfigStore`)
//! - ADC battery and USB sensing (implements `lanyard_hal::PowerSense`)
//! - CYW43 station radio (implements `lanyard_hal::Radio`)
//! - Watchdog-scratch reset cause and app hand-off (implements `lanyard_hal::System`)

#![no_std]

pub mod flash;
pub mod power;
pub mod radio;
pub mod system;

pub use flash::FlashConfigStore;
pub use power::{AdcPowerSense, Dividers};
pub use radio::{Cyw43Radio, RadioError};
pub use system::Rp2040System;
