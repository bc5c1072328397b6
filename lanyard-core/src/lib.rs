//! Board-agnostic home screen logic for the Lanyard badge firmware
//!
//! This crate contains everything above the hardware traits of
//! `lanyard-hal`:
//!
//! - Connectivity gate (bounded-time link acquisition)
//! - Update checker
//! - Power and easter-egg countdowns
//! - Service registry with per-service fault containment
//! - Self-rearming tick scheduler
//! - Home screen controller, boot phase and rendering
//! - Typed settings on top of the configuration store

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

#[macro_use]
mod fmt;

pub mod battery;
pub mod connectivity;
pub mod countdown;
pub mod home;
pub mod scheduler;
pub mod services;
pub mod settings;
pub mod update;

#[cfg(test)]
mod testing;
