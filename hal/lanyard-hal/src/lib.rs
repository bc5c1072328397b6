//! Lanyard Hardware Abstraction Layer
//!
//! This crate defines the traits the home screen uses to reach the outside
//! world. Chip-specific crates (RP2040 / Pico W today) implement them, and
//! `lanyard-core` is written purely against them so it can be tested on the
//! host.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  lanyard-firmware (board bring-up)      │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lanyard-core (home screen, services)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  lanyard-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │ lanyard-hal-  │       │ lanyard-      │
//! │    rp2040     │       │   display     │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`store::ConfigStore`] - Persistent namespaced key-value storage
//! - [`radio::Radio`] - Wireless link control
//! - [`power::PowerSense`] - Battery and external power sensing
//! - [`canvas::Canvas`] - Monochrome drawing surface
//! - [`version::VersionSource`] - Remote firmware version descriptor
//! - [`system::Clock`], [`system::Monotonic`], [`system::System`] - Time and lifecycle

#![no_std]
#![deny(unsafe_code)]

pub mod canvas;
pub mod input;
pub mod power;
pub mod radio;
pub mod store;
pub mod system;
pub mod version;

// Re-export key traits at crate root for convenience
pub use canvas::{Canvas, CanvasError, Font, Refresh};
pub use input::{Button, ButtonEvent};
pub use power::PowerSense;
pub use radio::Radio;
pub use store::{ConfigStore, StoreError};
pub use system::{App, Clock, ClockError, Monotonic, ResetCause, System};
pub use version::{FetchError, VersionSource};
