//! Display support for the Lanyard badge
//!
//! This crate provides:
//! - [`FrameBuffer`]: 1-bpp landscape frame, an `embedded-graphics` draw target
//! - [`Panel`]: the physical e-paper refresh
//! - [`Display`]: the `lanyard_hal::Canvas` the home screen draws on
//!
//! Panel drivers live with the board firmware; this crate stays host
//! testable.

#![no_std]

pub mod display;
pub mod framebuffer;
pub mod panel;

pub use display::Display;
pub use framebuffer::{FrameBuffer, HEIGHT, WIDTH};
pub use panel::Panel;
