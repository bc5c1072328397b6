//! Home screen
//!
//! Boot phase handling, button dispatch, rendering and the controller that
//! ties them to the service registry and the tick scheduler.

pub mod boot;
pub mod controller;
pub mod draw;
pub mod input;

pub use boot::{BootPhase, BootPlan, UpdateCheck, CLOCK_VALID_AFTER};
pub use controller::{BootOutcome, HomeScreen, Startup};
pub use input::HomeAction;
