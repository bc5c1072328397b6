//! Embassy async tasks
//!
//! Each task runs independently and communicates via channels.

pub mod home;
pub mod input;
pub mod net;

pub use home::{home_task, HomeContext};
pub use input::input_task;
pub use net::{cyw43_task, net_task};
